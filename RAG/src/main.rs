use anyhow::{bail, Context, Result};
use clap::Parser;
use doc_genie::document_processor::is_pdf_upload;
use doc_genie::{GeminiProvider, Outcome, QueryService, Settings, Severity};
use std::path::PathBuf;
use std::sync::Arc;

/// Ask a question about a PDF
#[derive(Parser, Debug)]
#[command(name = "doc-genie", version, about, long_about = None)]
struct Cli {
    /// PDF file to read
    pdf: PathBuf,

    /// Question to answer; without it the PDF is only indexed
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let file_name = cli.pdf.file_name().and_then(|n| n.to_str());
    if !is_pdf_upload(file_name, None) {
        bail!("{} is not a PDF file", cli.pdf.display());
    }

    let settings = Arc::new(Settings::from_env().context("loading settings")?);
    if !settings.has_credential() {
        log::warn!("GOOGLE_API_KEY is not set; questions cannot be answered");
    }

    let pdf = tokio::fs::read(&cli.pdf)
        .await
        .with_context(|| format!("reading {}", cli.pdf.display()))?;

    let provider = Arc::new(GeminiProvider::new(settings.gemini.clone()));
    let service = QueryService::new(settings, provider)?;

    match service.process(pdf, cli.question.as_deref()).await {
        Ok(Outcome::Answered(answer)) => {
            println!("{}", answer.text);
        }
        Ok(Outcome::Indexed { chunks }) => {
            println!("Indexed {} chunks. Pass --question to ask about the PDF.", chunks);
        }
        Err(e) => {
            match e.severity() {
                Severity::Warning => eprintln!("Warning: {}", e.user_message()),
                Severity::Error => eprintln!("{}", e.user_message()),
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
