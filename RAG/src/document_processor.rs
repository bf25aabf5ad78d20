use crate::config::ChunkingSettings;
use crate::error::{GenieError, Result};
use crate::text_splitter::TextSplitter;

pub struct DocumentProcessor {
    splitter: TextSplitter,
}

impl DocumentProcessor {
    pub fn new(chunking: &ChunkingSettings) -> Result<Self> {
        Ok(Self {
            splitter: TextSplitter::new(chunking)?,
        })
    }

    /// Extracts and concatenates the text of every page.
    ///
    /// Decoding runs on the blocking pool; a panic inside the PDF decoder is
    /// reported as `GenieError::Pdf`. Fails with `NoExtractableText` when the
    /// document yields nothing but whitespace.
    pub async fn extract_text(&self, pdf: Vec<u8>) -> Result<String> {
        log::info!("Extracting text from PDF ({} bytes)", pdf.len());

        let pages = tokio::task::spawn_blocking(move || extract_pages(&pdf))
            .await
            .map_err(|e| GenieError::pdf(format!("PDF decoder aborted: {}", e)))??;

        let page_count = pages.len();
        let text = join_pages(pages);

        if text.trim().is_empty() {
            log::warn!("No extractable text in {} page(s)", page_count);
            return Err(GenieError::NoExtractableText);
        }

        log::info!(
            "Extracted {} characters from {} page(s)",
            text.chars().count(),
            page_count
        );
        Ok(text)
    }

    pub fn create_chunks(&self, text: &str) -> Vec<String> {
        let chunks = self.splitter.split_text(text);
        log::info!(
            "Created {} chunks (size {}, overlap {})",
            chunks.len(),
            self.splitter.chunk_size(),
            self.splitter.chunk_overlap()
        );
        chunks
    }
}

/// Per-page text in page order.
pub fn extract_pages(pdf: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(pdf).map_err(|e| GenieError::pdf(e.to_string()))
}

/// Concatenates page texts in order with nothing in between. Pages without
/// text contribute nothing.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .filter(|page| !page.as_ref().is_empty())
        .fold(String::new(), |mut text, page| {
            text.push_str(page.as_ref());
            text
        })
}

/// Upload filter: a PDF content type or a `.pdf` file name.
pub fn is_pdf_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/pdf")
        })
        .unwrap_or(false);
    let by_name = file_name
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);

    by_type || by_name
}
