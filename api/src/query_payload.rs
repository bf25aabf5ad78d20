use crate::rag_response::ApiError;
use axum::extract::Multipart;
use doc_genie::document_processor::is_pdf_upload;

/// The fields of an `/ask` form: the PDF under `pdf` and an optional `question`.
#[derive(Debug)]
pub struct AskPayload {
    pub file_name: Option<String>,
    pub pdf: Vec<u8>,
    pub question: Option<String>,
}

impl AskPayload {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload: Option<(Option<String>, Vec<u8>)> = None;
        let mut question = None;

        while let Some(field) = multipart.next_field().await.map_err(ApiError::upload)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "pdf" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    if !is_pdf_upload(file_name.as_deref(), content_type.as_deref()) {
                        return Err(ApiError::NotPdf);
                    }
                    let bytes = field.bytes().await.map_err(ApiError::upload)?;
                    upload = Some((file_name, bytes.to_vec()));
                }
                "question" => {
                    question = Some(field.text().await.map_err(ApiError::upload)?);
                }
                other => log::debug!("Ignoring form field '{}'", other),
            }
        }

        let (file_name, pdf) = upload
            .ok_or_else(|| ApiError::BadRequest("Upload a PDF file in the 'pdf' field.".to_string()))?;

        Ok(Self {
            file_name,
            pdf,
            question,
        })
    }
}
