//! Provider trait definition for OCR and extraction model adapters

use async_trait::async_trait;
use serde_json::Value;

use crate::dataset::ExtractionResult;

/// Error types for provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} is not supported by this provider")]
    Unsupported(&'static str),

    #[error("Timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Adapter for a vendor model that can OCR a document image and/or extract
/// schema-conforming JSON.
///
/// `ocr` is required. The extraction methods default to
/// [`ProviderError::Unsupported`] so OCR-only adapters need not implement
/// them.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Model identifier this instance drives (e.g. "gpt-4o")
    fn model(&self) -> &str;

    /// Convert the document image to markdown
    async fn ocr(&self, image_url: &str) -> ProviderResult<ExtractionResult>;

    /// Produce JSON conforming to `schema` from previously OCR'd text
    async fn extract_from_text(
        &self,
        _text: &str,
        _schema: &Value,
    ) -> ProviderResult<ExtractionResult> {
        Err(ProviderError::Unsupported("text extraction"))
    }

    /// Produce JSON conforming to `schema` straight from the image
    async fn extract_from_image(
        &self,
        _image_url: &str,
        _schema: &Value,
    ) -> ProviderResult<ExtractionResult> {
        Err(ProviderError::Unsupported("image extraction"))
    }
}
