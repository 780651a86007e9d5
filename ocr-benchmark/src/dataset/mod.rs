//! Benchmark documents and result records
//!
//! Field names serialize in camelCase so data files and persisted results
//! keep the shape the report tooling reads.

pub mod loader;

pub use loader::{load_documents, LoadError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use json_accuracy::DiffStats;

use crate::config::ModelSpec;

/// A benchmark input: one document image with its ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Image location: an http(s) URL or a local path
    pub image_url: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    /// JSON schema the extraction must conform to
    pub json_schema: Value,
    pub true_json_output: Value,
    pub true_markdown_output: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Token and cost accounting for one provider call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Wall-clock seconds
    pub duration: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// Usage broken down by pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<Usage>,
}

impl StageUsage {
    pub fn is_empty(&self) -> bool {
        self.ocr.is_none() && self.extraction.is_none()
    }
}

/// What a provider call produced: markdown text, extracted JSON, or both.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub json: Option<Value>,
    pub text: Option<String>,
    pub usage: Usage,
}

/// One benchmark record: a (model pipeline, document) pair with predictions
/// and scores. Everything downstream of the run reads this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub file_url: String,
    pub metadata: DocumentMetadata,
    pub json_schema: Value,
    pub ocr_model: String,
    pub extraction_model: Option<String>,
    pub direct_image_extraction: bool,
    pub true_markdown: Option<String>,
    pub true_json: Option<Value>,
    pub predicted_markdown: Option<String>,
    pub predicted_json: Option<Value>,
    pub json_accuracy: Option<f64>,
    pub json_diff: Option<Value>,
    pub full_json_diff: Option<Value>,
    pub json_diff_stats: Option<DiffStats>,
    pub usage: Option<StageUsage>,
    pub error: Option<String>,
}

impl BenchmarkResult {
    /// Empty record for a (pipeline, document) pair, before any provider ran
    pub fn new(spec: &ModelSpec, document: &Document) -> Self {
        Self {
            file_url: document.image_url.clone(),
            metadata: document.metadata.clone(),
            json_schema: document.json_schema.clone(),
            ocr_model: spec.ocr.clone(),
            extraction_model: spec.extraction.clone(),
            direct_image_extraction: spec.direct_image_extraction,
            true_markdown: Some(document.true_markdown_output.clone()),
            true_json: Some(document.true_json_output.clone()),
            predicted_markdown: None,
            predicted_json: None,
            json_accuracy: None,
            json_diff: None,
            full_json_diff: None,
            json_diff_stats: None,
            usage: None,
            error: None,
        }
    }

    /// Display label of the pipeline that produced this record
    pub fn model_label(&self) -> String {
        ModelSpec {
            ocr: self.ocr_model.clone(),
            extraction: self.extraction_model.clone(),
            direct_image_extraction: self.direct_image_extraction,
        }
        .label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_deserializes_camel_case() {
        let doc: Document = serde_json::from_value(json!({
            "imageUrl": "https://example.com/invoice.png",
            "metadata": {"language": "en"},
            "jsonSchema": {"type": "object"},
            "trueJsonOutput": {"total": 10},
            "trueMarkdownOutput": "# Invoice",
        }))
        .unwrap();
        assert_eq!(doc.image_url, "https://example.com/invoice.png");
        assert_eq!(doc.metadata.language.as_deref(), Some("en"));
        assert_eq!(doc.true_json_output, json!({"total": 10}));
    }

    #[test]
    fn result_serializes_camel_case() {
        let spec = ModelSpec {
            ocr: "gpt-4o".to_string(),
            extraction: None,
            direct_image_extraction: false,
        };
        let doc: Document = serde_json::from_value(json!({
            "imageUrl": "a.png",
            "jsonSchema": {},
            "trueJsonOutput": {},
            "trueMarkdownOutput": "",
        }))
        .unwrap();

        let encoded = serde_json::to_value(BenchmarkResult::new(&spec, &doc)).unwrap();
        assert_eq!(encoded["fileUrl"], json!("a.png"));
        assert_eq!(encoded["ocrModel"], json!("gpt-4o"));
        assert_eq!(encoded["directImageExtraction"], json!(false));
        assert_eq!(encoded["jsonAccuracy"], json!(null));
    }
}
