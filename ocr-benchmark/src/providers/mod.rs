//! Model provider implementations

pub mod gemini;
pub mod openai;
pub mod prompts;
pub mod schema;
pub mod token_cost;
pub mod traits;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use traits::{ModelProvider, ProviderError, ProviderResult};

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

/// Return a provider for a model name, or `None` for the "ground-truth"
/// sentinel (the runner copies the reference markdown instead of calling
/// anything).
///
/// Matching is heuristic on the model name, the way the configs name
/// models; an unrecognized name is a configuration error.
pub fn get_model_provider(name: &str) -> ProviderResult<Option<Arc<dyn ModelProvider>>> {
    if name == "ground-truth" {
        return Ok(None);
    }

    let key = name.to_lowercase();

    if key.contains("gemini") || key.contains("google") {
        return Ok(Some(Arc::new(GeminiProvider::from_env(name)?)));
    }

    if key.contains("gpt")
        || key.contains("openai")
        || key.starts_with("o1")
        || key.starts_with("o3")
        || key.starts_with("o4")
    {
        return Ok(Some(Arc::new(OpenAiProvider::from_env(name)?)));
    }

    Err(ProviderError::Config(format!(
        "no provider implemented for model '{}'",
        name
    )))
}

/// Mime type for an image/document location, judged by extension with query
/// strings and fragments stripped. Unknown extensions default to image/png.
pub fn mime_type_for(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tiff" | "tif" => "image/tiff",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// Recover a JSON value from a model response that may wrap it in markdown
/// fences or prose. Tries, in order: a fenced block, the first-to-last brace
/// span, the raw text; each candidate is also retried with trailing commas
/// stripped.
pub(crate) fn extract_json_from_text(text: &str) -> ProviderResult<Value> {
    let s = text.trim();

    let fence = Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap();
    let trailing_comma = Regex::new(r",\s*([}\]])").unwrap();

    let mut candidates: Vec<String> = Vec::new();
    if let Some(captures) = fence.captures(s) {
        candidates.push(captures[1].trim().to_string());
    }
    if let (Some(start), Some(end)) = (s.find('{'), s.rfind('}')) {
        if end > start {
            candidates.push(s[start..=end].to_string());
        }
    }
    candidates.push(s.to_string());

    for candidate in &candidates {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }
        let repaired = trailing_comma.replace_all(candidate, "$1");
        if let Ok(value) = serde_json::from_str(&repaired) {
            return Ok(value);
        }
    }

    Err(ProviderError::Parse(
        "could not extract valid JSON from model response".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for("scan.pdf"), "application/pdf");
        assert_eq!(mime_type_for("https://x.test/a/receipt.JPG?sig=abc"), "image/jpeg");
        assert_eq!(mime_type_for("page.tiff#frag"), "image/tiff");
        assert_eq!(mime_type_for("unknown.webp"), "image/png");
        assert_eq!(mime_type_for(""), "image/png");
    }

    #[test]
    fn test_extract_plain_json() {
        let value = extract_json_from_text(r#"{"a": 1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here is the result:\n```json\n{\"total\": 42}\n```\nDone.";
        assert_eq!(extract_json_from_text(text).unwrap(), json!({"total": 42}));
    }

    #[test]
    fn test_extract_json_from_prose() {
        let text = "The extracted object is {\"a\": [1, 2]} as requested.";
        assert_eq!(extract_json_from_text(text).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_extract_repairs_trailing_commas() {
        let text = "{\"a\": 1, \"b\": [1, 2,],}";
        assert_eq!(
            extract_json_from_text(text).unwrap(),
            json!({"a": 1, "b": [1, 2]})
        );
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(extract_json_from_text("no json here").is_err());
    }
}
