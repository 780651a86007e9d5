//! Google Gemini adapter using the generateContent REST API

use std::time::Instant;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::prompts::{
    IMAGE_EXTRACTION_SYSTEM_PROMPT, JSON_EXTRACTION_SYSTEM_PROMPT, OCR_SYSTEM_PROMPT,
};
use super::token_cost::build_usage;
use super::traits::{ModelProvider, ProviderError, ProviderResult};
use super::{extract_json_from_text, mime_type_for};
use crate::dataset::ExtractionResult;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_OUTPUT_TOKENS: u32 = 65_535;

/// Client for the Gemini model family
pub struct GeminiProvider {
    model: String,
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl GeminiProvider {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: Client::new(),
        }
    }

    /// Create from the `GOOGLE_AI_API_KEY` environment variable
    pub fn from_env(model: &str) -> ProviderResult<Self> {
        let api_key = std::env::var("GOOGLE_AI_API_KEY")
            .map_err(|_| ProviderError::Config("GOOGLE_AI_API_KEY not set".to_string()))?;
        Ok(Self::new(model, api_key))
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn generate(
        &self,
        system_prompt: &str,
        parts: Vec<Value>,
        json_output: bool,
    ) -> ProviderResult<GenerateResponse> {
        let mut generation_config = json!({"maxOutputTokens": MAX_OUTPUT_TOKENS});
        if json_output {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let body = json!({
            "systemInstruction": {"parts": [{"text": system_prompt}]},
            "contents": [{"role": "user", "parts": parts}],
            "generationConfig": generation_config,
        });

        let response = self
            .http_client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json().await?)
    }

    /// Image bytes are always inlined; the API does not fetch URLs itself.
    async fn image_part(&self, image_url: &str) -> ProviderResult<Value> {
        let bytes = if image_url.starts_with("http://") || image_url.starts_with("https://") {
            self.http_client
                .get(image_url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec()
        } else {
            std::fs::read(image_url).map_err(|e| {
                ProviderError::Config(format!("failed to read image {}: {}", image_url, e))
            })?
        };

        Ok(json!({
            "inlineData": {
                "mimeType": mime_type_for(image_url),
                "data": BASE64.encode(bytes),
            },
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateResponse {
    fn text(&self) -> ProviderResult<String> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| ProviderError::Parse("no candidates in response".to_string()))?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Ok(text)
    }

    fn token_counts(&self) -> (u64, u64) {
        match &self.usage_metadata {
            Some(meta) => (meta.prompt_token_count, meta.candidates_token_count),
            None => (0, 0),
        }
    }
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn ocr(&self, image_url: &str) -> ProviderResult<ExtractionResult> {
        let start = Instant::now();

        let image = self.image_part(image_url).await?;
        let response = self.generate(OCR_SYSTEM_PROMPT, vec![image], false).await?;
        let text = response.text()?;

        let (input_tokens, output_tokens) = response.token_counts();
        let usage = build_usage(
            &self.model,
            start.elapsed().as_secs_f64(),
            input_tokens,
            output_tokens,
        );

        Ok(ExtractionResult {
            json: None,
            text: Some(text),
            usage,
        })
    }

    async fn extract_from_text(
        &self,
        text: &str,
        schema: &Value,
    ) -> ProviderResult<ExtractionResult> {
        let start = Instant::now();

        let prompt = format!(
            "Schema:\n{}\n\nDocument:\n{}",
            serde_json::to_string_pretty(schema).unwrap_or_default(),
            text
        );
        let response = self
            .generate(JSON_EXTRACTION_SYSTEM_PROMPT, vec![json!({"text": prompt})], true)
            .await?;
        let value = extract_json_from_text(&response.text()?)?;

        let (input_tokens, output_tokens) = response.token_counts();
        let usage = build_usage(
            &self.model,
            start.elapsed().as_secs_f64(),
            input_tokens,
            output_tokens,
        );

        Ok(ExtractionResult {
            json: Some(value),
            text: None,
            usage,
        })
    }

    async fn extract_from_image(
        &self,
        image_url: &str,
        schema: &Value,
    ) -> ProviderResult<ExtractionResult> {
        let start = Instant::now();

        let image = self.image_part(image_url).await?;
        let schema_part = json!({
            "text": format!(
                "Schema:\n{}",
                serde_json::to_string_pretty(schema).unwrap_or_default()
            ),
        });
        let response = self
            .generate(
                IMAGE_EXTRACTION_SYSTEM_PROMPT,
                vec![schema_part, image],
                true,
            )
            .await?;
        let value = extract_json_from_text(&response.text()?)?;

        let (input_tokens, output_tokens) = response.token_counts();
        let usage = build_usage(
            &self.model,
            start.elapsed().as_secs_f64(),
            input_tokens,
            output_tokens,
        );

        Ok(ExtractionResult {
            json: Some(value),
            text: None,
            usage,
        })
    }
}
