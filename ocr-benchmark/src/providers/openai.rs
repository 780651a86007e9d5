//! OpenAI chat-completions adapter for OCR and structured extraction

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
use super::schema::to_strict_schema;
use super::token_cost::build_usage;
use super::traits::{ModelProvider, ProviderError, ProviderResult};
use super::{extract_json_from_text, mime_type_for};
use crate::dataset::ExtractionResult;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI and OpenAI-compatible endpoints
pub struct OpenAiProvider {
    model: String,
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl OpenAiProvider {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: Client::new(),
        }
    }

    /// Create from `OPENAI_API_KEY`, honoring an `OPENAI_BASE_URL` override
    /// for compatible endpoints.
    pub fn from_env(model: &str) -> ProviderResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::Config("OPENAI_API_KEY not set".to_string()))?;
        let mut provider = Self::new(model, api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            provider.base_url = base_url;
        }
        Ok(provider)
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn chat(&self, body: &Value) -> ProviderResult<ChatResponse> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(error) => error.error.message,
                Err(_) => format!("HTTP {}: {}", status.as_u16(), body),
            };
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Image content part; local files are inlined as data URLs.
    fn image_part(&self, image_url: &str) -> ProviderResult<Value> {
        let url = if std::path::Path::new(image_url).exists() {
            let bytes = std::fs::read(image_url).map_err(|e| {
                ProviderError::Config(format!("failed to read image {}: {}", image_url, e))
            })?;
            format!(
                "data:{};base64,{}",
                mime_type_for(image_url),
                BASE64.encode(bytes)
            )
        } else {
            image_url.to_string()
        };
        Ok(json!({"type": "image_url", "image_url": {"url": url}}))
    }

    fn response_format(&self, schema: &Value) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": "extraction",
                "strict": true,
                "schema": to_strict_schema(schema),
            },
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: ChatUsage,
}

impl ChatResponse {
    fn content(&self) -> ProviderResult<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::Parse("no choices in response".to_string()))
    }
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn ocr(&self, image_url: &str) -> ProviderResult<ExtractionResult> {
        let start = Instant::now();

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": OCR_SYSTEM_PROMPT},
                    self.image_part(image_url)?,
                ],
            }],
        });

        let response = self.chat(&body).await?;
        let text = response.content()?;
        let usage = build_usage(
            &self.model,
            start.elapsed().as_secs_f64(),
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
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

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": JSON_EXTRACTION_SYSTEM_PROMPT},
                {"role": "user", "content": text},
            ],
            "response_format": self.response_format(schema),
        });

        let response = self.chat(&body).await?;
        let value = extract_json_from_text(&response.content()?)?;
        let usage = build_usage(
            &self.model,
            start.elapsed().as_secs_f64(),
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
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

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": IMAGE_EXTRACTION_SYSTEM_PROMPT},
                    self.image_part(image_url)?,
                ],
            }],
            "response_format": self.response_format(schema),
        });

        let response = self.chat(&body).await?;
        let value = extract_json_from_text(&response.content()?)?;
        let usage = build_usage(
            &self.model,
            start.elapsed().as_secs_f64(),
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
        );

        Ok(ExtractionResult {
            json: Some(value),
            text: None,
            usage,
        })
    }
}
