//! GeminiClassifier - Direct REST API classification client for Gemini.
//!
//! Sends the image as inline base64 data together with the fixed
//! instruction, asks for a JSON answer constrained by the response schema,
//! and validates the answer before handing it back.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use medscan_core::classification::{ClassificationResult, Classifier};
use medscan_core::config::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use medscan_core::error::{MedscanError, Result};
use medscan_core::image::ImageMimeType;
use medscan_infrastructure::RuntimeConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompts::{CLASSIFICATION_INSTRUCTION, response_schema};
use crate::response::parse_classification;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Classification client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClassifier {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    /// Builds a client from the merged runtime configuration.
    ///
    /// Fails with `Config` when no API key is configured.
    pub fn from_config(runtime: &RuntimeConfig) -> Result<Self> {
        let settings = &runtime.config.classifier;
        let model = if settings.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL.to_string()
        } else {
            settings.model.clone()
        };
        Ok(Self::new(runtime.require_api_key()?, model).with_base_url(&settings.base_url))
    }

    /// Overrides the API base URL (everything before `/{model}:generateContent`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        // The key travels in a header so transport errors never echo it.
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                MedscanError::classification_failed(format!("Gemini API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            MedscanError::classification_failed(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(
        &self,
        image_bytes: &[u8],
        mime_type: ImageMimeType,
    ) -> Result<ClassificationResult> {
        if image_bytes.is_empty() {
            return Err(MedscanError::validation("image is empty"));
        }

        let request = build_request(image_bytes, mime_type);
        tracing::debug!(
            model = %self.model,
            mime_type = %mime_type,
            bytes = image_bytes.len(),
            "Sending classification request"
        );

        let text = self.send_request(&request).await?;
        parse_classification(&text)
    }
}

fn build_request(image_bytes: &[u8], mime_type: ImageMimeType) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::InlineData {
                    inline_data: InlineDataPayload {
                        mime_type: mime_type.as_str().to_string(),
                        data: BASE64_STANDARD.encode(image_bytes),
                    },
                },
                Part::Text {
                    text: CLASSIFICATION_INSTRUCTION.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            MedscanError::malformed_response(
                "Gemini API returned no text in the response candidates",
            )
        })
}

fn map_http_error(status: StatusCode, body: &str) -> MedscanError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    MedscanError::classification_failed(format!(
        "Gemini API returned HTTP {}: {}",
        status.as_u16(),
        message
    ))
}
