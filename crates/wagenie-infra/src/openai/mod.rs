//! OpenAI-backed generation services.
//!
//! Implements the `CompletionService` and `ImageService` ports against the
//! OpenAI HTTP API. The API key is wrapped in [`secrecy::SecretString`]
//! and is never logged; neither service derives `Debug`.

pub mod types;

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use wagenie_core::generation::{CompletionService, ImageService};
use wagenie_types::config::{CompletionConfig, ImageConfig};
use wagenie_types::error::GenerationError;

use types::{ChatMessage, ChatRequest, ChatResponse, ImageRequest, ImageResponse};

/// Request timeout. Image generation is the slow path.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("failed to create reqwest client")
}

/// Map a non-success HTTP status to a generation error.
fn map_status(status: StatusCode, body: String) -> GenerationError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::QuotaExceeded,
        StatusCode::BAD_REQUEST => GenerationError::InvalidPrompt(body),
        _ => GenerationError::UpstreamUnavailable(format!("HTTP {status}: {body}")),
    }
}

/// Text completion via `POST /v1/chat/completions`.
pub struct OpenAiCompletionService {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompletionService {
    pub fn new(api_key: SecretString, config: &CompletionConfig) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl CompletionService for OpenAiCompletionService {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, "requesting completion");
        let response = self
            .client
            .post(self.url("/v1/chat/completions"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status, error_body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::UpstreamUnavailable(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GenerationError::UpstreamUnavailable("response contained no completion".to_string())
            })
    }
}

/// Image generation via `POST /v1/images/generations`. Exactly one image
/// per request; the reply is the hosted image URL, never the bytes.
pub struct OpenAiImageService {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    size: String,
}

impl OpenAiImageService {
    pub fn new(api_key: SecretString, config: &ImageConfig) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            size: config.size.clone(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ImageService for OpenAiImageService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ImageRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.size.clone(),
            response_format: "url".to_string(),
        };

        debug!(model = %self.model, size = %self.size, "requesting image");
        let response = self
            .client
            .post(self.url("/v1/images/generations"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status, error_body));
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::UpstreamUnavailable(format!("malformed response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| {
                GenerationError::UpstreamUnavailable("response contained no image url".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion_service() -> OpenAiCompletionService {
        OpenAiCompletionService::new(
            SecretString::from("test-key-not-real"),
            &CompletionConfig::default(),
        )
    }

    #[test]
    fn rate_limit_maps_to_quota_exceeded() {
        let err = map_status(StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, GenerationError::QuotaExceeded));
    }

    #[test]
    fn bad_request_maps_to_invalid_prompt() {
        let err = map_status(StatusCode::BAD_REQUEST, "safety rejection".to_string());
        match err {
            GenerationError::InvalidPrompt(detail) => assert_eq!(detail, "safety rejection"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_statuses_map_to_upstream_unavailable() {
        for status in [
            StatusCode::UNAUTHORIZED,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
        ] {
            let err = map_status(status, "boom".to_string());
            assert!(
                matches!(err, GenerationError::UpstreamUnavailable(_)),
                "expected UpstreamUnavailable for {status}"
            );
        }
    }

    #[test]
    fn base_url_override() {
        let service = completion_service().with_base_url("http://localhost:8080".to_string());
        assert_eq!(
            service.url("/v1/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn default_base_url_points_at_openai() {
        let service = completion_service();
        assert_eq!(
            service.url("/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
