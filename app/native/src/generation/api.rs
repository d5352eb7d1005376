//! Client for the remote image generation API.
//!
//! A request posts `{prompt, n, size, response_format, quality}` with a
//! bearer credential and receives either `{"data": [{"url": ...}]}` or
//! `{"error": {"message": ...}}`. The image itself is fetched from the
//! returned URL in a second request.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::AiwallError;
use crate::logging::Redacted;

/// Remote image generation, behind a trait so tests can stub it.
pub trait ImageGenerator: Send + Sync {
    /// Requests one image for `prompt` and returns its download URL.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Remote`] with the provider's message on a
    /// non-success response or a network failure.
    fn generate(&self, credential: &str, prompt: &str) -> Result<String, AiwallError>;

    /// Fetches the image bytes behind `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Remote`] if the download fails.
    fn download(&self, url: &str) -> Result<Vec<u8>, AiwallError>;
}

#[derive(Debug, Serialize)]
struct GenerationBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    response_format: &'static str,
    quality: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Blocking HTTP client for the generation endpoint.
#[derive(Debug, Clone)]
pub struct HttpImageClient {
    client: Client,
    config: ApiConfig,
}

impl HttpImageClient {
    /// Builds a client using the endpoint and timeout from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Remote`] if the TLS backend cannot be set up.
    pub fn new(config: ApiConfig) -> Result<Self, AiwallError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("aiwall/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn body<'a>(&'a self, prompt: &'a str) -> GenerationBody<'a> {
        GenerationBody {
            model: self.config.model.as_deref(),
            prompt,
            n: 1,
            size: &self.config.size,
            response_format: "url",
            quality: &self.config.quality,
        }
    }
}

impl ImageGenerator for HttpImageClient {
    fn generate(&self, credential: &str, prompt: &str) -> Result<String, AiwallError> {
        tracing::debug!(
            endpoint = %self.config.endpoint,
            credential = %Redacted(credential),
            "requesting image generation"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(credential)
            .json(&self.body(prompt))
            .send()?;

        let status = response.status();
        let text = response.text()?;
        parse_generation_response(status.is_success(), &text)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, AiwallError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AiwallError::Remote(format!("image download failed with HTTP {status}")));
        }

        let bytes = response.bytes()?;
        tracing::debug!(bytes = bytes.len(), "downloaded generated image");
        Ok(bytes.to_vec())
    }
}

/// Extracts the image URL, or the provider's error message.
///
/// # Errors
///
/// Returns [`AiwallError::Remote`] for error responses (message taken from
/// `error.message`, `"Unknown error"` if absent) and for success responses
/// without an image URL.
pub fn parse_generation_response(success: bool, body: &str) -> Result<String, AiwallError> {
    if !success {
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
        let message = envelope
            .error
            .and_then(|error| error.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(AiwallError::Remote(message));
    }

    let parsed: GenerationResponse = serde_json::from_str(body)
        .map_err(|err| AiwallError::Remote(format!("unexpected response: {err}")))?;

    parsed
        .data
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .ok_or_else(|| AiwallError::Remote("response did not contain an image URL".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Response parsing
    // ========================================================================

    #[test]
    fn test_success_returns_first_url() {
        let body = r#"{"created": 1, "data": [{"url": "https://img.example/a.png"}, {"url": "https://img.example/b.png"}]}"#;
        assert_eq!(parse_generation_response(true, body).unwrap(), "https://img.example/a.png");
    }

    #[test]
    fn test_error_message_is_surfaced() {
        let body = r#"{"error": {"message": "Billing hard limit has been reached", "type": "invalid_request_error"}}"#;
        let err = parse_generation_response(false, body).unwrap_err();
        assert_eq!(err.to_string(), "API error: Billing hard limit has been reached");
    }

    #[test]
    fn test_error_without_message_is_unknown() {
        for body in ["{}", r#"{"error": {}}"#, "<html>502</html>", ""] {
            let err = parse_generation_response(false, body).unwrap_err();
            assert_eq!(err.to_string(), "API error: Unknown error", "body: {body}");
        }
    }

    #[test]
    fn test_success_without_url_is_remote_error() {
        let err = parse_generation_response(true, r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, AiwallError::Remote(_)));

        let err = parse_generation_response(true, r#"{"data": [{"b64_json": "..."}]}"#).unwrap_err();
        assert!(err.to_string().contains("image URL"));

        assert!(parse_generation_response(true, "not json").is_err());
    }

    // ========================================================================
    // Request body
    // ========================================================================

    #[test]
    fn test_request_body_shape() {
        let client = HttpImageClient::new(ApiConfig::default()).unwrap();
        let value = serde_json::to_value(client.body("A red apple on a table")).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "prompt": "A red apple on a table",
                "n": 1,
                "size": "1024x1024",
                "response_format": "url",
                "quality": "hd"
            })
        );
    }

    #[test]
    fn test_request_body_includes_model_when_set() {
        let config = ApiConfig { model: Some("dall-e-3".to_string()), ..ApiConfig::default() };
        let client = HttpImageClient::new(config).unwrap();
        let value = serde_json::to_value(client.body("p")).unwrap();
        assert_eq!(value["model"], "dall-e-3");
    }
}
