//! Spacing side-car client
//!
//! Talks to a spacing model served over HTTP (for example a PyKoSpacing
//! wrapper): `POST {endpoint}` with `{"text": ...}`, answer `{"text": ...}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tutor_core::SpacingCorrector;

use crate::TextProcessingError;

#[derive(Serialize)]
struct SpacingRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SpacingResponse {
    text: String,
}

/// Remote spacing model
pub struct HttpSpacer {
    client: Client,
    endpoint: String,
}

impl HttpSpacer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, text: &str) -> Result<String, TextProcessingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SpacingRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextProcessingError::SpacingService(format!(
                "{}: {}",
                status, body
            )));
        }

        let body: SpacingResponse = response.json().await?;
        Ok(body.text)
    }
}

#[async_trait]
impl SpacingCorrector for HttpSpacer {
    async fn correct_spacing(&self, text: &str) -> tutor_core::Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        Ok(self.request(text).await?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(SpacingRequest { text: "학교에가요" }).unwrap();
        assert_eq!(json, serde_json::json!({"text": "학교에가요"}));

        let parsed: SpacingResponse =
            serde_json::from_str(r#"{"text": "학교에 가요", "elapsed": 3}"#).unwrap();
        assert_eq!(parsed.text, "학교에 가요");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let spacer = HttpSpacer::new("http://127.0.0.1:1/spacing", Duration::from_millis(500));
        let err = spacer.correct_spacing("학교에가요").await.unwrap_err();
        assert!(matches!(err, tutor_core::Error::Spacing(_)));
    }

    #[tokio::test]
    async fn test_empty_text_skips_request() {
        let spacer = HttpSpacer::new("http://127.0.0.1:1/spacing", Duration::from_millis(500));
        assert_eq!(spacer.correct_spacing("").await.unwrap(), "");
    }
}
