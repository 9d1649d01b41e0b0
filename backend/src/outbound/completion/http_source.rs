//! Reqwest-backed chat-completions adapter.
//!
//! Owns transport details only: request serialisation, bearer auth, timeout
//! and HTTP error mapping, and extracting the first choice's content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{ChatRequestDto, ChatResponseDto};
use crate::domain::ports::{CompletionSource, CompletionSourceError};

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Completion source that POSTs chat requests to one endpoint.
pub struct ChatCompletionHttpSource {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    model: String,
}

impl std::fmt::Debug for ChatCompletionHttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionHttpSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionHttpSource {
    /// Build an adapter whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: Zeroizing<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            model: model.into(),
        })
    }
}

#[async_trait]
impl CompletionSource for ChatCompletionHttpSource {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionSourceError> {
        let body = ChatRequestDto::user_prompt(&self.model, prompt);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        parse_content(bytes.as_ref())
    }
}

fn parse_content(body: &[u8]) -> Result<String, CompletionSourceError> {
    let decoded: ChatResponseDto = serde_json::from_slice(body).map_err(|error| {
        CompletionSourceError::invalid_response(format!("invalid completion JSON: {error}"))
    })?;
    decoded.into_first_content().ok_or_else(|| {
        CompletionSourceError::invalid_response("choices[0].message.content is missing or empty")
    })
}

fn map_transport_error(error: reqwest::Error) -> CompletionSourceError {
    // reqwest errors can embed the URL but never the headers.
    if error.is_timeout() {
        CompletionSourceError::timeout(error.to_string())
    } else {
        CompletionSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CompletionSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => CompletionSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CompletionSourceError::timeout(message)
        }
        _ => CompletionSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn request_body_is_deterministic_single_user_message() {
        let body = serde_json::to_value(ChatRequestDto::user_prompt("gpt-4o-mini", "hola"))
            .expect("serialises");
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "messages": [{"role": "user", "content": "hola"}],
            })
        );
    }

    #[test]
    fn extracts_first_choice_content() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":"SELECT 1"}},{"message":{"content":"SELECT 2"}}]}"#;
        assert_eq!(parse_content(body), Ok("SELECT 1".to_owned()));
    }

    #[rstest]
    #[case::no_choices(r#"{"choices":[]}"#)]
    #[case::missing_choices(r#"{}"#)]
    #[case::null_content(r#"{"choices":[{"message":{"content":null}}]}"#)]
    #[case::blank_content(r#"{"choices":[{"message":{"content":"   "}}]}"#)]
    #[case::not_json("<html>bad gateway</html>")]
    fn unusable_bodies_are_invalid_responses(#[case] body: &str) {
        assert!(matches!(
            parse_content(body.as_bytes()),
            Err(CompletionSourceError::InvalidResponse { .. })
        ));
    }

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "Transport")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, br#"{"error":{"message":"nope"}}"#);
        let matched = match expected {
            "RateLimited" => matches!(error, CompletionSourceError::RateLimited { .. }),
            "Timeout" => matches!(error, CompletionSourceError::Timeout { .. }),
            "Transport" => matches!(error, CompletionSourceError::Transport { .. }),
            _ => panic!("unsupported expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn long_bodies_are_truncated_in_messages() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn debug_output_omits_the_api_key() {
        let source = ChatCompletionHttpSource::new(
            Url::parse("https://api.example.test/v1/chat/completions").expect("url"),
            Zeroizing::new("sk-secret".to_owned()),
            "gpt-4o-mini",
            Duration::from_secs(1),
        )
        .expect("client builds");
        assert!(!format!("{source:?}").contains("sk-secret"));
    }
}
