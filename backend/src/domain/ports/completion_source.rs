//! Port for the external text-completion service.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when requesting a completion.
    pub enum CompletionSourceError {
        /// No API key is configured.
        Unconfigured => "completion service is not configured",
        /// The request exceeded the configured timeout.
        Timeout { message: String } => "completion request timed out: {message}",
        /// The provider throttled the request.
        RateLimited { message: String } => "completion request was rate limited: {message}",
        /// Network or HTTP-level failure.
        Transport { message: String } => "completion transport failed: {message}",
        /// The provider answered without usable content.
        InvalidResponse { message: String } => "completion response was invalid: {message}",
    }
}

/// Text completion with deterministic sampling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionSource: Send + Sync {
    /// Return the raw completion text for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionSourceError>;
}

/// Source used when no API key is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCompletionSource;

#[async_trait]
impl CompletionSource for UnconfiguredCompletionSource {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionSourceError> {
        Err(CompletionSourceError::unconfigured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_source_always_fails() {
        let result = UnconfiguredCompletionSource.complete("anything").await;
        assert_eq!(result, Err(CompletionSourceError::Unconfigured));
    }
}
