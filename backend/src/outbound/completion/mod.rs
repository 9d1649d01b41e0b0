//! Text-completion outbound adapter.
//!
//! A thin HTTP implementation of the `CompletionSource` port for
//! OpenAI-compatible chat-completions endpoints.

mod dto;
mod http_source;

pub use http_source::ChatCompletionHttpSource;
