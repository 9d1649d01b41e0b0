//! Wire types for the chat-completions API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct ChatRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) temperature: f32,
    pub(super) messages: [ChatMessageDto<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessageDto<'a> {
    pub(super) role: &'static str,
    pub(super) content: &'a str,
}

impl<'a> ChatRequestDto<'a> {
    /// Single user message with deterministic sampling.
    pub(super) fn user_prompt(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            temperature: 0.0,
            messages: [ChatMessageDto {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponseDto {
    #[serde(default)]
    choices: Vec<ChatChoiceDto>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceDto {
    message: Option<ChatChoiceMessageDto>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessageDto {
    content: Option<String>,
}

impl ChatResponseDto {
    /// Content of the first choice, if present and not blank.
    pub(super) fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
    }
}
