//! services/api/src/adapters/criteria_llm.rs
//!
//! This module contains the adapter for criteria extraction through an LLM.
//! It implements the `CriteriaExtractionService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You turn a company's campus-hiring criteria into a structured interview preparation plan.

Respond with a single JSON object and nothing else, using exactly this shape:
{
  "eligibility": { "cgpa": <number, minimum CGPA on a 10 point scale>, "branches": [<string>] },
  "rounds": [
    { "type": <string>, "topics": [<string>], "duration": <integer minutes>, "questions": <integer or null> }
  ],
  "topics": [<string>],
  "difficulty": <string such as "Easy", "Medium", "Hard" or "Medium-Hard">,
  "weightage": { "dsa": <integer percent>, "mcq": <integer percent>, "interview": <integer percent> }
}

Rules:
- List rounds in the order the candidate will face them.
- When the text does not state a value, infer a typical one for a software hiring drive.
- Weightage percentages must add up to 100."#;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use interview_prep_core::{
    domain::{CriteriaPayload, ExtractedCriteria},
    ports::{CriteriaExtractionService, PortError, PortResult},
};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CriteriaExtractionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCriteriaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCriteriaAdapter {
    /// Creates a new `OpenAiCriteriaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Pulls readable text out of a payload. Only plain-text files are decoded.
fn payload_text(payload: &CriteriaPayload) -> PortResult<String> {
    match payload {
        CriteriaPayload::Text(text) => Ok(text.clone()),
        CriteriaPayload::File { file_name, bytes } => match payload.extension().as_deref() {
            Some("txt") => String::from_utf8(bytes.to_vec()).map_err(|e| {
                PortError::Unexpected(format!("{} is not valid UTF-8 text: {}", file_name, e))
            }),
            _ => Err(PortError::Unexpected(format!(
                "{} cannot be read as text for extraction",
                file_name
            ))),
        },
    }
}

/// Parses the model's reply, tolerating a surrounding markdown code fence.
pub fn parse_criteria_reply(reply: &str) -> PortResult<ExtractedCriteria> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str::<ExtractedCriteria>(body).map_err(|e| {
        warn!("Extraction LLM returned unparseable criteria: {}", e);
        PortError::Unexpected(format!("Malformed criteria JSON: {}", e))
    })
}

//=========================================================================================
// `CriteriaExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CriteriaExtractionService for OpenAiCriteriaAdapter {
    async fn extract_criteria(&self, payload: &CriteriaPayload) -> PortResult<ExtractedCriteria> {
        let text = payload_text(payload)?;

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("CRITERIA:\n---\n{}\n---", text))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Extraction LLM response contained no text content.".to_string())
            })?;

        parse_criteria_reply(&content)
    }
}
