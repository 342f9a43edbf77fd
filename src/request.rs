//! Request, response and audit types

use serde::{Deserialize, Serialize};

/// Ceiling on generated tokens sent with every backend call
pub const MAX_TOKENS: usize = 500;

/// Temperature used when the caller does not give one
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One inbound generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest
{   /// Subject interpolated into the style template
    pub topic: String
  , /// Requested style id; unknown ids fall back to the default
    pub style: String
  , /// Sampling temperature, passed through unchecked
    pub temperature: f32
  , /// Model identifier sent to the backend
    pub model: String
}

impl GenerationRequest
{   pub fn new(
      topic: impl Into<String>
    , style: impl Into<String>
    , temperature: f32
    , model: impl Into<String>
    ) -> Self
    {   GenerationRequest
        {   topic: topic.into()
          , style: style.into()
          , temperature
          , model: model.into()
        }
    }
}

/// Outward result of one generation, as returned to HTTP callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult
{   pub output: String
  , pub prompt: String
  , pub model: String
  , pub style: String
}

// ===== Backend wire types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub max_tokens: usize
}

impl ChatCompletionRequest
{   /// Single user-message request with the fixed token ceiling
    pub fn user_prompt(
      model: impl Into<String>
    , prompt: impl Into<String>
    , temperature: f32
    ) -> Self
    {   ChatCompletionRequest
        {   model: model.into()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.into()
              }
            ]
          , temperature
          , max_tokens: MAX_TOKENS
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChoiceMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub role: Option<String>
  , pub content: String
}

// ===== Audit =====

/// One line of the generation audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord
{   pub timestamp: chrono::DateTime<chrono::Local>
  , pub topic: String
  , pub style: String
  , pub model: String
  , pub output: String
}

impl AuditRecord
{   /// Record stamped with the current local time
    pub fn now(
      topic: impl Into<String>
    , style: impl Into<String>
    , model: impl Into<String>
    , output: impl Into<String>
    ) -> Self
    {   AuditRecord
        {   timestamp: chrono::Local::now()
          , topic: topic.into()
          , style: style.into()
          , model: model.into()
          , output: output.into()
        }
    }
}
