//! Generation pipeline: style resolution, backend call, classification
//! and audit.

use std::sync::Arc;
use log::{debug, error, warn};

use crate::audit::AuditLog;
use crate::error::Error;
use crate::providers::LocalClient;
use crate::request::{
  AuditRecord, ChatCompletionRequest, GenerationRequest, GenerationResult
};
use crate::styles::StyleRegistry;

/// Classified result of one backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome
{   /// First choice's content, verbatim
    Success(String)
  , /// Connection, timeout or non-success status
    BackendUnreachable(String)
  , /// Body without a usable `choices[0].message.content`
    MalformedResponse(String)
  , /// Anything else that went wrong while generating
    Unexpected(String)
}

impl GenerationOutcome
{   pub fn is_success(&self) -> bool
    {   matches!(self, GenerationOutcome::Success(_))
    }

    /// Flatten to the text handed back to callers and written to the audit log
    pub fn into_text(self) -> String
    {   match self
        {   GenerationOutcome::Success(text) => text
          , GenerationOutcome::BackendUnreachable(detail) => {
              format!("Error connecting to LLM server: {}", detail)
            }
          , GenerationOutcome::MalformedResponse(detail) => {
              format!("Unexpected response format: {}", detail)
            }
          , GenerationOutcome::Unexpected(detail) => {
              format!("Error generating text: {}", detail)
            }
        }
    }
}

impl From<Result<String, Error>> for GenerationOutcome
{   fn from(result: Result<String, Error>) -> Self
    {   match result
        {   Ok(text) => GenerationOutcome::Success(text)
          , Err(e @ (Error::HttpError(_)
                  | Error::ApiError(_)
                  | Error::Timeout(_))) => {
              GenerationOutcome::BackendUnreachable(e.to_string())
            }
          , Err(e @ (Error::ParseError(_)
                  | Error::NoChoicesInResponse(_))) => {
              GenerationOutcome::MalformedResponse(e.to_string())
            }
          , Err(e) => GenerationOutcome::Unexpected(e.to_string())
        }
    }
}

/// One completed generation, before flattening
#[derive(Debug, Clone, PartialEq)]
pub struct Generation
{   pub outcome: GenerationOutcome
  , pub prompt: String
  , pub model: String
  , pub style: String
}

impl Generation
{   pub fn into_result(self) -> GenerationResult
    {   GenerationResult
        {   output: self.outcome.into_text()
          , prompt: self.prompt
          , model: self.model
          , style: self.style
        }
    }
}

/// Generation service shared by all request handlers
#[derive(Clone)]
pub struct GenerationService
{   styles: Arc<StyleRegistry>
  , backend: LocalClient
  , audit: AuditLog
  , default_model: String
}

impl GenerationService
{   pub fn new(
      styles: Arc<StyleRegistry>
    , backend: LocalClient
    , audit: AuditLog
    , default_model: impl Into<String>
    ) -> Self
    {   GenerationService
        {   styles
          , backend
          , audit
          , default_model: default_model.into()
        }
    }

    /// Build the whole pipeline from configuration.
    /// Spawns the audit actor, so call inside a tokio runtime.
    pub fn from_config(config: &crate::config::QuillConfig)
      -> Result<Self, Error>
    {   let styles = Arc::new(StyleRegistry::from_config(config)?);
        let backend = LocalClient::from_config(config)?;
        let audit = AuditLog::spawn(config.audit_log_path());
        Ok(GenerationService::new(
          styles,
          backend,
          audit,
          config.default_model.clone()
        ))
    }

    pub fn styles(&self) -> &StyleRegistry
    {   &self.styles
    }

    pub fn default_model(&self) -> &str
    {   &self.default_model
    }

    pub fn audit(&self) -> &AuditLog
    {   &self.audit
    }

    /// Run one generation.
    ///
    /// Only a blank topic is returned as `Err`; every backend failure
    /// comes back as an outcome and is audited like a success.
    pub async fn generate(&self, request: GenerationRequest)
      -> Result<Generation, Error>
    {   if request.topic.trim().is_empty()
        {   warn!("Rejecting generation with empty topic");
            return Err(Error::EmptyTopic);
        }
        debug!(
          "Generating style={} model={} temperature={}",
          request.style, request.model, request.temperature
        );

        let prompt = self.styles.render(&request.style, &request.topic);
        let payload = ChatCompletionRequest::user_prompt(
          request.model.clone(),
          prompt.clone(),
          request.temperature
        );

        let outcome = GenerationOutcome::from(
          self.backend.send_prompt(&payload).await
        );
        if !outcome.is_success()
        {   error!("Generation failed: {:?}", outcome);
        }

        let generation = Generation
        {   outcome
          , prompt
          , model: request.model
          , style: request.style
        };

        let record = AuditRecord::now(
          request.topic,
          generation.style.clone(),
          generation.model.clone(),
          generation.outcome.clone().into_text()
        );
        if let Err(e) = self.audit.record(record).await
        {   error!("Failed to write audit record: {}", e);
        }

        Ok(generation)
    }

    /// `generate` flattened to the outward result
    pub async fn generate_text(&self, request: GenerationRequest)
      -> Result<GenerationResult, Error>
    {   self.generate(request).await.map(Generation::into_result)
    }
}
