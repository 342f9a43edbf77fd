use std::time::Duration;
use log::{debug, trace, error, info};

use crate::error::Error;
use crate::request::{ChatCompletionRequest, ChatCompletionResponse};

/// Client for a locally hosted chat-completions server
/// (LM Studio, llama.cpp server, Ollama's OpenAI endpoint, ...)
#[derive(Debug, Clone)]
pub struct LocalClient
{   endpoint: String
  , timeout: Duration
  , http_client: reqwest::Client
}

impl LocalClient
{   /// Create a client posting to `endpoint`, bounded by `timeout`
    pub fn new(
      endpoint: impl Into<String>
    , timeout: Duration
    ) -> Result<Self, Error>
    {   let endpoint = endpoint.into();
        debug!(
          "Creating LocalClient for {} (timeout {:?})",
          endpoint, timeout
        );
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Cannot build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(LocalClient
        {   endpoint
          , timeout
          , http_client
        })
    }

    /// Client for the configured endpoint and timeout
    pub fn from_config(config: &crate::config::QuillConfig)
      -> Result<Self, Error>
    {   Self::new(
          config.backend_url.clone(),
          Duration::from_secs(config.timeout_secs)
        )
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }

    pub fn timeout(&self) -> Duration
    {   self.timeout
    }

    /// Post one completion request and return the first choice's content.
    ///
    /// Exactly one HTTP call is made; there are no retries.
    pub async fn send_prompt(
      &self
    , request: &ChatCompletionRequest
    ) -> Result<String, Error>
    {   debug!("Handling send_prompt for: {}", request.model);
        info!(
          "Sending request to LLM: {}",
          serde_json::to_string_pretty(request)
            .unwrap_or_else(|_| format!("{:?}", request))
        );

        let response = self.http_client
          .post(&self.endpoint)
          .header("Content-Type", "application/json")
          .json(request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            classify_transport(e)
          })?;

        let status = response.status();
        trace!("LLM response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("LLM server returned {}: {}", status, error_text);
            return Err(Error::ApiError(
              format!(
                "{} for url: {}: {}",
                status, self.endpoint, error_text
              )
            ));
        }

        let body = response.text().await.map_err(|e| {
          error!("Failed to read response body: {}", e);
          classify_transport(e)
        })?;
        trace!("LLM raw body: {}", body);

        extract_content(&body)
    }
}

fn classify_transport(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   Error::Timeout(e.to_string())
    } else
    {   // Bad or scheme-less URLs surface here as builder errors
        Error::HttpError(e.to_string())
    }
}

/// Pull `choices[0].message.content` out of a response body, verbatim
pub fn extract_content(body: &str) -> Result<String, Error>
{   let value: serde_json::Value = serde_json::from_str(body)
      .map_err(|e| {
        error!("Parse error: {}", e);
        Error::ParseError(format!("{} in body {:?}", e, body))
      })?;

    info!(
      "Received response from LLM: {}",
      serde_json::to_string_pretty(&value)
        .unwrap_or_else(|_| body.to_string())
    );

    let has_choices = value.get("choices")
      .and_then(|c| c.as_array())
      .map(|c| !c.is_empty())
      .unwrap_or(false);
    if !has_choices
    {   error!("No choices in response");
        return Err(Error::NoChoicesInResponse(value.to_string()));
    }

    let chat_response: ChatCompletionResponse
      = serde_json::from_value(value.clone()).map_err(|e| {
        error!("Parse error: {}", e);
        Error::ParseError(format!("{} in {}", e, value))
      })?;

    chat_response.choices.into_iter().next()
      .map(|c| c.message.content)
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse(value.to_string())
      })
}
