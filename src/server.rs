//! HTTP surface: `POST /generate` and `GET /styles`

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use log::{debug, error};

use crate::error::Error;
use crate::request::{GenerationRequest, GenerationResult, DEFAULT_TEMPERATURE};
use crate::service::GenerationService;

/// Form fields accepted by `POST /generate`.
///
/// Blank optional fields, as sent by an HTML form with empty inputs,
/// count as absent and take their defaults.
#[derive(Debug, Deserialize)]
pub struct GenerateForm
{   pub topic: String
  , #[serde(default)]
    pub style: Option<String>
  , #[serde(default)]
    pub temperature: Option<String>
  , #[serde(default)]
    pub model: Option<String>
}

fn non_empty(field: Option<String>) -> Option<String>
{   field.filter(|value| !value.is_empty())
}

impl GenerateForm
{   /// Fill defaults and parse into a generation request
    pub fn into_request(
      self
    , default_style: &str
    , default_model: &str
    ) -> Result<GenerationRequest, Error>
    {   let temperature = match non_empty(self.temperature)
        {   Some(raw) => raw.trim().parse::<f32>().map_err(|_| {
              Error::InvalidField(
                format!("temperature is not a number: {:?}", raw)
              )
            })?
          , None => DEFAULT_TEMPERATURE
        };

        Ok(GenerationRequest::new(
          self.topic,
          non_empty(self.style)
            .unwrap_or_else(|| default_style.to_string()),
          temperature,
          non_empty(self.model)
            .unwrap_or_else(|| default_model.to_string())
        ))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StylesResponse
{   pub styles: Vec<String>
  , pub default_style: String
  , pub default_model: String
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody
{   pub detail: String
}

impl IntoResponse for Error
{   fn into_response(self) -> Response
    {   let status = match self
        {   Error::InvalidField(_) => StatusCode::UNPROCESSABLE_ENTITY
          , ref e if e.is_client_error() => StatusCode::BAD_REQUEST
          , _ => StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorBody { detail: self.to_string() }))
          .into_response()
    }
}

pub fn router(service: GenerationService) -> Router
{   Router::new()
      .route("/generate", post(generate_handler))
      .route("/styles", get(styles_handler))
      .with_state(service)
}

async fn generate_handler(
  State(service): State<GenerationService>
, Form(form): Form<GenerateForm>
) -> Result<Json<GenerationResult>, Error>
{   debug!("POST /generate style={:?} model={:?}", form.style, form.model);
    let request = form.into_request(
      service.styles().default_style(),
      service.default_model()
    ).map_err(|e| {
      error!("Form rejected: {}", e);
      e
    })?;

    let result = service.generate_text(request).await
      .map_err(|e| {
        error!("Generation rejected: {}", e);
        e
      })?;
    Ok(Json(result))
}

async fn styles_handler(
  State(service): State<GenerationService>
) -> Json<StylesResponse>
{   Json(StylesResponse
    {   styles: service.styles().style_ids()
      , default_style: service.styles().default_style().to_string()
      , default_model: service.default_model().to_string()
    })
}
