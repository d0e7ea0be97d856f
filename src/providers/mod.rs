//! LLM provider implementations

pub mod claude;
pub mod gemini;
pub mod gemma;
pub mod openai;

pub use claude::ClaudeAdapter;
pub use gemini::GeminiAdapter;
pub use gemma::GemmaAdapter;
pub use openai::OpenAiAdapter;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use log::{trace, error};

use crate::message::{GenerationConfig, Turn};

/// Translates one prompt into a provider call and back.
///
/// The returned value is what gets cached: the full response object
/// on the OpenAI-compatible and Claude paths, a plain string otherwise.
#[async_trait]
pub trait Adapter: Send + Sync
{   /// Provider path this adapter implements
    fn provider(&self) -> crate::Provider;

    /// Model name sent in the request
    fn model(&self) -> &str;

    async fn complete(
      &self
    , messages: &[Turn]
    , config: &GenerationConfig
    ) -> crate::error::Result<Value>;
}

/// Posts `body` and decodes the reply as JSON.
/// Non-JSON bodies and error statuses are logged with the raw text.
pub(crate) async fn post_json(
  http_client: &reqwest::Client
, url: &str
, headers: &HeaderMap
, body: &Value
) -> crate::error::Result<Value>
{   trace!("POST {}: {}", url, body);
    let response = http_client
      .post(url)
      .headers(headers.clone())
      .json(body)
      .send()
      .await
      .map_err(|e| {
        error!("HTTP error: {}", e);
        crate::error::Error::HttpError(e.to_string())
      })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
      error!("Failed to read response body: {}", e);
      crate::error::Error::HttpError(e.to_string())
    })?;
    trace!("Response status {} from {}", status, url);

    if !status.is_success()
    {   error!("API error {} from {}: {}", status, url, text);
        return Err(crate::error::Error::ApiError(
          format!("{}: {}", status, text)
        ));
    }

    serde_json::from_str(&text).map_err(|e| {
      error!("Unparseable response from {}: {}", url, text);
      crate::error::Error::ParseError(e.to_string())
    })
}

/// Fails unless the response has a top-level `field`
pub(crate) fn require_field(
  response: Value
, field: &str
) -> crate::error::Result<Value>
{   if response.get(field).is_some()
    {   Ok(response)
    } else
    {   error!("Response has no `{}`: {}", field, response);
        Err(crate::error::Error::MissingField(field.to_string()))
    }
}
