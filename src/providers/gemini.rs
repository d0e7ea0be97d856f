//! Google Gemini generateContent

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use log::{debug, error};

use crate::message::{GenerationConfig, Role, Turn};

const GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiAdapter
{   http_client: reqwest::Client
  , model: String
  , endpoint: String
  , headers: HeaderMap
}

impl GeminiAdapter
{   /// `url` is either a full endpoint or a bare Gemini model id
    pub fn new(
      http_client: reqwest::Client
    , model: impl Into<String>
    , url: &str
    , headers: HeaderMap
    ) -> Self
    {   let endpoint = if url.contains("://")
        {   url.to_string()
        } else
        {   format!("{}/{}:generateContent", GEMINI_API_BASE, url)
        };
        GeminiAdapter
        {   http_client
          , model: model.into()
          , endpoint
          , headers
        }
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }
}

fn gemini_content(turn: &Turn) -> Value
{   let role = match turn.role
    {   Role::System | Role::User => "user"
      , Role::Assistant => "model"
    };
    json!({
      "role": role,
      "parts": [{ "text": turn.content }],
    })
}

/// Everything but the last turn is chat history, the last turn is the
/// new message
pub fn split_history(
  messages: &[Turn]
) -> crate::error::Result<(Vec<Value>, Value)>
{   let (last, history) = messages.split_last().ok_or_else(|| {
      crate::error::Error::Other("Gemini prompt has no turns".to_string())
    })?;
    Ok((
      history.iter().map(gemini_content).collect(),
      gemini_content(last)
    ))
}

#[async_trait]
impl super::Adapter for GeminiAdapter
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::Gemini
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(
      &self
    , messages: &[Turn]
    , _config: &GenerationConfig
    ) -> crate::error::Result<Value>
    {   let (mut contents, message) = split_history(messages)?;
        debug!(
          "Gemini request for {} ({} history turns)",
          self.model, contents.len()
        );
        contents.push(message);
        let body = json!({ "contents": contents });

        let response = super::post_json(
          &self.http_client,
          &self.endpoint,
          &self.headers,
          &body
        ).await?;

        let parts = response.pointer("/candidates/0/content/parts")
          .and_then(Value::as_array)
          .ok_or_else(|| {
            error!("Unexpected Gemini response: {}", response);
            crate::error::Error::MissingField(
              "candidates[0].content.parts".to_string()
            )
          })?;
        let text: String = parts.iter()
          .filter_map(|part| part.get("text").and_then(Value::as_str))
          .collect();
        Ok(Value::String(text))
    }
}
