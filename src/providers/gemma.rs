//! Self-hosted Gemma behind an OpenAI-style chat endpoint (vLLM)

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use log::{debug, error};

use crate::config::SelfHostedOverrides;
use crate::message::{GenerationConfig, Role, Turn};

/// Rewrites turns so they strictly alternate, starting with the user.
///
/// System turns become user turns, runs of one role are merged with a
/// blank line between them, and a leading assistant turn gets a
/// placeholder user turn in front.
pub fn normalize_turns(messages: &[Turn]) -> Vec<Turn>
{   let mut merged: Vec<Turn> = Vec::with_capacity(messages.len() + 1);
    for message in messages
    {   let role = match message.role
        {   Role::System => Role::User
          , role => role
        };
        match merged.last_mut()
        {   Some(last) if last.role == role => {
              last.content.push_str("\n\n");
              last.content.push_str(&message.content);
            }
          , _ => merged.push(Turn::new(role, message.content.clone()))
        }
    }
    if merged.first().map_or(false, |t| t.role != Role::User)
    {   merged.insert(0, Turn::user("Hello"));
    }
    merged
}

pub struct GemmaAdapter
{   http_client: reqwest::Client
  , model: String
  , url: String
  , overrides: SelfHostedOverrides
}

impl GemmaAdapter
{   pub fn new(
      http_client: reqwest::Client
    , model: impl Into<String>
    , url: impl Into<String>
    , overrides: SelfHostedOverrides
    ) -> Self
    {   GemmaAdapter
        {   http_client
          , model: model.into()
          , url: url.into()
          , overrides
        }
    }
}

#[async_trait]
impl super::Adapter for GemmaAdapter
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::Gemma
    }

    fn model(&self) -> &str
    {   &self.model
    }

    /// Caller config is ignored; sampling is pinned by the overrides
    async fn complete(
      &self
    , messages: &[Turn]
    , _config: &GenerationConfig
    ) -> crate::error::Result<Value>
    {   let turns = normalize_turns(messages);
        let body = GenerationConfig::new()
          .temperature(self.overrides.temperature)
          .max_tokens(self.overrides.max_tokens)
          .request_body(&self.model, &turns);
        debug!("Gemma request for {} ({} turns)", self.model, turns.len());

        let response = super::post_json(
          &self.http_client,
          &self.url,
          &HeaderMap::new(),
          &body
        ).await?;

        response.pointer("/choices/0/message/content")
          .and_then(Value::as_str)
          .map(|text| Value::String(text.trim().to_string()))
          .ok_or_else(|| {
            error!("Unexpected Gemma response: {}", response);
            crate::error::Error::MissingField(
              "choices[0].message.content".to_string()
            )
          })
    }
}
