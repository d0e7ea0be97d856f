//! OpenAI-compatible chat completions, plus the reasoning-model variant

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use log::debug;

use crate::message::{system_as_user, GenerationConfig, Turn};
use crate::retry::{with_retry, RetryPolicy};

pub struct OpenAiAdapter
{   http_client: reqwest::Client
  , model: String
  , url: String
  , headers: HeaderMap
  , retry: RetryPolicy
  , reasoning: bool
}

impl OpenAiAdapter
{   pub fn new(
      http_client: reqwest::Client
    , model: impl Into<String>
    , url: impl Into<String>
    , headers: HeaderMap
    , retry: RetryPolicy
    ) -> Self
    {   OpenAiAdapter
        {   http_client
          , model: model.into()
          , url: url.into()
          , headers
          , retry
          , reasoning: false
        }
    }

    /// Reasoning models take no generation config and no system turns
    pub fn reasoning(
      http_client: reqwest::Client
    , model: impl Into<String>
    , url: impl Into<String>
    , headers: HeaderMap
    , retry: RetryPolicy
    ) -> Self
    {   OpenAiAdapter
        {   reasoning: true
          , ..OpenAiAdapter::new(http_client, model, url, headers, retry)
        }
    }
}

#[async_trait]
impl super::Adapter for OpenAiAdapter
{   fn provider(&self) -> crate::Provider
    {   if self.reasoning
        {   crate::Provider::Reasoning
        } else
        {   crate::Provider::OpenAiCompatible
        }
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(
      &self
    , messages: &[Turn]
    , config: &GenerationConfig
    ) -> crate::error::Result<Value>
    {   let body = if self.reasoning
        {   GenerationConfig::new()
              .request_body(&self.model, &system_as_user(messages))
        } else
        {   config.request_body(&self.model, messages)
        };
        debug!("OpenAI request for {} ({} turns)", self.model, messages.len());

        let body = &body;
        let this = self;
        with_retry(&self.retry, "OpenAI request", || async move {
          let response = super::post_json(
            &this.http_client,
            &this.url,
            &this.headers,
            body
          ).await?;
          super::require_field(response, "choices")
        }).await
    }
}
