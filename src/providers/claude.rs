//! Anthropic messages API

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use log::debug;

use crate::message::{system_as_user, GenerationConfig, Turn};
use crate::retry::{with_retry, RetryPolicy};

pub struct ClaudeAdapter
{   http_client: reqwest::Client
  , model: String
  , url: String
  , headers: HeaderMap
  , retry: RetryPolicy
}

impl ClaudeAdapter
{   pub fn new(
      http_client: reqwest::Client
    , model: impl Into<String>
    , url: impl Into<String>
    , headers: HeaderMap
    , retry: RetryPolicy
    ) -> Self
    {   ClaudeAdapter
        {   http_client
          , model: model.into()
          , url: url.into()
          , headers
          , retry
        }
    }
}

#[async_trait]
impl super::Adapter for ClaudeAdapter
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::Claude
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(
      &self
    , messages: &[Turn]
    , config: &GenerationConfig
    ) -> crate::error::Result<Value>
    {   let body = config.request_body(&self.model, &system_as_user(messages));
        debug!("Claude request for {} ({} turns)", self.model, messages.len());

        let body = &body;
        let this = self;
        with_retry(&self.retry, "Claude request", || async move {
          let response = super::post_json(
            &this.http_client,
            &this.url,
            &this.headers,
            body
          ).await?;
          super::require_field(response, "content")
        }).await
    }
}
