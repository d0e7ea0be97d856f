#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};

use promptcache::message::{GenerationConfig, Turn};
use promptcache::providers::Adapter;
use promptcache::{Error, Provider};

/// Adapter that answers with the last turn's content in OpenAI shape
/// and records every call it gets
pub struct ScriptedAdapter
{   pub provider: Provider
  , pub model: String
  , pub fail: bool
  , pub fail_on: Option<String>
  , pub latency_ms: Option<(u64, u64)>
  , pub calls: AtomicUsize
  , pub in_flight: AtomicUsize
  , pub max_in_flight: AtomicUsize
  , pub seen: Mutex<Vec<(Vec<Turn>, GenerationConfig)>>
}

impl ScriptedAdapter
{   pub fn new(provider: Provider, model: &str) -> Self
    {   ScriptedAdapter
        {   provider
          , model: model.to_string()
          , fail: false
          , fail_on: None
          , latency_ms: None
          , calls: AtomicUsize::new(0)
          , in_flight: AtomicUsize::new(0)
          , max_in_flight: AtomicUsize::new(0)
          , seen: Mutex::new(vec![])
        }
    }

    pub fn gpt4o() -> Self
    {   ScriptedAdapter::new(Provider::OpenAiCompatible, "gpt-4o")
    }

    pub fn failing(mut self) -> Self
    {   self.fail = true;
        self
    }

    /// Fails only for prompts whose last turn says `text`
    pub fn failing_on(mut self, text: &str) -> Self
    {   self.fail_on = Some(text.to_string());
        self
    }

    pub fn with_latency(mut self, low_ms: u64, high_ms: u64) -> Self
    {   self.latency_ms = Some((low_ms, high_ms));
        self
    }

    pub fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }
}

pub fn openai_response(text: &str) -> Value
{   json!({
      "choices": [{ "message": { "role": "assistant", "content": text } }],
      "usage": { "prompt_tokens": 100, "completion_tokens": 50 },
    })
}

pub fn prompt(text: &str) -> Vec<Turn>
{   vec![Turn::system("You are terse."), Turn::user(text)]
}

#[async_trait]
impl Adapter for ScriptedAdapter
{   fn provider(&self) -> Provider
    {   self.provider
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn complete(
      &self
    , messages: &[Turn]
    , config: &GenerationConfig
    ) -> Result<Value, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap()
          .push((messages.to_vec(), config.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some((low, high)) = self.latency_ms
        {   let wait = rand::thread_rng().gen_range(low..=high);
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let last = messages.last()
          .map(|t| t.content.clone())
          .unwrap_or_default();
        if self.fail || self.fail_on.as_deref() == Some(last.as_str())
        {   return Err(Error::ApiError("503 Service Unavailable".to_string()));
        }
        Ok(openai_response(&last))
    }
}
