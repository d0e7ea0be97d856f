use serde_json::Value;
use log::{debug, info, error};

use crate::cache::{cache_key, CacheStore};
use crate::config::{DispatchConfig, ProviderCredentials};
use crate::dispatch::dispatch_batch;
use crate::message::{system_as_user, GenerationConfig, Prompt};
use crate::providers::{
  Adapter, ClaudeAdapter, GeminiAdapter, GemmaAdapter, OpenAiAdapter
};
use crate::retry::with_retry;
use crate::Provider;

/// Result of a batch generation
#[derive(Debug, Clone, PartialEq)]
pub enum Generation
{   /// Uncached call: provider responses as returned, no cost
    Raw(Vec<Value>)
  , /// Cached call: reply text per prompt and the summed cost
    Completed
    {   texts: Vec<String>
      , cost: f64
    }
}

impl Generation
{   pub fn texts(&self) -> Option<&[String]>
    {   match self
        {   Generation::Completed { texts, .. } => Some(texts)
          , Generation::Raw(_) => None
        }
    }

    pub fn cost(&self) -> f64
    {   match self
        {   Generation::Completed { cost, .. } => *cost
          , Generation::Raw(_) => 0.0
        }
    }
}

/// Pulls the reply text out of a cached value
pub fn extract_text(
  provider: Provider
, value: &Value
) -> crate::error::Result<String>
{   let (text, field) = match provider
    {   Provider::OpenAiCompatible | Provider::Reasoning => (
          value.pointer("/choices/0/message/content"),
          "choices[0].message.content"
        )
      , Provider::Claude => (
          value.pointer("/content/0/text"),
          "content[0].text"
        )
      , Provider::Gemini | Provider::Gemma => (Some(value), "completion")
    };
    // A refusal carries `"content": null`; it is still a finished reply
    let openai_shaped = matches!(
      provider,
      Provider::OpenAiCompatible | Provider::Reasoning
    );
    if openai_shaped && text == Some(&Value::Null)
    {   debug!("Cached {:?} value has null {}, using empty text", provider, field);
        return Ok(String::new());
    }
    text.and_then(Value::as_str)
      .map(str::to_string)
      .ok_or_else(|| {
        error!("Cached {:?} value has no text: {}", provider, value);
        crate::error::Error::MissingField(field.to_string())
      })
}

/// Entry point for cached, retried, optionally concurrent generation
pub struct Dispatcher
{   http_client: reqwest::Client
  , credentials: ProviderCredentials
  , config: DispatchConfig
}

impl Dispatcher
{   pub fn new(
      config: DispatchConfig
    , credentials: ProviderCredentials
    ) -> Self
    {   debug!("Creating Dispatcher");
        Dispatcher
        {   http_client: reqwest::Client::new()
          , credentials
          , config
        }
    }

    /// Default config with credentials from the environment
    pub fn from_env() -> Self
    {   Dispatcher::new(
          DispatchConfig::default(),
          ProviderCredentials::from_env()
        )
    }

    pub fn config(&self) -> &DispatchConfig
    {   &self.config
    }

    /// Builds the adapter serving `model` at `url`
    pub fn adapter_for(
      &self
    , model: &str
    , url: &str
    ) -> crate::error::Result<Box<dyn Adapter>>
    {   let provider = self.config.models.resolve(model)?;
        let http_client = self.http_client.clone();
        let retry = self.config.request_retry.clone();
        let adapter: Box<dyn Adapter> = match provider
        {   Provider::OpenAiCompatible => Box::new(OpenAiAdapter::new(
              http_client, model, url,
              self.credentials.openai_headers()?, retry
            ))
          , Provider::Reasoning => Box::new(OpenAiAdapter::reasoning(
              http_client, model, url,
              self.credentials.openai_headers()?, retry
            ))
          , Provider::Gemini => Box::new(GeminiAdapter::new(
              http_client, model, url,
              self.credentials.gemini_headers()?
            ))
          , Provider::Gemma => Box::new(GemmaAdapter::new(
              http_client, model, url,
              self.config.self_hosted.clone()
            ))
          , Provider::Claude => Box::new(ClaudeAdapter::new(
              http_client, model, url,
              self.credentials.anthropic_headers()?, retry
            ))
        };
        Ok(adapter)
    }

    /// Generates one reply per prompt for `model`, served at `url`.
    ///
    /// Without a cache the raw responses come back. With one, only
    /// prompts that miss (or were stored without the full response
    /// shape) hit the network; each new response is appended to the
    /// cache file as soon as the batch returns.
    pub async fn cached_generate(
      &self
    , batch: &[Prompt]
    , model: &str
    , url: &str
    , cache: Option<&mut CacheStore>
    , generation_config: &GenerationConfig
    , parallel: bool
    ) -> crate::error::Result<Generation>
    {   let adapter = self.adapter_for(model, url)?;
        self.cached_generate_with(
          adapter.as_ref(),
          batch,
          cache,
          generation_config,
          parallel
        ).await
    }

    /// Same as `cached_generate` with an already built adapter
    pub async fn cached_generate_with(
      &self
    , adapter: &dyn Adapter
    , batch: &[Prompt]
    , cache: Option<&mut CacheStore>
    , generation_config: &GenerationConfig
    , parallel: bool
    ) -> crate::error::Result<Generation>
    {   let provider = adapter.provider();
        let model = adapter.model();

        let (prompts, config) = if provider == Provider::Reasoning
        {   let prompts: Vec<Prompt> = batch.iter()
              .map(|prompt| system_as_user(prompt))
              .collect();
            (prompts, GenerationConfig::new())
        } else
        {   (batch.to_vec(), generation_config.clone())
        };

        let cache = match cache
        {   Some(cache) => cache
          , None => {
              debug!("No cache, dispatching {} prompts", prompts.len());
              let responses = self
                .call_batch(adapter, &prompts, &config, parallel)
                .await?;
              return Ok(Generation::Raw(responses));
            }
        };

        let cost_tracked = self.config.models.is_cost_tracked(model);
        let keys = prompts.iter()
          .map(|prompt| cache_key(prompt))
          .collect::<crate::error::Result<Vec<String>>>()?;

        let mut miss_prompts = Vec::new();
        let mut miss_keys = Vec::new();
        for (prompt, key) in prompts.iter().zip(&keys)
        {   if !cache.is_complete(key, cost_tracked)
            {   miss_prompts.push(prompt.clone());
                miss_keys.push(key.clone());
            }
        }
        info!(
          "{}: {} of {} prompts missed the cache",
          model, miss_prompts.len(), prompts.len()
        );

        let responses = self
          .call_batch(adapter, &miss_prompts, &config, parallel)
          .await?;
        for (key, response) in miss_keys.iter().zip(&responses)
        {   cache.insert(key.clone(), response.clone()).await?;
        }
        if responses.len() != miss_prompts.len()
        {   error!(
              "Dispatch returned {} responses for {} prompts",
              responses.len(), miss_prompts.len()
            );
            return Err(crate::error::Error::ResponseCountMismatch
            {   expected: miss_prompts.len()
              , actual: responses.len()
            });
        }

        let mut texts = Vec::with_capacity(keys.len());
        let mut cost = 0.0;
        for key in &keys
        {   let value = cache.get(key).ok_or_else(|| {
              crate::error::Error::Other(
                format!("Cache lost entry for {}", key)
              )
            })?;
            texts.push(extract_text(provider, value)?);
            if cost_tracked
            {   cost = self.config.models.costs.add_cost(cost, model, value)?;
            }
        }
        debug!("{}: batch cost {}", model, cost);
        Ok(Generation::Completed
        {   texts
          , cost
        })
    }

    /// Dispatches the batch under the batch retry policy
    async fn call_batch(
      &self
    , adapter: &dyn Adapter
    , prompts: &[Prompt]
    , config: &GenerationConfig
    , parallel: bool
    ) -> crate::error::Result<Vec<Value>>
    {   if prompts.is_empty()
        {   return Ok(vec![]);
        }
        with_retry(&self.config.batch_retry, "batch dispatch", || {
          dispatch_batch(prompts, parallel, move |prompt| {
            adapter.complete(prompt, config)
          })
        }).await
    }
}
