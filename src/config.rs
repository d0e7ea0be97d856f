//! Configuration for provider credentials and dispatch behavior

use std::path::Path;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use log::{debug, error};

use crate::registry::ModelRegistry;
use crate::retry::RetryPolicy;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Provider API keys, read once at start-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCredentials
{   pub openai_api_key: Option<String>
  , pub openai_organization: Option<String>
  , pub openai_project: Option<String>
  , pub anthropic_api_key: Option<String>
  , pub google_api_key: Option<String>
}

impl ProviderCredentials
{   /// Reads `OPENAI_API_KEY`, `OPENAI_ORGANIZATION`, `OPENAI_PROJECT`,
    /// `ANTHROPIC_API_KEY` and `GOOGLE_API_KEY`
    pub fn from_env() -> Self
    {   let var = |name: &str| std::env::var(name).ok();
        let credentials = ProviderCredentials
        {   openai_api_key: var("OPENAI_API_KEY")
          , openai_organization: var("OPENAI_ORGANIZATION")
          , openai_project: var("OPENAI_PROJECT")
          , anthropic_api_key: var("ANTHROPIC_API_KEY")
          , google_api_key: var("GOOGLE_API_KEY")
        };
        debug!(
          "Credentials from env: openai={} anthropic={} google={}",
          credentials.openai_api_key.is_some(),
          credentials.anthropic_api_key.is_some(),
          credentials.google_api_key.is_some()
        );
        credentials
    }

    /// Empty without an OpenAI key
    pub fn openai_headers(&self) -> crate::error::Result<HeaderMap>
    {   let mut headers = HeaderMap::new();
        let key = match &self.openai_api_key
        {   Some(key) => key
          , None => return Ok(headers)
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert_header(
          &mut headers,
          "authorization",
          &format!("Bearer {}", key)
        )?;
        if let Some(org) = &self.openai_organization
        {   insert_header(&mut headers, "openai-organization", org)?;
        }
        if let Some(project) = &self.openai_project
        {   insert_header(&mut headers, "openai-project", project)?;
        }
        Ok(headers)
    }

    /// Empty without an Anthropic key
    pub fn anthropic_headers(&self) -> crate::error::Result<HeaderMap>
    {   let mut headers = HeaderMap::new();
        let key = match &self.anthropic_api_key
        {   Some(key) => key
          , None => return Ok(headers)
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert_header(&mut headers, "anthropic-version", ANTHROPIC_VERSION)?;
        insert_header(&mut headers, "x-api-key", key)?;
        Ok(headers)
    }

    /// Empty without a Google key
    pub fn gemini_headers(&self) -> crate::error::Result<HeaderMap>
    {   let mut headers = HeaderMap::new();
        if let Some(key) = &self.google_api_key
        {   insert_header(&mut headers, "x-goog-api-key", key)?;
        }
        Ok(headers)
    }
}

fn insert_header(
  headers: &mut HeaderMap
, name: &'static str
, value: &str
) -> crate::error::Result<()>
{   let value = HeaderValue::from_str(value).map_err(|e| {
      error!("Header {} has an invalid value", name);
      crate::error::Error::InvalidConfiguration(
        format!("{}: {}", name, e)
      )
    })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Sampling values forced on the self-hosted path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfHostedOverrides
{   pub temperature: f64
  , pub max_tokens: u64
}

impl Default for SelfHostedOverrides
{   fn default() -> Self
    {   SelfHostedOverrides
        {   temperature: 0.0
          , max_tokens: 512
        }
    }
}

/// Dispatch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig
{   /// Retry around each OpenAI-compatible or Claude request
    pub request_retry: RetryPolicy
  , /// Retry around a whole batch dispatch
    pub batch_retry: RetryPolicy
  , pub self_hosted: SelfHostedOverrides
  , pub models: ModelRegistry
}

impl Default for DispatchConfig
{   fn default() -> Self
    {   DispatchConfig
        {   request_retry: RetryPolicy::per_request()
          , batch_retry: RetryPolicy::per_batch()
          , self_hosted: SelfHostedOverrides::default()
          , models: ModelRegistry::default()
        }
    }
}

impl DispatchConfig
{   pub fn from_json_str(json: &str) -> crate::error::Result<Self>
    {   serde_json::from_str(json).map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })
    }

    pub fn from_json_file(
      path: impl AsRef<Path>
    ) -> crate::error::Result<Self>
    {   let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
          error!("Failed to read config {}: {}", path.display(), e);
          crate::error::Error::InvalidConfiguration(
            format!("{}: {}", path.display(), e)
          )
        })?;
        DispatchConfig::from_json_str(&json)
    }
}
