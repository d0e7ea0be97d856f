pub mod error;
pub mod config;
pub mod message;
pub mod cache;
pub mod pricing;
pub mod registry;
pub mod retry;
pub mod dispatch;
pub mod providers;
pub mod client;
use serde::{Deserialize, Serialize};

pub use cache::CacheStore;
pub use client::{Dispatcher, Generation};
pub use config::{DispatchConfig, ProviderCredentials};
pub use error::Error;
pub use message::{GenerationConfig, Prompt, Role, Turn};

/*

promptcache: one call path for several hosted LLM APIs, with every
completion cached on disk by exact prompt so reruns don't pay twice.

promptcache/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports, Provider tag, logging init
│   ├── error.rs        # Error type
│   ├── config.rs       # Credentials and dispatch configuration
│   ├── message.rs      # Turns, prompts, generation config
│   ├── cache/          # Cache key, append-only cache file, store
│   ├── pricing.rs      # Per-token cost tables
│   ├── registry.rs     # Model name -> provider
│   ├── retry.rs        # Bounded retry with backoff
│   ├── dispatch.rs     # Sequential / concurrent batch runner
│   ├── providers/      # OpenAI, Gemini, Gemma (vLLM), Claude
│   └── client.rs       # Dispatcher: cache, dispatch, cost
└── tests/

*/

/// Provider call paths. Each variant has its own request shape
/// and its own way of reading the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum Provider
{   /// OpenAI chat completions (and compatible endpoints)
    OpenAiCompatible
  , /// Google Gemini generateContent
    Gemini
  , /// Gemma on a self-hosted chat endpoint, no API key
    Gemma
  , /// Anthropic messages API
    Claude
  , /// OpenAI reasoning models: no system turns, no generation config
    Reasoning
}

/// Starts `env_logger` from `RUST_LOG`; safe to call more than once
pub fn init_logging()
{   let _ = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
