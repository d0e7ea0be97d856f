//! Model name -> provider resolution

use serde::{Deserialize, Serialize};
use log::{debug, warn};

use crate::pricing::CostTable;
use crate::Provider;

/// Known models and the markers that route them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelRegistry
{   /// Cost-tracked, OpenAI-compatible models
    pub costs: CostTable
  , /// Exact names served by the Claude path
    pub claude_models: Vec<String>
  , /// Cost-tracked models with this prefix are reasoning models
    pub reasoning_prefix: String
}

impl Default for ModelRegistry
{   fn default() -> Self
    {   ModelRegistry
        {   costs: CostTable::default()
          , claude_models: vec![
              "claude-3-5-sonnet-20241022".to_string()
            ]
          , reasoning_prefix: "o1".to_string()
        }
    }
}

impl ModelRegistry
{   /// Picks the provider path for `model`: cost table first, then
    /// the `gemini` and `gemma` family markers, then the Claude list
    pub fn resolve(
      &self
    , model: &str
    ) -> crate::error::Result<Provider>
    {   let lowered = model.to_lowercase();
        let provider = if self.costs.contains(model)
        {   if model.starts_with(&self.reasoning_prefix)
            {   Provider::Reasoning
            } else
            {   Provider::OpenAiCompatible
            }
        } else if lowered.contains("gemini")
        {   Provider::Gemini
        } else if lowered.contains("gemma")
        {   Provider::Gemma
        } else if self.claude_models.iter().any(|m| m == model)
        {   Provider::Claude
        } else
        {   warn!("No provider matches model: {}", model);
            return Err(crate::error::Error::UnsupportedModel(
              model.to_string()
            ));
        };
        debug!("Model {} resolved to {:?}", model, provider);
        Ok(provider)
    }

    /// Whether responses for `model` carry usage that can be priced
    pub fn is_cost_tracked(&self, model: &str) -> bool
    {   self.costs.contains(model)
    }
}
