//! Linear per-token price tables

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{trace, error};

/// Price per token, keyed by the `usage` field it applies to
pub type TokenPrices = BTreeMap<String, f64>;

/// Model name -> token prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable(pub BTreeMap<String, TokenPrices>);

impl CostTable
{   pub fn empty() -> Self
    {   CostTable(BTreeMap::new())
    }

    /// Adds or replaces the prompt/completion prices of a model
    pub fn with_model(
      mut self
    , model: &str
    , prompt_price: f64
    , completion_price: f64
    ) -> Self
    {   let mut prices = TokenPrices::new();
        prices.insert("prompt_tokens".to_string(), prompt_price);
        prices.insert("completion_tokens".to_string(), completion_price);
        self.0.insert(model.to_string(), prices);
        self
    }

    pub fn contains(&self, model: &str) -> bool
    {   self.0.contains_key(model)
    }

    pub fn prices(&self, model: &str) -> Option<&TokenPrices>
    {   self.0.get(model)
    }

    /// Sums `usage[token_type] * price` over the model's token types.
    /// Untracked models cost nothing.
    pub fn cost_of(
      &self
    , model: &str
    , response: &Value
    ) -> crate::error::Result<f64>
    {   self.add_cost(0.0, model, response)
    }

    /// Adds each `usage[token_type] * price` term of one response
    /// onto a running batch total, one term at a time.
    /// Terms go prompt tokens first, then completion tokens, then any
    /// other token types by name, so batch totals are reproducible to
    /// the last bit.
    pub fn add_cost(
      &self
    , running: f64
    , model: &str
    , response: &Value
    ) -> crate::error::Result<f64>
    {   let prices = match self.0.get(model)
        {   Some(prices) => prices
          , None => return Ok(running)
        };
        let mut cost = running;
        for (token_type, price) in summation_order(prices)
        {   let used = response.get("usage")
              .and_then(|usage| usage.get(token_type))
              .and_then(Value::as_f64)
              .ok_or_else(|| {
                error!("Response has no usage.{}: {}", token_type, response);
                crate::error::Error::MissingField(
                  format!("usage.{}", token_type)
                )
              })?;
            cost += used * price;
        }
        trace!("Cost for {}: {} -> {}", model, running, cost);
        Ok(cost)
    }
}

const LEADING_TOKEN_TYPES: [&str; 2] = ["prompt_tokens", "completion_tokens"];

fn summation_order(
  prices: &TokenPrices
) -> impl Iterator<Item = (&String, &f64)>
{   let leading = LEADING_TOKEN_TYPES.iter()
      .filter_map(move |name| prices.get_key_value(*name));
    let rest = prices.iter()
      .filter(|(name, _)| !LEADING_TOKEN_TYPES.contains(&name.as_str()));
    leading.chain(rest)
}

impl Default for CostTable
{   fn default() -> Self
    {   CostTable::empty()
          .with_model("gpt-4o", 5.0 / 1_000_000.0, 15.0 / 1_000_000.0)
          .with_model("o1-preview", 15.0 / 1_000_000.0, 60.0 / 1_000_000.0)
          .with_model("o1", 15.0 / 1_000_000.0, 60.0 / 1_000_000.0)
    }
}
