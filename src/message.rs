//! Prompt and generation config types shared by every provider path

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker of a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

impl Role
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Role::System => "system"
          , Role::User => "user"
          , Role::Assistant => "assistant"
        }
    }
}

/// One role-tagged message of a conversation.
/// Field order is part of the cache key layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Turn
{   pub role: Role
  , pub content: String
}

impl Turn
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   Turn
        {   role
          , content: content.into()
        }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   Turn::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   Turn::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   Turn::new(Role::Assistant, content)
    }
}

/// An ordered conversation sent as one request
pub type Prompt = Vec<Turn>;

/// Returns a copy of `turns` with every system turn spoken by the user
pub fn system_as_user(turns: &[Turn]) -> Prompt
{   turns.iter()
      .map(|turn| match turn.role
      {   Role::System => Turn::user(turn.content.clone())
        , _ => turn.clone()
      })
      .collect()
}

/// Provider-specific request options, merged verbatim into
/// the outgoing body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationConfig(pub Map<String, Value>);

impl GenerationConfig
{   pub fn new() -> Self
    {   GenerationConfig(Map::new())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self
    {   self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn temperature(self, temperature: f64) -> Self
    {   self.with("temperature", temperature)
    }

    pub fn max_tokens(self, max_tokens: u64) -> Self
    {   self.with("max_tokens", max_tokens)
    }

    pub fn is_empty(&self) -> bool
    {   self.0.is_empty()
    }

    /// Builds `{model, messages, ...config}`; config keys win on clash
    pub fn request_body(
      &self
    , model: &str
    , messages: &[Turn]
    ) -> Value
    {   let mut body = Map::new();
        body.insert("model".to_string(), Value::from(model));
        body.insert(
          "messages".to_string(),
          Value::Array(messages.iter().map(turn_value).collect())
        );
        for (key, value) in &self.0
        {   body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

fn turn_value(turn: &Turn) -> Value
{   serde_json::json!({
      "role": turn.role.as_str(),
      "content": turn.content,
    })
}
