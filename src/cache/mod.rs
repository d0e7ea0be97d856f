//! Disk-backed response cache keyed by serialized prompt

pub mod file;
pub mod key;

pub use file::{load_cache_file, persist_entry, CacheRecord};
pub use key::cache_key;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde_json::Value;
use log::debug;

/// In-memory view of a cache file.
///
/// The store is the only writer of its file within a process:
/// `insert` takes `&mut self`, so appends never overlap.
#[derive(Debug, Clone)]
pub struct CacheStore
{   entries: HashMap<String, Value>
  , path: PathBuf
}

impl CacheStore
{   /// Loads the store by replaying the file at `path`
    pub async fn open(
      path: impl Into<PathBuf>
    ) -> crate::error::Result<Self>
    {   let path = path.into();
        let entries = load_cache_file(&path).await?;
        debug!("Opened cache store at {}", path.display());
        Ok(CacheStore
        {   entries
          , path
        })
    }

    pub fn path(&self) -> &Path
    {   &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value>
    {   self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool
    {   self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize
    {   self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.entries.is_empty()
    }

    /// True when the entry exists and, for cost-tracked models,
    /// carries the full response shape
    pub fn is_complete(&self, key: &str, cost_tracked: bool) -> bool
    {   match self.entries.get(key)
        {   None => false
          , Some(value) => !cost_tracked || value.get("choices").is_some()
        }
    }

    /// Stores the entry and appends it to the file right away
    pub async fn insert(
      &mut self
    , key: String
    , value: Value
    ) -> crate::error::Result<()>
    {   persist_entry(&key, &value, &self.path).await?;
        self.entries.insert(key, value);
        Ok(())
    }
}
