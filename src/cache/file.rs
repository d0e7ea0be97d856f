//! Append-only cache log: one `{"prompt", "completion"}` record per line

use std::collections::HashMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use log::{debug, trace, error};

/// One line of the cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord
{   /// Already serialized prompt
    pub prompt: String
  , /// Provider response or plain text
    pub completion: Value
}

/// Replays the cache file into a prompt -> completion map.
/// A missing file is an empty cache; the last record for a key wins.
pub async fn load_cache_file(
  path: impl AsRef<Path>
) -> crate::error::Result<HashMap<String, Value>>
{   let path = path.as_ref();
    let contents = match tokio::fs::read(path).await
    {   Ok(contents) => contents
      , Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
          debug!("No cache file at {}, starting empty", path.display());
          return Ok(HashMap::new());
        }
      , Err(e) => {
          error!("Failed to read cache file {}: {}", path.display(), e);
          return Err(e.into());
        }
    };

    // Lines are decoded one by one so bad bytes are reported
    // against the line that holds them
    let mut cache = HashMap::new();
    let mut lines: Vec<&[u8]> = contents.split(|b| *b == b'\n').collect();
    if lines.last().map_or(false, |last| last.is_empty())
    {   lines.pop();
    }
    for (index, line) in lines.into_iter().enumerate()
    {   let line = line.strip_suffix(b"\r").unwrap_or(line);
        let record: CacheRecord = std::str::from_utf8(line)
          .map_err(|e| e.to_string())
          .and_then(|line| {
            serde_json::from_str(line).map_err(|e| e.to_string())
          })
          .map_err(|message| {
            error!("Bad cache record on line {}: {}", index + 1, message);
            crate::error::Error::CacheDecode
            {   line: index + 1
              , message
            }
          })?;
        cache.insert(record.prompt, record.completion);
    }
    debug!(
      "Loaded {} cache entries from {}",
      cache.len(), path.display()
    );
    Ok(cache)
}

/// Appends one record. The file is opened and closed per call
/// and the whole line goes out in a single write.
pub async fn persist_entry(
  key: &str
, value: &Value
, path: impl AsRef<Path>
) -> crate::error::Result<()>
{   let path = path.as_ref();
    let record = CacheRecord
    {   prompt: key.to_string()
      , completion: value.clone()
    };
    let mut line = super::key::to_legacy_json(&record)?;
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .await
      .map_err(|e| {
        error!("Failed to open cache file {}: {}", path.display(), e);
        crate::error::Error::from(e)
      })?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    trace!("Appended {} bytes to {}", line.len(), path.display());
    Ok(())
}
