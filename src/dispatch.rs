//! Runs one call per prompt, in order or all at once

use std::future::Future;
use futures::future::join_all;
use log::debug;

/// Calls `get_response` once per prompt and returns the results in
/// input order.
///
/// Sequential unless `parallel` is set and there is more than one
/// prompt; then every call is in flight at the same time. The first
/// failure in input order is returned after all calls settle.
pub async fn dispatch_batch<'a, P, T, F, Fut>(
  prompts: &'a [P]
, parallel: bool
, get_response: F
) -> crate::error::Result<Vec<T>>
where
  F: Fn(&'a P) -> Fut
, Fut: Future<Output = crate::error::Result<T>>
{   if !parallel || prompts.len() <= 1
    {   debug!("Dispatching {} prompts sequentially", prompts.len());
        let mut responses = Vec::with_capacity(prompts.len());
        for prompt in prompts
        {   responses.push(get_response(prompt).await?);
        }
        return Ok(responses);
    }

    debug!("Dispatching {} prompts concurrently", prompts.len());
    join_all(prompts.iter().map(get_response))
      .await
      .into_iter()
      .collect()
}
