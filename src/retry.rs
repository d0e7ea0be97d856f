//! Bounded retry with backoff around fallible async calls

use std::future::Future;
use std::time::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use log::{debug, warn, error};

/// Wait between two attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff
{   /// Uniform in `[0, min(max_secs, multiplier * 2^(attempt-1))]`
    RandomExponential
    {   multiplier: f64
      , max_secs: f64
    }
  , /// Same wait after every attempt
    Fixed
    {   secs: f64
    }
}

/// Retry policy for failed calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy
{   /// Total attempts, the first one included
    pub max_attempts: usize
  , pub backoff: Backoff
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_attempts: usize
    , backoff: Backoff
    ) -> Self
    {   RetryPolicy
        {   max_attempts
          , backoff
        }
    }

    /// Policy for single provider requests
    pub fn per_request() -> Self
    {   RetryPolicy::new(
          10,
          Backoff::RandomExponential
          {   multiplier: 1.0
            , max_secs: 60.0
          }
        )
    }

    /// Policy for a whole dispatched batch
    pub fn per_batch() -> Self
    {   RetryPolicy::new(10, Backoff::Fixed { secs: 20.0 })
    }

    /// No waiting between attempts
    pub fn immediate(max_attempts: usize) -> Self
    {   RetryPolicy::new(max_attempts, Backoff::Fixed { secs: 0.0 })
    }

    /// Wait after the given failed attempt (1-based)
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   match self.backoff
        {   Backoff::Fixed { secs } => clamped_wait(secs)
          , Backoff::RandomExponential { multiplier, max_secs } => {
              let exponent = attempt.saturating_sub(1).min(63) as i32;
              let high = clamped_wait(
                (multiplier * 2f64.powi(exponent)).min(max_secs)
              ).as_secs_f64();
              let secs = rand::thread_rng().gen_range(0.0..=high);
              clamped_wait(secs)
            }
        }
    }
}

/// Longest single wait between attempts, in seconds
pub const MAX_BACKOFF_SECS: f64 = 3600.0;

/// NaN and negative waits are zero; anything past the cap is the cap
fn clamped_wait(secs: f64) -> Duration
{   if secs.is_nan()
    {   return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.clamp(0.0, MAX_BACKOFF_SECS))
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::per_request()
    }
}

/// Runs `call` until it succeeds or `policy.max_attempts` calls failed.
/// Exhaustion returns `RetriesExhausted` holding the last failure.
pub async fn with_retry<T, F, Fut>(
  policy: &RetryPolicy
, label: &str
, mut call: F
) -> crate::error::Result<T>
where
  F: FnMut() -> Fut
, Fut: Future<Output = crate::error::Result<T>>
{   let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop
    {   attempt += 1;
        match call().await
        {   Ok(value) => {
              if attempt > 1
              {   debug!("{} succeeded on attempt {}", label, attempt);
              }
              return Ok(value);
            }
          , Err(e) if attempt >= max_attempts => {
              error!("{} failed {} times, giving up: {}", label, attempt, e);
              return Err(crate::error::Error::RetriesExhausted
              {   attempts: attempt
                , last: Box::new(e)
              });
            }
          , Err(e) => {
              let wait = policy.backoff_for_attempt(attempt);
              warn!(
                "{} attempt {}/{} failed: {}; retrying in {:?}",
                label, attempt, max_attempts, e, wait
              );
              tokio::time::sleep(wait).await;
            }
        }
    }
}
