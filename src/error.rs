use std::fmt;

/// Custom error type for promptcache operations
/// Implements Clone so a failure can be kept as the
/// last cause of an exhausted retry loop
#[derive(Debug, Clone, PartialEq)]
pub enum Error
{   /// No adapter is registered for this model name
    UnsupportedModel(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// Response body lacks a field the provider path requires
    MissingField(String)
  , /// Cache file could not be read or appended to
    CacheIo(String)
  , /// A cache file line is not a valid record
    CacheDecode
    {   line: usize
      , message: String
    }
  , /// Dispatch returned a different number of responses
    /// than prompts sent
    ResponseCountMismatch
    {   expected: usize
      , actual: usize
    }
  , /// Every attempt of a retried call failed
    RetriesExhausted
    {   attempts: usize
      , last: Box<Error>
    }
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::UnsupportedModel(model) => {
              write!(f, "No adapter for model: {}", model)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::MissingField(field) => {
              write!(f,
                "API response is missing field: {}",
                field
              )
            }
          , Error::CacheIo(msg) => {
              write!(f, "Cache file error: {}", msg)
            }
          , Error::CacheDecode { line, message } => {
              write!(f,
                "Cache file line {} is invalid: {}",
                line, message
              )
            }
          , Error::ResponseCountMismatch { expected, actual } => {
              write!(f,
                "Dispatch returned {} responses for {} prompts",
                actual, expected
              )
            }
          , Error::RetriesExhausted { attempts, last } => {
              write!(f,
                "Gave up after {} attempts: {}",
                attempts, last
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::CacheIo(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
