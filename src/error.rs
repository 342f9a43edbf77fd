use std::fmt;

/// Custom error type for quill operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Topic was empty or whitespace only
    EmptyTopic
  , /// Form field present but not parseable
    InvalidField(String)
  , /// HTTP transport error (connect, DNS, body read)
    HttpError(String)
  , /// Backend answered with a non-success status
    ApiError(String)
  , /// Backend did not answer within the timeout
    Timeout(String)
  , /// Backend body could not be parsed
    ParseError(String)
  , /// Backend body had no usable choices
    NoChoicesInResponse(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Audit logger task is gone
    AuditUnavailable
  , /// Filesystem error
    Io(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether this is a caller mistake rather than a server-side fault
    pub fn is_client_error(&self) -> bool
    {   matches!(self, Error::EmptyTopic | Error::InvalidField(_))
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::EmptyTopic => {
              write!(f, "Topic cannot be empty")
            }
          , Error::InvalidField(msg) => {
              write!(f, "Invalid form field: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "{}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "{}", msg)
            }
          , Error::Timeout(msg) => {
              write!(f, "Request timed out: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "{}", msg)
            }
          , Error::NoChoicesInResponse(body) => {
              write!(f, "{}", body)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::AuditUnavailable => {
              write!(f, "Audit logger is not running")
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "{}", msg)
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
    {   Error::Io(e.to_string())
    }
}
