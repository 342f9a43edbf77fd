//! Configuration for the backend endpoint, styles and the audit store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use log::{debug, error};

pub const DEFAULT_BACKEND_URL: &str
  = "http://127.0.0.1:1234/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "tinyllama";
pub const DEFAULT_STYLE: &str = "blog_intro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Built-in writing styles
pub fn default_styles() -> BTreeMap<String, String>
{   [ ( "blog_intro"
      , "Write a concise and engaging blog introduction about {topic}"
      )
    , ( "tweet"
      , "Create a tweet (under 280 characters) about {topic}"
      )
    , ( "story"
      , "Write a short story (2-3 paragraphs) about {topic}"
      )
    , ( "professional"
      , "Write a professional email about {topic}"
      )
    , ( "casual"
      , "Write a casual message about {topic}"
      )
    ]
    .into_iter()
    .map(|(id, template)| (id.to_string(), template.to_string()))
    .collect()
}

/// Quill configuration, fixed at process start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig
{   /// Chat-completions endpoint of the local model server
    pub backend_url: String
  , /// Model used when the caller does not name one
    pub default_model: String
  , /// Style used when the caller's style is unknown or absent
    pub default_style: String
  , /// Style id to prompt template
    pub styles: BTreeMap<String, String>
  , /// Backend request timeout in seconds
    pub timeout_secs: u64
  , /// Address the HTTP server listens on
    pub bind_addr: String
  , /// Directory for generations.log and the daily app log
    pub log_dir: PathBuf
  , /// Send diagnostics to the daily app log instead of stderr
    pub log_to_file: bool
}

impl Default for QuillConfig
{   fn default() -> Self
    {   QuillConfig
        {   backend_url: DEFAULT_BACKEND_URL.to_string()
          , default_model: DEFAULT_MODEL.to_string()
          , default_style: DEFAULT_STYLE.to_string()
          , styles: default_styles()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
          , bind_addr: "0.0.0.0:8000".to_string()
          , log_dir: PathBuf::from("logs")
          , log_to_file: false
        }
    }
}

impl QuillConfig
{   /// Load from QUILL_CONFIG (if set) and QUILL_* environment overrides
    pub fn load() -> Result<Self, crate::error::Error>
    {   Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as `load`, reading variables through `lookup`
    pub fn load_with<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let mut config = match lookup("QUILL_CONFIG")
        {   Some(path) => Self::from_file(&path)?
          , None => QuillConfig::default()
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Read a JSON config file; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)
          .map_err(|e| {
            error!("Cannot read config {}: {}", path.display(), e);
            crate::error::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        serde_json::from_str(&text).map_err(|e| {
          error!("Cannot parse config {}: {}", path.display(), e);
          crate::error::Error::InvalidConfiguration(
            format!("{}: {}", path.display(), e)
          )
        })
    }

    fn apply_overrides<F>(&mut self, lookup: F)
      -> Result<(), crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   if let Some(url) = lookup("QUILL_BACKEND_URL")
        {   self.backend_url = url;
        }
        if let Some(model) = lookup("QUILL_DEFAULT_MODEL")
        {   self.default_model = model;
        }
        if let Some(addr) = lookup("QUILL_BIND_ADDR")
        {   self.bind_addr = addr;
        }
        if let Some(dir) = lookup("QUILL_LOG_DIR")
        {   self.log_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("QUILL_TIMEOUT_SECS")
        {   self.timeout_secs = secs.trim().parse().map_err(|_| {
              crate::error::Error::InvalidConfiguration(
                format!("QUILL_TIMEOUT_SECS is not a number: {}", secs)
              )
            })?;
        }
        if let Some(flag) = lookup("QUILL_LOG_TO_FILE")
        {   self.log_to_file = match flag.trim()
            {   "1" | "true" | "yes" => true
              , "0" | "false" | "no" | "" => false
              , other => {
                  return Err(crate::error::Error::InvalidConfiguration(
                    format!("QUILL_LOG_TO_FILE must be a boolean: {}", other)
                  ));
                }
            };
        }
        if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be greater than zero".to_string()
            ));
        }
        Ok(())
    }

    /// Path of the append-only generation audit log
    pub fn audit_log_path(&self) -> PathBuf
    {   self.log_dir.join("generations.log")
    }

    /// Path of today's diagnostic log
    pub fn app_log_path(&self) -> PathBuf
    {   self.log_dir.join(format!(
          "app_{}.log",
          chrono::Local::now().format("%Y%m%d")
        ))
    }
}
