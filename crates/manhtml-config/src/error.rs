use std::{io, path::PathBuf};

use manhtml_roff::RoffError;
use thiserror::Error;

/// Error type for manhtml-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Failed to read config file: {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse JSON config from {}: {source}", path.display())]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Failed to parse TOML config from {}: {source}", path.display())]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error(transparent)]
  Roff(#[from] RoffError),
}
