use std::{
  fs,
  path::{Path, PathBuf},
};

use manhtml_roff::{OutputMode, PageOptions, RenderOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a manhtml run.
///
/// Every field is optional so that several sources (config files,
/// `--config KEY=VALUE` overrides, CLI flags) can be layered; unset values
/// fall back to the defaults of [`RenderOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Output mode: `html`, `jekyll` or `raw`.
  pub mode: Option<String>,

  /// Output file. Standard output when unset.
  pub output: Option<PathBuf>,

  /// Jekyll `layout` front matter key.
  pub layout: Option<String>,

  /// Jekyll `permalink` front matter key.
  pub permalink: Option<String>,
}

impl Config {
  /// Load configuration from a TOML or JSON file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, has an unsupported
  /// extension, or fails to parse.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
      })?;

    match path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase)
      .as_deref()
    {
      Some("json") => {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
          path: path.to_path_buf(),
          source,
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
          path: path.to_path_buf(),
          source,
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Look for a config file in the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    ["manhtml.toml", "manhtml.json", ".manhtml.toml", ".manhtml.json"]
      .iter()
      .map(|name| current_dir.join(name))
      .find(|path| path.exists())
  }

  /// Load configuration from the given files (or a discovered one), then
  /// apply `KEY=VALUE` overrides.
  ///
  /// Files are merged in order; later files win.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is malformed,
  /// or the resulting output mode is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    config.apply_overrides(config_overrides)?;
    config.output_mode()?;

    Ok(config)
  }

  /// Merge another config into this one; the other config's `Some` values
  /// take precedence.
  pub fn merge(&mut self, other: Self) {
    if other.mode.is_some() {
      self.mode = other.mode;
    }
    if other.output.is_some() {
      self.output = other.output;
    }
    if other.layout.is_some() {
      self.layout = other.layout;
    }
    if other.permalink.is_some() {
      self.permalink = other.permalink;
    }
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// An empty value clears the key.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in `KEY=VALUE` form or names an
  /// unknown key.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    let value = (!value.is_empty()).then(|| value.to_string());

    match key {
      "mode" => self.mode = value,
      "output" => self.output = value.map(PathBuf::from),
      "layout" => self.layout = value,
      "permalink" => self.permalink = value,
      other => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{other}'"
        )));
      },
    }

    Ok(())
  }

  /// The configured output mode, `html` when unset.
  ///
  /// # Errors
  ///
  /// Returns an error if the mode is not `html`, `jekyll` or `raw`.
  pub fn output_mode(&self) -> Result<OutputMode, ConfigError> {
    self
      .mode
      .as_deref()
      .map_or(Ok(OutputMode::default()), str::parse)
      .map_err(ConfigError::from)
  }

  /// Interpreter settings derived from this config.
  ///
  /// # Errors
  ///
  /// Returns an error if the output mode is invalid.
  pub fn render_options(&self) -> Result<RenderOptions, ConfigError> {
    Ok(RenderOptions {
      mode: self.output_mode()?,
      page: PageOptions {
        layout:    self.layout.clone(),
        permalink: self.permalink.clone(),
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merge_prefers_other_values() {
    let mut base = Config {
      mode: Some("jekyll".to_string()),
      layout: Some("page".to_string()),
      ..Config::default()
    };
    base.merge(Config {
      layout: Some("manpage".to_string()),
      ..Config::default()
    });

    assert_eq!(base.mode.as_deref(), Some("jekyll"));
    assert_eq!(base.layout.as_deref(), Some("manpage"));
  }

  #[test]
  fn overrides_set_and_clear() {
    let mut config = Config {
      layout: Some("page".to_string()),
      ..Config::default()
    };
    config
      .apply_overrides(&["mode=raw".to_string(), "layout=".to_string()])
      .unwrap_or_else(|e| panic!("overrides failed: {e}"));

    assert_eq!(config.mode.as_deref(), Some("raw"));
    assert_eq!(config.layout, None);
  }

  #[test]
  fn bad_overrides_are_rejected() {
    let mut config = Config::default();
    assert!(config.apply_overrides(&["mode".to_string()]).is_err());
    assert!(config.apply_overrides(&["colour=red".to_string()]).is_err());
  }

  #[test]
  fn output_mode_defaults_to_html() {
    assert!(matches!(Config::default().output_mode(), Ok(OutputMode::Html)));

    let config = Config {
      mode: Some("pdf".to_string()),
      ..Config::default()
    };
    assert!(matches!(config.output_mode(), Err(ConfigError::Roff(_))));
  }

  #[test]
  fn render_options_carry_page_settings() {
    let config = Config {
      mode: Some("jekyll".to_string()),
      permalink: Some("/man/x.html".to_string()),
      ..Config::default()
    };
    let options = config.render_options().ok();
    assert_eq!(
      options.map(|o| (o.mode, o.page.permalink)),
      Some((OutputMode::Jekyll, Some("/man/x.html".to_string())))
    );
  }
}
