use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
  error::{RoffError, RoffResult},
  escape::escape_text,
  links::EXEMPT_URL,
};

/// Shape of the document wrapped around the converted lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
  /// Complete HTML document.
  #[default]
  Html,
  /// Jekyll page: YAML front matter, no trailer.
  Jekyll,
  /// Bare fragment: no preamble, no trailer.
  Raw,
}

impl FromStr for OutputMode {
  type Err = RoffError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "html" => Ok(Self::Html),
      "jekyll" => Ok(Self::Jekyll),
      "raw" => Ok(Self::Raw),
      other => Err(RoffError::InvalidMode(other.to_string())),
    }
  }
}

impl fmt::Display for OutputMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Html => "html",
      Self::Jekyll => "jekyll",
      Self::Raw => "raw",
    })
  }
}

/// Page settings that do not come from the document itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
  /// Jekyll `layout` key.
  pub layout:    Option<String>,
  /// Jekyll `permalink` key.
  pub permalink: Option<String>,
}

/// Arguments of the `TH` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleInfo {
  pub title:        String,
  pub section:      String,
  pub date:         Option<String>,
  pub package:      Option<String>,
  pub section_text: Option<String>,
}

impl TitleInfo {
  /// Build from `TH` arguments: title, section, date, package, section text.
  ///
  /// Missing or empty optional arguments are `None`.
  #[must_use]
  pub fn from_args(args: &[String]) -> Self {
    let optional = |index: usize| {
      args
        .get(index)
        .filter(|value| !value.is_empty())
        .map(|value| escape_text(value))
    };

    Self {
      title:        args.first().map(|t| escape_text(t)).unwrap_or_default(),
      section:      args.get(1).map(|s| escape_text(s)).unwrap_or_default(),
      date:         optional(2),
      package:      optional(3),
      section_text: optional(4),
    }
  }

  /// `title(section)`, or just the title when no section was given.
  #[must_use]
  pub fn display_name(&self) -> String {
    if self.section.is_empty() {
      self.title.clone()
    } else {
      format!("{}({})", self.title, self.section)
    }
  }
}

/// Text emitted around the document body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
  /// Emitted in place of the `TH` request.
  pub head:    Option<String>,
  /// Emitted after the last line.
  pub trailer: Option<String>,
}

/// Build the preamble and trailer for `mode`.
///
/// # Errors
///
/// Returns an error if the Jekyll front matter cannot be serialized.
pub fn render_preamble(
  mode: OutputMode,
  info: &TitleInfo,
  page: &PageOptions,
) -> RoffResult<Preamble> {
  let preamble = match mode {
    OutputMode::Html => {
      Preamble {
        head:    Some(html_head(info)),
        trailer: Some("</body></html>".to_string()),
      }
    },
    OutputMode::Jekyll => {
      Preamble {
        head:    Some(front_matter(info, page)?),
        trailer: None,
      }
    },
    OutputMode::Raw => Preamble::default(),
  };
  Ok(preamble)
}

fn html_head(info: &TitleInfo) -> String {
  format!(
    "<!DOCTYPE html>\n<html xmlns=\"{EXEMPT_URL}\">\n<head>\n<meta \
     charset=\"utf-8\" />\n<title>{} manual page</title>\n</head>\n<body>",
    info.display_name()
  )
}

/// Jekyll front matter keys, in output order.
#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  permalink:    Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  layout:       Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  title:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  package:      Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  date:         Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  section_text: Option<&'a str>,
}

impl FrontMatter<'_> {
  const fn is_empty(&self) -> bool {
    self.permalink.is_none()
      && self.layout.is_none()
      && self.title.is_none()
      && self.package.is_none()
      && self.date.is_none()
      && self.section_text.is_none()
  }
}

fn front_matter(info: &TitleInfo, page: &PageOptions) -> RoffResult<String> {
  let matter = FrontMatter {
    permalink:    page.permalink.as_deref(),
    layout:       page.layout.as_deref(),
    title:        Some(info.display_name()).filter(|t| !t.is_empty()),
    package:      info.package.as_deref(),
    date:         info.date.as_deref(),
    section_text: info.section_text.as_deref(),
  };

  // An empty struct would serialize as `{}`.
  let body = if matter.is_empty() {
    String::new()
  } else {
    serde_yaml::to_string(&matter)?
  };
  Ok(format!("---\n{body}---"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
  }

  #[test]
  fn parses_modes() {
    assert_eq!("html".parse::<OutputMode>().ok(), Some(OutputMode::Html));
    assert_eq!("raw".parse::<OutputMode>().ok(), Some(OutputMode::Raw));
    assert!(matches!(
      "pdf".parse::<OutputMode>(),
      Err(RoffError::InvalidMode(mode)) if mode == "pdf"
    ));
    assert_eq!(OutputMode::Jekyll.to_string(), "jekyll");
  }

  #[test]
  fn title_info_from_args() {
    let info = TitleInfo::from_args(&args(&[
      "prog",
      "1",
      "2024-01-01",
      "",
      "My Package",
    ]));
    assert_eq!(info.display_name(), "prog(1)");
    assert_eq!(info.date.as_deref(), Some("2024-01-01"));
    assert_eq!(info.package, None);
    assert_eq!(info.section_text.as_deref(), Some("My Package"));
  }

  #[test]
  fn html_preamble_and_trailer() {
    let info = TitleInfo::from_args(&args(&["prog", "1"]));
    let preamble =
      render_preamble(OutputMode::Html, &info, &PageOptions::default())
        .unwrap_or_default();
    let head = preamble.head.unwrap_or_default();
    assert!(head.starts_with("<!DOCTYPE html>"));
    assert!(head.contains("<title>prog(1) manual page</title>"));
    assert_eq!(preamble.trailer.as_deref(), Some("</body></html>"));
  }

  #[test]
  fn jekyll_front_matter_skips_missing_keys() {
    let info = TitleInfo::from_args(&args(&[
      "prog",
      "1",
      "2024-01-01",
      "mypackage",
    ]));
    let page = PageOptions {
      layout:    Some("manpage".to_string()),
      permalink: None,
    };
    let preamble = render_preamble(OutputMode::Jekyll, &info, &page)
      .unwrap_or_default();
    assert_eq!(
      preamble.head.as_deref(),
      Some(
        "---\nlayout: manpage\ntitle: prog(1)\npackage: mypackage\ndate: \
         2024-01-01\n---"
      )
    );
    assert_eq!(preamble.trailer, None);
  }

  #[test]
  fn raw_mode_has_nothing() {
    let info = TitleInfo::from_args(&args(&["prog", "1"]));
    assert_eq!(
      render_preamble(OutputMode::Raw, &info, &PageOptions::default()).ok(),
      Some(Preamble::default())
    );
  }

  fn jekyll_values(values: &[&str]) -> serde_yaml::Mapping {
    let info = TitleInfo::from_args(&args(values));
    let page = PageOptions::default();
    let head = render_preamble(OutputMode::Jekyll, &info, &page)
      .ok()
      .and_then(|preamble| preamble.head)
      .unwrap_or_default();
    let yaml = head
      .strip_prefix("---\n")
      .and_then(|rest| rest.strip_suffix("---"))
      .unwrap_or_default();
    serde_yaml::from_str(yaml).unwrap_or_default()
  }

  fn string_value<'a>(
    map: &'a serde_yaml::Mapping,
    key: &str,
  ) -> Option<&'a str> {
    map.get(key).and_then(serde_yaml::Value::as_str)
  }

  #[test]
  fn front_matter_keeps_yaml_keywords_as_strings() {
    let map =
      jekyll_values(&["prog", "1", "2024-01-01", "null", "  My Package"]);
    assert_eq!(string_value(&map, "package"), Some("null"));
    assert_eq!(string_value(&map, "section_text"), Some("  My Package"));
    assert_eq!(string_value(&map, "date"), Some("2024-01-01"));

    let map = jekyll_values(&["prog", "1", "", "yes", "true"]);
    assert_eq!(string_value(&map, "package"), Some("yes"));
    assert_eq!(string_value(&map, "section_text"), Some("true"));
    assert!(!map.contains_key("date"));
  }

  #[test]
  fn front_matter_quotes_yaml_punctuation() {
    let map = jekyll_values(&["prog", "1", "", "a: b", "*star #x"]);
    assert_eq!(string_value(&map, "package"), Some("a: b"));
    assert_eq!(string_value(&map, "section_text"), Some("*star #x"));
  }

  #[test]
  fn empty_front_matter_has_only_delimiters() {
    let info = TitleInfo::default();
    let preamble =
      render_preamble(OutputMode::Jekyll, &info, &PageOptions::default())
        .unwrap_or_default();
    assert_eq!(preamble.head.as_deref(), Some("---\n---"));
  }
}
