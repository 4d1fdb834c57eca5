use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::utils::{compile_static, strip_tags};

static WHITESPACE_RUN: LazyLock<Regex> =
  LazyLock::new(|| compile_static("WHITESPACE_RUN", r"\s+"));

/// Anchor identifiers handed out so far in one document.
#[derive(Debug, Default)]
pub struct FragmentRegistry {
  issued: HashSet<String>,
}

impl FragmentRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Derive a unique anchor identifier from rendered heading HTML.
  ///
  /// Markup is stripped and whitespace runs become underscores. The first
  /// repeat of an identifier gets `_1`, the next `_2`, and so on.
  pub fn register(&mut self, heading_html: &str) -> String {
    let text = strip_tags(heading_html);
    let base = WHITESPACE_RUN.replace_all(text.trim(), "_").into_owned();

    if self.issued.insert(base.clone()) {
      return base;
    }

    let mut suffix = 1usize;
    loop {
      let candidate = format!("{base}_{suffix}");
      if self.issued.insert(candidate.clone()) {
        return candidate;
      }
      suffix += 1;
    }
  }

  #[cfg(test)]
  fn contains(&self, id: &str) -> bool {
    self.issued.contains(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_markup_and_underscores_whitespace() {
    let mut registry = FragmentRegistry::new();
    assert_eq!(
      registry.register("<b>EXIT</b>   STATUS"),
      "EXIT_STATUS"
    );
  }

  #[test]
  fn duplicates_get_numeric_suffixes() {
    let mut registry = FragmentRegistry::new();
    assert_eq!(registry.register("OPTIONS"), "OPTIONS");
    assert_eq!(registry.register("OPTIONS"), "OPTIONS_1");
    assert_eq!(registry.register("OPTIONS"), "OPTIONS_2");
    assert!(registry.contains("OPTIONS_1"));
  }

  #[test]
  fn suffix_skips_ids_already_taken() {
    let mut registry = FragmentRegistry::new();
    registry.register("A_1");
    assert_eq!(registry.register("A"), "A");
    assert_eq!(registry.register("A"), "A_2");
  }
}
