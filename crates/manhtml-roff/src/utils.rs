use log::error;
use regex::Regex;

/// Returns a regex that never matches anything.
///
/// Fallback for static patterns that fail to compile: a broken pattern means
/// no substitution.
///
/// # Panics
///
/// Panics if neither `[^\s\S]` nor `^\b$` compiles, which cannot happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}

/// Compile one of the crate's static patterns.
///
/// Logs and falls back to [`never_matching_regex`] if `pattern` is invalid.
#[must_use]
pub(crate) fn compile_static(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    error!("Failed to compile {name} regex: {e}");
    never_matching_regex()
  })
}

/// Strip everything that looks like an HTML tag.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut in_tag = false;

  for c in html.chars() {
    match c {
      '<' => in_tag = true,
      '>' if in_tag => in_tag = false,
      _ if !in_tag => out.push(c),
      _ => {},
    }
  }

  out
}
