use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::utils::compile_static;

/// URL that is never turned into a link, wherever it appears.
pub const EXEMPT_URL: &str = "http://www.w3.org/1999/xhtml";

// Host labels, word-ish path segments and an optional `.html`/`.pdf`/`/`
// ending. Query strings and fragments are not linked.
static URL: LazyLock<Regex> = LazyLock::new(|| {
  compile_static(
    "URL",
    r"https?://[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*(?::[0-9]+)?(?:/[A-Za-z0-9_~%+-]+(?:\.[A-Za-z0-9_~%+-]+)*)*(?:\.html|\.pdf|/)?",
  )
});

/// Whether `url` names the same host and path as [`EXEMPT_URL`], ignoring
/// the scheme and a trailing slash.
fn is_exempt(url: &str) -> bool {
  let host_path = |url: &str| {
    url
      .split_once("://")
      .map(|(_, rest)| rest.trim_end_matches('/').to_ascii_lowercase())
  };
  host_path(url).is_some_and(|found| host_path(EXEMPT_URL) == Some(found))
}

/// Wrap every recognised `http://`/`https://` URL in an anchor to itself.
///
/// Expects text that has already been through
/// [`escape_text`](crate::escape::escape_text), so entity text such as
/// `&gt;` terminates a URL instead of being swallowed by it.
#[must_use]
pub fn link_urls(text: &str) -> String {
  URL
    .replace_all(text, |caps: &Captures| {
      let url = &caps[0];
      if is_exempt(url) {
        return url.to_string();
      }
      format!(
        "<a href=\"{}\">{url}</a>",
        html_escape::encode_double_quoted_attribute(url)
      )
    })
    .into_owned()
}
