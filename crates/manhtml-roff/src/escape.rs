//! Inline escape expansion.
//!
//! Text runs go through a fixed pipeline before they reach the output:
//!
//! 1. zero-width and spacing escapes are resolved (`\&`, `\|`, `\~`, `\e`, ...)
//! 2. the `\-` hyphen is rewritten to the `\(hy` special character
//! 3. ampersands become `&amp;`, except in entities the engine emits
//! 4. special characters (`\(xx`, `\[xx]`) are replaced from [`SPECIAL_CHARS`]
//! 5. named strings (`\*(xx`, `\*x`, `\*[xx]`) are replaced from
//!    [`NAMED_STRINGS`]
//! 6. remaining `<` and `>` become entities
//!
//! Font escapes (`\fB`, `\fI`, `\fR`, `\fP`, ...) are handled afterwards by
//! [`expand_fonts`], so the tags it inserts are never entity-escaped.
use std::{
  collections::{HashMap, HashSet},
  sync::LazyLock,
};

use regex::{Captures, Regex};

use crate::utils::compile_static;

/// Special characters addressed as `\(xx` or `\[xx]`.
pub static SPECIAL_CHARS: LazyLock<HashMap<&'static str, &'static str>> =
  LazyLock::new(|| {
    HashMap::from([
      ("em", "&mdash;"),
      ("en", "&ndash;"),
      ("hy", "-"),
      ("mi", "&minus;"),
      ("lq", "&ldquo;"),
      ("rq", "&rdquo;"),
      ("oq", "&lsquo;"),
      ("cq", "&rsquo;"),
      ("aq", "&#39;"),
      ("dq", "&quot;"),
      ("bu", "&bull;"),
      ("de", "&deg;"),
      ("co", "&copy;"),
      ("rg", "&reg;"),
      ("tm", "&trade;"),
      ("sc", "&sect;"),
      ("ps", "&para;"),
      ("dg", "&dagger;"),
      ("->", "&rarr;"),
      ("<-", "&larr;"),
      ("ua", "&uarr;"),
      ("da", "&darr;"),
      ("<=", "&le;"),
      (">=", "&ge;"),
      ("!=", "&ne;"),
      ("==", "&equiv;"),
      ("+-", "&plusmn;"),
      ("mu", "&times;"),
      ("di", "&divide;"),
      ("12", "&frac12;"),
      ("14", "&frac14;"),
      ("34", "&frac34;"),
      ("ti", "~"),
      ("ha", "^"),
      ("ga", "`"),
      ("rs", "&#92;"),
      ("sl", "/"),
      ("ul", "_"),
      ("br", "|"),
    ])
  });

/// Predefined strings addressed as `\*x`, `\*(xx` or `\*[xx]`.
pub static NAMED_STRINGS: LazyLock<HashMap<&'static str, &'static str>> =
  LazyLock::new(|| {
    HashMap::from([
      ("R", "&reg;"),
      ("Rg", "&reg;"),
      ("Tm", "&trade;"),
      ("lq", "&ldquo;"),
      ("rq", "&rdquo;"),
    ])
  });

/// Entities this module emits itself; any other `&...;` in the input is text.
static OWN_ENTITIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
  SPECIAL_CHARS
    .values()
    .chain(NAMED_STRINGS.values())
    .copied()
    .chain(["&#92;", "&nbsp;", "&lt;", "&gt;", "&amp;"])
    .filter(|glyph| glyph.starts_with('&'))
    .collect()
});

static AMPERSAND: LazyLock<Regex> = LazyLock::new(|| {
  compile_static(
    "AMPERSAND",
    r"&(?:[A-Za-z][A-Za-z0-9]*;|#[0-9]+;|#[xX][0-9A-Fa-f]+;)?",
  )
});

static SPECIAL_CHAR: LazyLock<Regex> = LazyLock::new(|| {
  compile_static("SPECIAL_CHAR", r"\\(?:\(([^\s\\]{2})|\[([^\]\s\\]+)\])")
});

static NAMED_STRING: LazyLock<Regex> = LazyLock::new(|| {
  compile_static(
    "NAMED_STRING",
    r"\\\*(?:\(([^\s\\]{2})|\[([^\]\s\\]+)\]|([^\s\\(\[]))",
  )
});

/// Resolve escapes that do not depend on a lookup table.
fn resolve_simple_escapes(text: &str) -> String {
  let chars: Vec<char> = text.chars().collect();
  let mut result = String::with_capacity(text.len());
  let mut i = 0;

  while i < chars.len() {
    if chars[i] != '\\' || i + 1 == chars.len() {
      result.push(chars[i]);
      i += 1;
      continue;
    }

    match chars[i + 1] {
      // zero-width
      '&' | '%' | ':' | ')' | '|' | '^' => {},
      'e' | '\\' => result.push_str("&#92;"),
      '~' | ' ' => result.push_str("&nbsp;"),
      '-' => result.push_str("\\(hy"),
      other => {
        result.push('\\');
        result.push(other);
      },
    }
    i += 2;
  }

  result
}

/// Escape ampersands, leaving entities produced by this module alone.
fn escape_ampersands(text: &str) -> String {
  AMPERSAND
    .replace_all(text, |caps: &Captures| {
      let entity = &caps[0];
      if OWN_ENTITIES.contains(entity) {
        entity.to_string()
      } else {
        format!("&amp;{}", &entity[1..])
      }
    })
    .into_owned()
}

fn lookup_replace(
  re: &Regex,
  table: &HashMap<&'static str, &'static str>,
  text: &str,
) -> String {
  re.replace_all(text, |caps: &Captures| {
    let code = (1..caps.len())
      .find_map(|group| caps.get(group))
      .map_or("", |m| m.as_str());

    table.get(code).map_or_else(
      || {
        log::debug!("Leaving unknown escape `{}` as-is", &caps[0]);
        caps[0].to_string()
      },
      |glyph| (*glyph).to_string(),
    )
  })
  .into_owned()
}

/// Run the table-driven escape pipeline (steps 1 to 6) over a text run.
///
/// The output contains no markup of its own, only entities, so it is safe to
/// feed back in: already-expanded text comes out unchanged.
#[must_use]
pub fn escape_text(text: &str) -> String {
  let resolved = resolve_simple_escapes(text);
  let amp_escaped = escape_ampersands(&resolved);
  let specials = lookup_replace(&SPECIAL_CHAR, &SPECIAL_CHARS, &amp_escaped);
  let strings = lookup_replace(&NAMED_STRING, &NAMED_STRINGS, &specials);

  strings.replace('<', "&lt;").replace('>', "&gt;")
}

/// A font selectable through `\f` escapes and font requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
  Roman,
  Bold,
  Italic,
  BoldItalic,
  Mono,
}

impl Font {
  /// Map a troff font name (or position number) to a [`Font`].
  ///
  /// `P` (previous) is treated as a return to roman; unknown names also fall
  /// back to roman.
  #[must_use]
  pub fn from_name(name: &str) -> Self {
    match name {
      "B" | "3" => Self::Bold,
      "I" | "2" => Self::Italic,
      "BI" | "4" => Self::BoldItalic,
      "C" | "CW" | "CR" | "CB" => Self::Mono,
      _ => Self::Roman,
    }
  }

  /// The request letter used by the alternating font requests.
  #[must_use]
  pub const fn from_letter(letter: char) -> Self {
    match letter {
      'B' => Self::Bold,
      'I' => Self::Italic,
      _ => Self::Roman,
    }
  }

  const fn open_tag(self) -> &'static str {
    match self {
      Self::Roman => "",
      Self::Bold => "<b>",
      Self::Italic => "<em>",
      Self::BoldItalic => "<b><em>",
      Self::Mono => "<code>",
    }
  }

  const fn close_tag(self) -> &'static str {
    match self {
      Self::Roman => "",
      Self::Bold => "</b>",
      Self::Italic => "</em>",
      Self::BoldItalic => "</em></b>",
      Self::Mono => "</code>",
    }
  }

  /// Wrap already-rendered HTML in this font's element.
  #[must_use]
  pub fn wrap(self, html: &str) -> String {
    if html.is_empty() {
      return String::new();
    }
    format!("{}{html}{}", self.open_tag(), self.close_tag())
  }
}

/// Read the font name following `\f` at `chars[start]`.
///
/// Returns the name and the index just past it.
fn read_font_name(chars: &[char], start: usize) -> Option<(String, usize)> {
  match chars.get(start)? {
    '(' => {
      let name: String = chars.get(start + 1..start + 3)?.iter().collect();
      Some((name, start + 3))
    },
    '[' => {
      let len = chars[start + 1..].iter().position(|&c| c == ']')?;
      let name: String = chars[start + 1..start + 1 + len].iter().collect();
      Some((name, start + len + 2))
    },
    c => Some((c.to_string(), start + 1)),
  }
}

/// Replace `\f` font escapes with HTML elements.
///
/// A font stays in effect until the next `\f` escape; switching directly from
/// one font to another closes the first span. Empty spans produce no markup
/// and any span still open at the end of the run is closed.
#[must_use]
pub fn expand_fonts(text: &str) -> String {
  let chars: Vec<char> = text.chars().collect();
  let mut result = String::with_capacity(text.len() + 16);
  let mut current = Font::Roman;
  let mut opened = false;
  let mut i = 0;

  while i < chars.len() {
    if chars[i] == '\\'
      && chars.get(i + 1) == Some(&'f')
      && let Some((name, next)) = read_font_name(&chars, i + 2)
    {
      if opened {
        result.push_str(current.close_tag());
        opened = false;
      }
      current = Font::from_name(&name);
      i = next;
      continue;
    }

    if !opened && current != Font::Roman {
      result.push_str(current.open_tag());
      opened = true;
    }
    result.push(chars[i]);
    i += 1;
  }

  if opened {
    result.push_str(current.close_tag());
  }

  result
}

/// Full inline rendering without URL linking: escapes, then fonts.
#[must_use]
pub fn render_inline(text: &str) -> String {
  expand_fonts(&escape_text(text))
}

/// Render arguments of an alternating font request (`.BR`, `.IB`, ...).
///
/// Arguments take the two fonts in turn and are joined without spaces.
#[must_use]
pub fn alternate_fonts(fonts: [Font; 2], args: &[String]) -> String {
  args
    .iter()
    .enumerate()
    .map(|(i, arg)| fonts[i % 2].wrap(&render_inline(arg)))
    .collect()
}
