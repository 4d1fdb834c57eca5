//! Line classification and request tokenizing.

/// Stand-in for an escaped space while a request line is split into words.
const PROTECTED_SPACE: char = '\u{E000}';

/// A control line split into its request name and argument words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
  pub name: String,
  pub args: Vec<String>,
}

/// What an input line is, as far as the interpreter cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
  /// Empty (or whitespace-only) text line: starts a new paragraph.
  Blank,
  /// Literal text to be expanded.
  Text(&'a str),
  /// A control character with nothing after it.
  EmptyRequest,
  /// `.\"` comment.
  Comment,
  Request(Request),
}

/// Whether the line starts with a control character (`.` or `'`).
#[must_use]
pub fn is_control_line(line: &str) -> bool {
  line.starts_with('.') || line.starts_with('\'')
}

/// Classify a raw input line.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
  if !is_control_line(line) {
    if line.trim().is_empty() {
      return LineKind::Blank;
    }
    return LineKind::Text(line);
  }

  let rest = line[1..].trim_start();
  if rest.is_empty() {
    return LineKind::EmptyRequest;
  }
  if rest.starts_with("\\\"") {
    return LineKind::Comment;
  }

  let mut words = split_words(rest).into_iter();
  match words.next() {
    Some(name) => {
      LineKind::Request(Request {
        name,
        args: words.collect(),
      })
    },
    None => LineKind::EmptyRequest,
  }
}

/// Split request text into words.
///
/// Whitespace separates words, a double quote at the start of a word runs to
/// the next double quote (a doubled quote inside stands for one literal
/// quote), and `\"` outside quotes starts a comment that ends the line. A
/// backslash followed by whitespace protects that space from splitting; it
/// comes back as a plain space.
#[must_use]
pub fn split_words(text: &str) -> Vec<String> {
  let chars: Vec<char> = protect_spaces(text).chars().collect();
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];

    if c == '"' && !in_word {
      let mut quoted = String::new();
      i += 1;
      while i < chars.len() {
        if chars[i] == '"' {
          if chars.get(i + 1) == Some(&'"') {
            quoted.push('"');
            i += 2;
            continue;
          }
          break;
        }
        quoted.push(chars[i]);
        i += 1;
      }
      words.push(quoted);
      i += 1;
      continue;
    }

    if c.is_whitespace() {
      if in_word {
        words.push(std::mem::take(&mut current));
        in_word = false;
      }
      i += 1;
      continue;
    }

    if c == '\\' {
      match chars.get(i + 1) {
        Some('"') => break,
        Some(&next) => {
          current.push(c);
          current.push(next);
          in_word = true;
          i += 2;
          continue;
        },
        None => {},
      }
    }

    current.push(c);
    in_word = true;
    i += 1;
  }

  if in_word {
    words.push(current);
  }

  words
    .into_iter()
    .map(|word| word.replace(PROTECTED_SPACE, " "))
    .collect()
}

fn protect_spaces(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    if c == '\\' {
      match chars.peek() {
        Some(next) if next.is_whitespace() => {
          result.push(PROTECTED_SPACE);
          chars.next();
        },
        Some(&next) => {
          result.push(c);
          result.push(next);
          chars.next();
        },
        None => result.push(c),
      }
    } else {
      result.push(c);
    }
  }

  result
}
