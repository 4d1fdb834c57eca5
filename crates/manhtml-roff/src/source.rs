use std::io::{BufRead, BufReader, Cursor, Read};

use crate::error::RoffResult;

/// Forward-only cursor over the input lines of one document.
///
/// The interpreter owns the source and lends it to request handlers that
/// need to read ahead (definition terms, list items, table bodies, macro
/// definitions). The line counter always refers to the last line returned.
#[derive(Debug)]
pub struct LineSource<R> {
  reader: R,
  name:   String,
  line:   usize,
  buffer: String,
}

impl<R: BufRead> LineSource<R> {
  pub fn new(reader: R, name: impl Into<String>) -> Self {
    Self {
      reader,
      name: name.into(),
      line: 0,
      buffer: String::new(),
    }
  }

  /// Read the next line without its terminator, or `None` at end of input.
  ///
  /// # Errors
  ///
  /// Returns an error if the underlying reader fails.
  pub fn next_line(&mut self) -> RoffResult<Option<String>> {
    self.buffer.clear();
    if self.reader.read_line(&mut self.buffer)? == 0 {
      return Ok(None);
    }
    self.line += 1;

    let trimmed = self
      .buffer
      .strip_suffix('\n')
      .unwrap_or(&self.buffer);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(Some(trimmed.to_string()))
  }

  /// Name used for this source in diagnostics.
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// 1-based number of the last line read (0 before the first read).
  #[must_use]
  pub const fn line_number(&self) -> usize {
    self.line
  }
}

impl<R: Read> LineSource<BufReader<R>> {
  /// Wrap an unbuffered reader.
  pub fn from_reader(reader: R, name: impl Into<String>) -> Self {
    Self::new(BufReader::new(reader), name)
  }
}

impl LineSource<Cursor<Vec<u8>>> {
  /// Source over an in-memory document.
  #[must_use]
  pub fn from_text(text: &str, name: impl Into<String>) -> Self {
    Self::new(Cursor::new(text.as_bytes().to_vec()), name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_lines_and_counts() {
    let mut source = LineSource::from_text("one\r\ntwo\n\nfour", "doc.1");
    assert_eq!(source.line_number(), 0);
    assert_eq!(source.next_line().ok().flatten().as_deref(), Some("one"));
    assert_eq!(source.next_line().ok().flatten().as_deref(), Some("two"));
    assert_eq!(source.next_line().ok().flatten().as_deref(), Some(""));
    assert_eq!(source.next_line().ok().flatten().as_deref(), Some("four"));
    assert_eq!(source.line_number(), 4);
    assert!(matches!(source.next_line(), Ok(None)));
    assert_eq!(source.line_number(), 4);
    assert_eq!(source.name(), "doc.1");
  }
}
