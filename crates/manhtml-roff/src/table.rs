//! `TS`/`TE` table blocks.
//!
//! A block is an options/format header terminated by a line ending in `.`,
//! followed by data rows up to `.TE`. Column format codes are parsed and kept
//! on [`TableSpec`], but cells are rendered without per-column alignment.
use std::io::BufRead;

use log::debug;

use crate::{
  error::RoffResult,
  escape::render_inline,
  request::is_control_line,
  source::LineSource,
};

/// Key letters that start a new column in a format row.
const COLUMN_KEYS: &str = "lrcnas^_=";

/// Table header: global options and format rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
  pub centered:  bool,
  pub separator: char,
  /// One entry per format row, each holding one code per column.
  pub formats:   Vec<Vec<String>>,
}

impl Default for TableSpec {
  fn default() -> Self {
    Self {
      centered:  false,
      separator: '\t',
      formats:   Vec::new(),
    }
  }
}

impl TableSpec {
  /// Read the header from `source`, up to and including the format line
  /// that ends with a period.
  ///
  /// End of input also ends the header.
  ///
  /// # Errors
  ///
  /// Returns an error if reading from `source` fails.
  pub fn read<R: BufRead>(source: &mut LineSource<R>) -> RoffResult<Self> {
    let mut spec = Self::default();

    while let Some(line) = source.next_line()? {
      let line = line.trim_end();
      if let Some(options) = line.strip_suffix(';') {
        spec.apply_options(options);
      } else if let Some(format) = line.strip_suffix('.') {
        spec.push_format(format);
        break;
      } else {
        spec.push_format(line);
      }
    }

    Ok(spec)
  }

  /// Apply an options line (without its trailing `;`).
  ///
  /// Recognises `center`/`centre` and `tab(x)`; everything else is accepted
  /// and ignored.
  pub fn apply_options(&mut self, options: &str) {
    let lowered = options.to_ascii_lowercase();

    if lowered
      .split(|c: char| c.is_whitespace() || c == ',')
      .any(|word| word == "center" || word == "centre")
    {
      self.centered = true;
    }

    if let Some(start) = lowered.find("tab(") {
      let mut rest = options[start + 4..].chars();
      if let (Some(sep), Some(')')) = (rest.next(), rest.next()) {
        self.separator = sep;
      }
    }
  }

  /// Add one format row, split into per-column codes.
  pub fn push_format(&mut self, format: &str) {
    let mut columns: Vec<String> = Vec::new();

    for c in format
      .chars()
      .filter(|c| !c.is_whitespace())
      .map(|c| c.to_ascii_lowercase())
    {
      match columns.last_mut() {
        Some(last) if !COLUMN_KEYS.contains(c) => last.push(c),
        _ => columns.push(c.to_string()),
      }
    }

    self.formats.push(columns);
  }

  /// Cell element for the body row at `index`.
  ///
  /// Rows matched with a format row other than the last are header rows;
  /// once the formats run out the last one is reused for data rows.
  #[must_use]
  pub fn cell_tag(&self, index: usize) -> &'static str {
    if index + 1 < self.formats.len() {
      "th"
    } else {
      "td"
    }
  }
}

fn is_table_end(line: &str) -> bool {
  is_control_line(line) && line[1..].trim_start().starts_with("TE")
}

fn is_rule(line: &str) -> bool {
  matches!(line.trim(), "_" | "=")
}

/// Consume a whole table block (after `.TS`) and render it.
///
/// A block that never reaches `.TE` ends at end of input.
///
/// # Errors
///
/// Returns an error if reading from `source` fails.
pub fn read_table<R: BufRead>(source: &mut LineSource<R>) -> RoffResult<String> {
  let spec = TableSpec::read(source)?;
  let mut rows = Vec::new();
  let mut terminated = false;

  while let Some(line) = source.next_line()? {
    if is_table_end(&line) {
      terminated = true;
      break;
    }
    if is_rule(&line) {
      continue;
    }
    if is_control_line(&line) {
      debug!("Skipping request inside table: {line}");
      continue;
    }

    let tag = spec.cell_tag(rows.len());
    let cells: String = line
      .split(spec.separator)
      .map(|cell| format!("<{tag}>{}</{tag}>", render_inline(cell.trim())))
      .collect();
    rows.push(format!("<tr>{cells}</tr>"));
  }

  if !terminated {
    debug!("Table at {} ran to end of input", source.name());
  }
  debug!(
    "Rendered table: {} format row(s), {} body row(s)",
    spec.formats.len(),
    rows.len()
  );

  let open = if spec.centered {
    "<table align=\"center\">"
  } else {
    "<table>"
  };

  let mut html = String::from(open);
  for row in rows {
    html.push('\n');
    html.push_str(&row);
  }
  html.push_str("\n</table>");
  Ok(html)
}
