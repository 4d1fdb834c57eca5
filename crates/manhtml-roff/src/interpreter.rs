use std::{
  fmt,
  io::{BufRead, Write},
};

use log::{debug, warn};

use crate::{
  dispatch::{Capability, HeadingLevel, RequestKind},
  error::RoffResult,
  escape::{Font, alternate_fonts, render_inline},
  fragments::FragmentRegistry,
  links::link_urls,
  modes::{Mode, ModeStack, Underflow},
  request::{LineKind, Request, classify},
  source::LineSource,
  table::read_table,
  title::{OutputMode, PageOptions, TitleInfo, render_preamble},
};

/// Bullet markers accepted as the first argument of `IP`.
const BULLET_MARKERS: [&str; 3] = ["o", "\\(bu", "\\[bu]"];

/// Settings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
  pub mode: OutputMode,
  pub page: PageOptions,
}

/// A recoverable problem found while converting, tagged with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub source:  String,
  pub line:    usize,
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: {}", self.source, self.line, self.message)
  }
}

/// Per-document interpreter state.
///
/// Feed it one line at a time through [`Interpreter::process_line`]; handlers
/// that need more input read it from the same [`LineSource`]. Call
/// [`Interpreter::finish`] after the last line.
#[derive(Debug)]
pub struct Interpreter {
  options:     RenderOptions,
  modes:       ModeStack,
  fragments:   FragmentRegistry,
  trailer:     Option<String>,
  diagnostics: Vec<Diagnostic>,
}

impl Interpreter {
  #[must_use]
  pub fn new(options: RenderOptions) -> Self {
    Self {
      options,
      modes: ModeStack::new(),
      fragments: FragmentRegistry::new(),
      trailer: None,
      diagnostics: Vec::new(),
    }
  }

  #[must_use]
  pub const fn modes(&self) -> &ModeStack {
    &self.modes
  }

  #[must_use]
  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  #[must_use]
  pub fn into_diagnostics(self) -> Vec<Diagnostic> {
    self.diagnostics
  }

  /// Expand one input line into at most one chunk of output.
  ///
  /// # Errors
  ///
  /// Returns an error if a handler fails to read ahead from `source`.
  pub fn process_line<R: BufRead>(
    &mut self,
    line: &str,
    source: &mut LineSource<R>,
  ) -> RoffResult<Option<String>> {
    match classify(line) {
      LineKind::Blank => Ok(Some(self.paragraph_break())),
      LineKind::Text(text) => Ok(Some(render_text(text))),
      LineKind::EmptyRequest | LineKind::Comment => Ok(None),
      LineKind::Request(request) => self.dispatch(&request, source),
    }
  }

  /// Close any regions still open and return the trailer, if there is
  /// anything to emit.
  pub fn finish(&mut self) -> Option<String> {
    let mut tail = self.modes.close_all();
    if let Some(trailer) = self.trailer.take() {
      if !tail.is_empty() {
        tail.push('\n');
      }
      tail.push_str(&trailer);
    }
    (!tail.is_empty()).then_some(tail)
  }

  fn dispatch<R: BufRead>(
    &mut self,
    request: &Request,
    source: &mut LineSource<R>,
  ) -> RoffResult<Option<String>> {
    let Some(kind) = RequestKind::lookup(&request.name) else {
      self.warn(source, format!("unknown request `.{}`", request.name));
      return Ok(None);
    };

    let start = source.line_number();
    let args = &request.args;

    let output = match kind {
      RequestKind::Title => self.title(args)?,
      RequestKind::Heading(level) => self.heading(level, args, source)?,
      RequestKind::Paragraph => Some(self.paragraph_break()),
      RequestKind::IndentedParagraph => {
        Some(self.indented_paragraph(args, source)?)
      },
      RequestKind::MarginIncrease => {
        self.modes.push();
        None
      },
      RequestKind::MarginDecrease => self.margin_decrease(source),
      RequestKind::Term => Some(self.term(source)?),
      RequestKind::Font(font) => font_request(font, args, source)?,
      RequestKind::AlternatingFont(fonts) => {
        Some(alternate_fonts(fonts, args))
      },
      RequestKind::LineBreak => Some("<br>".to_string()),
      RequestKind::PreformattedStart => Some("<pre>".to_string()),
      RequestKind::PreformattedEnd => Some("</pre>".to_string()),
      RequestKind::Ignored => {
        debug!("Ignoring formatting request .{}", request.name);
        None
      },
      RequestKind::SkipBlock => {
        skip_block(source)?;
        None
      },
      RequestKind::Table => Some(read_table(source)?),
    };

    if kind.capability_with_args(args.len()) == Capability::ConsumesLines {
      debug!(
        ".{} at {}:{start} read {} more line(s)",
        request.name,
        source.name(),
        source.line_number() - start
      );
    }

    Ok(output)
  }

  fn warn<R: BufRead>(&mut self, source: &LineSource<R>, message: String) {
    let diagnostic = Diagnostic {
      source: source.name().to_string(),
      line: source.line_number(),
      message,
    };
    warn!("{diagnostic}");
    self.diagnostics.push(diagnostic);
  }

  fn paragraph_break(&mut self) -> String {
    format!("{}<p>", self.modes.close_region())
  }

  fn title(&mut self, args: &[String]) -> RoffResult<Option<String>> {
    let info = TitleInfo::from_args(args);
    let preamble =
      render_preamble(self.options.mode, &info, &self.options.page)?;
    self.trailer = preamble.trailer;
    Ok(preamble.head)
  }

  fn heading<R: BufRead>(
    &mut self,
    level: HeadingLevel,
    args: &[String],
    source: &mut LineSource<R>,
  ) -> RoffResult<Option<String>> {
    let text = if args.is_empty() {
      match source.next_line()? {
        Some(line) => line,
        None => return Ok(None),
      }
    } else {
      args.join(" ")
    };

    let html = render_inline(&text);
    let id = self.fragments.register(&html).replace('"', "&quot;");
    let close = self.modes.close_region();
    let tag = level.tag();

    Ok(Some(format!(
      "{close}<{tag} id=\"{id}\"><a href=\"#{id}\">{html}</a></{tag}>"
    )))
  }

  fn indented_paragraph<R: BufRead>(
    &mut self,
    args: &[String],
    source: &mut LineSource<R>,
  ) -> RoffResult<String> {
    let is_bullet = args
      .first()
      .is_some_and(|marker| BULLET_MARKERS.contains(&marker.as_str()));
    if !is_bullet {
      return Ok(self.paragraph_break());
    }

    let mut out = self.enter_entry(Mode::BulletList);
    let item = read_entry(source)?;
    out.push_str("<li>");
    out.push_str(&item);
    Ok(out)
  }

  fn term<R: BufRead>(
    &mut self,
    source: &mut LineSource<R>,
  ) -> RoffResult<String> {
    let mut out = self.enter_entry(Mode::DefinitionList);
    let term = read_entry(source)?;
    out.push_str("<dt>");
    out.push_str(&term);
    out.push_str("</dt><dd>");
    Ok(out)
  }

  /// Markup to start a new entry of a list region: the separator when the
  /// region is already open, otherwise whatever closes the current region
  /// followed by the opening tag.
  fn enter_entry(&mut self, mode: Mode) -> String {
    if self.modes.current() == mode {
      return mode.entry_separator().to_string();
    }
    let mut out = self.modes.close_region().to_string();
    out.push_str(mode.open_markup());
    self.modes.set_current(mode);
    out
  }

  fn margin_decrease<R: BufRead>(
    &mut self,
    source: &LineSource<R>,
  ) -> Option<String> {
    let popped = match self.modes.pop() {
      Ok(mode) => mode,
      Err(Underflow { discarded }) => {
        self.warn(source, "`.RE` without a matching `.RS`".to_string());
        discarded
      },
    };
    let close = popped.close_markup();
    (!close.is_empty()).then(|| close.to_string())
  }
}

/// Text line: escapes, fonts, then URL links.
fn render_text(text: &str) -> String {
  link_urls(&render_inline(text))
}

/// `.B text` / `.I text`, or the next line when no text is given.
fn font_request<R: BufRead>(
  font: Font,
  args: &[String],
  source: &mut LineSource<R>,
) -> RoffResult<Option<String>> {
  let text = if args.is_empty() {
    match source.next_line()? {
      Some(line) => line,
      None => return Ok(None),
    }
  } else {
    args.join(" ")
  };
  Ok(Some(font.wrap(&render_inline(&text))))
}

/// Read the line after `TP` or a bullet `IP` and render it.
///
/// Font requests are rendered as such; any other line is expanded as text.
fn read_entry<R: BufRead>(source: &mut LineSource<R>) -> RoffResult<String> {
  let Some(line) = source.next_line()? else {
    return Ok(String::new());
  };

  if let LineKind::Request(request) = classify(&line)
    && let Some(kind) = RequestKind::lookup(&request.name)
    && kind.is_inline_font()
  {
    let rendered = match kind {
      RequestKind::Font(font) => font_request(font, &request.args, source)?,
      RequestKind::AlternatingFont(fonts) => {
        Some(alternate_fonts(fonts, &request.args))
      },
      _ => None,
    };
    return Ok(rendered.unwrap_or_default());
  }

  Ok(render_text(&line))
}

/// Skip a `de`/`ig` body up to and including its `..` terminator.
fn skip_block<R: BufRead>(source: &mut LineSource<R>) -> RoffResult<()> {
  let mut skipped = 0usize;
  while let Some(line) = source.next_line()? {
    if line.starts_with("..") || line.starts_with("''") {
      debug!("Skipped {skipped} line(s) of macro definition");
      return Ok(());
    }
    skipped += 1;
  }
  debug!("Macro definition at {} ran to end of input", source.name());
  Ok(())
}

/// Result of converting a whole in-memory document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
  pub html:        String,
  pub diagnostics: Vec<Diagnostic>,
}

/// Convert every line of `source`, writing output lines to `out`.
///
/// # Errors
///
/// Returns an error if reading the input or writing the output fails.
pub fn convert<R: BufRead, W: Write + ?Sized>(
  source: &mut LineSource<R>,
  out: &mut W,
  options: RenderOptions,
) -> RoffResult<Vec<Diagnostic>> {
  let mut interpreter = Interpreter::new(options);

  while let Some(line) = source.next_line()? {
    if let Some(html) = interpreter.process_line(&line, source)? {
      writeln!(out, "{html}")?;
    }
  }
  if let Some(tail) = interpreter.finish() {
    writeln!(out, "{tail}")?;
  }
  out.flush()?;

  Ok(interpreter.into_diagnostics())
}

/// Convert an in-memory document.
///
/// # Errors
///
/// Only fails on I/O errors, which an in-memory source and sink never raise.
pub fn render_document(
  text: &str,
  name: &str,
  options: RenderOptions,
) -> RoffResult<Rendered> {
  let mut source = LineSource::from_text(text, name);
  let mut out = Vec::new();
  let diagnostics = convert(&mut source, &mut out, options)?;

  Ok(Rendered {
    html: String::from_utf8_lossy(&out).into_owned(),
    diagnostics,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn feed(interpreter: &mut Interpreter, text: &str) -> Vec<String> {
    let mut source = LineSource::from_text(text, "test");
    let mut out = Vec::new();
    while let Ok(Some(line)) = source.next_line() {
      if let Ok(Some(html)) = interpreter.process_line(&line, &mut source) {
        out.push(html);
      }
    }
    out
  }

  #[test]
  fn margin_push_pop_restores_stack() {
    let mut interpreter = Interpreter::new(RenderOptions::default());
    feed(&mut interpreter, ".TP\nterm\nbody\n");
    let before = interpreter.modes().clone();

    let out = feed(&mut interpreter, ".RS\n.RE\n");
    assert!(out.is_empty());
    assert_eq!(interpreter.modes(), &before);
  }

  #[test]
  fn unbalanced_re_is_reported_and_repaired() {
    let mut interpreter = Interpreter::new(RenderOptions::default());
    let out = feed(&mut interpreter, "text\n.RE\nmore\n");

    assert_eq!(out, vec!["text", "more"]);
    assert_eq!(interpreter.modes(), &ModeStack::new());
    assert_eq!(interpreter.diagnostics().len(), 1);
    assert_eq!(interpreter.diagnostics()[0].line, 2);
  }

  #[test]
  fn re_closes_nested_definition_list() {
    let mut interpreter = Interpreter::new(RenderOptions::default());
    let out = feed(&mut interpreter, ".RS\n.TP\nx\ny\n.RE\n");
    assert_eq!(out, vec!["<dl><dt>x</dt><dd>", "y", "</dd></dl>"]);
  }

  #[test]
  fn finish_closes_open_regions_before_trailer() {
    let options = RenderOptions {
      mode: OutputMode::Html,
      page: PageOptions::default(),
    };
    let mut interpreter = Interpreter::new(options);
    feed(&mut interpreter, ".TH x 1\n.TP\nterm\n");
    assert_eq!(
      interpreter.finish().as_deref(),
      Some("</dd></dl>\n</body></html>")
    );
    assert_eq!(interpreter.finish(), None);
  }

  #[test]
  fn unknown_request_warns_with_position() {
    let rendered =
      render_document("one\n.XX arg\n", "page.1", RenderOptions::default());
    let diagnostics = rendered.map(|r| r.diagnostics).unwrap_or_default();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
      diagnostics[0].to_string(),
      "page.1:2: unknown request `.XX`"
    );
  }

  #[test]
  fn term_line_can_be_a_font_request() {
    let mut interpreter = Interpreter::new(RenderOptions::default());
    let out = feed(&mut interpreter, ".TP\n.BR \\-v , \\-\\-verbose\nTalk more.\n");
    assert_eq!(out, vec![
      "<dl><dt><b>-v</b>,<b>--verbose</b></dt><dd>",
      "Talk more."
    ]);
  }

  #[test]
  fn non_bullet_ip_is_a_paragraph() {
    let mut interpreter = Interpreter::new(RenderOptions::default());
    let out = feed(&mut interpreter, ".IP \"tag\" 4\nbody\n");
    assert_eq!(out, vec!["<p>", "body"]);
  }

  #[test]
  fn switching_list_kinds_closes_the_previous_one() {
    let mut interpreter = Interpreter::new(RenderOptions::default());
    let out = feed(&mut interpreter, ".IP o\nitem\n.TP\nterm\n");
    assert_eq!(out, vec!["<ul><li>item", "</li></ul><dl><dt>term</dt><dd>"]);
  }
}
