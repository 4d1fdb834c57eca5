/// Block context a line is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Plain paragraphs.
  Paragraph,
  /// Inside a `<dl>` opened by a `TP` term.
  DefinitionList,
  /// Inside a `<ul>` opened by a bullet `IP`.
  BulletList,
}

impl Mode {
  /// Markup that opens this mode's region.
  #[must_use]
  pub const fn open_markup(self) -> &'static str {
    match self {
      Self::Paragraph => "",
      Self::DefinitionList => "<dl>",
      Self::BulletList => "<ul>",
    }
  }

  /// Markup that closes this mode's region, including the open entry.
  #[must_use]
  pub const fn close_markup(self) -> &'static str {
    match self {
      Self::Paragraph => "",
      Self::DefinitionList => "</dd></dl>",
      Self::BulletList => "</li></ul>",
    }
  }

  /// Markup that closes the current entry before the next one starts.
  #[must_use]
  pub const fn entry_separator(self) -> &'static str {
    match self {
      Self::Paragraph => "",
      Self::DefinitionList => "</dd>",
      Self::BulletList => "</li>",
    }
  }

  #[must_use]
  pub const fn is_list(self) -> bool {
    matches!(self, Self::DefinitionList | Self::BulletList)
  }
}

/// Popping the last entry of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underflow {
  /// Mode that was on the stack when it was reset.
  pub discarded: Mode,
}

/// Stack of nested block contexts; `RS` pushes and `RE` pops.
///
/// Never empty: it starts as `[Paragraph]` and an underflowing pop resets it
/// to that base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack {
  stack: Vec<Mode>,
}

impl Default for ModeStack {
  fn default() -> Self {
    Self {
      stack: vec![Mode::Paragraph],
    }
  }
}

impl ModeStack {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn current(&self) -> Mode {
    self.stack.last().copied().unwrap_or(Mode::Paragraph)
  }

  #[cfg(test)]
  fn depth(&self) -> usize {
    self.stack.len()
  }

  /// Switch the innermost context to `mode`.
  pub fn set_current(&mut self, mode: Mode) {
    match self.stack.last_mut() {
      Some(top) => *top = mode,
      None => self.stack.push(mode),
    }
  }

  /// Close a list region in the innermost context, if one is open.
  ///
  /// Returns the closing markup (empty when already in paragraph mode).
  pub fn close_region(&mut self) -> &'static str {
    let mode = self.current();
    if mode.is_list() {
      self.set_current(Mode::Paragraph);
    }
    mode.close_markup()
  }

  /// Enter a nested context, which always starts in paragraph mode.
  pub fn push(&mut self) {
    self.stack.push(Mode::Paragraph);
  }

  /// Leave the innermost context and return its mode.
  ///
  /// # Errors
  ///
  /// Returns [`Underflow`] when only the base entry is left; the stack is
  /// reset to `[Paragraph]` in that case.
  pub fn pop(&mut self) -> Result<Mode, Underflow> {
    if self.stack.len() > 1 {
      return Ok(self.stack.pop().unwrap_or(Mode::Paragraph));
    }
    let discarded = self.current();
    self.stack = vec![Mode::Paragraph];
    Err(Underflow { discarded })
  }

  /// Close every open list region, innermost first, and reset to the base.
  pub fn close_all(&mut self) -> String {
    let closing = self
      .stack
      .iter()
      .rev()
      .map(|mode| mode.close_markup())
      .collect();
    self.stack = vec![Mode::Paragraph];
    closing
  }
}
