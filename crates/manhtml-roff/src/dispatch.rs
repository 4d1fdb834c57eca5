use crate::escape::Font;

/// Heading depth of `SH` and `SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
  Section,
  Subsection,
}

impl HeadingLevel {
  #[must_use]
  pub const fn tag(self) -> &'static str {
    match self {
      Self::Section => "h2",
      Self::Subsection => "h3",
    }
  }
}

/// How a request handler interacts with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
  /// Output depends only on the request's own arguments and interpreter
  /// state.
  Pure,
  /// May pull further lines from the line source.
  ConsumesLines,
}

/// Every request the interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
  /// `TH`
  Title,
  /// `SH`, `SS`
  Heading(HeadingLevel),
  /// `PP`, `P`, `LP`
  Paragraph,
  /// `IP`
  IndentedParagraph,
  /// `RS`
  MarginIncrease,
  /// `RE`
  MarginDecrease,
  /// `TP`
  Term,
  /// `B`, `I`
  Font(Font),
  /// `BI`, `IB`, `BR`, `RB`, `IR`, `RI`
  AlternatingFont([Font; 2]),
  /// `br`
  LineBreak,
  /// `nf`, `EX`
  PreformattedStart,
  /// `fi`, `EE`
  PreformattedEnd,
  /// `ad`, `na`, `nh`, `hy`
  Ignored,
  /// `de`, `ig`: skipped up to a line starting with `..`
  SkipBlock,
  /// `TS` ... `TE`
  Table,
}

impl RequestKind {
  /// Find the handler for a request name.
  #[must_use]
  pub fn lookup(name: &str) -> Option<Self> {
    let kind = match name {
      "TH" => Self::Title,
      "SH" => Self::Heading(HeadingLevel::Section),
      "SS" => Self::Heading(HeadingLevel::Subsection),
      "PP" | "P" | "LP" => Self::Paragraph,
      "IP" => Self::IndentedParagraph,
      "RS" => Self::MarginIncrease,
      "RE" => Self::MarginDecrease,
      "TP" => Self::Term,
      "B" => Self::Font(Font::Bold),
      "I" => Self::Font(Font::Italic),
      "BI" | "IB" | "BR" | "RB" | "IR" | "RI" => {
        let mut letters = name.chars().map(Font::from_letter);
        let first = letters.next()?;
        let second = letters.next()?;
        Self::AlternatingFont([first, second])
      },
      "br" => Self::LineBreak,
      "nf" | "EX" => Self::PreformattedStart,
      "fi" | "EE" => Self::PreformattedEnd,
      "ad" | "na" | "nh" | "hy" => Self::Ignored,
      "de" | "ig" => Self::SkipBlock,
      "TS" => Self::Table,
      _ => return None,
    };
    Some(kind)
  }

  /// Whether the handler for this request reads ahead in the input.
  ///
  /// `SH`, `SS`, `B` and `I` only read ahead when they have no arguments,
  /// which [`Self::capability_with_args`] accounts for.
  #[must_use]
  pub const fn capability(self) -> Capability {
    match self {
      Self::Heading(_)
      | Self::Font(_)
      | Self::IndentedParagraph
      | Self::Term
      | Self::SkipBlock
      | Self::Table => Capability::ConsumesLines,
      Self::Title
      | Self::Paragraph
      | Self::MarginIncrease
      | Self::MarginDecrease
      | Self::AlternatingFont(_)
      | Self::LineBreak
      | Self::PreformattedStart
      | Self::PreformattedEnd
      | Self::Ignored => Capability::Pure,
    }
  }

  /// [`Self::capability`] refined by the actual argument count.
  #[must_use]
  pub const fn capability_with_args(self, arg_count: usize) -> Capability {
    match self {
      Self::Heading(_) | Self::Font(_) if arg_count > 0 => Capability::Pure,
      _ => self.capability(),
    }
  }

  /// Font requests can stand in for the text of a term or list item.
  #[must_use]
  pub const fn is_inline_font(self) -> bool {
    matches!(self, Self::Font(_) | Self::AlternatingFont(_))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_requests() {
    assert_eq!(RequestKind::lookup("TH"), Some(RequestKind::Title));
    assert_eq!(RequestKind::lookup("P"), Some(RequestKind::Paragraph));
    assert_eq!(RequestKind::lookup("PP"), Some(RequestKind::Paragraph));
    assert_eq!(
      RequestKind::lookup("SS"),
      Some(RequestKind::Heading(HeadingLevel::Subsection))
    );
    assert_eq!(RequestKind::lookup("ig"), Some(RequestKind::SkipBlock));
  }

  #[test]
  fn alternating_fonts_follow_the_name() {
    assert_eq!(
      RequestKind::lookup("BR"),
      Some(RequestKind::AlternatingFont([Font::Bold, Font::Roman]))
    );
    assert_eq!(
      RequestKind::lookup("IB"),
      Some(RequestKind::AlternatingFont([Font::Italic, Font::Bold]))
    );
  }

  #[test]
  fn unknown_requests() {
    assert_eq!(RequestKind::lookup("XY"), None);
    assert_eq!(RequestKind::lookup("th"), None);
  }

  #[test]
  fn capabilities() {
    assert_eq!(RequestKind::Table.capability(), Capability::ConsumesLines);
    assert_eq!(RequestKind::LineBreak.capability(), Capability::Pure);
    assert_eq!(
      RequestKind::Font(Font::Bold).capability_with_args(0),
      Capability::ConsumesLines
    );
    assert_eq!(
      RequestKind::Font(Font::Bold).capability_with_args(2),
      Capability::Pure
    );
  }
}
