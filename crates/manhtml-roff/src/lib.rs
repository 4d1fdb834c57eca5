//! # manhtml-roff
//!
//! Line-oriented interpreter for the subset of the man(7) macro package that
//! manhtml understands, producing HTML.
//!
//! ```rust
//! use manhtml_roff::{OutputMode, RenderOptions, render_document};
//!
//! let options = RenderOptions {
//!   mode: OutputMode::Raw,
//!   ..RenderOptions::default()
//! };
//! let page = ".SH NAME\nprog \\- does things\n";
//! let rendered = render_document(page, "prog.1", options)?;
//!
//! assert!(rendered.html.contains("<h2 id=\"NAME\">"));
//! # Ok::<(), manhtml_roff::RoffError>(())
//! ```
//!
//! Supported requests: `TH`, `SH`, `SS`, `PP`/`P`/`LP`, `IP`, `TP`, `RS`,
//! `RE`, `B`, `I`, `BI`/`IB`/`BR`/`RB`/`IR`/`RI`, `br`, `nf`/`fi`,
//! `EX`/`EE`, `ad`/`na`/`nh`/`hy` (ignored), `de`/`ig` (skipped) and
//! `TS`/`TE` tables. Anything else is reported as a [`Diagnostic`] and
//! skipped.
pub mod dispatch;
pub mod error;
pub mod escape;
pub mod fragments;
pub mod interpreter;
pub mod links;
pub mod modes;
pub mod request;
pub mod source;
pub mod table;
pub mod title;
pub mod utils;

pub use error::{RoffError, RoffResult};
pub use escape::{escape_text, expand_fonts, render_inline};
pub use interpreter::{
  Diagnostic,
  Interpreter,
  RenderOptions,
  Rendered,
  convert,
  render_document,
};
pub use source::LineSource;
pub use title::{OutputMode, PageOptions};
