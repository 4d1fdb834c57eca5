//! Driver for the `manhtml` binary, exposed for integration tests.
pub mod cli;

use std::{
  fs::File,
  io::{self, BufRead, BufWriter, Write},
  path::Path,
};

use color_eyre::eyre::{Context, Result};
use log::{info, warn};
use manhtml_config::Config;
use manhtml_roff::{LineSource, RenderOptions, convert};

/// Convert the configured input to the configured output.
///
/// The output mode is validated and the output file created before the
/// first input line is read.
///
/// # Errors
///
/// Returns an error if the mode is invalid, a file cannot be opened, or
/// reading/writing fails.
pub fn run(input: Option<&Path>, config: &Config) -> Result<()> {
  let options = config
    .render_options()
    .wrap_err("Invalid output configuration")?;

  let mut writer: Box<dyn Write> = match &config.output {
    Some(path) => {
      let file = File::create(path).wrap_err_with(|| {
        format!("Failed to create output file: {}", path.display())
      })?;
      Box::new(BufWriter::new(file))
    },
    None => Box::new(BufWriter::new(io::stdout().lock())),
  };

  match input {
    Some(path) => {
      let file = File::open(path).wrap_err_with(|| {
        format!("Failed to open input file: {}", path.display())
      })?;
      let mut source =
        LineSource::from_reader(file, path.display().to_string());
      render(&mut source, writer.as_mut(), options)?;
    },
    None => {
      let stdin = io::stdin();
      let mut source = LineSource::new(stdin.lock(), "<stdin>");
      render(&mut source, writer.as_mut(), options)?;
    },
  }

  if let Some(path) = &config.output {
    info!("Wrote {}", path.display());
  }

  Ok(())
}

fn render<R: BufRead>(
  source: &mut LineSource<R>,
  writer: &mut dyn Write,
  options: RenderOptions,
) -> Result<()> {
  let diagnostics = convert(source, writer, options)
    .wrap_err_with(|| format!("Failed to convert {}", source.name()))?;

  if !diagnostics.is_empty() {
    warn!(
      "{}: {} request(s) could not be handled",
      source.name(),
      diagnostics.len()
    );
  }

  Ok(())
}
