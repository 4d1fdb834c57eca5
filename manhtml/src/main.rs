use color_eyre::eyre::Result;
use log::LevelFilter;
use manhtml::cli::Cli;
use manhtml_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so config loading can report what it finds
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Auto)
    .init();

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;
  cli.apply_to(&mut config);

  manhtml::run(cli.input.as_deref(), &config)
}
