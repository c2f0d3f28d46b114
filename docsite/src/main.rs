use std::io;

use color_eyre::eyre::Result;
use docsite::{cli::Cli, commands};
use log::LevelFilter;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  commands::run(&cli, &mut io::stdout().lock())
}
