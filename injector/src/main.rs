mod output;

use std::io::IsTerminal;

use common::{InjectError, SETTINGS_EXAMPLE_FILE, SETTINGS_FILE};
use log::*;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // stdout carries the build output, keep logs off it
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let format = OutputFormat::from_args(std::env::args().skip(1))?;

    let settings = match common::load(SETTINGS_FILE) {
        Ok(settings) => settings,
        Err(InjectError::SettingsNotFound(path)) => {
            debug!("{} does not exist", path.display());
            eprintln!();
            eprintln!(
                "Please copy '{SETTINGS_EXAMPLE_FILE}' to '{SETTINGS_FILE}' and set the correct values before building"
            );
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let config = common::build_config(&settings)?;

    info!(
        "injecting {} definitions, uploading to {} via {}",
        config.definitions.len(),
        config.upload.port,
        config.upload.protocol
    );

    output::emit(&config, format)
}
