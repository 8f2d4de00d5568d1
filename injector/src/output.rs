use std::str::FromStr;

use anyhow::bail;
use common::{BuildConfig, CargoEnvironment, FlagList, PlatformioFragment, RecordedEnvironment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `-D` flags for PlatformIO dynamic `build_flags`.
    #[default]
    Flags,
    Platformio,
    Json,
    /// Build script directives, see [`CargoEnvironment`].
    Cargo,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flags" => Ok(OutputFormat::Flags),
            "platformio" => Ok(OutputFormat::Platformio),
            "json" => Ok(OutputFormat::Json),
            "cargo" => Ok(OutputFormat::Cargo),
            other => bail!("unknown output '{other}', expected one of: flags, platformio, json, cargo"),
        }
    }
}

impl OutputFormat {
    /// Reads the optional output name from the arguments after the program name.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let format = match args.next() {
            Some(arg) => arg.parse()?,
            None => OutputFormat::default(),
        };

        if let Some(extra) = args.next() {
            bail!("unexpected argument '{extra}', expected at most one output name");
        }

        Ok(format)
    }
}

/// Applies `config` to the environment behind `format` and writes the
/// result to stdout.
pub fn emit(config: &BuildConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Flags => {
            let mut env = FlagList::default();
            config.apply(&mut env);
            print!("{env}");
        }
        OutputFormat::Platformio => {
            let mut env = PlatformioFragment::default();
            config.apply(&mut env);
            print!("{env}");
        }
        OutputFormat::Json => {
            let mut env = RecordedEnvironment::default();
            config.apply(&mut env);
            println!("{}", serde_json::to_string_pretty(&env)?);
        }
        OutputFormat::Cargo => {
            let mut env = CargoEnvironment;
            env.track(common::SETTINGS_FILE);
            config.apply(&mut env);
        }
    }

    Ok(())
}
