//! Sinks for a [`BuildConfig`](crate::BuildConfig).
//!
//! A build environment only ever has definitions appended and its upload
//! settings replaced wholesale; nothing is read back.

use std::fmt;
use std::path::Path;

use log::*;
use serde::Serialize;

use crate::define::Definition;
use crate::ota::UploadConfig;

pub trait BuildEnvironment {
    fn append_definitions(&mut self, definitions: &[Definition]);

    fn replace_upload(&mut self, upload: &UploadConfig);
}

/// Keeps whatever was applied to it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedEnvironment {
    pub definitions: Vec<Definition>,
    pub upload: Option<UploadConfig>,
}

impl BuildEnvironment for RecordedEnvironment {
    fn append_definitions(&mut self, definitions: &[Definition]) {
        self.definitions.extend_from_slice(definitions);
    }

    fn replace_upload(&mut self, upload: &UploadConfig) {
        self.upload = Some(upload.clone());
    }
}

/// Compiler flags for PlatformIO's dynamic `build_flags = !command`.
#[derive(Debug, Default, Clone)]
pub struct FlagList {
    pub flags: Vec<String>,
    pub upload: Option<UploadConfig>,
}

impl BuildEnvironment for FlagList {
    fn append_definitions(&mut self, definitions: &[Definition]) {
        self.flags
            .extend(definitions.iter().map(Definition::to_flag));
    }

    fn replace_upload(&mut self, upload: &UploadConfig) {
        // build_flags has no way to carry upload settings, report them on stderr instead
        warn!(
            "set in platformio.ini: upload_protocol = {} | upload_port = {} | upload_flags = {}",
            upload.protocol,
            upload.port,
            upload.flags.join(" ")
        );
        self.upload = Some(upload.clone());
    }
}

impl fmt::Display for FlagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in &self.flags {
            writeln!(f, "{flag}")?;
        }
        Ok(())
    }
}

/// A `platformio.ini` environment fragment.
#[derive(Debug, Default, Clone)]
pub struct PlatformioFragment {
    build_flags: Vec<String>,
    upload: Option<UploadConfig>,
}

impl BuildEnvironment for PlatformioFragment {
    fn append_definitions(&mut self, definitions: &[Definition]) {
        self.build_flags
            .extend(definitions.iter().map(Definition::to_flag));
    }

    fn replace_upload(&mut self, upload: &UploadConfig) {
        self.upload = Some(upload.clone());
    }
}

impl fmt::Display for PlatformioFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.build_flags.is_empty() {
            writeln!(f, "build_flags =")?;
            for flag in &self.build_flags {
                writeln!(f, "    {flag}")?;
            }
        }

        if let Some(upload) = &self.upload {
            writeln!(f, "upload_protocol = {}", upload.protocol)?;
            writeln!(f, "upload_port = {}", upload.port)?;
            writeln!(f, "upload_flags =")?;
            for flag in &upload.flags {
                writeln!(f, "    {flag}")?;
            }
        }

        Ok(())
    }
}

/// Cargo build script output, for firmware crates that read the values back
/// with `env!()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CargoEnvironment;

impl CargoEnvironment {
    /// Rebuild whenever the settings file changes.
    pub fn track(&self, settings: impl AsRef<Path>) {
        embuild::cargo::track_file(settings.as_ref());
    }

    fn set(&self, key: &str, value: &str) {
        if value.contains('\n') {
            warn!("{key} spans several lines, only the first reaches rustc");
        }
        embuild::cargo::set_rustc_env(key, value);
    }
}

impl BuildEnvironment for CargoEnvironment {
    fn append_definitions(&mut self, definitions: &[Definition]) {
        for definition in definitions {
            self.set(definition.name, &definition.value.plain());
        }
    }

    fn replace_upload(&mut self, upload: &UploadConfig) {
        self.set("UPLOAD_PROTOCOL", &upload.protocol);
        self.set("UPLOAD_PORT", &upload.port);
        self.set("UPLOAD_FLAGS", &upload.flags.join(" "));
    }
}
