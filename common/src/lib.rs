pub mod define;
pub mod environment;
pub mod error;
pub mod injector;
pub mod ota;
pub mod settings;

pub use define::{DefineValue, Definition};
pub use environment::{
    BuildEnvironment, CargoEnvironment, FlagList, PlatformioFragment, RecordedEnvironment,
};
pub use error::{InjectError, ParseErrorKind, SettingsError};
pub use injector::{build_config, load, BuildConfig};
pub use ota::UploadConfig;
pub use settings::Settings;

/// Settings file looked up relative to the directory the build runs in.
pub const SETTINGS_FILE: &'static str = "settings.ini";
pub const SETTINGS_EXAMPLE_FILE: &'static str = "settings.ini.example";

pub const SECTION_MATRIX: &'static str = "Matrix";
pub const SECTION_WIFI: &'static str = "Wifi";
pub const SECTION_OTA: &'static str = "OTA";
pub const SECTION_MQTT: &'static str = "MQTT";
