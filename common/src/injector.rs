use std::path::Path;

use log::*;
use serde::Serialize;

use crate::define::{DefineValue, Definition};
use crate::environment::BuildEnvironment;
use crate::error::{InjectError, SettingsResult};
use crate::ota::{self, UploadConfig};
use crate::settings::Settings;
use crate::{SECTION_MATRIX, SECTION_MQTT, SECTION_OTA, SECTION_WIFI};

/// Everything a settings file contributes to one firmware build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    pub definitions: Vec<Definition>,
    pub upload: UploadConfig,
}

impl BuildConfig {
    #[cfg(test)]
    pub fn definition(&self, name: &str) -> Option<&DefineValue> {
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .map(|d| &d.value)
    }

    pub fn apply<E: BuildEnvironment + ?Sized>(&self, env: &mut E) {
        debug!("appending {} definitions", self.definitions.len());
        env.append_definitions(&self.definitions);

        debug!(
            "replacing upload settings: {} -> {}",
            self.upload.protocol, self.upload.port
        );
        env.replace_upload(&self.upload);
    }
}

/// Reads the settings file at `path`. A missing file is reported separately
/// from unreadable or malformed ones so callers can point at the template.
pub fn load(path: impl AsRef<Path>) -> Result<Settings, InjectError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(InjectError::SettingsNotFound(path.to_path_buf()));
    }

    Ok(Settings::load(path)?)
}

/// Maps a settings document onto definitions and upload settings. Every key
/// is required; the first missing one aborts the whole mapping.
pub fn build_config(settings: &Settings) -> SettingsResult<BuildConfig> {
    let string = |section: &str, key: &str| -> SettingsResult<DefineValue> {
        Ok(DefineValue::string(settings.get(section, key)?))
    };
    let ip = |section: &str, key: &str| -> SettingsResult<DefineValue> {
        Ok(DefineValue::ip_address(settings.get(section, key)?))
    };

    let ota_password = settings.get(SECTION_OTA, "password")?;
    let ota_pass_hash = ota::password_hash(ota_password);

    let definitions = vec![
        Definition::new("WIFI_SSID", string(SECTION_WIFI, "ssid")?),
        Definition::new("WIFI_PASS", string(SECTION_WIFI, "password")?),
        Definition::new("SET_DEBUG", string(SECTION_MATRIX, "set_debug")?),
        Definition::new("SET_STATIC", string(SECTION_WIFI, "set_static")?),
        Definition::new("STA_IP", ip(SECTION_WIFI, "ip")?),
        Definition::new("STA_GATEWAY", ip(SECTION_WIFI, "gateway")?),
        Definition::new("STA_SUBNET", ip(SECTION_WIFI, "subnet")?),
        Definition::new("STA_DNS1", ip(SECTION_WIFI, "dns1")?),
        Definition::new("STA_DNS2", ip(SECTION_WIFI, "dns2")?),
        Definition::new("OTA_PASS_HASH", DefineValue::string(ota_pass_hash)),
        Definition::new("SITEID", string(SECTION_MATRIX, "siteId")?),
        Definition::new("HOSTNAME", string(SECTION_MATRIX, "hostname")?),
        Definition::new("MQTT_IP", ip(SECTION_MQTT, "ip")?),
        Definition::new("MQTT_HOST", string(SECTION_MQTT, "hostname")?),
        Definition::new("MQTT_PORT", string(SECTION_MQTT, "port")?),
        Definition::new("MQTT_USER", string(SECTION_MQTT, "username")?),
        Definition::new("MQTT_PASS", string(SECTION_MQTT, "password")?),
        Definition::new(
            "MQTT_MAX_PACKET_SIZE",
            DefineValue::raw(settings.get(SECTION_MQTT, "maxPacketSize")?),
        ),
    ];

    let upload = UploadConfig::espota(
        settings.get(SECTION_MATRIX, "hostname")?,
        settings.get(SECTION_OTA, "port")?,
        ota_password,
    );

    Ok(BuildConfig {
        definitions,
        upload,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::environment::RecordedEnvironment;
    use crate::error::SettingsError;

    pub(crate) const SAMPLE: &str = "\
[Matrix]
set_debug = true
siteId = lab-3
hostname = matrix-01.local

[Wifi]
ssid = home
password = wifi-pass
set_static = false
ip = 192.168.1.50
gateway = 192.168.1.1
subnet = 255.255.255.0
dns1 = 1.1.1.1
dns2 = 8.8.8.8

[OTA]
port = 3232
password = secret

[MQTT]
ip = 10.0.0.1
hostname = broker.local
port = 1883
username = matrix
password = mqtt-pass
maxPacketSize = 1024
";

    pub(crate) fn sample() -> BuildConfig {
        build_config(&SAMPLE.parse().unwrap()).unwrap()
    }

    #[test]
    fn maps_every_definition_in_order() {
        let config = sample();

        let names: Vec<&str> = config.definitions.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "WIFI_SSID",
                "WIFI_PASS",
                "SET_DEBUG",
                "SET_STATIC",
                "STA_IP",
                "STA_GATEWAY",
                "STA_SUBNET",
                "STA_DNS1",
                "STA_DNS2",
                "OTA_PASS_HASH",
                "SITEID",
                "HOSTNAME",
                "MQTT_IP",
                "MQTT_HOST",
                "MQTT_PORT",
                "MQTT_USER",
                "MQTT_PASS",
                "MQTT_MAX_PACKET_SIZE",
            ]
        );
    }

    #[test]
    fn formats_values_by_kind() {
        let config = sample();
        let rendered = |name: &str| config.definition(name).unwrap().to_string();

        assert_eq!(rendered("WIFI_SSID"), "\"home\"");
        assert_eq!(rendered("SET_DEBUG"), "\"true\"");
        assert_eq!(rendered("STA_IP"), "IPAddress(192,168,1,50)");
        assert_eq!(rendered("STA_SUBNET"), "IPAddress(255,255,255,0)");
        assert_eq!(rendered("MQTT_IP"), "IPAddress(10,0,0,1)");
        assert_eq!(rendered("SITEID"), "\"lab-3\"");
        assert_eq!(rendered("MQTT_PORT"), "\"1883\"");
        assert_eq!(rendered("MQTT_MAX_PACKET_SIZE"), "1024");
    }

    #[test]
    fn embeds_password_hash_not_password() {
        let config = sample();

        assert_eq!(
            config.definition("OTA_PASS_HASH").unwrap().to_string(),
            "\"5ebe2294ecd0e0f08eab7690d2a6ee69\""
        );
        assert!(config
            .definitions
            .iter()
            .all(|d| d.value.plain() != "secret"));
    }

    #[test]
    fn upload_targets_matrix_hostname() {
        let upload = sample().upload;

        assert_eq!(upload.protocol, "espota");
        assert_eq!(upload.port, "matrix-01.local");
        assert_eq!(upload.flags[0], "--port=3232");
        assert_eq!(upload.flags[1], "--auth=secret");
    }

    #[test]
    fn missing_key_aborts() {
        let text = SAMPLE.replace("ssid = home\n", "");
        let err = build_config(&text.parse().unwrap()).unwrap_err();

        assert!(matches!(
            err,
            SettingsError::MissingKey { ref section, ref key } if section == "Wifi" && key == "ssid"
        ));
    }

    #[test]
    fn missing_section_aborts() {
        let text = SAMPLE.replace("[OTA]\nport = 3232\npassword = secret\n", "");
        let err = build_config(&text.parse().unwrap()).unwrap_err();

        assert!(matches!(err, SettingsError::MissingSection(ref name) if name == "OTA"));
    }

    #[test]
    fn apply_appends_and_replaces_once() {
        let config = sample();
        let mut env = RecordedEnvironment::default();

        config.apply(&mut env);

        assert_eq!(env.definitions.len(), 18);
        assert_eq!(env.definitions, config.definitions);
        assert_eq!(env.upload.as_ref(), Some(&config.upload));
    }

    #[test]
    fn load_distinguishes_missing_file() {
        let err = load("no/such/dir/settings.ini").unwrap_err();

        assert!(matches!(err, InjectError::SettingsNotFound(_)));
    }
}
