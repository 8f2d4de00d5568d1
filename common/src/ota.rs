use md5::{Digest, Md5};
use serde::Serialize;

pub const UPLOAD_PROTOCOL: &'static str = "espota";
pub const UPLOAD_TIMEOUT_SECS: u32 = 30;
pub const FIRMWARE_PATH: &'static str = ".pio/build/esp32dev/firmware.bin";

/// Lowercase hex MD5 of the OTA password. The firmware only ever sees this
/// digest, the plaintext goes to the uploader.
pub fn password_hash(password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadConfig {
    pub protocol: String,
    pub port: String,
    pub flags: Vec<String>,
}

impl UploadConfig {
    /// Over-the-air upload to `hostname` through espota.
    pub fn espota(hostname: &str, ota_port: &str, ota_password: &str) -> Self {
        UploadConfig {
            protocol: UPLOAD_PROTOCOL.to_string(),
            port: hostname.to_string(),
            flags: vec![
                format!("--port={ota_port}"),
                format!("--auth={ota_password}"),
                format!("--timeout={UPLOAD_TIMEOUT_SECS}"),
                format!("--f={FIRMWARE_PATH}"),
            ],
        }
    }
}
