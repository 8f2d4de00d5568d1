//! Preprocessor definitions handed to the firmware compiler.

use std::fmt;

use log::*;
use serde::{Serialize, Serializer};

/// Constructor the firmware uses for IPv4 addresses.
pub const IP_ADDRESS_CTOR: &'static str = "IPAddress";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineValue {
    StringLiteral(String),
    ConstructorCall {
        callee: &'static str,
        args: Vec<String>,
    },
    RawToken(String),
}

impl DefineValue {
    pub fn string(value: impl Into<String>) -> Self {
        DefineValue::StringLiteral(value.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        DefineValue::RawToken(value.into())
    }

    /// `192.168.1.50` becomes `IPAddress(192,168,1,50)`. Octets are not
    /// checked, anything else is passed through and left for the compiler.
    pub fn ip_address(dotted: &str) -> Self {
        let args: Vec<String> = dotted.split('.').map(str::to_string).collect();

        if args.len() != 4 || args.iter().any(|octet| octet.parse::<u8>().is_err()) {
            warn!("'{dotted}' is not a dotted-quad IPv4 address, passing it through as is");
        }

        DefineValue::ConstructorCall {
            callee: IP_ADDRESS_CTOR,
            args,
        }
    }

    /// Escapes the source form so it survives as one word of a compiler
    /// command line, e.g. `-DWIFI_SSID=\"home\ net\"`.
    pub fn build_flag(&self) -> String {
        let source = self.to_string();
        let mut escaped = String::with_capacity(source.len() + 8);

        for c in source.chars() {
            if matches!(c, '\\' | '"' | '\'' | '(' | ')') || c.is_whitespace() {
                escaped.push('\\');
            }
            escaped.push(c);
        }

        escaped
    }

    /// The value without any C syntax around it.
    pub fn plain(&self) -> String {
        match self {
            DefineValue::StringLiteral(value) | DefineValue::RawToken(value) => value.clone(),
            DefineValue::ConstructorCall { args, .. } => args.join("."),
        }
    }
}

impl fmt::Display for DefineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineValue::StringLiteral(value) => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            DefineValue::ConstructorCall { callee, args } => {
                write!(f, "{callee}({})", args.join(","))
            }
            DefineValue::RawToken(token) => f.write_str(token),
        }
    }
}

impl Serialize for DefineValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub name: &'static str,
    pub value: DefineValue,
}

impl Definition {
    pub fn new(name: &'static str, value: DefineValue) -> Self {
        Definition { name, value }
    }

    /// `-D NAME=VALUE` as a single command line word.
    pub fn to_flag(&self) -> String {
        format!("-D{}={}", self.name, self.value.build_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_address_becomes_constructor_call() {
        assert_eq!(
            DefineValue::ip_address("192.168.1.50").to_string(),
            "IPAddress(192,168,1,50)"
        );
        assert_eq!(DefineValue::ip_address("10.0.0.1").to_string(), "IPAddress(10,0,0,1)");
    }

    #[test]
    fn malformed_ip_is_passed_through() {
        assert_eq!(
            DefineValue::ip_address("300.1.x").to_string(),
            "IPAddress(300,1,x)"
        );
        assert_eq!(DefineValue::ip_address("").to_string(), "IPAddress()");
    }

    #[test]
    fn string_literal_is_quoted_and_escaped() {
        assert_eq!(DefineValue::string("home").to_string(), "\"home\"");
        assert_eq!(
            DefineValue::string(r#"say "hi" \o/"#).to_string(),
            r#""say \"hi\" \\o/""#
        );
    }

    #[test]
    fn raw_token_is_verbatim() {
        assert_eq!(DefineValue::raw("1024").to_string(), "1024");
    }

    #[test]
    fn build_flag_escapes_shell_characters() {
        let ssid = Definition::new("WIFI_SSID", DefineValue::string("home net"));
        assert_eq!(ssid.to_flag(), r#"-DWIFI_SSID=\"home\ net\""#);

        let ip = Definition::new("STA_IP", DefineValue::ip_address("10.0.0.1"));
        assert_eq!(ip.to_flag(), r"-DSTA_IP=IPAddress\(10,0,0,1\)");

        let size = Definition::new("MQTT_MAX_PACKET_SIZE", DefineValue::raw("512"));
        assert_eq!(size.to_flag(), "-DMQTT_MAX_PACKET_SIZE=512");
    }

    #[test]
    fn plain_strips_syntax() {
        assert_eq!(DefineValue::string("home").plain(), "home");
        assert_eq!(DefineValue::ip_address("10.0.0.1").plain(), "10.0.0.1");
        assert_eq!(DefineValue::raw("512").plain(), "512");
    }

    #[test]
    fn serializes_as_source_form() {
        let definition = Definition::new("STA_IP", DefineValue::ip_address("10.0.0.1"));

        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            serde_json::json!({ "name": "STA_IP", "value": "IPAddress(10,0,0,1)" })
        );
    }
}
