//! Persisted device configuration.
//!
//! The configuration is a plain serde tree stored as a postcard blob. Hosts
//! load it once at boot and hand it to [`crate::router::App::init`]; nothing
//! mutates it afterwards.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::events::MacAddress;

/// Default identifier template, expanded with the station MAC at boot.
pub const DEFAULT_DEVICE_ID: &str = "ember_??????";

/// Character in an identifier template replaced by a MAC nibble.
const MAC_PLACEHOLDER: char = '?';

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config decode failed: {0}")]
    Decode(postcard::Error),
    #[error("config encode failed: {0}")]
    Encode(postcard::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceConfig {
    pub device: DeviceIdentity,
    pub board: BoardConfig,
    pub wifi: InternetConfig,
    pub mqtt: MqttConfig,
    pub display: DisplayConfig,
    pub heartbeat: HeartbeatConfig,
}

impl DeviceConfig {
    /// Decode a configuration previously written by [`DeviceConfig::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(ConfigError::Decode)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(ConfigError::Encode)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Unique identifier; `?` characters are placeholders for MAC digits.
    pub id: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            id: String::from(DEFAULT_DEVICE_ID),
        }
    }
}

impl DeviceIdentity {
    /// Replace every `?` in the identifier with upper-case hex digits of the
    /// MAC address, filling from the right so the last placeholder receives
    /// the last nibble.
    pub fn expand(&self, mac: &MacAddress) -> String {
        let placeholders = self.id.chars().filter(|c| *c == MAC_PLACEHOLDER).count();
        let mut seen = 0;
        self.id
            .chars()
            .map(|c| {
                if c != MAC_PLACEHOLDER {
                    return c;
                }
                let from_right = placeholders - 1 - seen;
                seen += 1;
                mac.nibble_from_right(from_right)
                    .and_then(|n| char::from_digit(n as u32, 16))
                    .map(|d| d.to_ascii_uppercase())
                    .unwrap_or('0')
            })
            .collect()
    }

    pub fn has_placeholders(&self) -> bool {
        self.id.contains(MAC_PLACEHOLDER)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardConfig {
    pub led1: LedConfig,
    pub btn1: ButtonConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedConfig {
    /// GPIO number, or a negative value when no LED is fitted.
    pub pin: i32,
    pub active_high: bool,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            pin: -1,
            active_high: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig {
    /// GPIO number, or a negative value when no button is fitted.
    pub pin: i32,
    pub pull_up: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            pin: -1,
            pull_up: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct InternetConfig {
    pub ssid: String,
    pub password: String,
}

impl InternetConfig {
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    /// Broker host name or dotted IPv4 address. Empty disables MQTT.
    pub server: String,
    pub port: u16,
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: 1883,
            keep_alive_secs: 60,
        }
    }
}

impl MqttConfig {
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub enabled: bool,
    /// 7-bit I2C address of the panel.
    pub address: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: 0x3C,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub enabled: bool,
    pub period_ms: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_board_unfitted() {
        let config = DeviceConfig::default();
        assert_eq!(config.board.led1.pin, -1);
        assert_eq!(config.board.btn1.pin, -1);
        assert!(!config.heartbeat.enabled);
        assert!(!config.mqtt.is_configured());
        assert!(!config.wifi.is_configured());
        assert_eq!(config.display.address, 0x3C);
    }

    #[test]
    fn postcard_round_trip_preserves_fields() {
        let mut config = DeviceConfig::default();
        config.device.id = String::from("dev1");
        config.board.led1 = LedConfig {
            pin: 2,
            active_high: false,
        };
        config.mqtt.server = String::from("broker.local");
        config.heartbeat.enabled = true;

        let bytes = config.to_bytes().unwrap();
        let decoded = DeviceConfig::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let bytes = DeviceConfig::default().to_bytes().unwrap();
        let err = DeviceConfig::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }

    #[test]
    fn placeholders_take_trailing_mac_nibbles() {
        let identity = DeviceIdentity::default();
        let mac = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert!(identity.has_placeholders());
        assert_eq!(identity.expand(&mac), "ember_DDEEFF");
    }

    #[test]
    fn identifier_without_placeholders_is_unchanged() {
        let identity = DeviceIdentity {
            id: String::from("dev1"),
        };
        let mac = MacAddress::new([1, 2, 3, 4, 5, 6]);
        assert_eq!(identity.expand(&mac), "dev1");
    }

    #[test]
    fn more_placeholders_than_nibbles_pad_with_zero() {
        let identity = DeviceIdentity {
            id: String::from("??????????????"),
        };
        let mac = MacAddress::new([0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);
        assert_eq!(identity.expand(&mac), "00123456789ABC");
    }
}
