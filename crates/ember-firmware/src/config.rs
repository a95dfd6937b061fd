//! Device configuration baked in at build time.
//!
//! `build.rs` forwards `EMBER_*` variables from `.env`; anything unset
//! falls back to the ESP32-S3 DevKit wiring below.

use alloc::string::String;

use ember_core::config::{DeviceConfig, DeviceIdentity, InternetConfig};
use ember_core::events::MacAddress;

const DEFAULT_LED_PIN: i32 = 2;
const DEFAULT_BUTTON_PIN: i32 = 0;
pub const DEFAULT_I2C_SDA: u8 = 8;
pub const DEFAULT_I2C_SCL: u8 = 9;

fn parse_or<T: core::str::FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn flag_or(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// I2C pins the display hangs off, as (SDA, SCL).
pub fn i2c_pins() -> (u8, u8) {
    (
        parse_or(option_env!("EMBER_I2C_SDA"), DEFAULT_I2C_SDA),
        parse_or(option_env!("EMBER_I2C_SCL"), DEFAULT_I2C_SCL),
    )
}

/// Assemble the configuration and resolve the identifier against `mac`.
pub fn load(mac: MacAddress) -> DeviceConfig {
    let mut config = DeviceConfig::default();

    if let Some(id) = option_env!("EMBER_DEVICE_ID") {
        config.device = DeviceIdentity {
            id: String::from(id),
        };
    }
    config.device.id = config.device.expand(&mac);

    config.wifi = InternetConfig {
        ssid: String::from(option_env!("EMBER_WIFI_SSID").unwrap_or_default()),
        password: String::from(option_env!("EMBER_WIFI_PASSWORD").unwrap_or_default()),
    };

    if let Some(server) = option_env!("EMBER_MQTT_SERVER") {
        config.mqtt.server = String::from(server);
    }
    config.mqtt.port = parse_or(option_env!("EMBER_MQTT_PORT"), config.mqtt.port);

    config.board.led1.pin = parse_or(option_env!("EMBER_LED_PIN"), DEFAULT_LED_PIN);
    config.board.led1.active_high = flag_or(option_env!("EMBER_LED_ACTIVE_HIGH"), true);
    config.board.btn1.pin = parse_or(option_env!("EMBER_BUTTON_PIN"), DEFAULT_BUTTON_PIN);
    config.board.btn1.pull_up = flag_or(option_env!("EMBER_BUTTON_PULL_UP"), true);

    config.heartbeat.enabled = flag_or(option_env!("EMBER_HEARTBEAT"), false);

    config
}
