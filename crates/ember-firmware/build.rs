//! Bakes device settings from `.env` (or the process environment) into the
//! firmware and adds the esp-hal linker script.

use std::env;

/// Settings forwarded to the crate as `env!`/`option_env!` values.
const FORWARDED: &[&str] = &[
    "EMBER_DEVICE_ID",
    "EMBER_WIFI_SSID",
    "EMBER_WIFI_PASSWORD",
    "EMBER_MQTT_SERVER",
    "EMBER_MQTT_PORT",
    "EMBER_LED_PIN",
    "EMBER_LED_ACTIVE_HIGH",
    "EMBER_BUTTON_PIN",
    "EMBER_BUTTON_PULL_UP",
    "EMBER_I2C_SDA",
    "EMBER_I2C_SCL",
    "EMBER_HEARTBEAT",
];

fn main() {
    // a missing .env is fine, everything has a default
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for key in FORWARDED {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
