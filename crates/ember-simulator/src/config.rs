//! Simulator configuration: an optional postcard file plus board defaults.

use std::path::Path;

use ember_core::config::DeviceConfig;
use ember_core::events::MacAddress;
use log::{info, warn};

/// Environment variable naming a postcard config file.
pub const CONFIG_ENV: &str = "EMBER_CONFIG";

/// Pretend station MAC used to expand the device identifier.
pub const SIM_MAC: MacAddress = MacAddress::new([0x02, 0x00, 0x00, 0xE3, 0xB0, 0x01]);

const SIM_LED_PIN: i32 = 2;
const SIM_BUTTON_PIN: i32 = 0;

pub fn load() -> DeviceConfig {
    let mut config = match std::env::var(CONFIG_ENV) {
        Ok(path) => read(Path::new(&path)),
        Err(_) => DeviceConfig::default(),
    };
    apply_board_defaults(&mut config);
    config
}

fn read(path: &Path) -> DeviceConfig {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Cannot read {}: {}, using defaults", path.display(), e);
            return DeviceConfig::default();
        }
    };
    match DeviceConfig::from_bytes(&bytes) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}: {}, using defaults", path.display(), e);
            DeviceConfig::default()
        }
    }
}

/// The simulated board has an LED and a button; fill them in when the
/// loaded config leaves them unfitted, and resolve the identifier template.
pub fn apply_board_defaults(config: &mut DeviceConfig) {
    if config.board.led1.pin < 0 {
        config.board.led1.pin = SIM_LED_PIN;
    }
    if config.board.btn1.pin < 0 {
        config.board.btn1.pin = SIM_BUTTON_PIN;
    }
    if config.device.has_placeholders() {
        config.device.id = config.device.expand(&SIM_MAC);
    }
}

pub fn save(config: &DeviceConfig, path: &Path) {
    let result = config
        .to_bytes()
        .map_err(|e| e.to_string())
        .and_then(|bytes| std::fs::write(path, bytes).map_err(|e| e.to_string()));
    match result {
        Ok(()) => info!("Config written to {}", path.display()),
        Err(e) => warn!("Saving config to {} failed: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_defaults_fill_unfitted_pins() {
        let mut config = DeviceConfig::default();
        apply_board_defaults(&mut config);
        assert_eq!(config.board.led1.pin, SIM_LED_PIN);
        assert_eq!(config.board.btn1.pin, SIM_BUTTON_PIN);
        assert_eq!(config.device.id, "ember_E3B001");
    }

    #[test]
    fn explicit_pins_are_kept() {
        let mut config = DeviceConfig::default();
        config.board.led1.pin = 13;
        config.device.id = String::from("dev1");
        apply_board_defaults(&mut config);
        assert_eq!(config.board.led1.pin, 13);
        assert_eq!(config.device.id, "dev1");
    }
}
