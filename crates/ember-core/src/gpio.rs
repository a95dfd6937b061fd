//! Pin identities and the rules that turn board configuration into
//! output and button setups.

use core::fmt;

use crate::config::{ButtonConfig, LedConfig};

/// Debounce window applied to the user button, in milliseconds.
pub const BUTTON_DEBOUNCE_MS: u16 = 20;

/// A GPIO number that is known to be fitted on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioPin(u8);

impl GpioPin {
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// Interpret a configured pin number. Negative values mean "not fitted".
    pub fn from_config(raw: i32) -> Option<Self> {
        u8::try_from(raw).ok().map(Self)
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for GpioPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Electrical level of an output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Internal resistor used to bias the button input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    Up,
    Down,
}

/// Edge on which the button interrupt fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// A fitted LED and the polarity that lights it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedSpec {
    pub pin: GpioPin,
    pub active_high: bool,
}

impl LedSpec {
    pub fn from_config(config: &LedConfig) -> Option<Self> {
        GpioPin::from_config(config.pin).map(|pin| Self {
            pin,
            active_high: config.active_high,
        })
    }

    /// Level that drives the LED to the requested logical state.
    pub fn level(&self, on: bool) -> Level {
        Level::from(on == self.active_high)
    }
}

/// Everything the host needs to arm a debounced button interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSpec {
    pub pin: GpioPin,
    pub pull: Pull,
    pub edge: Edge,
    pub debounce_ms: u16,
}

impl ButtonSpec {
    /// A pulled-up button is active low and fires on the falling edge;
    /// a pulled-down one is active high and fires on the rising edge.
    pub fn from_config(config: &ButtonConfig) -> Option<Self> {
        let pin = GpioPin::from_config(config.pin)?;
        let (pull, edge) = if config.pull_up {
            (Pull::Up, Edge::Falling)
        } else {
            (Pull::Down, Edge::Rising)
        };
        Some(Self {
            pin,
            pull,
            edge,
            debounce_ms: BUTTON_DEBOUNCE_MS,
        })
    }

    /// Label used in the bring-up log line.
    pub fn active_label(&self) -> &'static str {
        match self.pull {
            Pull::Up => "low",
            Pull::Down => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_pin_is_not_fitted() {
        assert_eq!(GpioPin::from_config(-1), None);
        assert_eq!(GpioPin::from_config(300), None);
        assert_eq!(GpioPin::from_config(5), Some(GpioPin::new(5)));
    }

    #[test]
    fn pull_up_button_is_active_low() {
        let spec = ButtonSpec::from_config(&ButtonConfig {
            pin: 0,
            pull_up: true,
        })
        .unwrap();
        assert_eq!(spec.pull, Pull::Up);
        assert_eq!(spec.edge, Edge::Falling);
        assert_eq!(spec.debounce_ms, 20);
        assert_eq!(spec.active_label(), "low");
    }

    #[test]
    fn pull_down_button_is_active_high() {
        let spec = ButtonSpec::from_config(&ButtonConfig {
            pin: 4,
            pull_up: false,
        })
        .unwrap();
        assert_eq!(spec.pull, Pull::Down);
        assert_eq!(spec.edge, Edge::Rising);
        assert_eq!(spec.active_label(), "high");
    }

    #[test]
    fn led_level_follows_polarity() {
        let high = LedSpec {
            pin: GpioPin::new(2),
            active_high: true,
        };
        let low = LedSpec {
            pin: GpioPin::new(2),
            active_high: false,
        };
        assert_eq!(high.level(true), Level::High);
        assert_eq!(high.level(false), Level::Low);
        assert_eq!(low.level(true), Level::Low);
        assert_eq!(low.level(false), Level::High);
    }
}
