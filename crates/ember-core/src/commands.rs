//! Inbound LED command topics.

use alloc::format;
use alloc::string::String;

const LED_ON_SUFFIX: &str = "ledOn";
const LED_OFF_SUFFIX: &str = "ledOff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    On,
    Off,
}

impl LedCommand {
    /// Topic that carries this command for `device_id`.
    pub fn topic(self, device_id: &str) -> String {
        let suffix = match self {
            Self::On => LED_ON_SUFFIX,
            Self::Off => LED_OFF_SUFFIX,
        };
        format!("devices/{device_id}/{suffix}")
    }

    /// Match an inbound topic against this device's command topics.
    pub fn parse(topic: &str, device_id: &str) -> Option<Self> {
        let rest = topic.strip_prefix("devices/")?;
        let suffix = rest.strip_prefix(device_id)?.strip_prefix('/')?;
        match suffix {
            LED_ON_SUFFIX => Some(Self::On),
            LED_OFF_SUFFIX => Some(Self::Off),
            _ => None,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_for_device() {
        assert_eq!(LedCommand::On.topic("dev1"), "devices/dev1/ledOn");
        assert_eq!(LedCommand::Off.topic("dev1"), "devices/dev1/ledOff");
    }

    #[test]
    fn parse_accepts_own_topics_only() {
        assert_eq!(
            LedCommand::parse("devices/dev1/ledOn", "dev1"),
            Some(LedCommand::On)
        );
        assert_eq!(
            LedCommand::parse("devices/dev1/ledOff", "dev1"),
            Some(LedCommand::Off)
        );
        assert_eq!(LedCommand::parse("devices/dev2/ledOn", "dev1"), None);
        assert_eq!(LedCommand::parse("devices/dev10/ledOn", "dev1"), None);
        assert_eq!(LedCommand::parse("/devices/dev1/events", "dev1"), None);
        assert_eq!(LedCommand::parse("devices/dev1/ledBlink", "dev1"), None);
    }
}
