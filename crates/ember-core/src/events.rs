//! Connectivity events delivered by the host and the log lines they produce.

use core::fmt;

use alloc::string::String;
use alloc::vec::Vec;

/// Category of asynchronous notifications a handler can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventGroup {
    /// Generic network connectivity transitions.
    Net,
    /// Station and access-point WiFi transitions.
    Wifi,
    /// MQTT session state and inbound messages.
    Mqtt,
}

/// Opaque value handed to the host at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerContext(pub usize);

impl HandlerContext {
    pub const NONE: Self = Self(0);
}

impl fmt::Display for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// 6-byte hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Hex nibble counted from the least significant end (0 is the low
    /// nibble of the last octet).
    pub fn nibble_from_right(&self, index: usize) -> Option<u8> {
        if index >= self.0.len() * 2 {
            return None;
        }
        let octet = self.0[self.0.len() - 1 - index / 2];
        Some(if index % 2 == 0 { octet & 0x0F } else { octet >> 4 })
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Generic network connectivity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEvent {
    Disconnected,
    Connecting,
    Connected,
    IpAcquired,
    /// Any code this application does not handle.
    Other(u16),
}

impl NetEvent {
    /// Map a host event code onto the known transitions.
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Disconnected,
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::IpAcquired,
            other => Self::Other(other),
        }
    }

    /// Fixed log line for this transition, `None` for unhandled codes.
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Disconnected => Some("Net disconnected"),
            Self::Connecting => Some("Net connecting..."),
            Self::Connected => Some("Net connected"),
            Self::IpAcquired => Some("Net got IP address"),
            Self::Other(_) => None,
        }
    }
}

/// WiFi station and access-point transition.
#[cfg(feature = "wifi")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiEvent {
    StaDisconnected,
    StaConnecting,
    StaConnected,
    StaIpAcquired,
    /// A client joined our access point.
    ApStaConnected(MacAddress),
    /// A client left our access point.
    ApStaDisconnected(MacAddress),
    Other(u16),
}

/// Log line produced for a handled [`WifiEvent`].
#[cfg(feature = "wifi")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiNotice {
    Station {
        transition: &'static str,
        context: HandlerContext,
    },
    AccessPoint {
        transition: &'static str,
        mac: MacAddress,
    },
}

#[cfg(feature = "wifi")]
impl WifiNotice {
    pub fn from_event(event: WifiEvent, context: HandlerContext) -> Option<Self> {
        let station = |transition| {
            Some(Self::Station {
                transition,
                context,
            })
        };
        match event {
            WifiEvent::StaDisconnected => station("disconnected"),
            WifiEvent::StaConnecting => station("connecting"),
            WifiEvent::StaConnected => station("connected"),
            WifiEvent::StaIpAcquired => station("IP acquired"),
            WifiEvent::ApStaConnected(mac) => Some(Self::AccessPoint {
                transition: "connected",
                mac,
            }),
            WifiEvent::ApStaDisconnected(mac) => Some(Self::AccessPoint {
                transition: "disconnected",
                mac,
            }),
            WifiEvent::Other(_) => None,
        }
    }
}

#[cfg(feature = "wifi")]
impl fmt::Display for WifiNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Station {
                transition,
                context,
            } => write!(f, "WiFi STA {transition} {context}"),
            Self::AccessPoint { transition, mac } => {
                write!(f, "WiFi AP STA {transition} MAC {mac}")
            }
        }
    }
}

/// MQTT session notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttEvent {
    Connected,
    Disconnected,
    Message { topic: String, payload: Vec<u8> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    const MAC: MacAddress = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

    #[test]
    fn mac_formats_as_lowercase_octet_pairs() {
        assert_eq!(MAC.to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(
            MacAddress::new([0, 1, 2, 0x0a, 0x10, 0xff]).to_string(),
            "00:01:02:0a:10:ff"
        );
    }

    #[test]
    fn mac_nibbles_count_from_the_end() {
        assert_eq!(MAC.nibble_from_right(0), Some(0xF));
        assert_eq!(MAC.nibble_from_right(1), Some(0xF));
        assert_eq!(MAC.nibble_from_right(2), Some(0xE));
        assert_eq!(MAC.nibble_from_right(11), Some(0xA));
        assert_eq!(MAC.nibble_from_right(12), None);
    }

    #[test]
    fn net_codes_map_to_known_transitions() {
        assert_eq!(NetEvent::from_code(0), NetEvent::Disconnected);
        assert_eq!(NetEvent::from_code(3), NetEvent::IpAcquired);
        assert_eq!(NetEvent::from_code(42), NetEvent::Other(42));
        assert_eq!(NetEvent::Other(42).message(), None);
    }

    #[test]
    fn context_renders_as_hex() {
        assert_eq!(HandlerContext::NONE.to_string(), "0x0");
        assert_eq!(HandlerContext(0x3ffb_0010).to_string(), "0x3ffb0010");
    }

    #[cfg(feature = "wifi")]
    #[test]
    fn access_point_notices_carry_the_mac() {
        let joined =
            WifiNotice::from_event(WifiEvent::ApStaConnected(MAC), HandlerContext::NONE).unwrap();
        let left =
            WifiNotice::from_event(WifiEvent::ApStaDisconnected(MAC), HandlerContext::NONE)
                .unwrap();
        assert_eq!(
            joined.to_string(),
            "WiFi AP STA connected MAC aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(
            left.to_string(),
            "WiFi AP STA disconnected MAC aa:bb:cc:dd:ee:ff"
        );
    }

    #[cfg(feature = "wifi")]
    #[test]
    fn station_notices_include_the_context() {
        let ctx = HandlerContext(0x20);
        let cases = [
            (WifiEvent::StaDisconnected, "WiFi STA disconnected 0x20"),
            (WifiEvent::StaConnecting, "WiFi STA connecting 0x20"),
            (WifiEvent::StaConnected, "WiFi STA connected 0x20"),
            (WifiEvent::StaIpAcquired, "WiFi STA IP acquired 0x20"),
        ];
        for (event, line) in cases {
            assert_eq!(
                WifiNotice::from_event(event, ctx).unwrap().to_string(),
                line
            );
        }
        assert_eq!(WifiNotice::from_event(WifiEvent::Other(9), ctx), None);
    }
}
