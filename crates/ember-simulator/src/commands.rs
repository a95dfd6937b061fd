//! Line commands typed into the simulator's stdin.

use std::path::PathBuf;

#[cfg(feature = "wifi")]
use ember_core::events::{MacAddress, WifiEvent};
use ember_core::events::{MqttEvent, NetEvent};
use ember_core::gpio::GpioPin;
use ember_core::router::HostEvent;

pub const HELP: &str = "\
commands:
  b                      press the button
  net <code>             network event (0 down, 1 connecting, 2 up, 3 got IP)
  sta down|connecting|up|ip
  ap+ <mac> / ap- <mac>  client joined / left our access point
  mqtt up|down           broker session state
  msg <topic> [payload]  inbound MQTT message
  save <path>            write the running config as postcard
  q                      quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(HostEvent),
    Save(PathBuf),
    Help,
    Quit,
}

/// Parse one input line. `button` is the pin a press is reported on.
pub fn parse(line: &str, button: GpioPin) -> Option<Command> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let event = match verb {
        "q" | "quit" => return Some(Command::Quit),
        "h" | "help" | "?" => return Some(Command::Help),
        "save" => return words.next().map(|p| Command::Save(PathBuf::from(p))),
        "b" | "button" => HostEvent::Button(button),
        "net" => HostEvent::Net(NetEvent::from_code(words.next()?.parse().ok()?)),
        #[cfg(feature = "wifi")]
        "sta" => HostEvent::Wifi(match words.next()? {
            "down" => WifiEvent::StaDisconnected,
            "connecting" => WifiEvent::StaConnecting,
            "up" => WifiEvent::StaConnected,
            "ip" => WifiEvent::StaIpAcquired,
            _ => return None,
        }),
        #[cfg(feature = "wifi")]
        "ap+" => HostEvent::Wifi(WifiEvent::ApStaConnected(parse_mac(words.next()?)?)),
        #[cfg(feature = "wifi")]
        "ap-" => HostEvent::Wifi(WifiEvent::ApStaDisconnected(parse_mac(words.next()?)?)),
        "mqtt" => HostEvent::Mqtt(match words.next()? {
            "up" => MqttEvent::Connected,
            "down" => MqttEvent::Disconnected,
            _ => return None,
        }),
        "msg" => {
            let topic = words.next()?.to_string();
            let payload = words.collect::<Vec<_>>().join(" ").into_bytes();
            HostEvent::Mqtt(MqttEvent::Message { topic, payload })
        }
        _ => return None,
    };
    Some(Command::Event(event))
}

/// Parse `aa:bb:cc:dd:ee:ff`.
#[cfg(feature = "wifi")]
pub fn parse_mac(text: &str) -> Option<MacAddress> {
    let mut octets = [0u8; 6];
    let mut parts = text.split(':');
    for octet in octets.iter_mut() {
        *octet = u8::from_str_radix(parts.next()?, 16).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(MacAddress::new(octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTN: GpioPin = GpioPin::new(0);

    #[test]
    fn button_and_quit() {
        assert_eq!(
            parse("b", BTN),
            Some(Command::Event(HostEvent::Button(BTN)))
        );
        assert_eq!(parse("  quit ", BTN), Some(Command::Quit));
        assert_eq!(parse("", BTN), None);
        assert_eq!(parse("dance", BTN), None);
    }

    #[test]
    fn net_codes() {
        assert_eq!(
            parse("net 3", BTN),
            Some(Command::Event(HostEvent::Net(NetEvent::IpAcquired)))
        );
        assert_eq!(
            parse("net 9", BTN),
            Some(Command::Event(HostEvent::Net(NetEvent::Other(9))))
        );
        assert_eq!(parse("net x", BTN), None);
    }

    #[cfg(feature = "wifi")]
    #[test]
    fn mac_parsing() {
        assert_eq!(
            parse_mac("aa:bb:cc:dd:ee:ff"),
            Some(MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]))
        );
        assert_eq!(parse_mac("aa:bb:cc"), None);
        assert_eq!(parse_mac("aa:bb:cc:dd:ee:ff:00"), None);
        assert_eq!(parse_mac("zz:bb:cc:dd:ee:ff"), None);
    }

    #[test]
    fn inbound_message_keeps_payload_words() {
        assert_eq!(
            parse("msg devices/dev1/ledOn hello there", BTN),
            Some(Command::Event(HostEvent::Mqtt(MqttEvent::Message {
                topic: "devices/dev1/ledOn".to_string(),
                payload: b"hello there".to_vec(),
            })))
        );
    }

    #[test]
    fn save_needs_a_path() {
        assert_eq!(
            parse("save /tmp/ember.bin", BTN),
            Some(Command::Save(PathBuf::from("/tmp/ember.bin")))
        );
        assert_eq!(parse("save", BTN), None);
    }
}
