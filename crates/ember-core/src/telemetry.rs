//! Outbound telemetry: the button-press event publish, the periodic device
//! state report and the heartbeat log line.

use core::fmt;

use alloc::format;
use alloc::string::String;

use embassy_time::Duration;

/// Topic the button-press event is published on.
pub fn event_topic(device_id: &str) -> String {
    format!("/devices/{device_id}/events")
}

/// Heap snapshot sent with each button press.
///
/// The keys are deliberately unquoted; consumers of this topic parse the
/// exact `{total_ram: N, free_ram: M}` shape.
pub fn heap_payload(total: usize, free: usize) -> String {
    format!("{{total_ram: {total}, free_ram: {free}}}")
}

/// Topic the device state is reported on.
pub fn state_topic(device_id: &str) -> String {
    format!("devices/{device_id}/state")
}

/// One-off report sent when the broker session comes up.
pub fn ram_total_payload(total: usize) -> String {
    format!("{{\"ram_total\":{total}}}")
}

/// Snapshot of the device state, published as JSON while online.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateReport {
    pub on: bool,
    pub btn_count: u32,
    pub uptime: Duration,
    pub ram_free: usize,
}

impl fmt::Display for StateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.uptime.as_millis();
        write!(
            f,
            "{{\"on\":{},\"btnCount\":{},\"uptime\":{}.{:02},\"ram_free\":{}}}",
            self.on,
            self.btn_count,
            millis / 1000,
            (millis % 1000) / 10,
            self.ram_free
        )
    }
}

/// Result of a best-effort publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Failed,
}

impl PublishOutcome {
    pub fn as_yes_no(self) -> &'static str {
        match self {
            Self::Published => "yes",
            Self::Failed => "no",
        }
    }
}

impl From<bool> for PublishOutcome {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Published
        } else {
            Self::Failed
        }
    }
}

/// One heartbeat log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatLine {
    pub tick: bool,
    pub uptime: Duration,
    pub heap_total: usize,
    pub heap_free: usize,
}

impl fmt::Display for HeartbeatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.uptime.as_millis();
        write!(
            f,
            "{} uptime: {}.{:02}, RAM: {}, {} free",
            if self.tick { "Tick" } else { "Tock" },
            millis / 1000,
            (millis % 1000) / 10,
            self.heap_total,
            self.heap_free
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn topic_embeds_device_id() {
        assert_eq!(event_topic("dev1"), "/devices/dev1/events");
    }

    #[test]
    fn payload_shape() {
        assert_eq!(
            heap_payload(327_680, 204_800),
            "{total_ram: 327680, free_ram: 204800}"
        );
        assert_eq!(heap_payload(0, 0), "{total_ram: 0, free_ram: 0}");
    }

    #[test]
    fn state_report_is_json() {
        let report = StateReport {
            on: true,
            btn_count: 3,
            uptime: Duration::from_millis(61_070),
            ram_free: 2048,
        };
        assert_eq!(state_topic("dev1"), "devices/dev1/state");
        assert_eq!(
            report.to_string(),
            r#"{"on":true,"btnCount":3,"uptime":61.07,"ram_free":2048}"#
        );
        assert_eq!(ram_total_payload(327_680), r#"{"ram_total":327680}"#);
    }

    #[test]
    fn outcome_from_client_result() {
        assert_eq!(PublishOutcome::from(true), PublishOutcome::Published);
        assert_eq!(PublishOutcome::from(false).as_yes_no(), "no");
    }

    #[test]
    fn heartbeat_line_format() {
        let line = HeartbeatLine {
            tick: false,
            uptime: Duration::from_millis(12_345),
            heap_total: 1000,
            heap_free: 250,
        };
        assert_eq!(line.to_string(), "Tock uptime: 12.34, RAM: 1000, 250 free");

        let line = HeartbeatLine {
            tick: true,
            uptime: Duration::from_millis(5),
            ..line
        };
        assert_eq!(line.to_string(), "Tick uptime: 0.00, RAM: 1000, 250 free");
    }
}
