//! Recording host used by the unit tests.

use alloc::string::String;
use alloc::vec::Vec;

use embassy_time::Duration;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Point;

use super::{DisplayFactory, EventBus, Gpio, Mqtt, QoS, SystemStats, TimerId, Timers};
use crate::display::{DisplayError, DisplaySpec, TextDisplay};
use crate::events::{EventGroup, HandlerContext};
use crate::gpio::{ButtonSpec, GpioPin, Level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    Begin,
    Clear,
    TextSize(u8),
    TextColor(BinaryColor),
    Cursor(Point),
    Write(String),
    Flush,
}

pub struct MockDisplay {
    pub calls: Vec<DisplayCall>,
    pub fail_begin: bool,
    pub fail_flush: bool,
    width: u32,
    height: u32,
}

impl MockDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            fail_begin: false,
            fail_flush: false,
            width,
            height,
        }
    }

    fn count(&self, call: &DisplayCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn clears(&self) -> usize {
        self.count(&DisplayCall::Clear)
    }

    pub fn flushes(&self) -> usize {
        self.count(&DisplayCall::Flush)
    }

    /// Every string handed to `write_text`, in order.
    pub fn written(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Write(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextDisplay for MockDisplay {
    fn begin(&mut self) -> Result<(), DisplayError> {
        self.calls.push(DisplayCall::Begin);
        if self.fail_begin {
            Err(DisplayError::InitializationFailed)
        } else {
            Ok(())
        }
    }

    fn clear(&mut self) {
        self.calls.push(DisplayCall::Clear);
    }

    fn set_text_size(&mut self, size: u8) {
        self.calls.push(DisplayCall::TextSize(size));
    }

    fn set_text_color(&mut self, color: BinaryColor) {
        self.calls.push(DisplayCall::TextColor(color));
    }

    fn set_cursor(&mut self, position: Point) {
        self.calls.push(DisplayCall::Cursor(position));
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.calls.push(DisplayCall::Write(String::from(text)));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.calls.push(DisplayCall::Flush);
        if self.fail_flush {
            Err(DisplayError::Bus)
        } else {
            Ok(())
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub qos: QoS,
    pub retain: bool,
    pub payload: Vec<u8>,
}

/// Host that records every registration and accepts every request unless
/// told otherwise.
pub struct MockPlatform {
    pub outputs: Vec<(GpioPin, Level)>,
    pub buttons: Vec<ButtonSpec>,
    pub writes: Vec<(GpioPin, Level)>,
    pub groups: Vec<(EventGroup, HandlerContext)>,
    pub timers: Vec<(Duration, TimerId)>,
    pub display_requests: Vec<DisplaySpec>,
    pub published: Vec<Published>,
    pub subscriptions: Vec<(String, QoS)>,

    pub display_available: bool,
    pub display_fails_begin: bool,
    pub publish_result: bool,
    pub heap_total: usize,
    pub heap_free: usize,
    pub uptime: Duration,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            buttons: Vec::new(),
            writes: Vec::new(),
            groups: Vec::new(),
            timers: Vec::new(),
            display_requests: Vec::new(),
            published: Vec::new(),
            subscriptions: Vec::new(),
            display_available: true,
            display_fails_begin: false,
            publish_result: true,
            heap_total: 327_680,
            heap_free: 204_800,
            uptime: Duration::from_millis(0),
        }
    }
}

impl MockPlatform {
    pub fn timers_for(&self, id: TimerId) -> usize {
        self.timers.iter().filter(|(_, t)| *t == id).count()
    }

    pub fn has_group(&self, group: EventGroup) -> bool {
        self.groups.iter().any(|(g, _)| *g == group)
    }
}

impl Gpio for MockPlatform {
    fn setup_output(&mut self, pin: GpioPin, initial: Level) {
        self.outputs.push((pin, initial));
    }

    fn set_button_handler(&mut self, button: ButtonSpec) {
        self.buttons.push(button);
    }

    fn write(&mut self, pin: GpioPin, level: Level) {
        self.writes.push((pin, level));
    }
}

impl EventBus for MockPlatform {
    fn add_group_handler(&mut self, group: EventGroup, context: HandlerContext) {
        self.groups.push((group, context));
    }
}

impl Timers for MockPlatform {
    fn set_repeating(&mut self, period: Duration, timer: TimerId) {
        self.timers.push((period, timer));
    }
}

impl DisplayFactory for MockPlatform {
    type Display = MockDisplay;

    fn create_display(&mut self, spec: DisplaySpec) -> Option<MockDisplay> {
        self.display_requests.push(spec);
        if !self.display_available {
            return None;
        }
        let mut display = MockDisplay::new(spec.resolution.width(), spec.resolution.height());
        display.fail_begin = self.display_fails_begin;
        Some(display)
    }
}

impl Mqtt for MockPlatform {
    fn publish(&mut self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) -> bool {
        self.published.push(Published {
            topic: String::from(topic),
            qos,
            retain,
            payload: payload.to_vec(),
        });
        self.publish_result
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool {
        self.subscriptions.push((String::from(topic), qos));
        true
    }
}

impl SystemStats for MockPlatform {
    fn heap_size(&self) -> usize {
        self.heap_total
    }

    fn free_heap_size(&self) -> usize {
        self.heap_free
    }

    fn uptime(&self) -> Duration {
        self.uptime
    }
}
