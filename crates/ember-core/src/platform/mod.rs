//! Capabilities the host runtime provides to the router.
//!
//! The router never touches hardware directly. Everything it needs (pin
//! setup, event and timer registration, the display bus, the MQTT client
//! and heap/uptime introspection) is expressed as one of the traits below.
//! A concrete host implements all of them and gets [`Platform`] for free.

#[cfg(test)]
pub(crate) mod mock;

use embassy_time::Duration;

use crate::display::{DisplaySpec, TextDisplay};
use crate::events::{EventGroup, HandlerContext};
use crate::gpio::{ButtonSpec, GpioPin, Level};

/// Repeating timers the router can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    DisplayRefresh,
    Heartbeat,
    /// Publishes the device state while the broker session is up.
    StateReport,
}

/// MQTT delivery assurance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    /// Fire and forget.
    AtMostOnce,
    AtLeastOnce,
}

pub trait Gpio {
    /// Configure `pin` as a push-pull output driven to `initial`.
    fn setup_output(&mut self, pin: GpioPin, initial: Level);

    /// Arm a debounced edge interrupt. The host delivers presses as
    /// [`crate::router::HostEvent::Button`].
    fn set_button_handler(&mut self, button: ButtonSpec);

    fn write(&mut self, pin: GpioPin, level: Level);
}

pub trait EventBus {
    /// Start delivering every event of `group` to the router.
    fn add_group_handler(&mut self, group: EventGroup, context: HandlerContext);
}

pub trait Timers {
    /// Deliver [`crate::router::HostEvent::Timer`] every `period` until reset.
    fn set_repeating(&mut self, period: Duration, timer: TimerId);
}

pub trait DisplayFactory {
    type Display: TextDisplay;

    /// Create a driver for the panel described by `spec`, or `None` when
    /// the peripheral is not present.
    fn create_display(&mut self, spec: DisplaySpec) -> Option<Self::Display>;
}

pub trait Mqtt {
    /// Queue a publish. Returns whether the client accepted it; there is no
    /// delivery guarantee beyond that.
    fn publish(&mut self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) -> bool;

    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool;
}

pub trait SystemStats {
    /// Total heap size in bytes.
    fn heap_size(&self) -> usize;

    /// Currently unused heap in bytes.
    fn free_heap_size(&self) -> usize;

    /// Time since boot.
    fn uptime(&self) -> Duration;
}

/// Everything a host runtime has to offer.
pub trait Platform: Gpio + EventBus + Timers + DisplayFactory + Mqtt + SystemStats {}

impl<T> Platform for T where T: Gpio + EventBus + Timers + DisplayFactory + Mqtt + SystemStats {}
