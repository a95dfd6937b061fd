//! [`FirmwareHost`]: the ESP32-S3 implementation of the core platform traits.
//!
//! Registration calls only record what the router asked for. `main` reads
//! the records back afterwards to decide which loops to run.

use core::sync::atomic::Ordering;

use alloc::string::String;

use embassy_time::{Duration, Instant};
use ember_core::display::{Console, DisplaySpec, Interface, Resolution};
use ember_core::events::{EventGroup, HandlerContext};
use ember_core::gpio::{ButtonSpec, GpioPin, Level};
use ember_core::platform::{DisplayFactory, EventBus, Gpio, Mqtt, QoS, SystemStats, TimerId, Timers};
use ember_core::router::HostEvent;
use esp_hal::Blocking;
use esp_hal::gpio::{AnyPin, Output, OutputConfig};
use esp_hal::i2c::master::I2c;
use log::{debug, warn};

use crate::mqtt::Outbound;
use crate::oled::OledPanel;
use crate::{MQTT_OUTBOX, MQTT_UP};

/// Most timers the router registers.
pub const MAX_TIMERS: usize = 3;

/// Claim a GPIO by number.
///
/// Pin numbers come from configuration, so the typed peripheral singletons
/// cannot be used.
///
/// # Safety
/// Each configured pin must be used for exactly one purpose.
pub unsafe fn claim_pin(pin: GpioPin) -> AnyPin<'static> {
    unsafe { AnyPin::steal(pin.number()) }
}

fn hal_level(level: Level) -> esp_hal::gpio::Level {
    match level {
        Level::Low => esp_hal::gpio::Level::Low,
        Level::High => esp_hal::gpio::Level::High,
    }
}

pub struct FirmwareHost {
    led: Option<(GpioPin, Output<'static>)>,
    button: Option<ButtonSpec>,
    groups: heapless::Vec<EventGroup, 3>,
    timers: heapless::Vec<(Duration, TimerId), MAX_TIMERS>,
    i2c: Option<I2c<'static, Blocking>>,
}

impl FirmwareHost {
    /// `i2c` is handed to the display on first request.
    pub fn new(i2c: Option<I2c<'static, Blocking>>) -> Self {
        Self {
            led: None,
            button: None,
            groups: heapless::Vec::new(),
            timers: heapless::Vec::new(),
            i2c,
        }
    }

    pub fn button(&self) -> Option<ButtonSpec> {
        self.button
    }

    pub fn timers(&self) -> heapless::Vec<(Duration, TimerId), MAX_TIMERS> {
        self.timers.clone()
    }

    /// Whether the router registered for `event`.
    pub fn accepts(&self, event: &HostEvent) -> bool {
        let group = match event {
            HostEvent::Net(_) => EventGroup::Net,
            HostEvent::Wifi(_) => EventGroup::Wifi,
            HostEvent::Mqtt(_) => EventGroup::Mqtt,
            HostEvent::Button(pin) => return self.button.is_some_and(|b| b.pin == *pin),
            HostEvent::Timer(id) => return self.timers.iter().any(|(_, t)| t == id),
        };
        self.groups.contains(&group)
    }
}

impl Gpio for FirmwareHost {
    fn setup_output(&mut self, pin: GpioPin, initial: Level) {
        // SAFETY: the LED pin is only driven through this output.
        let output = Output::new(
            unsafe { claim_pin(pin) },
            hal_level(initial),
            OutputConfig::default(),
        );
        self.led = Some((pin, output));
    }

    fn set_button_handler(&mut self, button: ButtonSpec) {
        self.button = Some(button);
    }

    fn write(&mut self, pin: GpioPin, level: Level) {
        match self.led.as_mut() {
            Some((led_pin, output)) if *led_pin == pin => output.set_level(hal_level(level)),
            _ => warn!("GPIO {} is not an output", pin),
        }
    }
}

impl EventBus for FirmwareHost {
    fn add_group_handler(&mut self, group: EventGroup, context: HandlerContext) {
        debug!("Handler registered for {:?} ({})", group, context);
        if !self.groups.contains(&group) && self.groups.push(group).is_err() {
            warn!("Too many event groups, dropping {:?}", group);
        }
    }
}

impl Timers for FirmwareHost {
    fn set_repeating(&mut self, period: Duration, timer: TimerId) {
        if self.timers.push((period, timer)).is_err() {
            warn!("Timer table full, dropping {:?}", timer);
        }
    }
}

impl DisplayFactory for FirmwareHost {
    type Display = Console<OledPanel>;

    fn create_display(&mut self, spec: DisplaySpec) -> Option<Self::Display> {
        if spec.resolution != Resolution::Res128x64 {
            warn!("Unsupported panel resolution {:?}", spec.resolution);
            return None;
        }
        let Interface::I2c { address, .. } = spec.interface;
        let i2c = self.i2c.take()?;
        Some(Console::new(OledPanel::new(i2c, address)))
    }
}

impl Mqtt for FirmwareHost {
    fn publish(&mut self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) -> bool {
        if !MQTT_UP.load(Ordering::Acquire) {
            return false;
        }
        if retain {
            debug!("Retain flag not supported, publishing {} without it", topic);
        }
        MQTT_OUTBOX
            .try_send(Outbound::Publish {
                topic: String::from(topic),
                payload: payload.to_vec(),
                qos,
            })
            .is_ok()
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool {
        MQTT_UP.load(Ordering::Acquire)
            && MQTT_OUTBOX
                .try_send(Outbound::Subscribe {
                    topic: String::from(topic),
                    qos,
                })
                .is_ok()
    }
}

impl SystemStats for FirmwareHost {
    fn heap_size(&self) -> usize {
        esp_alloc::HEAP.used() + esp_alloc::HEAP.free()
    }

    fn free_heap_size(&self) -> usize {
        esp_alloc::HEAP.free()
    }

    fn uptime(&self) -> Duration {
        Duration::from_micros(Instant::now().as_micros())
    }
}
