//! Desktop implementation of the ember platform traits.

use std::time::Instant;

use embassy_time::Duration;
use ember_core::display::{Console, DisplaySpec};
use ember_core::events::{EventGroup, HandlerContext, MqttEvent};
use ember_core::gpio::{ButtonSpec, GpioPin, Level};
use ember_core::platform::{DisplayFactory, EventBus, Gpio, Mqtt, QoS, SystemStats, TimerId, Timers};
use ember_core::router::HostEvent;
use log::{debug, info};

use crate::panel::SimPanel;

/// Heap numbers reported to the router. The desktop has no meaningful
/// equivalent, so these mimic a freshly booted ESP32-S3.
const SIM_HEAP_TOTAL: usize = 327_680;
const SIM_HEAP_FREE: usize = 281_344;

struct SimTimer {
    id: TimerId,
    period: std::time::Duration,
    next_due: Instant,
}

pub struct SimHost {
    started: Instant,
    groups: Vec<EventGroup>,
    button: Option<ButtonSpec>,
    timers: Vec<SimTimer>,
    broker_up: bool,
    display_enabled: bool,
}

impl SimHost {
    pub fn new(display_enabled: bool) -> Self {
        Self {
            started: Instant::now(),
            groups: Vec::new(),
            button: None,
            timers: Vec::new(),
            broker_up: false,
            display_enabled,
        }
    }

    pub fn button(&self) -> Option<ButtonSpec> {
        self.button
    }

    /// Whether the router registered for `event`. Unregistered events are
    /// not delivered, the same way the firmware never raises them.
    pub fn accepts(&self, event: &HostEvent) -> bool {
        let group = match event {
            HostEvent::Net(_) => EventGroup::Net,
            #[cfg(feature = "wifi")]
            HostEvent::Wifi(_) => EventGroup::Wifi,
            HostEvent::Mqtt(_) => EventGroup::Mqtt,
            HostEvent::Button(pin) => return self.button.is_some_and(|b| b.pin == *pin),
            HostEvent::Timer(id) => return self.timers.iter().any(|t| t.id == *id),
        };
        self.groups.contains(&group)
    }

    /// Track the broker session so publishes fail while it is down.
    pub fn observe(&mut self, event: &HostEvent) {
        match event {
            HostEvent::Mqtt(MqttEvent::Connected) => self.broker_up = true,
            HostEvent::Mqtt(MqttEvent::Disconnected) => self.broker_up = false,
            _ => {}
        }
    }

    /// Timers whose deadline has passed, in registration order.
    pub fn due_timers(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due = Vec::new();
        for timer in self.timers.iter_mut() {
            while timer.next_due <= now {
                due.push(timer.id);
                timer.next_due += timer.period;
            }
        }
        due
    }

    /// Time until the next timer fires.
    pub fn until_next_timer(&self, now: Instant) -> Option<std::time::Duration> {
        self.timers
            .iter()
            .map(|t| t.next_due.saturating_duration_since(now))
            .min()
    }
}

impl Gpio for SimHost {
    fn setup_output(&mut self, pin: GpioPin, initial: Level) {
        info!("GPIO {} output, initial {:?}", pin, initial);
    }

    fn set_button_handler(&mut self, button: ButtonSpec) {
        debug!("Button armed: {:?}", button);
        self.button = Some(button);
    }

    fn write(&mut self, pin: GpioPin, level: Level) {
        info!("GPIO {} -> {:?}", pin, level);
    }
}

impl EventBus for SimHost {
    fn add_group_handler(&mut self, group: EventGroup, context: HandlerContext) {
        debug!("Handler registered for {:?} ({})", group, context);
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }
}

impl Timers for SimHost {
    fn set_repeating(&mut self, period: Duration, timer: TimerId) {
        let period = std::time::Duration::from_micros(period.as_micros());
        debug!("Timer {:?} every {:?}", timer, period);
        self.timers.push(SimTimer {
            id: timer,
            period,
            next_due: Instant::now() + period,
        });
    }
}

impl DisplayFactory for SimHost {
    type Display = Console<SimPanel>;

    fn create_display(&mut self, spec: DisplaySpec) -> Option<Self::Display> {
        if !self.display_enabled {
            return None;
        }
        debug!("Display requested: {:?}", spec);
        Some(Console::new(SimPanel::new(
            spec.resolution.width(),
            spec.resolution.height(),
        )))
    }
}

impl Mqtt for SimHost {
    fn publish(&mut self, topic: &str, qos: QoS, retain: bool, payload: &[u8]) -> bool {
        if !self.broker_up {
            return false;
        }
        info!(
            "mqtt(LOG): topic='{}' {:?} retain={} payload={}",
            topic,
            qos,
            retain,
            String::from_utf8_lossy(payload)
        );
        true
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> bool {
        info!("mqtt(LOG): subscribe '{}' {:?}", topic, qos);
        self.broker_up
    }
}

impl SystemStats for SimHost {
    fn heap_size(&self) -> usize {
        SIM_HEAP_TOTAL
    }

    fn free_heap_size(&self) -> usize {
        SIM_HEAP_FREE
    }

    fn uptime(&self) -> Duration {
        Duration::from_micros(self.started.elapsed().as_micros() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::events::NetEvent;
    use ember_core::gpio::{Edge, Pull};

    #[test]
    fn publishes_fail_until_broker_connects() {
        let mut host = SimHost::new(false);
        assert!(!host.publish("/devices/x/events", QoS::AtMostOnce, false, b"{}"));
        host.observe(&HostEvent::Mqtt(MqttEvent::Connected));
        assert!(host.publish("/devices/x/events", QoS::AtMostOnce, false, b"{}"));
    }

    #[test]
    fn only_registered_events_are_accepted() {
        let mut host = SimHost::new(false);
        let net = HostEvent::Net(NetEvent::Connected);
        let press = HostEvent::Button(GpioPin::new(0));
        assert!(!host.accepts(&net));
        assert!(!host.accepts(&press));

        host.add_group_handler(EventGroup::Net, HandlerContext::NONE);
        host.set_button_handler(ButtonSpec {
            pin: GpioPin::new(0),
            pull: Pull::Up,
            edge: Edge::Falling,
            debounce_ms: 20,
        });
        assert!(host.accepts(&net));
        assert!(host.accepts(&press));
        assert!(!host.accepts(&HostEvent::Button(GpioPin::new(4))));
    }

    #[test]
    fn overdue_timer_catches_up() {
        let mut host = SimHost::new(false);
        host.set_repeating(Duration::from_millis(100), TimerId::DisplayRefresh);
        let later = Instant::now() + std::time::Duration::from_millis(350);
        assert_eq!(host.due_timers(later).len(), 3);
        assert!(host.due_timers(later).is_empty());
    }
}
