//! Device bring-up and the event handlers the host drives afterwards.
//!
//! [`App::init`] configures pins and registers every handler with the host,
//! then the host feeds [`HostEvent`]s to [`App::dispatch`] from one loop for
//! the rest of the device's life. Handlers return the line they logged so
//! callers and tests can observe the outcome without a log capture.

use alloc::string::{String, ToString};

use embassy_time::Duration;
use log::{debug, info, warn};

use crate::app_state::AppState;
use crate::commands::LedCommand;
use crate::config::DeviceConfig;
use crate::display::{self, COUNTER_LABEL, DisplaySpec, Interface, Resolution, TextDisplay};
#[cfg(feature = "wifi")]
use crate::events::{WifiEvent, WifiNotice};
use crate::events::{EventGroup, HandlerContext, MqttEvent, NetEvent};
use crate::gpio::{ButtonSpec, GpioPin, LedSpec};
use crate::platform::{Gpio, Mqtt, Platform, QoS, SystemStats, TimerId};
use crate::telemetry::{self, HeartbeatLine, PublishOutcome, StateReport};

/// Display refresh period.
pub const DISPLAY_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// How often the device state is reported while online.
pub const STATE_REPORT_PERIOD: Duration = Duration::from_secs(1);

/// Everything a host can deliver to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Net(NetEvent),
    #[cfg(feature = "wifi")]
    Wifi(WifiEvent),
    /// Debounced press on the given pin.
    Button(GpioPin),
    Timer(TimerId),
    Mqtt(MqttEvent),
}

/// The application: configuration captured at boot plus runtime state.
pub struct App<D> {
    device_id: String,
    led: Option<LedSpec>,
    context: HandlerContext,
    display: Option<D>,
    state: AppState,
}

impl<D> App<D>
where
    D: TextDisplay,
{
    /// Configure pins and register all handlers with `host`.
    ///
    /// Missing peripherals only disable the feature that needs them; this
    /// never fails.
    pub fn init<H>(config: &DeviceConfig, host: &mut H) -> Self
    where
        H: Platform<Display = D>,
    {
        let context = HandlerContext::NONE;
        let state = AppState::new();

        let led = LedSpec::from_config(&config.board.led1);
        if let Some(led) = led {
            info!("LED pin {}", led.pin);
            // starts off; driving `active_high` as the initial level
            // instead would light the LED at boot
            host.setup_output(led.pin, led.level(state.led_on));
        }

        if let Some(button) = ButtonSpec::from_config(&config.board.btn1) {
            info!(
                "Button pin {}, active {}",
                button.pin,
                button.active_label()
            );
            host.set_button_handler(button);
        }

        host.add_group_handler(EventGroup::Net, context);
        #[cfg(feature = "wifi")]
        host.add_group_handler(EventGroup::Wifi, context);
        host.add_group_handler(EventGroup::Mqtt, context);

        if config.heartbeat.enabled {
            let period = Duration::from_millis(u64::from(config.heartbeat.period_ms));
            host.set_repeating(period, TimerId::Heartbeat);
        }
        host.set_repeating(STATE_REPORT_PERIOD, TimerId::StateReport);

        let display = if config.display.enabled {
            Self::bring_up_display(config, host)
        } else {
            info!("Display disabled in config");
            None
        };

        Self {
            device_id: config.device.id.clone(),
            led,
            context,
            display,
            state,
        }
    }

    fn bring_up_display<H>(config: &DeviceConfig, host: &mut H) -> Option<D>
    where
        H: Platform<Display = D>,
    {
        let spec = DisplaySpec {
            interface: Interface::I2c {
                address: config.display.address,
                reset_pin: None,
            },
            resolution: Resolution::Res128x64,
        };

        let Some(mut display) = host.create_display(spec) else {
            info!("No display found");
            return None;
        };

        if let Err(e) = display.begin() {
            warn!("Display init failed: {}", e);
            return None;
        }
        if let Err(e) = display.flush() {
            warn!("Display blank failed: {}", e);
        }

        host.set_repeating(DISPLAY_REFRESH_PERIOD, TimerId::DisplayRefresh);
        Some(display)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Context handed to the host with every event-group registration.
    pub fn context(&self) -> HandlerContext {
        self.context
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }

    /// Route one host event to its handler.
    pub fn dispatch<H>(&mut self, event: HostEvent, host: &mut H)
    where
        H: Gpio + Mqtt + SystemStats,
    {
        debug!("Dispatching {:?}", event);
        match event {
            HostEvent::Net(event) => {
                self.on_net_event(event);
            }
            #[cfg(feature = "wifi")]
            HostEvent::Wifi(event) => {
                self.on_wifi_event(event);
            }
            HostEvent::Button(pin) => {
                self.on_button(pin, host);
            }
            HostEvent::Timer(TimerId::DisplayRefresh) => {
                self.on_display_refresh();
            }
            HostEvent::Timer(TimerId::Heartbeat) => {
                self.on_heartbeat(host);
            }
            HostEvent::Timer(TimerId::StateReport) => {
                self.on_state_report(host);
            }
            HostEvent::Mqtt(event) => self.on_mqtt_event(event, host),
        }
    }

    pub fn on_net_event(&self, event: NetEvent) -> Option<&'static str> {
        let line = event.message()?;
        info!("{}", line);
        Some(line)
    }

    #[cfg(feature = "wifi")]
    pub fn on_wifi_event(&self, event: WifiEvent) -> Option<WifiNotice> {
        let notice = WifiNotice::from_event(event, self.context)?;
        info!("{}", notice);
        Some(notice)
    }

    /// Draw the counter (when a display exists) and advance it. Returns the
    /// value that was due for display.
    pub fn on_display_refresh(&mut self) -> u32 {
        let count = self.state.next_count();
        if let Some(display) = self.display.as_mut() {
            if let Err(e) = display::show_count(display, COUNTER_LABEL, count) {
                warn!("Display refresh failed: {}", e);
            }
        }
        count
    }

    /// Count the press and publish a heap snapshot to the device's event
    /// topic.
    pub fn on_button<H>(&mut self, pin: GpioPin, host: &mut H) -> PublishOutcome
    where
        H: Mqtt + SystemStats + ?Sized,
    {
        self.state.btn_count = self.state.btn_count.wrapping_add(1);
        let topic = telemetry::event_topic(&self.device_id);
        let payload = telemetry::heap_payload(host.heap_size(), host.free_heap_size());
        let outcome =
            PublishOutcome::from(host.publish(&topic, QoS::AtMostOnce, false, payload.as_bytes()));
        info!("Pin: {}, published: {}", pin, outcome.as_yes_no());
        outcome
    }

    pub fn on_heartbeat<H>(&mut self, host: &H) -> HeartbeatLine
    where
        H: SystemStats + ?Sized,
    {
        let line = HeartbeatLine {
            tick: self.state.next_tick(),
            uptime: host.uptime(),
            heap_total: host.heap_size(),
            heap_free: host.free_heap_size(),
        };
        info!("{}", line);
        line
    }

    /// Publish the device state. Skipped (returning `None`) while offline.
    pub fn on_state_report<H>(&mut self, host: &mut H) -> Option<PublishOutcome>
    where
        H: Mqtt + SystemStats + ?Sized,
    {
        if !self.state.online {
            return None;
        }
        let report = StateReport {
            on: self.state.led_on,
            btn_count: self.state.btn_count,
            uptime: host.uptime(),
            ram_free: host.free_heap_size(),
        };
        let topic = telemetry::state_topic(&self.device_id);
        let payload = report.to_string();
        let outcome =
            PublishOutcome::from(host.publish(&topic, QoS::AtMostOnce, false, payload.as_bytes()));
        if outcome == PublishOutcome::Failed {
            warn!("State report to {} failed", topic);
        }
        Some(outcome)
    }

    pub fn on_mqtt_event<H>(&mut self, event: MqttEvent, host: &mut H)
    where
        H: Gpio + Mqtt + SystemStats + ?Sized,
    {
        match event {
            MqttEvent::Connected => {
                self.state.online = true;
                info!("MQTT connected");
                let topic = telemetry::state_topic(&self.device_id);
                let payload = telemetry::ram_total_payload(host.heap_size());
                if !host.publish(&topic, QoS::AtMostOnce, false, payload.as_bytes()) {
                    warn!("RAM report to {} failed", topic);
                }
                if self.led.is_some() {
                    for command in [LedCommand::On, LedCommand::Off] {
                        let topic = command.topic(&self.device_id);
                        if !host.subscribe(&topic, QoS::AtMostOnce) {
                            warn!("Subscribe to {} failed", topic);
                        }
                    }
                }
            }
            MqttEvent::Disconnected => {
                self.state.online = false;
                info!("MQTT disconnected");
            }
            MqttEvent::Message { topic, payload } => {
                let Some(command) = LedCommand::parse(&topic, &self.device_id) else {
                    debug!("Ignoring message on {}", topic);
                    return;
                };
                info!(
                    "Topic: {}, Message: {}",
                    topic,
                    String::from_utf8_lossy(&payload)
                );
                self.set_led(command.is_on(), host);
            }
        }
    }

    /// Drive the LED to a logical state, honouring its polarity.
    pub fn set_led<H>(&mut self, on: bool, host: &mut H)
    where
        H: Gpio + ?Sized,
    {
        let Some(led) = self.led else {
            return;
        };
        host.write(led.pin, led.level(on));
        self.state.led_on = on;
        info!("LED on -> {}", on);
    }
}
