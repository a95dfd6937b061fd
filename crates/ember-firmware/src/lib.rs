//! ESP32-S3 bindings for ember-core
//!
//! This crate holds everything that cannot compile on desktop targets: the
//! concrete [`host::FirmwareHost`] behind the core platform traits, the
//! SSD1306 panel, and the async loops that turn WiFi, MQTT, button and
//! timer activity into host events.

#![no_std]

extern crate alloc;

pub mod config;
pub mod host;
pub mod mqtt;
pub mod oled;
pub mod tasks;
pub mod wifi;

use core::sync::atomic::AtomicBool;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use ember_core::queue::EventQueue;

use crate::mqtt::Outbound;

/// Depth of the MQTT outbox.
pub const OUTBOX_DEPTH: usize = 4;

/// Host events waiting for the dispatch loop.
pub static EVENT_QUEUE: EventQueue = Channel::new();

/// Publishes and subscriptions requested by the router, drained by the
/// MQTT session.
pub static MQTT_OUTBOX: Channel<CriticalSectionRawMutex, Outbound, OUTBOX_DEPTH> = Channel::new();

/// Set while a broker session is established.
pub static MQTT_UP: AtomicBool = AtomicBool::new(false);
