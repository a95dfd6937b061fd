//! Hardware-independent core library for ember
//!
//! This crate holds everything the ember device does that is not tied to a
//! particular chip: persisted configuration, pin setup rules, connectivity
//! event logging, the button-to-MQTT publish, the display refresh, and the
//! [`router::App`] that wires those handlers to a host runtime.
//!
//! The host runtime itself (GPIO, timers, event delivery, MQTT client,
//! display bus) is described by the traits in [`platform`]. The ESP32-S3
//! firmware and the desktop simulator each provide one implementation.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app_state;
pub mod commands;
pub mod config;
pub mod display;
pub mod events;
pub mod framebuffer;
pub mod gpio;
pub mod platform;
pub mod queue;
pub mod router;
pub mod telemetry;

pub use router::App;
