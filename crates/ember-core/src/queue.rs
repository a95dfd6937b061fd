//! Bounded queue between event producers and the dispatch loop.
//!
//! Interrupt-driven tasks (button, timers, WiFi, MQTT) never call into the
//! router directly. They post a [`HostEvent`] and the single loop that owns
//! the [`crate::App`] drains it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

use crate::router::HostEvent;

/// Depth of the host event queue.
pub const EVENT_QUEUE_DEPTH: usize = 16;

pub type EventQueue<const N: usize = EVENT_QUEUE_DEPTH> =
    Channel<CriticalSectionRawMutex, HostEvent, N>;

/// Post without waiting. A full queue drops the event.
pub fn post<const N: usize>(queue: &EventQueue<N>, event: HostEvent) -> bool {
    match queue.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(dropped)) => {
            warn!("Event queue full, dropping {:?}", dropped);
            false
        }
    }
}
