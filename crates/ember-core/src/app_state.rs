//! Mutable runtime state owned by the router.

/// Application state container
///
/// Everything here starts from zero on every boot; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Whether the MQTT session is up; state reports are only sent while set.
    pub online: bool,
    /// Button presses since boot.
    pub btn_count: u32,
    /// Display refresh counter, wraps on overflow.
    pub counter: u32,
    /// Heartbeat alternation; `false` prints "Tock".
    pub tick_tock: bool,
    /// Logical LED state.
    pub led_on: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub const fn new() -> Self {
        Self {
            online: false,
            btn_count: 0,
            counter: 0,
            tick_tock: false,
            led_on: false,
        }
    }

    /// Return the current counter and advance it.
    pub fn next_count(&mut self) -> u32 {
        let current = self.counter;
        self.counter = self.counter.wrapping_add(1);
        current
    }

    /// Return the current heartbeat phase and flip it.
    pub fn next_tick(&mut self) -> bool {
        let tick = self.tick_tock;
        self.tick_tock = !self.tick_tock;
        tick
    }
}
