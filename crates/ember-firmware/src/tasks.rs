//! Button and timer loops. Both only post events; the dispatch loop in
//! `main` does the work.

use embassy_time::{Duration, Instant, Timer};
use ember_core::gpio::{ButtonSpec, Edge, Pull};
use ember_core::platform::TimerId;
use ember_core::queue;
use ember_core::router::HostEvent;
use esp_hal::gpio::{Input, InputConfig};
use log::debug;

use crate::EVENT_QUEUE;
use crate::host::{MAX_TIMERS, claim_pin};

/// Wait for the configured edge, then confirm the level once the debounce
/// window has passed.
pub async fn button_loop(button: ButtonSpec) -> ! {
    let pull = match button.pull {
        Pull::Up => esp_hal::gpio::Pull::Up,
        Pull::Down => esp_hal::gpio::Pull::Down,
    };
    // SAFETY: the button pin is only read here.
    let mut input = Input::new(
        unsafe { claim_pin(button.pin) },
        InputConfig::default().with_pull(pull),
    );
    let debounce = Duration::from_millis(u64::from(button.debounce_ms));

    loop {
        match button.edge {
            Edge::Falling => input.wait_for_falling_edge().await,
            Edge::Rising => input.wait_for_rising_edge().await,
        }
        Timer::after(debounce).await;

        let still_pressed = match button.edge {
            Edge::Falling => input.is_low(),
            Edge::Rising => input.is_high(),
        };
        if still_pressed {
            queue::post(&EVENT_QUEUE, HostEvent::Button(button.pin));
        } else {
            debug!("Bounce on GPIO {}", button.pin);
        }
    }
}

/// Fire every registered repeating timer. Deadlines advance by whole
/// periods so a late wake-up does not drift the schedule.
pub async fn timer_loop(timers: &[(Duration, TimerId)]) -> ! {
    let start = Instant::now();
    let mut deadlines: heapless::Vec<Instant, MAX_TIMERS> = timers
        .iter()
        .take(MAX_TIMERS)
        .map(|(period, _)| start + *period)
        .collect();

    loop {
        let Some((index, next)) = deadlines
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|(_, deadline)| *deadline)
        else {
            // nothing registered
            core::future::pending::<()>().await;
            continue;
        };

        Timer::at(next).await;
        let (period, id) = timers[index];
        queue::post(&EVENT_QUEUE, HostEvent::Timer(id));
        deadlines[index] = next + period;
    }
}
