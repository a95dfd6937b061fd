//! Desktop simulator for the ember device sample.
//!
//! Runs the same [`ember_core::App`] as the firmware. Hardware events are
//! typed on stdin, timers run on the wall clock, MQTT publishes go to the
//! log, and the display is either logged as text (`RUST_LOG=debug`) or shown
//! in an SDL2 window (`--features window`).
//!
//! # Commands
//!
//! | Input              | Event                                  |
//! |--------------------|----------------------------------------|
//! | `b`                | Button press                           |
//! | `net 0..3`         | Network disconnected .. got IP         |
//! | `sta up`           | WiFi station connected                 |
//! | `ap+ <mac>`        | Client joined the access point         |
//! | `mqtt up`          | Broker session established             |
//! | `msg <topic> ...`  | Inbound MQTT message                   |
//! | `save <path>`      | Write the running config               |
//! | `q`                | Quit                                   |

mod commands;
mod config;
mod host;
mod panel;

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use embassy_sync::channel::Channel;
use ember_core::App;
use ember_core::gpio::GpioPin;
use ember_core::queue::{self, EventQueue};
use log::{debug, info, warn};

use commands::Command;
use host::SimHost;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Events posted by the stdin thread, drained by the main loop.
static EVENTS: EventQueue = Channel::new();

/// Set by the stdin thread or the window to stop the main loop.
pub(crate) static QUIT: AtomicBool = AtomicBool::new(false);

/// Upper bound on how long the main loop sleeps between polls.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn spawn_stdin_reader(button: GpioPin, save_requests: std::sync::mpsc::Sender<std::path::PathBuf>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match commands::parse(&line, button) {
                Some(Command::Event(event)) => {
                    queue::post(&EVENTS, event);
                }
                Some(Command::Save(path)) => {
                    if save_requests.send(path).is_err() {
                        break;
                    }
                }
                Some(Command::Help) => println!("{}", commands::HELP),
                Some(Command::Quit) => break,
                None if line.trim().is_empty() => {}
                None => warn!("Unknown command '{}', try 'help'", line.trim()),
            }
        }
        QUIT.store(true, Ordering::Relaxed);
    });
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting ember simulator");

    let config = config::load();
    info!("Device id {}", config.device.id);

    let mut host = SimHost::new(config.display.enabled);
    let mut app = App::init(&config, &mut host);

    let button = host
        .button()
        .map(|b| b.pin)
        .unwrap_or(GpioPin::new(0));
    let (save_tx, save_rx) = std::sync::mpsc::channel();
    spawn_stdin_reader(button, save_tx);
    println!("{}", commands::HELP);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    while !QUIT.load(Ordering::Relaxed) {
        // --- Timers -------------------------------------------------------
        for timer in host.due_timers(Instant::now()) {
            app.dispatch(ember_core::router::HostEvent::Timer(timer), &mut host);
        }

        // --- Posted events ------------------------------------------------
        while let Ok(event) = EVENTS.try_receive() {
            if !host.accepts(&event) {
                debug!("No handler registered for {:?}", event);
                continue;
            }
            host.observe(&event);
            app.dispatch(event, &mut host);
        }

        // --- Config saves -------------------------------------------------
        while let Ok(path) = save_rx.try_recv() {
            config::save(&config, &path);
        }

        // --- Pacing -------------------------------------------------------
        let wait = host
            .until_next_timer(Instant::now())
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));
        std::thread::sleep(wait);
    }

    info!(
        "Simulator exiting after {} display refreshes",
        app.state().counter
    );
}
