//! Station connection loop. Every transition is reported to the router as
//! both a network and a WiFi event.

use embassy_net::Stack;
use embassy_time::{Duration, Timer, WithTimeout};
use ember_core::events::{NetEvent, WifiEvent};
use ember_core::queue;
use ember_core::router::HostEvent;
use esp_radio::wifi::WifiController;
use log::info;

use crate::EVENT_QUEUE;

const DHCP_TIMEOUT: Duration = Duration::from_secs(20);
const LINK_POLL_INTERVAL: Duration = Duration::from_millis(500);
const RETRY_BACKOFF_MIN_SECS: u64 = 2;
const RETRY_BACKOFF_MAX_SECS: u64 = 120;

fn report(net: NetEvent, wifi: WifiEvent) {
    queue::post(&EVENT_QUEUE, HostEvent::Net(net));
    queue::post(&EVENT_QUEUE, HostEvent::Wifi(wifi));
}

fn retry_backoff_secs(consecutive_failures: u32) -> u64 {
    // 2, 4, 8, 16, 32, 64, 120, 120, ...
    let shift = consecutive_failures.min(6);
    RETRY_BACKOFF_MIN_SECS
        .saturating_mul(1u64 << shift)
        .min(RETRY_BACKOFF_MAX_SECS)
}

async fn wait_before_retry(consecutive_failures: &mut u32) {
    let delay_secs = retry_backoff_secs(*consecutive_failures);
    *consecutive_failures = consecutive_failures.saturating_add(1);
    info!("WiFi retrying in {}s", delay_secs);
    Timer::after_secs(delay_secs).await;
}

pub async fn wifi_loop(controller: &mut WifiController<'_>, stack: Stack<'_>) -> ! {
    let mut consecutive_failures = 0u32;

    loop {
        report(NetEvent::Connecting, WifiEvent::StaConnecting);

        if !controller.is_started().unwrap_or(false) {
            if let Err(err) = controller.start_async().await {
                info!("WiFi start failed: {:?}", err);
                report(NetEvent::Disconnected, WifiEvent::StaDisconnected);
                wait_before_retry(&mut consecutive_failures).await;
                continue;
            }
        }

        if let Err(err) = controller.connect_async().await {
            info!("WiFi connect failed: {:?}", err);
            report(NetEvent::Disconnected, WifiEvent::StaDisconnected);
            let _ = controller.disconnect_async().await;
            wait_before_retry(&mut consecutive_failures).await;
            continue;
        }
        report(NetEvent::Connected, WifiEvent::StaConnected);

        if stack.wait_config_up().with_timeout(DHCP_TIMEOUT).await.is_err() {
            info!("DHCP timeout, reconnecting");
            report(NetEvent::Disconnected, WifiEvent::StaDisconnected);
            let _ = controller.disconnect_async().await;
            wait_before_retry(&mut consecutive_failures).await;
            continue;
        }
        if let Some(v4) = stack.config_v4() {
            info!("Address {}", v4.address);
        }
        report(NetEvent::IpAcquired, WifiEvent::StaIpAcquired);
        consecutive_failures = 0;

        while stack.is_link_up()
            && stack.config_v4().is_some()
            && matches!(controller.is_connected(), Ok(true))
        {
            Timer::after(LINK_POLL_INTERVAL).await;
        }

        report(NetEvent::Disconnected, WifiEvent::StaDisconnected);
        let _ = controller.disconnect_async().await;
        wait_before_retry(&mut consecutive_failures).await;
    }
}
