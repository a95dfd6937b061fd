#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_futures::join::{join, join3};
use embassy_net::StackResources;
use embassy_time::{Duration, Timer};
use ember_core::App;
use ember_core::events::MacAddress;
use ember_core::gpio::GpioPin;
use ember_firmware::host::{FirmwareHost, claim_pin};
use ember_firmware::{EVENT_QUEUE, config, mqtt, tasks, wifi};
use esp_hal::clock::CpuClock;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, debug, info, warn};
use static_cell::StaticCell;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(LevelFilter::Info);

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let mac = MacAddress::new(esp_hal::efuse::Efuse::mac_address());
    let config = config::load(mac);
    info!("Device id {}", config.device.id);

    // Display bus
    let i2c = if config.display.enabled {
        let (sda, scl) = config::i2c_pins();
        match I2c::new(
            peripherals.I2C0,
            I2cConfig::default().with_frequency(Rate::from_khz(400)),
        ) {
            // SAFETY: the I2C pins are not used for anything else.
            Ok(bus) => Some(unsafe {
                bus.with_sda(claim_pin(GpioPin::new(sda)))
                    .with_scl(claim_pin(GpioPin::new(scl)))
            }),
            Err(e) => {
                warn!("I2C init failed: {:?}", e);
                None
            }
        }
    } else {
        None
    };

    let mut host = FirmwareHost::new(i2c);
    let mut app = App::init(&config, &mut host);
    let button = host.button();
    let timers = host.timers();

    // WiFi station and network stack
    let radio = esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller");
    let (mut wifi_controller, interfaces) =
        esp_radio::wifi::new(&radio, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    if config.wifi.is_configured() {
        let client_config = ClientConfig::default()
            .with_ssid(config.wifi.ssid.clone())
            .with_password(config.wifi.password.clone());
        if let Err(e) = wifi_controller.set_config(&ModeConfig::Client(client_config)) {
            warn!("WiFi mode config failed: {:?}", e);
        }
    }

    let seed = mac
        .octets()
        .iter()
        .fold(0x5A17_2B34_D099_EE11u64, |acc, b| acc.rotate_left(8) ^ u64::from(*b));
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::<4>::new()),
        seed,
    );

    let net_future = net_runner.run();
    let wifi_future = async {
        if config.wifi.is_configured() {
            wifi::wifi_loop(&mut wifi_controller, stack).await;
        }
        info!("WiFi not configured, staying offline");
        core::future::pending::<()>().await
    };
    let mqtt_future = async {
        if config.wifi.is_configured() && config.mqtt.is_configured() {
            mqtt::mqtt_loop(stack, &config).await;
        }
        info!("MQTT broker not configured");
        core::future::pending::<()>().await
    };

    let button_future = async {
        if let Some(button) = button {
            tasks::button_loop(button).await;
        }
        core::future::pending::<()>().await
    };
    let timer_future = tasks::timer_loop(&timers);
    let dispatch_future = async {
        loop {
            let event = EVENT_QUEUE.receive().await;
            if host.accepts(&event) {
                app.dispatch(event, &mut host);
            } else {
                debug!("No handler registered for {:?}", event);
            }
        }
    };

    let _ = join(
        join3(net_future, wifi_future, mqtt_future),
        join3(button_future, timer_future, dispatch_future),
    )
    .await;

    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
