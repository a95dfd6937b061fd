//! Broker session: connects over embassy-net TCP with `myrtio-mqtt`,
//! forwards inbound messages to the router and drains the outbox.

use core::net::Ipv4Addr;
use core::sync::atomic::Ordering;

use alloc::string::String;
use alloc::vec::Vec;

use embassy_futures::select::{Either, select};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{ConnectError, TcpSocket};
use embassy_net::{IpAddress, Stack};
use embassy_time::{Duration, Timer};
use ember_core::config::DeviceConfig;
use ember_core::events::MqttEvent;
use ember_core::platform::QoS;
use ember_core::queue;
use ember_core::router::HostEvent;
use log::{info, warn};
use myrtio_mqtt::client::{MqttClient, MqttEvent as ClientEvent, MqttOptions};
use myrtio_mqtt::transport::TcpTransport;
use thiserror_no_std::Error;

use crate::{EVENT_QUEUE, MQTT_OUTBOX, MQTT_UP};

const SOCKET_BUFFER_SIZE: usize = 1024;
const MQTT_BUFFER_SIZE: usize = 512;
const MAX_TOPICS: usize = 4;
const IO_TIMEOUT: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Request from the router to the session.
#[derive(Debug)]
pub enum Outbound {
    Publish {
        topic: String,
        payload: Vec<u8>,
        qos: QoS,
    },
    Subscribe {
        topic: String,
        qos: QoS,
    },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("broker address lookup failed")]
    Dns,
    #[error("TCP connect failed: {0:?}")]
    Connect(ConnectError),
    #[error("MQTT handshake failed")]
    Handshake,
    #[error("MQTT session lost")]
    Lost,
}

fn client_qos(qos: QoS) -> myrtio_mqtt::packet::QoS {
    match qos {
        QoS::AtMostOnce => myrtio_mqtt::packet::QoS::AtMostOnce,
        QoS::AtLeastOnce => myrtio_mqtt::packet::QoS::AtLeastOnce,
    }
}

async fn resolve(stack: Stack<'_>, server: &str) -> Result<IpAddress, SessionError> {
    if let Ok(ip) = server.parse::<Ipv4Addr>() {
        return Ok(IpAddress::from(ip));
    }
    stack
        .dns_query(server, DnsQueryType::A)
        .await
        .ok()
        .and_then(|found| found.first().copied())
        .ok_or(SessionError::Dns)
}

/// What the session loop does after one wake-up. Owned so the client is
/// no longer borrowed when it is acted on.
enum Step {
    Inbound { topic: String, payload: Vec<u8> },
    Outbound(Outbound),
    Idle,
    Lost,
}

async fn run_session(stack: Stack<'_>, config: &DeviceConfig) -> Result<(), SessionError> {
    let mut rx_buffer = [0u8; SOCKET_BUFFER_SIZE];
    let mut tx_buffer = [0u8; SOCKET_BUFFER_SIZE];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(IO_TIMEOUT));

    let address = resolve(stack, &config.mqtt.server).await?;
    socket
        .connect((address, config.mqtt.port))
        .await
        .map_err(SessionError::Connect)?;

    let options = MqttOptions::new(&config.device.id, &config.mqtt.server, config.mqtt.port)
        .with_keep_alive(Duration::from_secs(u64::from(config.mqtt.keep_alive_secs)));
    let mut client: MqttClient<_, MAX_TOPICS, MQTT_BUFFER_SIZE> =
        MqttClient::new(TcpTransport::new(socket, IO_TIMEOUT), options);
    client.connect().await.map_err(|e| {
        warn!("MQTT connect: {:?}", e);
        SessionError::Handshake
    })?;

    MQTT_UP.store(true, Ordering::Release);
    queue::post(&EVENT_QUEUE, HostEvent::Mqtt(MqttEvent::Connected));

    loop {
        let step = match select(client.poll(), MQTT_OUTBOX.receive()).await {
            Either::First(Ok(Some(ClientEvent::Publish(msg)))) => Step::Inbound {
                topic: String::from(msg.topic),
                payload: msg.payload.to_vec(),
            },
            Either::First(Ok(_)) => Step::Idle,
            Either::First(Err(e)) => {
                warn!("MQTT poll: {:?}", e);
                Step::Lost
            }
            Either::Second(request) => Step::Outbound(request),
        };

        match step {
            Step::Inbound { topic, payload } => {
                queue::post(
                    &EVENT_QUEUE,
                    HostEvent::Mqtt(MqttEvent::Message { topic, payload }),
                );
            }
            Step::Outbound(Outbound::Publish {
                topic,
                payload,
                qos,
            }) => {
                if let Err(e) = client.publish(&topic, &payload, client_qos(qos)).await {
                    warn!("MQTT publish to {}: {:?}", topic, e);
                    return Err(SessionError::Lost);
                }
            }
            Step::Outbound(Outbound::Subscribe { topic, qos }) => {
                if let Err(e) = client.subscribe(&topic, client_qos(qos)).await {
                    warn!("MQTT subscribe to {}: {:?}", topic, e);
                    return Err(SessionError::Lost);
                }
            }
            Step::Idle => {}
            Step::Lost => return Err(SessionError::Lost),
        }
    }
}

/// Keep a broker session up for as long as the device runs.
pub async fn mqtt_loop(stack: Stack<'_>, config: &DeviceConfig) -> ! {
    loop {
        stack.wait_config_up().await;
        info!(
            "MQTT connecting to {}:{}",
            config.mqtt.server, config.mqtt.port
        );

        if let Err(e) = run_session(stack, config).await {
            warn!("{}", e);
        }

        if MQTT_UP.swap(false, Ordering::AcqRel) {
            queue::post(&EVENT_QUEUE, HostEvent::Mqtt(MqttEvent::Disconnected));
        }
        // requests queued for the dead session are not replayed
        while MQTT_OUTBOX.try_receive().is_ok() {}

        Timer::after(RECONNECT_DELAY).await;
    }
}
