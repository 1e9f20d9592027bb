//! MQTT transport publishing frames to a broker
//!
//! The rumqttc event loop runs in its own tokio task and reports the
//! connection state through a `watch` channel. The session side only reads
//! that state and queues publishes with `try_publish`, so a tick never waits
//! on the network.

use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::config::MqttConfig;
use super::{Transport, TransportError};
use crate::controller::InputFrame;

const DEFAULT_PORT: u16 = 1883;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Broker answered the connect with a refusal
    Failed,
    Reconnecting,
}

pub struct MqttTransport {
    name: String,
    topic: String,
    client: AsyncClient,
    state: watch::Receiver<ConnectionState>,
    event_loop: JoinHandle<()>,
}

impl MqttTransport {
    /// Creates the client and spawns its event loop.
    ///
    /// Returns immediately; the transport reports not ready until the broker
    /// acknowledged the connection. Must be called inside a tokio runtime.
    pub fn connect(config: &MqttConfig) -> Result<Self, TransportError> {
        let (host, port) = parse_address(&config.url)?;

        if config.client_id.is_empty() || config.client_id.starts_with(' ') {
            return Err(TransportError::InvalidClientId(config.client_id.clone()));
        }

        let mut options = MqttOptions::new(config.client_id.clone(), host.clone(), port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(1)));
        if let Some(user) = &config.user {
            options.set_credentials(user.clone(), config.password.clone().unwrap_or_default());
        }

        let (client, event_loop) = AsyncClient::new(options, config.channel_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        info!("Connecting to MQTT broker {}:{} as {}", host, port, config.client_id);
        let event_loop = tokio::spawn(run_event_loop(event_loop, state_tx));

        Ok(Self {
            name: format!("mqtt://{}:{}/{}", host, port, config.topic),
            topic: config.topic.clone(),
            client,
            state: state_rx,
            event_loop,
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver for observing connection changes, e.g. from the UI
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }
}

impl Transport for MqttTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn send(&mut self, frame: &InputFrame) -> Result<(), TransportError> {
        let payload = frame.encode()?;
        trace!("Publishing {} bytes to {}", payload.len(), self.topic);
        self.client
            .try_publish(self.topic.clone(), QoS::AtMostOnce, false, payload)?;
        Ok(())
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        debug!("Stopping MQTT event loop for {}", self.name);
        self.event_loop.abort();
    }
}

/// Drives the connection forever; rumqttc reconnects on the next poll after
/// an error.
async fn run_event_loop(mut event_loop: EventLoop, state: watch::Sender<ConnectionState>) {
    loop {
        let polled = event_loop.poll().await;
        match &polled {
            Ok(Event::Incoming(Packet::ConnAck(ack))) if ack.code == ConnectReturnCode::Success => {
                info!("MQTT connection established")
            }
            Ok(Event::Incoming(Packet::Disconnect)) => info!("MQTT broker closed the connection"),
            Ok(_) => {}
            Err(ConnectionError::ConnectionRefused(code)) => {
                warn!("MQTT broker refused connection: {:?}", code)
            }
            Err(e) => warn!("MQTT connection error: {}", e),
        }

        if let Some(next) = state_after_poll(&polled) {
            state.send_replace(next);
        }
        if polled.is_err() {
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }
}

/// Connection state implied by one poll result, `None` keeps the current one
fn state_after_poll(polled: &Result<Event, ConnectionError>) -> Option<ConnectionState> {
    match polled {
        Ok(Event::Incoming(Packet::ConnAck(ack))) if ack.code == ConnectReturnCode::Success => {
            Some(ConnectionState::Connected)
        }
        Ok(Event::Incoming(Packet::ConnAck(_))) => Some(ConnectionState::Failed),
        Ok(Event::Incoming(Packet::Disconnect)) => Some(ConnectionState::Disconnected),
        Ok(_) => None,
        Err(ConnectionError::ConnectionRefused(_)) => Some(ConnectionState::Failed),
        Err(_) => Some(ConnectionState::Reconnecting),
    }
}

/// Splits `host[:port]`, accepting an optional `mqtt://` or `tcp://` scheme
fn parse_address(url: &str) -> Result<(String, u16), TransportError> {
    let address = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url)
        .trim_end_matches('/');

    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| TransportError::InvalidAddress(url.to_string()))?;
            (host, port)
        }
        None => (address, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(TransportError::InvalidAddress(url.to_string()));
    }

    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("localhost:1883").unwrap(), ("localhost".to_string(), 1883));
        assert_eq!(parse_address("broker.lan").unwrap(), ("broker.lan".to_string(), 1883));
        assert_eq!(parse_address("mqtt://10.0.0.2:8883/").unwrap(), ("10.0.0.2".to_string(), 8883));
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(matches!(parse_address(":1883"), Err(TransportError::InvalidAddress(_))));
        assert!(matches!(parse_address("host:port"), Err(TransportError::InvalidAddress(_))));
        assert!(matches!(parse_address("host:70000"), Err(TransportError::InvalidAddress(_))));
    }

    #[test]
    fn test_refused_connection_fails() {
        let refused = Err(ConnectionError::ConnectionRefused(ConnectReturnCode::NotAuthorized));
        assert_eq!(state_after_poll(&refused), Some(ConnectionState::Failed));

        let bad_login = Err(ConnectionError::ConnectionRefused(
            ConnectReturnCode::BadUserNamePassword,
        ));
        assert_eq!(state_after_poll(&bad_login), Some(ConnectionState::Failed));
    }

    #[test]
    fn test_poll_results_drive_state() {
        let accepted = Ok(Event::Incoming(Packet::ConnAck(rumqttc::ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        })));
        assert_eq!(state_after_poll(&accepted), Some(ConnectionState::Connected));

        let closed = Ok(Event::Incoming(Packet::Disconnect));
        assert_eq!(state_after_poll(&closed), Some(ConnectionState::Disconnected));

        let ping = Ok(Event::Incoming(Packet::PingResp));
        assert_eq!(state_after_poll(&ping), None);

        let dropped = Err(ConnectionError::RequestsDone);
        assert_eq!(state_after_poll(&dropped), Some(ConnectionState::Reconnecting));
    }

    #[tokio::test]
    async fn test_unreachable_broker_is_not_ready() {
        let config = MqttConfig {
            url: "127.0.0.1:1".to_string(),
            ..MqttConfig::default()
        };
        let mut transport = MqttTransport::connect(&config).unwrap();

        assert!(!transport.is_ready());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!transport.is_ready());
        assert_ne!(transport.state(), ConnectionState::Connected);
        assert_eq!(transport.name(), "mqtt://127.0.0.1:1/touchcontroller/pad/0");

        // Queuing still works while offline, delivery is not promised
        assert!(transport.send(&InputFrame::default()).is_ok());
    }

    #[tokio::test]
    async fn test_empty_client_id_rejected() {
        let config = MqttConfig {
            client_id: String::new(),
            ..MqttConfig::default()
        };
        assert!(matches!(
            MqttTransport::connect(&config),
            Err(TransportError::InvalidClientId(_))
        ));
    }
}
