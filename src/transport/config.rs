use serde::{Deserialize, Serialize};

/// Broker connection settings for [`MqttTransport`](super::MqttTransport)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// `host:port`, port defaults to 1883 when omitted
    pub url: String,
    pub client_id: String,
    /// Topic every frame is published on
    pub topic: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    /// Capacity of the request queue between client and event loop
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: "localhost:1883".to_string(),
            client_id: "touchcontroller".to_string(),
            topic: "touchcontroller/pad/0".to_string(),
            user: None,
            password: None,
            keep_alive_secs: 5,
            channel_capacity: 10,
        }
    }
}
