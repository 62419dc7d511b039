//! Per-connection limits configuration.

use serde::Deserialize;

use super::defaults::{
    default_max_line_length, default_message_burst, default_message_rate, default_send_queue,
};

/// Per-connection limits.
///
/// These bound how fast a single client may talk, how long a line may be,
/// and how far a slow reader may fall behind before fan-out starts dropping.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Sustained lines per second; 0 disables flood control (default: 0).
    #[serde(default = "default_message_rate")]
    pub message_rate_per_second: f32,
    /// Token bucket size, used when a rate is set (default: 20).
    #[serde(default = "default_message_burst")]
    pub message_burst: f32,
    /// Longest accepted line in bytes, terminator included (default: 4096).
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Outgoing queue capacity per connection (default: 64).
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            message_rate_per_second: default_message_rate(),
            message_burst: default_message_burst(),
            max_line_length: default_max_line_length(),
            send_queue: default_send_queue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_correct() {
        let config = LimitsConfig::default();
        assert_eq!(config.message_rate_per_second, 0.0);
        assert_eq!(config.message_burst, 20.0);
        assert_eq!(config.max_line_length, 4096);
        assert_eq!(config.send_queue, 64);
    }

    #[test]
    fn partial_table_fills_defaults() {
        let config: LimitsConfig = toml::from_str("send_queue = 8").unwrap();
        assert_eq!(config.send_queue, 8);
        assert_eq!(config.max_line_length, 4096);
    }
}
