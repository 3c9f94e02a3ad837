use evmctl_common::{
    config::{BLOCKS_PER_HOUR, GAS_ESTIMATE_FALLBACK, GAS_MARGIN_PERCENT},
    rpc::client::HttpChannelConfig,
};

/// Settings of a [`ChainTimeController`](super::ChainTimeController)
///
/// `channel` is only used by [`ChainTimeController::connect`](super::ChainTimeController::connect);
/// controllers built on an existing channel ignore it.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub channel: HttpChannelConfig,
    /// Gas estimates are multiplied by `gas_margin_percent / 100`, rounded up
    pub gas_margin_percent: u64,
    /// Returned by gas estimation whenever the estimate fails
    pub gas_fallback: String,
    /// Blocks mined per simulated hour by `mine_hours`
    pub blocks_per_hour: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            channel: HttpChannelConfig::default(),
            gas_margin_percent: GAS_MARGIN_PERCENT,
            gas_fallback: GAS_ESTIMATE_FALLBACK.to_string(),
            blocks_per_hour: BLOCKS_PER_HOUR,
        }
    }
}

impl ControllerConfig {
    /// Defaults, with the node endpoint read from `EVMCTL_RPC_URL` and
    /// `EVMCTL_REQUEST_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self {
            channel: HttpChannelConfig::from_env(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.channel.url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.gas_margin_percent, 150);
        assert_eq!(config.gas_fallback, "5000000");
        assert_eq!(config.blocks_per_hour, 3600);
        assert_eq!(config.channel.url, "http://127.0.0.1:8545");

        let config = config.with_url("http://node:8545");
        assert_eq!(config.channel.url, "http://node:8545");
    }
}
