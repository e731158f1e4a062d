use crate::core::constants::{
    BLOCK_INTERVAL, DEFAULT_CONFIRMATIONS, DEFAULT_DEADLINE_BLOCKS, DEFAULT_POLL_INTERVAL,
    SIMPLE_TRANSFER_GAS_LIMIT,
};
use crate::error::ConfigError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Where in a receipt the factory reports the new wallet address.
///
/// This is a property of the deployed factory's event ordering, so it is configured per
/// deployment rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPosition {
    /// Index into the receipt's logs
    pub log_index: usize,

    /// Index into that log's topics; topic 0 is the event signature
    pub topic_index: usize,
}

impl LogPosition {
    pub const fn new(log_index: usize, topic_index: usize) -> Self {
        Self {
            log_index,
            topic_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeMode {
    /// Single `gasPrice` from `eth_gasPrice`
    #[default]
    Legacy,
    Eip1559,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub factory_address: Address,
    pub create_log: LogPosition,
    pub recreate_log: LogPosition,
    pub confirmation_deadline_secs: u64,
    pub poll_interval_ms: u64,
    pub confirmations: u64,
    pub simple_transfer_gas_limit: u64,
    pub fee_mode: FeeMode,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            factory_address: Address::ZERO,
            create_log: LogPosition::new(0, 2),
            recreate_log: LogPosition::new(1, 2),
            confirmation_deadline_secs: BLOCK_INTERVAL.as_secs() * u64::from(DEFAULT_DEADLINE_BLOCKS),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            confirmations: DEFAULT_CONFIRMATIONS,
            simple_transfer_gas_limit: SIMPLE_TRANSFER_GAS_LIMIT,
            fee_mode: FeeMode::Legacy,
        }
    }
}

impl SdkConfig {
    pub fn new(factory_address: Address) -> Self {
        Self {
            factory_address,
            ..Self::default()
        }
    }

    pub fn with_confirmation_deadline(mut self, deadline: Duration) -> Self {
        self.confirmation_deadline_secs = deadline.as_secs();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn with_fee_mode(mut self, fee_mode: FeeMode) -> Self {
        self.fee_mode = fee_mode;
        self
    }

    pub fn with_log_positions(mut self, create: LogPosition, recreate: LogPosition) -> Self {
        self.create_log = create;
        self.recreate_log = recreate;
        self
    }

    pub fn confirmation_deadline(&self) -> Duration {
        Duration::from_secs(self.confirmation_deadline_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.factory_address == Address::ZERO {
            return Err(ConfigError::Invalid("factory_address must be set".into()));
        }
        if self.confirmation_deadline_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirmation_deadline_secs must be non-zero".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be non-zero".into()));
        }
        if self.confirmations == 0 {
            return Err(ConfigError::Invalid("confirmations must be at least 1".into()));
        }
        // A log carries at most four topics.
        for (name, position) in [("create_log", self.create_log), ("recreate_log", self.recreate_log)] {
            if position.topic_index > 3 {
                return Err(ConfigError::Invalid(format!(
                    "{name}.topic_index {} is out of range",
                    position.topic_index
                )));
            }
        }
        Ok(())
    }
}
