//! Session configuration.

use std::time::Duration;

use hid_witmotion_protocol::{
    DEFAULT_CHANNEL_COUNT, ProtocolVersion, ServoCommandEncoder, WITMOTION_PRODUCT_ID,
    WITMOTION_VENDOR_ID,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ServoError, ServoResult};

const SERIAL_ENV: &str = "WITMOTION_SERIAL";
const CHANNELS_ENV: &str = "WITMOTION_CHANNELS";
const PROTOCOL_ENV: &str = "WITMOTION_PROTOCOL";
const HEARTBEAT_TIMEOUT_ENV: &str = "WITMOTION_HEARTBEAT_TIMEOUT_MS";

/// Default deadline for [`ServoBoard::heartbeat`](crate::ServoBoard::heartbeat).
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_millis(100);

/// Default sleep between heartbeat polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Which board to bind and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Board to bind. The first matching board is used when absent.
    pub serial: Option<String>,
    pub channels: u8,
    pub protocol: ProtocolVersion,
    pub heartbeat_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            vendor_id: WITMOTION_VENDOR_ID,
            product_id: WITMOTION_PRODUCT_ID,
            serial: None,
            channels: DEFAULT_CHANNEL_COUNT,
            protocol: ProtocolVersion::Revised,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ServoConfig {
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Check the configuration can drive a session.
    pub fn validate(&self) -> ServoResult<()> {
        self.protocol
            .validate_channel_count(self.channels)
            .map_err(|e| ServoError::Config(e.to_string()))?;
        if self.poll_interval.is_zero() {
            return Err(ServoError::Config("poll interval must be greater than zero".to_string()));
        }
        if self.serial.as_deref().is_some_and(str::is_empty) {
            return Err(ServoError::Config("serial must not be empty".to_string()));
        }
        Ok(())
    }

    /// Encoder matching this configuration's profile and channel count.
    pub fn encoder(&self) -> ServoResult<ServoCommandEncoder> {
        ServoCommandEncoder::new(self.protocol, self.channels)
            .map_err(|e| ServoError::Config(e.to_string()))
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            serial: self.serial.clone(),
            channel_count: self.channels,
        }
    }

    /// Defaults overlaid with `WITMOTION_*` environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `WITMOTION_SERIAL` | `serial` |
    /// | `WITMOTION_CHANNELS` | `channels` |
    /// | `WITMOTION_PROTOCOL` | `protocol` (`original`/`v1`, `revised`/`v2`) |
    /// | `WITMOTION_HEARTBEAT_TIMEOUT_MS` | `heartbeat_timeout` |
    ///
    /// A variable that is set but unparseable is an error rather than being
    /// ignored.
    pub fn from_env() -> ServoResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_env_with<F>(lookup: F) -> ServoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(serial) = lookup(SERIAL_ENV) {
            let serial = serial.trim();
            if !serial.is_empty() {
                config.serial = Some(serial.to_string());
            }
        }
        if let Some(raw) = lookup(CHANNELS_ENV) {
            config.channels = raw
                .trim()
                .parse()
                .map_err(|_| invalid_env(CHANNELS_ENV, &raw))?;
        }
        if let Some(raw) = lookup(PROTOCOL_ENV) {
            config.protocol =
                ProtocolVersion::parse(&raw).ok_or_else(|| invalid_env(PROTOCOL_ENV, &raw))?;
        }
        if let Some(raw) = lookup(HEARTBEAT_TIMEOUT_ENV) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid_env(HEARTBEAT_TIMEOUT_ENV, &raw))?;
            config.heartbeat_timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        debug!(?config, "servo config loaded from environment");
        Ok(config)
    }
}

fn invalid_env(key: &str, raw: &str) -> ServoError {
    ServoError::Config(format!("{key}: unrecognised value {raw:?}"))
}

/// The board a session is bound to. Fixed when the session is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub channel_count: u8,
}
