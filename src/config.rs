// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::DeviceId;

/// Default Breezart TCP control port.
const DEFAULT_PORT: u16 = 1560;

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Connection settings for one Breezart unit.
///
/// # Examples
///
/// ```
/// use breezart_sync::config::DeviceConfig;
///
/// let config = DeviceConfig::new("Living Room", "192.168.1.20")
///     .with_port(1560)
///     .with_password(12345);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Display name of the unit.
    pub name: String,
    /// Host or IP address.
    pub host: String,
    /// TCP control port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Access password configured on the unit.
    #[serde(default)]
    pub password: u32,
}

impl DeviceConfig {
    /// Creates a configuration with the default port and no password.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            password: 0,
        }
    }

    /// Sets the TCP control port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the access password.
    #[must_use]
    pub fn with_password(mut self, password: u32) -> Self {
        self.password = password;
        self
    }

    /// Checks that the configuration names a reachable device.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when the name or host is empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("device has no name".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "device '{}' has no host",
                self.name
            )));
        }
        Ok(())
    }

    /// Derives the stable device identity used as the persistence key.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        DeviceId::from_endpoint(&self.host, self.port)
    }
}

/// Reconnect policy after a dropped link.
///
/// The default is a fixed 5 second delay with unbounded retries. Unbounded
/// is deliberate for always-on local-network appliances; deployments that
/// prefer to give up can bound it with
/// [`with_max_retries`](Self::with_max_retries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before each reconnect attempt.
    pub retry_delay: Duration,
    /// Maximum connect attempts per reconnect sequence (`None` = unbounded).
    pub max_retries: Option<u32>,
}

impl ReconnectPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay before each reconnect attempt.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Bounds the number of connect attempts per reconnect sequence.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Removes the attempt bound.
    #[must_use]
    pub fn with_unbounded_retries(mut self) -> Self {
        self.max_retries = None;
        self
    }

    /// Returns true if another attempt should follow `attempts` failures.
    #[must_use]
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.is_none_or(|max| attempts < max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(5),
            max_retries: None,
        }
    }
}

/// Tunables of the synchronization engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Period of the poll loop.
    pub poll_interval: Duration,
    /// Time after a local set during which poll results for that field are
    /// suppressed.
    pub debounce_window: Duration,
    /// Reconnect policy.
    pub reconnect: ReconnectPolicy,
}

impl SyncConfig {
    /// Creates the default configuration (1 s polls, 3 s debounce).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the override debounce window.
    #[must_use]
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Sets the reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            debounce_window: Duration::from_millis(3000),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_config_defaults() {
        let config = DeviceConfig::new("Unit", "10.0.0.5");
        assert_eq!(config.port, 1560);
        assert_eq!(config.password, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        let config = DeviceConfig::new("  ", "10.0.0.5");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn empty_host_rejected() {
        let config = DeviceConfig::new("Unit", "");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn device_id_is_stable_per_endpoint() {
        let a = DeviceConfig::new("A", "10.0.0.5").device_id();
        let b = DeviceConfig::new("B", "10.0.0.5").device_id();
        assert_eq!(a, b);

        let c = DeviceConfig::new("A", "10.0.0.5").with_port(1561).device_id();
        assert_ne!(a, c);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: DeviceConfig =
            serde_json::from_str(r#"{"name": "Unit", "host": "10.0.0.5"}"#).unwrap();
        assert_eq!(config.port, 1560);
        assert_eq!(config.password, 0);
    }

    #[test]
    fn reconnect_policy_defaults() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
        assert!(policy.max_retries.is_none());
        assert!(policy.should_retry(1_000_000));
    }

    #[test]
    fn bounded_retries() {
        let policy = ReconnectPolicy::new().with_max_retries(3);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn sync_config_builders() {
        let config = SyncConfig::new()
            .with_poll_interval(Duration::from_millis(500))
            .with_debounce_window(Duration::from_secs(5))
            .with_reconnect(ReconnectPolicy::new().with_max_retries(1));

        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.debounce_window, Duration::from_secs(5));
        assert_eq!(config.reconnect.max_retries, Some(1));
    }
}
