// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

use uuid::Uuid;

/// Unique identifier for a synchronized device.
///
/// Used as the persistence key for energy records, so it must be stable
/// across restarts: [`from_endpoint`](Self::from_endpoint) derives a
/// deterministic UUID (v5) from the device's host and port. [`new`](Self::new)
/// creates a random id for throwaway instances such as tests.
///
/// # Examples
///
/// ```
/// use breezart_sync::event::DeviceId;
///
/// let a = DeviceId::from_endpoint("192.168.1.20", 1560);
/// let b = DeviceId::from_endpoint("192.168.1.20", 1560);
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Creates a new random device identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derives a stable identifier from the device endpoint.
    #[must_use]
    pub fn from_endpoint(host: &str, port: u16) -> Self {
        let name = format!("{host}:{port}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }

    /// Creates a device identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let short = &self.0.to_string()[..8];
        write!(f, "DeviceId({short}...)")
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DeviceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_unique_ids() {
        assert_ne!(DeviceId::new(), DeviceId::new());
    }

    #[test]
    fn endpoint_ids_are_stable() {
        let a = DeviceId::from_endpoint("breezart.local", 1560);
        let b = DeviceId::from_endpoint("breezart.local", 1560);
        assert_eq!(a, b);
    }

    #[test]
    fn endpoint_ids_differ_by_port() {
        let a = DeviceId::from_endpoint("breezart.local", 1560);
        let b = DeviceId::from_endpoint("breezart.local", 1561);
        assert_ne!(a, b);
    }

    #[test]
    fn debug_format_is_short() {
        let id = DeviceId::new();
        let debug = format!("{id:?}");
        assert!(debug.starts_with("DeviceId("));
        assert!(debug.ends_with("...)"));
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        let id = DeviceId::new();
        set.insert(id);
        assert!(set.contains(&id));
    }
}
