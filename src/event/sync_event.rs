// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronization event types.

use crate::energy::EnergyRecord;
use crate::error::PollFailure;
use crate::state::{DeviceState, StateChange};

use super::DeviceId;

/// Events broadcast by the synchronization engine.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The session transitioned between connected and disconnected.
    ConnectionChanged {
        /// The device this event concerns.
        device_id: DeviceId,
        /// Whether the session is now connected.
        connected: bool,
    },

    /// A poll updated one field of the synchronized state.
    StateChanged {
        /// The device this event concerns.
        device_id: DeviceId,
        /// The specific field change.
        change: StateChange,
        /// The complete state after the change.
        state: DeviceState,
    },

    /// A successful poll tick advanced the energy total, or a reset was
    /// applied.
    EnergyUpdated {
        /// The device this event concerns.
        device_id: DeviceId,
        /// The persisted record after the update.
        record: EnergyRecord,
    },

    /// A status pull failed or the device reported a fault; the previous
    /// state is retained.
    PollFailed {
        /// The device this event concerns.
        device_id: DeviceId,
        /// Summary of the failure, as also exposed via `last_error`.
        failure: PollFailure,
    },
}

impl SyncEvent {
    /// Returns the device ID associated with this event.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::ConnectionChanged { device_id, .. }
            | Self::StateChanged { device_id, .. }
            | Self::EnergyUpdated { device_id, .. }
            | Self::PollFailed { device_id, .. } => *device_id,
        }
    }

    /// Creates a connected event.
    #[must_use]
    pub fn connected(device_id: DeviceId) -> Self {
        Self::ConnectionChanged {
            device_id,
            connected: true,
        }
    }

    /// Creates a disconnected event.
    #[must_use]
    pub fn disconnected(device_id: DeviceId) -> Self {
        Self::ConnectionChanged {
            device_id,
            connected: false,
        }
    }

    /// Creates a state-changed event.
    #[must_use]
    pub fn state_changed(device_id: DeviceId, change: StateChange, state: DeviceState) -> Self {
        Self::StateChanged {
            device_id,
            change,
            state,
        }
    }

    /// Creates an energy-updated event.
    #[must_use]
    pub fn energy_updated(device_id: DeviceId, record: EnergyRecord) -> Self {
        Self::EnergyUpdated { device_id, record }
    }

    /// Creates a poll-failed event.
    #[must_use]
    pub fn poll_failed(device_id: DeviceId, failure: PollFailure) -> Self {
        Self::PollFailed { device_id, failure }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_extraction() {
        let id = DeviceId::new();

        assert_eq!(SyncEvent::connected(id).device_id(), id);
        assert_eq!(SyncEvent::disconnected(id).device_id(), id);
        assert_eq!(
            SyncEvent::energy_updated(id, EnergyRecord::default()).device_id(),
            id
        );
    }

    #[test]
    fn connection_events_carry_direction() {
        let id = DeviceId::new();

        let SyncEvent::ConnectionChanged { connected, .. } = SyncEvent::connected(id) else {
            panic!("expected ConnectionChanged");
        };
        assert!(connected);

        let SyncEvent::ConnectionChanged { connected, .. } = SyncEvent::disconnected(id) else {
            panic!("expected ConnectionChanged");
        };
        assert!(!connected);
    }
}
