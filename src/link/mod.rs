// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interface to the external device protocol client.
//!
//! The wire protocol (framing, checksums, register addressing) lives outside
//! this crate. The engine only requires a client that can connect, pull a
//! register snapshot, accept per-field writes, and announce connection and
//! fault events. [`DeviceLink`] is that seam.

mod snapshot;

pub use snapshot::StatusSnapshot;

use std::future::Future;

use tokio::sync::broadcast;

use crate::error::Result;
use crate::types::{FanSpeed, TargetTemperature, VentMode};

/// A write operation for one controllable register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCommand {
    /// Power the unit on or off (`PwrBtnState`).
    Power(bool),
    /// Set the fan speed target (`SpeedTarget`).
    Speed(FanSpeed),
    /// Set the climate mode (`ModeSet`).
    Mode(VentMode),
    /// Set the supply temperature target (`TemperTarget`).
    TargetTemperature(TargetTemperature),
}

/// Event pushed by the protocol client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The link came up.
    Connected,
    /// The link dropped.
    Disconnected,
    /// The device reported a fault (malformed reply, unsolicited error).
    /// Does not imply a disconnect.
    Error(String),
}

/// Contract the engine requires from a device protocol client.
///
/// Implementations wrap one TCP (or serial) connection to one Breezart unit.
/// All methods take `&self`; the client is shared behind an `Arc` between the
/// session task and the poll loop.
pub trait DeviceLink: Send + Sync + 'static {
    /// Initiates a connection attempt.
    ///
    /// `Ok` means the link is up; a [`LinkEvent::Connected`] notification is
    /// emitted as well. On failure the client stays disconnected.
    fn connect(&self) -> impl Future<Output = Result<()>> + Send;

    /// Returns `true` while the link is up.
    fn is_connected(&self) -> bool;

    /// Refreshes all status registers and returns the snapshot.
    fn pull_status(&self) -> impl Future<Output = Result<StatusSnapshot>> + Send;

    /// Forwards one write command to the device.
    ///
    /// The returned result reports device-side accept/reject and is the only
    /// completion channel for the command.
    fn write(&self, command: WriteCommand) -> impl Future<Output = Result<()>> + Send;

    /// Subscribes to connect/disconnect/fault notifications.
    fn subscribe(&self) -> broadcast::Receiver<LinkEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_command_is_copyable() {
        let cmd = WriteCommand::Speed(FanSpeed::clamped(4));
        let copied = cmd;
        assert_eq!(cmd, copied);
    }

    #[test]
    fn link_events_compare() {
        assert_eq!(LinkEvent::Connected, LinkEvent::Connected);
        assert_ne!(
            LinkEvent::Disconnected,
            LinkEvent::Error("checksum".to_string())
        );
    }
}
