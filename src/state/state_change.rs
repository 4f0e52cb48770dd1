// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Individual state changes produced by applying a snapshot.

use crate::types::{FanSpeed, FilterLife, TargetTemperature, UnitState, VentMode};

/// One field change observed while applying a poll snapshot.
///
/// The engine publishes a `StateChange` for every field that actually moved,
/// so subscribers can push updates without diffing full records themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    /// Power-on flag changed.
    Active(bool),
    /// Fan speed target changed.
    RotationSpeed(FanSpeed),
    /// Measured supply temperature changed.
    CurrentTemperature(f64),
    /// Climate mode changed.
    Mode(VentMode),
    /// Running state changed.
    UnitState(UnitState),
    /// Supply temperature target changed.
    HeatingThreshold(TargetTemperature),
    /// Filter change indication flipped.
    FilterChange(bool),
    /// Filter life level changed.
    FilterLifeLevel(FilterLife),
    /// Firmware version became known or changed.
    Firmware((u16, u16)),
    /// Speed bounds became known or changed.
    SpeedLimits((u8, u8)),
    /// Temperature bounds became known or changed.
    TemperatureLimits((i16, i16)),
}
