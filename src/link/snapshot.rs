// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One pulled register image.

use crate::types::{FanSpeed, FilterLife, TargetTemperature, UnitState, VentMode};

/// A complete register image from one status pull.
///
/// Every successful pull produces one snapshot; the engine applies it to the
/// synchronized state through the override debounce table. Fields that a
/// particular firmware does not report stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Power button state (`PwrBtnState`).
    pub power_on: bool,
    /// Commanded fan speed (`SpeedTarget`).
    pub speed_target: FanSpeed,
    /// Commanded supply temperature (`TemperTarget`).
    pub temperature_target: TargetTemperature,
    /// Measured supply air temperature in degrees Celsius (`TInf`).
    pub supply_temperature: Option<f64>,
    /// Commanded climate mode (`ModeSet`).
    pub mode_set: VentMode,
    /// Running state the unit derives (`Mode`).
    pub unit_state: UnitState,
    /// Filter change indication (`ChangeFilter`).
    pub filter_change: bool,
    /// Filter contamination level (`FilterDust`).
    pub filter_dust: FilterLife,
    /// Instantaneous power draw in watts.
    pub power_w: f64,
    /// Firmware version as (major, minor), when reported.
    pub firmware: Option<(u16, u16)>,
    /// Unit-specific speed bounds as (min, max), when reported.
    pub speed_limits: Option<(u8, u8)>,
    /// Unit-specific temperature bounds as (min, max), when reported.
    pub temperature_limits: Option<(i16, i16)>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            power_on: false,
            speed_target: FanSpeed::MIN,
            temperature_target: TargetTemperature::MIN,
            supply_temperature: None,
            mode_set: VentMode::ClimateOff,
            unit_state: UnitState::Inactive,
            filter_change: false,
            filter_dust: FilterLife::Unknown,
            power_w: 0.0,
            firmware: None,
            speed_limits: None,
            temperature_limits: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_inert() {
        let snap = StatusSnapshot::default();
        assert!(!snap.power_on);
        assert_eq!(snap.mode_set, VentMode::ClimateOff);
        assert_eq!(snap.filter_dust, FilterLife::Unknown);
        assert!(snap.supply_temperature.is_none());
    }

    #[test]
    fn snapshots_compare_by_value() {
        let a = StatusSnapshot {
            power_on: true,
            ..StatusSnapshot::default()
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
