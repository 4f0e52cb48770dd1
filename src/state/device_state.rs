// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronized device state record.

use std::time::Duration;

use tokio::time::Instant;

use crate::link::StatusSnapshot;
use crate::types::{FanSpeed, FilterLife, TargetTemperature, UnitState, VentMode};

use super::{DebounceTable, Field, StateChange};

/// Tracked state of one Breezart unit.
///
/// All fields are optional because nothing is known until the first
/// successful poll. Setters write optimistically; poll results flow in
/// through [`apply_snapshot`](Self::apply_snapshot), which respects the
/// override debounce for fields with a local-set path.
///
/// # Examples
///
/// ```
/// use breezart_sync::state::DeviceState;
/// use breezart_sync::types::FanSpeed;
///
/// let mut state = DeviceState::new();
/// assert!(state.rotation_speed().is_none());
///
/// state.set_rotation_speed(FanSpeed::clamped(4));
/// assert_eq!(state.rotation_speed(), Some(FanSpeed::clamped(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// Power-on flag (`PwrBtnState`).
    active: Option<bool>,
    /// Fan speed target (`SpeedTarget`).
    rotation_speed: Option<FanSpeed>,
    /// Measured supply air temperature (`TInf`).
    current_temperature: Option<f64>,
    /// Commanded climate mode (`ModeSet`).
    mode: Option<VentMode>,
    /// Running state (`Mode`).
    current_heater_cooler_state: Option<UnitState>,
    /// Supply temperature target (`TemperTarget`).
    heating_threshold_temperature: Option<TargetTemperature>,
    /// Filter change indication (`ChangeFilter`).
    filter_change: Option<bool>,
    /// Filter life level (`FilterDust`).
    filter_life_level: Option<FilterLife>,
    /// Firmware version as (major, minor).
    firmware: Option<(u16, u16)>,
    /// Unit speed bounds as (min, max).
    speed_limits: Option<(u8, u8)>,
    /// Unit temperature bounds as (min, max).
    temperature_limits: Option<(i16, i16)>,
}

impl DeviceState {
    /// Creates a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Power-on flag.
    #[must_use]
    pub fn active(&self) -> Option<bool> {
        self.active
    }

    /// Optimistically sets the power-on flag.
    pub fn set_active(&mut self, value: bool) {
        self.active = Some(value);
    }

    /// Fan speed target.
    #[must_use]
    pub fn rotation_speed(&self) -> Option<FanSpeed> {
        self.rotation_speed
    }

    /// Optimistically sets the fan speed target.
    pub fn set_rotation_speed(&mut self, value: FanSpeed) {
        self.rotation_speed = Some(value);
    }

    /// Measured supply air temperature in degrees Celsius. Poll-only.
    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.current_temperature
    }

    /// Climate mode.
    #[must_use]
    pub fn mode(&self) -> Option<VentMode> {
        self.mode
    }

    /// Optimistically sets the climate mode.
    pub fn set_mode(&mut self, value: VentMode) {
        self.mode = Some(value);
    }

    /// Running state derived by the unit. Poll-only.
    #[must_use]
    pub fn current_heater_cooler_state(&self) -> Option<UnitState> {
        self.current_heater_cooler_state
    }

    /// Supply temperature target.
    #[must_use]
    pub fn heating_threshold_temperature(&self) -> Option<TargetTemperature> {
        self.heating_threshold_temperature
    }

    /// Optimistically sets the supply temperature target.
    pub fn set_heating_threshold_temperature(&mut self, value: TargetTemperature) {
        self.heating_threshold_temperature = Some(value);
    }

    /// Filter change indication. Poll-only.
    #[must_use]
    pub fn filter_change(&self) -> Option<bool> {
        self.filter_change
    }

    /// Filter life level. Poll-only.
    #[must_use]
    pub fn filter_life_level(&self) -> Option<FilterLife> {
        self.filter_life_level
    }

    /// Firmware version as (major, minor). Poll-only.
    #[must_use]
    pub fn firmware(&self) -> Option<(u16, u16)> {
        self.firmware
    }

    /// Unit speed bounds as (min, max). Poll-only.
    #[must_use]
    pub fn speed_limits(&self) -> Option<(u8, u8)> {
        self.speed_limits
    }

    /// Unit temperature bounds as (min, max). Poll-only.
    #[must_use]
    pub fn temperature_limits(&self) -> Option<(i16, i16)> {
        self.temperature_limits
    }

    /// Applies a poll snapshot, honoring the override debounce.
    ///
    /// Fields with a local-set path are overwritten only when
    /// [`DebounceTable::may_apply_poll`] admits them; read-only telemetry is
    /// always overwritten. Assignment is idempotent: applying the same
    /// snapshot twice yields the same state and no further changes.
    ///
    /// Returns the list of fields that actually changed.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &StatusSnapshot,
        debounce: &DebounceTable,
        now: Instant,
        window: Duration,
    ) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if debounce.may_apply_poll(Field::Active, now, window)
            && self.active != Some(snapshot.power_on)
        {
            self.active = Some(snapshot.power_on);
            changes.push(StateChange::Active(snapshot.power_on));
        }

        if debounce.may_apply_poll(Field::RotationSpeed, now, window)
            && self.rotation_speed != Some(snapshot.speed_target)
        {
            self.rotation_speed = Some(snapshot.speed_target);
            changes.push(StateChange::RotationSpeed(snapshot.speed_target));
        }

        if debounce.may_apply_poll(Field::Mode, now, window) && self.mode != Some(snapshot.mode_set)
        {
            self.mode = Some(snapshot.mode_set);
            changes.push(StateChange::Mode(snapshot.mode_set));
        }

        if debounce.may_apply_poll(Field::HeatingThreshold, now, window)
            && self.heating_threshold_temperature != Some(snapshot.temperature_target)
        {
            self.heating_threshold_temperature = Some(snapshot.temperature_target);
            changes.push(StateChange::HeatingThreshold(snapshot.temperature_target));
        }

        // Read-only telemetry never consults the debounce table.
        if let Some(temp) = snapshot.supply_temperature
            && self.current_temperature != Some(temp)
        {
            self.current_temperature = Some(temp);
            changes.push(StateChange::CurrentTemperature(temp));
        }

        if self.current_heater_cooler_state != Some(snapshot.unit_state) {
            self.current_heater_cooler_state = Some(snapshot.unit_state);
            changes.push(StateChange::UnitState(snapshot.unit_state));
        }

        if self.filter_change != Some(snapshot.filter_change) {
            self.filter_change = Some(snapshot.filter_change);
            changes.push(StateChange::FilterChange(snapshot.filter_change));
        }

        if self.filter_life_level != Some(snapshot.filter_dust) {
            self.filter_life_level = Some(snapshot.filter_dust);
            changes.push(StateChange::FilterLifeLevel(snapshot.filter_dust));
        }

        if let Some(fw) = snapshot.firmware
            && self.firmware != Some(fw)
        {
            self.firmware = Some(fw);
            changes.push(StateChange::Firmware(fw));
        }

        if let Some(limits) = snapshot.speed_limits
            && self.speed_limits != Some(limits)
        {
            self.speed_limits = Some(limits);
            changes.push(StateChange::SpeedLimits(limits));
        }

        if let Some(limits) = snapshot.temperature_limits
            && self.temperature_limits != Some(limits)
        {
            self.temperature_limits = Some(limits);
            changes.push(StateChange::TemperatureLimits(limits));
        }

        changes
    }
}
