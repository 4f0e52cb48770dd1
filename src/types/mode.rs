// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ventilation mode registers.
//!
//! Breezart exposes two related registers: `ModeSet`, the commanded climate
//! mode (writable, values 1-4 where 4 disables climate control entirely),
//! and `Mode`, the read-only running state the unit derives from it.

use std::fmt;

use crate::error::ValueError;

/// Commanded climate mode (`ModeSet` register, values 1-4).
///
/// # Examples
///
/// ```
/// use breezart_sync::types::VentMode;
///
/// let mode = VentMode::try_from(4).unwrap();
/// assert_eq!(mode, VentMode::ClimateOff);
/// assert!(mode.is_climate_off());
/// assert_eq!(VentMode::Heat.register(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum VentMode {
    /// Heating mode.
    Heat,
    /// Cooling mode.
    Cool,
    /// Automatic heating/cooling.
    Auto,
    /// Climate control switched off (ventilation only).
    ClimateOff,
}

impl VentMode {
    /// Returns the raw `ModeSet` register value (1-4).
    #[must_use]
    pub const fn register(&self) -> u8 {
        match self {
            Self::Heat => 1,
            Self::Cool => 2,
            Self::Auto => 3,
            Self::ClimateOff => 4,
        }
    }

    /// Returns `true` if climate control is switched off.
    #[must_use]
    pub const fn is_climate_off(&self) -> bool {
        matches!(self, Self::ClimateOff)
    }
}

impl TryFrom<u8> for VentMode {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, ValueError> {
        match value {
            1 => Ok(Self::Heat),
            2 => Ok(Self::Cool),
            3 => Ok(Self::Auto),
            4 => Ok(Self::ClimateOff),
            other => Err(ValueError::InvalidMode(other)),
        }
    }
}

impl fmt::Display for VentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Auto => "auto",
            Self::ClimateOff => "climate-off",
        };
        write!(f, "{name}")
    }
}

/// Running state the unit reports (`Mode` register).
///
/// This is the derived display state: heating and cooling each cover two
/// raw register values (active and second-stage), 4 means idle, and any
/// other value means the climate stage is inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum UnitState {
    /// The unit is actively heating.
    Heating,
    /// The unit is actively cooling.
    Cooling,
    /// The unit is running but the climate stage is idle.
    Idle,
    /// The climate stage is inactive.
    Inactive,
}

impl UnitState {
    /// Maps the raw `Mode` register value onto a running state.
    #[must_use]
    pub const fn from_register(value: u8) -> Self {
        match value {
            0 | 2 => Self::Heating,
            1 | 3 => Self::Cooling,
            4 => Self::Idle,
            _ => Self::Inactive,
        }
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heating => "heating",
            Self::Cooling => "cooling",
            Self::Idle => "idle",
            Self::Inactive => "inactive",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_register_round_trip() {
        for raw in 1..=4u8 {
            let mode = VentMode::try_from(raw).unwrap();
            assert_eq!(mode.register(), raw);
        }
    }

    #[test]
    fn invalid_mode_rejected() {
        assert!(matches!(VentMode::try_from(0), Err(ValueError::InvalidMode(0))));
        assert!(matches!(VentMode::try_from(5), Err(ValueError::InvalidMode(5))));
    }

    #[test]
    fn climate_off_detection() {
        assert!(VentMode::ClimateOff.is_climate_off());
        assert!(!VentMode::Heat.is_climate_off());
    }

    #[test]
    fn unit_state_mapping() {
        assert_eq!(UnitState::from_register(0), UnitState::Heating);
        assert_eq!(UnitState::from_register(1), UnitState::Cooling);
        assert_eq!(UnitState::from_register(2), UnitState::Heating);
        assert_eq!(UnitState::from_register(3), UnitState::Cooling);
        assert_eq!(UnitState::from_register(4), UnitState::Idle);
        assert_eq!(UnitState::from_register(9), UnitState::Inactive);
    }

    #[test]
    fn display_names() {
        assert_eq!(VentMode::ClimateOff.to_string(), "climate-off");
        assert_eq!(UnitState::Idle.to_string(), "idle");
    }
}
