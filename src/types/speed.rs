// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed setpoint type.
//!
//! Breezart units accept speed setpoints on a 0-10 register scale. Accessory
//! layers that work in percent (0-100) convert with a factor of ten.

use std::fmt;

use crate::error::ValueError;

/// Fan speed setpoint on the device's 0-10 register scale.
///
/// # Examples
///
/// ```
/// use breezart_sync::types::FanSpeed;
///
/// let speed = FanSpeed::new(4).unwrap();
/// assert_eq!(speed.value(), 4);
/// assert_eq!(speed.as_percent(), 40);
///
/// // Invalid register values return an error
/// assert!(FanSpeed::new(11).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Minimum speed (fan stopped).
    pub const MIN: Self = Self(0);

    /// Maximum speed.
    pub const MAX: Self = Self(10);

    /// Creates a new fan speed setpoint.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value exceeds 10.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 10 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 10,
                actual: i32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a fan speed, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 10 { Self(10) } else { Self(value) }
    }

    /// Returns the raw register value (0-10).
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the speed as a percentage (0-100).
    #[must_use]
    pub const fn as_percent(&self) -> u8 {
        self.0 * 10
    }

    /// Creates a fan speed from a percentage (0-100), rounding to the
    /// nearest register step.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the percentage exceeds 100.
    pub fn from_percent(percent: u8) -> Result<Self, ValueError> {
        if percent > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i32::from(percent),
            });
        }
        Ok(Self((percent + 5) / 10))
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
