// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target temperature setpoint type.

use std::fmt;

use crate::error::ValueError;

/// Supply air temperature setpoint in whole degrees Celsius.
///
/// Breezart accepts setpoints between 5 and 45 degrees (`TemperTarget`
/// register). Individual units may narrow this further; the narrowed bounds
/// come back with every status snapshot.
///
/// # Examples
///
/// ```
/// use breezart_sync::types::TargetTemperature;
///
/// let target = TargetTemperature::new(24).unwrap();
/// assert_eq!(target.value(), 24);
/// assert!(TargetTemperature::new(60).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TargetTemperature(i16);

impl TargetTemperature {
    /// Lowest accepted setpoint.
    pub const MIN: Self = Self(5);

    /// Highest accepted setpoint.
    pub const MAX: Self = Self(45);

    /// Creates a new temperature setpoint.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value lies outside 5-45.
    pub fn new(value: i16) -> Result<Self, ValueError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: i32::from(Self::MIN.0),
                max: i32::from(Self::MAX.0),
                actual: i32::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a setpoint, clamping to the accepted range.
    #[must_use]
    pub const fn clamped(value: i16) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Returns the setpoint in degrees Celsius.
    #[must_use]
    pub const fn value(&self) -> i16 {
        self.0
    }
}

impl fmt::Display for TargetTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{b0}C", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_setpoints() {
        assert_eq!(TargetTemperature::new(5).unwrap(), TargetTemperature::MIN);
        assert_eq!(TargetTemperature::new(45).unwrap(), TargetTemperature::MAX);
        assert_eq!(TargetTemperature::new(24).unwrap().value(), 24);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(TargetTemperature::new(4).is_err());
        assert!(TargetTemperature::new(46).is_err());
        assert!(TargetTemperature::new(-10).is_err());
    }

    #[test]
    fn clamping() {
        assert_eq!(TargetTemperature::clamped(0).value(), 5);
        assert_eq!(TargetTemperature::clamped(100).value(), 45);
        assert_eq!(TargetTemperature::clamped(22).value(), 22);
    }

    #[test]
    fn display() {
        assert_eq!(TargetTemperature::new(24).unwrap().to_string(), "24°C");
    }
}
