// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Filter contamination level.

use std::fmt;

/// Remaining filter life reported by the `FilterDust` register.
///
/// The register carries 255 when the unit cannot estimate the level; values
/// above 100 are clamped to 100.
///
/// # Examples
///
/// ```
/// use breezart_sync::types::FilterLife;
///
/// assert_eq!(FilterLife::from_register(42).as_percent(), Some(42));
/// assert_eq!(FilterLife::from_register(255), FilterLife::Unknown);
/// assert_eq!(FilterLife::from_register(120).as_percent(), Some(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum FilterLife {
    /// Level in percent (0-100).
    Percent(u8),
    /// The unit does not report a level.
    Unknown,
}

impl FilterLife {
    /// Maps the raw `FilterDust` register value onto a filter life level.
    #[must_use]
    pub const fn from_register(value: u8) -> Self {
        match value {
            255 => Self::Unknown,
            v if v > 100 => Self::Percent(100),
            v => Self::Percent(v),
        }
    }

    /// Returns the level in percent, or `None` if unknown.
    #[must_use]
    pub const fn as_percent(&self) -> Option<u8> {
        match self {
            Self::Percent(v) => Some(*v),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for FilterLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(v) => write!(f, "{v}%"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
