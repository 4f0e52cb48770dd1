// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed register values for Breezart ventilation units.
//!
//! Each type wraps one device register and validates its range at
//! construction, so the rest of the engine never handles raw out-of-range
//! integers.

mod filter;
mod mode;
mod speed;
mod temperature;

pub use filter::FilterLife;
pub use mode::{UnitState, VentMode};
pub use speed::FanSpeed;
pub use temperature::TargetTemperature;
