// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted energy accumulation.
//!
//! Breezart units report instantaneous power draw but no consumption
//! counter, so the engine integrates the sampled value itself: on every
//! successful poll tick the persisted total is loaded, one tick's worth of
//! energy is added, and the result is written back. A process restart
//! therefore loses at most one tick of energy. The reset marker follows the
//! Eve app convention of seconds since 2001-01-01 UTC.

mod accumulator;
mod store;

pub use accumulator::{EnergyAccumulator, reset_marker_now};
pub use store::{EnergyRecord, EnergyStore, JsonFileStore, MemoryEnergyStore};
