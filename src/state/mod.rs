// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronized device state.
//!
//! [`DeviceState`] is the in-memory record the outside world reads.
//! Poll results flow into it through [`DebounceTable`], which suppresses
//! poll-derived values for fields the caller set moments ago, and every
//! actual change is reported as a [`StateChange`] for event publication.

mod debounce;
mod device_state;
mod state_change;

pub use debounce::{DebounceTable, Field};
pub use device_state::DeviceState;
pub use state_change::StateChange;
