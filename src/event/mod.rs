// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event types and distribution.
//!
//! The engine broadcasts a [`SyncEvent`] for every externally visible
//! transition (connection changes, field updates, energy ticks, poll
//! failures) so an accessory-mapping layer can push fresh values instead of
//! polling the state record.

mod device_id;
mod event_bus;
mod sync_event;

pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use sync_event::SyncEvent;
