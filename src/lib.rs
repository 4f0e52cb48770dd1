// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asynchronous state synchronization for Breezart ventilation units.
//!
//! The engine keeps an in-memory mirror of a unit's state fresh through a
//! 1 Hz poll loop, lets callers change settings optimistically without
//! being clobbered by in-flight polls, integrates the unit's power draw
//! into a persisted energy total, and re-establishes dropped connections
//! with a fixed-delay retry loop.
//!
//! # Features
//!
//! - **Polled state mirror** — one status pull per second, diffed into a
//!   [`state::DeviceState`] with change events per field.
//! - **Override debounce** — a local set shields its field from poll
//!   results for three seconds, so stale device readings never undo a
//!   command the user just issued.
//! - **Persisted energy** — power samples are integrated into a kWh total
//!   that survives restarts and resets on demand, Eve-style.
//! - **Resilient sessions** — dropped links reconnect every five seconds,
//!   by default forever.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use breezart_sync::config::{DeviceConfig, SyncConfig};
//! use breezart_sync::energy::JsonFileStore;
//! use breezart_sync::sync::SyncedDevice;
//! use breezart_sync::types::FanSpeed;
//!
//! #[tokio::main]
//! async fn main() -> breezart_sync::Result<()> {
//!     let config = DeviceConfig::new("Living Room", "192.168.1.20").with_password(12345);
//!     let link = Arc::new(my_tcp_link(&config));
//!     let store = Box::new(JsonFileStore::new("energy.json"));
//!
//!     let device = SyncedDevice::new(link, &config, SyncConfig::default(), store)?;
//!     device.start();
//!
//!     device.set_rotation_speed(FanSpeed::new(7)?).await?;
//!     println!("total: {:.3} kWh", device.total_energy_kwh());
//!
//!     device.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! The crate ships no transport. Implement [`link::DeviceLink`] over
//! whatever carries the unit's protocol (TCP for real hardware, an
//! in-memory mock for tests) and hand it to the engine.

pub mod config;
pub mod energy;
pub mod error;
pub mod event;
pub mod link;
pub mod session;
pub mod state;
pub mod sync;
pub mod types;

pub use config::{DeviceConfig, ReconnectPolicy, SyncConfig};
pub use error::{Error, Result};
pub use event::{DeviceId, SyncEvent};
pub use link::{DeviceLink, LinkEvent, StatusSnapshot, WriteCommand};
pub use session::SessionState;
pub use sync::SyncedDevice;
