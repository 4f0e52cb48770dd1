// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-to-energy integration.

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::event::DeviceId;

use super::{EnergyRecord, EnergyStore};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const EVE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Returns a reset marker for the current moment: seconds since
/// 2001-01-01 UTC, the convention the Eve app stamps on consumption resets.
#[must_use]
pub fn reset_marker_now() -> u32 {
    let secs = Utc::now().timestamp() - EVE_EPOCH_OFFSET_SECS;
    u32::try_from(secs).unwrap_or(0)
}

/// Integrates sampled power draw into a persisted energy total.
///
/// Each tick loads the persisted record, adds `P · Δt`, and writes the
/// record back, so restarts lose at most one tick. The total only decreases
/// on an explicit [`reset`](Self::reset).
pub struct EnergyAccumulator {
    id: DeviceId,
    store: Box<dyn EnergyStore>,
    cached: Option<EnergyRecord>,
}

impl EnergyAccumulator {
    /// Creates an accumulator persisting through `store` under `id`.
    #[must_use]
    pub fn new(id: DeviceId, store: Box<dyn EnergyStore>) -> Self {
        Self {
            id,
            store,
            cached: None,
        }
    }

    /// Integrates one tick: adds `power_w` watts over `dt` to the persisted
    /// total and returns the updated record.
    ///
    /// Negative power samples are treated as zero so the total stays
    /// non-decreasing between resets.
    pub fn tick(&mut self, power_w: f64, dt: Duration) -> Result<EnergyRecord> {
        let mut record = self.store.load(&self.id)?.unwrap_or_default();

        let delta_kwh = power_w.max(0.0) * dt.as_secs_f64() / 3600.0 / 1000.0;
        record.total_kwh += delta_kwh;

        self.store.save(&self.id, &record)?;
        self.cached = Some(record);
        Ok(record)
    }

    /// Zeroes the total, stamps `marker`, and persists both.
    pub fn reset(&mut self, marker: u32) -> Result<EnergyRecord> {
        let record = EnergyRecord {
            total_kwh: 0.0,
            reset_marker: marker,
        };
        self.store.save(&self.id, &record)?;
        self.cached = Some(record);
        Ok(record)
    }

    /// Returns the current record without writing.
    ///
    /// Falls back to the persisted record on first access; a store that
    /// cannot be read yields the zero record (and a warning) rather than
    /// blocking state reads.
    pub fn current(&mut self) -> EnergyRecord {
        if let Some(record) = self.cached {
            return record;
        }
        match self.store.load(&self.id) {
            Ok(Some(record)) => {
                self.cached = Some(record);
                record
            }
            Ok(None) => EnergyRecord::default(),
            Err(e) => {
                tracing::warn!(device_id = %self.id, error = %e, "energy store read failed");
                EnergyRecord::default()
            }
        }
    }
}

impl std::fmt::Debug for EnergyAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnergyAccumulator")
            .field("id", &self.id)
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}
