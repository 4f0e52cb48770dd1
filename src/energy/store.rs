// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy record persistence.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::event::DeviceId;

/// Persisted energy state for one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// Accumulated consumption in kWh. Non-decreasing between resets.
    pub total_kwh: f64,
    /// Reset-epoch stamp (seconds since 2001-01-01 UTC at the last reset).
    pub reset_marker: u32,
}

/// Persistence collaborator for energy records, keyed by device identity.
///
/// The engine loads once and saves once per poll tick, and saves on reset.
/// Implementations decide where the records actually live.
///
/// Both methods are called synchronously from the poll task, so they must
/// complete quickly: one small read and write per second. A store over slow
/// or remote media should buffer in memory and flush from its own task
/// rather than block here.
pub trait EnergyStore: Send + Sync {
    /// Loads the record for `id`, or `None` if nothing was persisted yet.
    fn load(&self, id: &DeviceId) -> Result<Option<EnergyRecord>>;

    /// Persists the record for `id`.
    fn save(&self, id: &DeviceId, record: &EnergyRecord) -> Result<()>;
}

/// In-memory store for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryEnergyStore {
    records: Mutex<HashMap<DeviceId, EnergyRecord>>,
}

impl MemoryEnergyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one record.
    #[must_use]
    pub fn with_record(id: DeviceId, record: EnergyRecord) -> Self {
        let store = Self::new();
        store.records.lock().insert(id, record);
        store
    }
}

impl EnergyStore for MemoryEnergyStore {
    fn load(&self, id: &DeviceId) -> Result<Option<EnergyRecord>> {
        Ok(self.records.lock().get(id).copied())
    }

    fn save(&self, id: &DeviceId, record: &EnergyRecord) -> Result<()> {
        self.records.lock().insert(*id, *record);
        Ok(())
    }
}

/// File-backed store: one JSON document holding the records of all devices,
/// keyed by device id.
///
/// Reads and writes the whole document on every call. The records are a few
/// dozen bytes each, which keeps each call fast enough for the once-per-tick
/// cadence on local storage; keep the file off network mounts.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file path.
    ///
    /// The file is created on first save; a missing file reads as empty.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, EnergyRecord>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(StorageError::Io)?;
        let records = serde_json::from_str(&contents).map_err(StorageError::Json)?;
        Ok(records)
    }
}

impl EnergyStore for JsonFileStore {
    fn load(&self, id: &DeviceId) -> Result<Option<EnergyRecord>> {
        Ok(self.read_all()?.get(&id.to_string()).copied())
    }

    fn save(&self, id: &DeviceId, record: &EnergyRecord) -> Result<()> {
        let mut records = self.read_all()?;
        records.insert(id.to_string(), *record);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
        let contents = serde_json::to_string_pretty(&records).map_err(StorageError::Json)?;
        fs::write(&self.path, contents).map_err(StorageError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryEnergyStore::new();
        let id = DeviceId::new();

        assert!(store.load(&id).unwrap().is_none());

        let record = EnergyRecord {
            total_kwh: 1.25,
            reset_marker: 7,
        };
        store.save(&id, &record).unwrap();
        assert_eq!(store.load(&id).unwrap(), Some(record));
    }

    #[test]
    fn memory_store_is_per_device() {
        let a = DeviceId::new();
        let b = DeviceId::new();
        let store = MemoryEnergyStore::with_record(
            a,
            EnergyRecord {
                total_kwh: 2.0,
                reset_marker: 0,
            },
        );

        assert!(store.load(&a).unwrap().is_some());
        assert!(store.load(&b).unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("energy.json"));
        let id = DeviceId::new();

        assert!(store.load(&id).unwrap().is_none());

        let record = EnergyRecord {
            total_kwh: 0.5,
            reset_marker: 123,
        };
        store.save(&id, &record).unwrap();
        assert_eq!(store.load(&id).unwrap(), Some(record));
    }

    #[test]
    fn file_store_keeps_other_devices() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("energy.json"));
        let a = DeviceId::new();
        let b = DeviceId::new();

        store
            .save(
                &a,
                &EnergyRecord {
                    total_kwh: 1.0,
                    reset_marker: 1,
                },
            )
            .unwrap();
        store
            .save(
                &b,
                &EnergyRecord {
                    total_kwh: 2.0,
                    reset_marker: 2,
                },
            )
            .unwrap();

        assert_eq!(store.load(&a).unwrap().unwrap().total_kwh, 1.0);
        assert_eq!(store.load(&b).unwrap().unwrap().total_kwh, 2.0);
    }

    #[test]
    fn file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("energy.json"));
        let id = DeviceId::new();

        store.save(&id, &EnergyRecord::default()).unwrap();
        assert!(store.load(&id).unwrap().is_some());
    }
}
