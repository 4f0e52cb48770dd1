// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-field override debounce.
//!
//! A caller that just issued a `set` expects to read back its own value, not
//! one from a poll that raced ahead of the device's internal settle time.
//! The table stamps each local set; within the debounce window the poll loop
//! leaves that field alone. Entries are superseded by later sets and become
//! inert once the window elapses; they are never removed.

use std::time::Duration;

use tokio::time::Instant;

/// Fields with a local-set path.
///
/// Read-only telemetry (current temperature, running state, filter fields)
/// never consults the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Power-on flag.
    Active,
    /// Fan speed target.
    RotationSpeed,
    /// Climate mode.
    Mode,
    /// Supply temperature target.
    HeatingThreshold,
}

impl Field {
    const COUNT: usize = 4;

    const fn slot(self) -> usize {
        match self {
            Self::Active => 0,
            Self::RotationSpeed => 1,
            Self::Mode => 2,
            Self::HeatingThreshold => 3,
        }
    }
}

/// Fixed-size table of last-local-set timestamps, one slot per [`Field`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use breezart_sync::state::{DebounceTable, Field};
///
/// let window = Duration::from_secs(3);
/// let mut table = DebounceTable::new();
/// let now = Instant::now();
///
/// assert!(table.may_apply_poll(Field::Active, now, window));
/// table.record_set(Field::Active, now);
/// assert!(!table.may_apply_poll(Field::Active, now, window));
/// assert!(table.may_apply_poll(Field::Active, now + window, window));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DebounceTable {
    slots: [Option<Instant>; Field::COUNT],
}

impl DebounceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps `field` as locally set at `now`.
    pub fn record_set(&mut self, field: Field, now: Instant) {
        self.slots[field.slot()] = Some(now);
    }

    /// Returns `true` if a poll result may overwrite `field`.
    ///
    /// True iff the field was never locally set, or the last set is at least
    /// `window` old.
    #[must_use]
    pub fn may_apply_poll(&self, field: Field, now: Instant, window: Duration) -> bool {
        match self.slots[field.slot()] {
            None => true,
            Some(stamp) => now.saturating_duration_since(stamp) >= window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(3000);

    #[test]
    fn unset_field_is_applicable() {
        let table = DebounceTable::new();
        assert!(table.may_apply_poll(Field::RotationSpeed, Instant::now(), WINDOW));
    }

    #[test]
    fn fresh_set_blocks_poll() {
        let mut table = DebounceTable::new();
        let now = Instant::now();
        table.record_set(Field::RotationSpeed, now);

        assert!(!table.may_apply_poll(Field::RotationSpeed, now, WINDOW));
        assert!(!table.may_apply_poll(
            Field::RotationSpeed,
            now + Duration::from_millis(2999),
            WINDOW
        ));
    }

    #[test]
    fn elapsed_window_admits_poll() {
        let mut table = DebounceTable::new();
        let now = Instant::now();
        table.record_set(Field::RotationSpeed, now);

        assert!(table.may_apply_poll(Field::RotationSpeed, now + WINDOW, WINDOW));
        assert!(table.may_apply_poll(
            Field::RotationSpeed,
            now + Duration::from_millis(3500),
            WINDOW
        ));
    }

    #[test]
    fn fields_are_independent() {
        let mut table = DebounceTable::new();
        let now = Instant::now();
        table.record_set(Field::Mode, now);

        assert!(!table.may_apply_poll(Field::Mode, now, WINDOW));
        assert!(table.may_apply_poll(Field::Active, now, WINDOW));
        assert!(table.may_apply_poll(Field::HeatingThreshold, now, WINDOW));
    }

    #[test]
    fn later_set_supersedes_earlier() {
        let mut table = DebounceTable::new();
        let first = Instant::now();
        table.record_set(Field::Active, first);

        let second = first + Duration::from_millis(2000);
        table.record_set(Field::Active, second);

        // The first stamp alone would have expired here; the second holds.
        let probe = first + Duration::from_millis(3500);
        assert!(!table.may_apply_poll(Field::Active, probe, WINDOW));
        assert!(table.may_apply_poll(Field::Active, second + WINDOW, WINDOW));
    }
}
