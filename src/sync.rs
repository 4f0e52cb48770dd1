// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The synchronization engine.
//!
//! [`SyncedDevice`] ties the pieces together: a poll loop that refreshes
//! state once a second while the link is up, the override debounce that
//! keeps fresh local sets from being clobbered by in-flight polls, the
//! persisted energy accumulator, and the session task that re-establishes
//! a dropped link. Observers subscribe to the engine's [`SyncEvent`]
//! stream instead of polling the getters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::config::{DeviceConfig, SyncConfig};
use crate::energy::{EnergyAccumulator, EnergyRecord, EnergyStore};
use crate::error::{PollFailure, Result};
use crate::event::{DeviceId, EventBus, SyncEvent};
use crate::link::{DeviceLink, LinkEvent, WriteCommand};
use crate::session::{ConnectionSession, SessionState};
use crate::state::{DebounceTable, DeviceState, Field, StateChange};
use crate::types::{FanSpeed, FilterLife, TargetTemperature, UnitState, VentMode};

/// State guarded by one lock so a poll result and a local set can never
/// interleave between reading the debounce table and writing the state.
struct Shared {
    state: DeviceState,
    debounce: DebounceTable,
    last_error: Option<PollFailure>,
    /// Completion time of the previous successful poll.
    last_tick: Option<Instant>,
}

struct SyncCore<L: DeviceLink> {
    link: Arc<L>,
    device_id: DeviceId,
    config: SyncConfig,
    session: ConnectionSession<L>,
    shared: Mutex<Shared>,
    energy: Mutex<EnergyAccumulator>,
    events: EventBus,
}

impl<L: DeviceLink> SyncCore<L> {
    /// Pulls one status snapshot and folds it into the tracked state.
    ///
    /// On failure the error is recorded as `last_error` and published; on
    /// success `last_error` clears and the elapsed time since the previous
    /// successful poll is fed to the energy accumulator.
    async fn poll_once(&self) -> Result<()> {
        let snapshot = match self.link.pull_status().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                let failure = PollFailure::from(&error);
                warn!(device_id = %self.device_id, %failure, "poll failed");
                self.shared.lock().last_error = Some(failure.clone());
                self.events
                    .publish(SyncEvent::poll_failed(self.device_id, failure));
                return Err(error);
            }
        };

        let now = Instant::now();
        let (changes, state, dt) = {
            let mut guard = self.shared.lock();
            let shared = &mut *guard;

            // First tick has no previous stamp; assume one nominal period.
            let dt = shared.last_tick.map_or(self.config.poll_interval, |last| {
                now.saturating_duration_since(last)
            });
            shared.last_tick = Some(now);
            shared.last_error = None;

            let changes = shared.state.apply_snapshot(
                &snapshot,
                &shared.debounce,
                now,
                self.config.debounce_window,
            );
            (changes, shared.state.clone(), dt)
        };

        match self.energy.lock().tick(snapshot.power_w, dt) {
            Ok(record) => self
                .events
                .publish(SyncEvent::energy_updated(self.device_id, record)),
            Err(error) => {
                // A failed write costs one tick of energy; state sync goes on.
                warn!(device_id = %self.device_id, %error, "energy store write failed");
            }
        }

        for change in changes {
            self.events.publish(SyncEvent::state_changed(
                self.device_id,
                change,
                state.clone(),
            ));
        }
        Ok(())
    }
}

/// Reacts to link lifecycle events and drives reconnects.
async fn session_task<L: DeviceLink>(core: Arc<SyncCore<L>>, mut shutdown: watch::Receiver<bool>) {
    let mut link_events = core.link.subscribe();

    if core.session.establish(&mut shutdown, false).await {
        core.events.publish(SyncEvent::connected(core.device_id));
    }

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = link_events.recv() => match event {
                Ok(LinkEvent::Connected) => {
                    if core.session.mark_connected() {
                        core.events.publish(SyncEvent::connected(core.device_id));
                    }
                }
                Ok(LinkEvent::Disconnected) => {
                    handle_link_drop(&core, &mut shutdown).await;
                }
                Ok(LinkEvent::Error(message)) => {
                    // Device-level faults surface through last_error and
                    // leave the connection state alone.
                    warn!(device_id = %core.device_id, %message, "device fault");
                    let failure = PollFailure::protocol(message);
                    core.shared.lock().last_error = Some(failure.clone());
                    core.events
                        .publish(SyncEvent::poll_failed(core.device_id, failure));
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(device_id = %core.device_id, missed, "link event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    debug!(device_id = %core.device_id, "session task stopped");
}

/// Handles a drop notification, ignoring stale ones.
///
/// Events that raced a reconnect already in flight (the session is not in
/// the connected state, or the link reports itself up again) are dropped so
/// only one reconnect sequence runs at a time.
async fn handle_link_drop<L: DeviceLink>(
    core: &Arc<SyncCore<L>>,
    shutdown: &mut watch::Receiver<bool>,
) {
    if !core.session.is_connected() || core.link.is_connected() {
        trace!(device_id = %core.device_id, "ignoring stale disconnect");
        return;
    }

    core.session.mark_disconnected();
    // The next successful poll must not integrate energy across the outage.
    core.shared.lock().last_tick = None;
    core.events.publish(SyncEvent::disconnected(core.device_id));

    if core.session.establish(shutdown, true).await {
        core.events.publish(SyncEvent::connected(core.device_id));
    }
}

/// Refreshes state on a fixed period while the link is up.
async fn poll_task<L: DeviceLink>(core: Arc<SyncCore<L>>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(core.config.poll_interval);
    // A slow poll delays the next tick rather than bursting to catch up,
    // so polls never overlap.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                if core.session.is_connected() {
                    // Failures are recorded in last_error and published.
                    let _ = core.poll_once().await;
                } else {
                    trace!(device_id = %core.device_id, "poll skipped while disconnected");
                }
            }
        }
    }
    debug!(device_id = %core.device_id, "poll task stopped");
}

/// A Breezart unit kept in sync by background tasks.
///
/// Construct one with [`new`](Self::new), call [`start`](Self::start) from
/// within a Tokio runtime, and read state through the getters or the
/// [`subscribe`](Self::subscribe) event stream. Local sets through the
/// `set_*` methods are optimistic: the tracked state updates immediately
/// and poll results for that field are suppressed for the debounce window,
/// so a poll that raced the set cannot flip the value back.
pub struct SyncedDevice<L: DeviceLink> {
    core: Arc<SyncCore<L>>,
    name: String,
    shutdown_tx: watch::Sender<bool>,
    started: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<L: DeviceLink> SyncedDevice<L> {
    /// Creates the engine for one unit.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` when `device` fails validation.
    pub fn new(
        link: Arc<L>,
        device: &DeviceConfig,
        config: SyncConfig,
        store: Box<dyn EnergyStore>,
    ) -> Result<Self> {
        device.validate()?;
        let device_id = device.device_id();
        let session = ConnectionSession::new(Arc::clone(&link), config.reconnect.clone());
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            core: Arc::new(SyncCore {
                link,
                device_id,
                config,
                session,
                shared: Mutex::new(Shared {
                    state: DeviceState::new(),
                    debounce: DebounceTable::new(),
                    last_error: None,
                    last_tick: None,
                }),
                energy: Mutex::new(EnergyAccumulator::new(device_id, store)),
                events: EventBus::new(),
            }),
            name: device.name.clone(),
            shutdown_tx,
            started: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawns the session and poll tasks. Idempotent.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown_tx.send_replace(false);

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(session_task(
            Arc::clone(&self.core),
            self.shutdown_tx.subscribe(),
        )));
        tasks.push(tokio::spawn(poll_task(
            Arc::clone(&self.core),
            self.shutdown_tx.subscribe(),
        )));
    }

    /// Signals both tasks to stop and waits for them.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(error) = task.await {
                warn!(device_id = %self.core.device_id, %error, "sync task failed");
            }
        }
        self.started.store(false, Ordering::SeqCst);
    }

    /// Display name of the unit.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable device identity.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.core.device_id
    }

    /// Subscribes to the engine's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.core.events.subscribe()
    }

    /// Current session state.
    pub fn session_state(&self) -> SessionState {
        self.core.session.state()
    }

    /// Returns true while the link is up.
    pub fn is_connected(&self) -> bool {
        self.core.session.is_connected()
    }

    /// Outcome of the most recent poll: `None` after a success, the
    /// failure after an error. Set failures never land here.
    pub fn last_error(&self) -> Option<PollFailure> {
        self.core.shared.lock().last_error.clone()
    }

    /// Snapshot of the full tracked state.
    pub fn state(&self) -> DeviceState {
        self.core.shared.lock().state.clone()
    }

    /// Power-on flag.
    pub fn active(&self) -> Option<bool> {
        self.core.shared.lock().state.active()
    }

    /// Fan speed target.
    pub fn rotation_speed(&self) -> Option<FanSpeed> {
        self.core.shared.lock().state.rotation_speed()
    }

    /// Measured supply air temperature in degrees Celsius.
    pub fn current_temperature(&self) -> Option<f64> {
        self.core.shared.lock().state.current_temperature()
    }

    /// Climate mode.
    pub fn mode(&self) -> Option<VentMode> {
        self.core.shared.lock().state.mode()
    }

    /// Running state derived by the unit.
    pub fn current_heater_cooler_state(&self) -> Option<UnitState> {
        self.core.shared.lock().state.current_heater_cooler_state()
    }

    /// Supply temperature target.
    pub fn heating_threshold_temperature(&self) -> Option<TargetTemperature> {
        self.core.shared.lock().state.heating_threshold_temperature()
    }

    /// Filter change indication.
    pub fn filter_change(&self) -> Option<bool> {
        self.core.shared.lock().state.filter_change()
    }

    /// Filter life level.
    pub fn filter_life_level(&self) -> Option<FilterLife> {
        self.core.shared.lock().state.filter_life_level()
    }

    /// Firmware version as (major, minor).
    pub fn firmware(&self) -> Option<(u16, u16)> {
        self.core.shared.lock().state.firmware()
    }

    /// Unit speed bounds as (min, max).
    pub fn speed_limits(&self) -> Option<(u8, u8)> {
        self.core.shared.lock().state.speed_limits()
    }

    /// Unit temperature bounds as (min, max).
    pub fn temperature_limits(&self) -> Option<(i16, i16)> {
        self.core.shared.lock().state.temperature_limits()
    }

    /// Current energy record.
    pub fn energy(&self) -> EnergyRecord {
        self.core.energy.lock().current()
    }

    /// Accumulated energy total in kWh.
    pub fn total_energy_kwh(&self) -> f64 {
        self.energy().total_kwh
    }

    /// Marker stamped by the most recent energy reset.
    pub fn reset_marker(&self) -> u32 {
        self.energy().reset_marker
    }

    /// Zeroes the energy total and stamps `marker`.
    pub fn reset_energy(&self, marker: u32) -> Result<EnergyRecord> {
        let record = self.core.energy.lock().reset(marker)?;
        self.core
            .events
            .publish(SyncEvent::energy_updated(self.core.device_id, record));
        Ok(record)
    }

    /// Performs one poll outside the regular schedule.
    ///
    /// Unlike the background loop the error is returned to the caller, but
    /// it still lands in [`last_error`](Self::last_error) either way.
    pub async fn pull(&self) -> Result<()> {
        self.core.poll_once().await
    }

    /// Sets the power-on flag.
    pub async fn set_active(&self, value: bool) -> Result<()> {
        self.local_set(
            |state| state.set_active(value),
            Field::Active,
            StateChange::Active(value),
        );
        self.core.link.write(WriteCommand::Power(value)).await
    }

    /// Sets the fan speed target.
    pub async fn set_rotation_speed(&self, value: FanSpeed) -> Result<()> {
        self.local_set(
            |state| state.set_rotation_speed(value),
            Field::RotationSpeed,
            StateChange::RotationSpeed(value),
        );
        self.core.link.write(WriteCommand::Speed(value)).await
    }

    /// Sets the climate mode.
    pub async fn set_mode(&self, value: VentMode) -> Result<()> {
        self.local_set(
            |state| state.set_mode(value),
            Field::Mode,
            StateChange::Mode(value),
        );
        self.core.link.write(WriteCommand::Mode(value)).await
    }

    /// Sets the supply temperature target.
    pub async fn set_heating_threshold_temperature(
        &self,
        value: TargetTemperature,
    ) -> Result<()> {
        self.local_set(
            |state| state.set_heating_threshold_temperature(value),
            Field::HeatingThreshold,
            StateChange::HeatingThreshold(value),
        );
        self.core
            .link
            .write(WriteCommand::TargetTemperature(value))
            .await
    }

    /// Applies a local set optimistically: mutate the tracked state, stamp
    /// the debounce slot, publish the change.
    fn local_set(
        &self,
        mutate: impl FnOnce(&mut DeviceState),
        field: Field,
        change: StateChange,
    ) {
        let state = {
            let mut shared = self.core.shared.lock();
            mutate(&mut shared.state);
            shared.debounce.record_set(field, Instant::now());
            shared.state.clone()
        };
        self.core
            .events
            .publish(SyncEvent::state_changed(self.core.device_id, change, state));
    }

    /// Configured poll period.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.core.config.poll_interval
    }
}

impl<L: DeviceLink> std::fmt::Debug for SyncedDevice<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncedDevice")
            .field("name", &self.name)
            .field("device_id", &self.core.device_id)
            .field("session", &self.core.session.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use super::*;
    use crate::energy::MemoryEnergyStore;
    use crate::error::{Error, Result};
    use crate::link::StatusSnapshot;

    struct NullLink {
        events: broadcast::Sender<LinkEvent>,
    }

    impl NullLink {
        fn new() -> Self {
            let (events, _) = broadcast::channel(16);
            Self { events }
        }
    }

    impl DeviceLink for NullLink {
        fn connect(&self) -> impl Future<Output = Result<()>> + Send {
            async { Ok(()) }
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn pull_status(&self) -> impl Future<Output = Result<StatusSnapshot>> + Send {
            async { Ok(StatusSnapshot::default()) }
        }

        fn write(&self, _command: WriteCommand) -> impl Future<Output = Result<()>> + Send {
            async { Ok(()) }
        }

        fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
            self.events.subscribe()
        }
    }

    fn device() -> SyncedDevice<NullLink> {
        SyncedDevice::new(
            Arc::new(NullLink::new()),
            &DeviceConfig::new("Unit", "10.0.0.5"),
            SyncConfig::default(),
            Box::new(MemoryEnergyStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let result = SyncedDevice::new(
            Arc::new(NullLink::new()),
            &DeviceConfig::new("", "10.0.0.5"),
            SyncConfig::default(),
            Box::new(MemoryEnergyStore::new()),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn fresh_engine_knows_nothing() {
        let device = device();
        assert!(device.active().is_none());
        assert!(device.rotation_speed().is_none());
        assert!(device.last_error().is_none());
        assert_eq!(device.session_state(), SessionState::Disconnected);
        assert_eq!(device.total_energy_kwh(), 0.0);
    }

    #[tokio::test]
    async fn local_set_is_visible_immediately() {
        let device = device();
        device.set_rotation_speed(FanSpeed::clamped(7)).await.unwrap();
        assert_eq!(device.rotation_speed(), Some(FanSpeed::clamped(7)));
    }

    #[tokio::test]
    async fn local_set_publishes_state_change() {
        let device = device();
        let mut events = device.subscribe();

        device.set_active(true).await.unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(
            event,
            SyncEvent::StateChanged {
                change: StateChange::Active(true),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reset_energy_publishes_record() {
        let device = device();
        let mut events = device.subscribe();

        let record = device.reset_energy(77).unwrap();
        assert_eq!(record.reset_marker, 77);
        assert_eq!(record.total_kwh, 0.0);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, SyncEvent::EnergyUpdated { record, .. } if record.reset_marker == 77));
    }
}
