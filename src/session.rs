// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection session lifecycle.
//!
//! A [`ConnectionSession`] tracks whether the link to a unit is up, and
//! drives the retry loop that re-establishes it after a drop. Observers
//! follow the state through a watch channel rather than callbacks, so a
//! late subscriber always sees the current state.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ReconnectPolicy;
use crate::link::DeviceLink;

/// Connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No link, and no attempt in progress.
    Disconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// The link is up.
    Connected,
}

impl SessionState {
    /// Returns true for [`SessionState::Connected`].
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Session over a [`DeviceLink`], with fixed-delay reconnects.
pub struct ConnectionSession<L: DeviceLink> {
    link: Arc<L>,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<SessionState>,
}

impl<L: DeviceLink> ConnectionSession<L> {
    /// Creates a session in the disconnected state.
    pub fn new(link: Arc<L>, policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        Self {
            link,
            policy,
            state_tx,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Returns true when the link is up.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Subscribes to state transitions.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Marks the session connected. Returns true on an actual transition.
    pub fn mark_connected(&self) -> bool {
        self.state_tx
            .send_if_modified(|state| match *state {
                SessionState::Connected => false,
                _ => {
                    *state = SessionState::Connected;
                    true
                }
            })
    }

    /// Marks the session disconnected. Returns true on an actual transition.
    pub fn mark_disconnected(&self) -> bool {
        self.state_tx
            .send_if_modified(|state| match *state {
                SessionState::Disconnected => false,
                _ => {
                    *state = SessionState::Disconnected;
                    true
                }
            })
    }

    /// Runs the connect retry loop until the link is up, the policy's
    /// attempt bound is exhausted, or shutdown is signalled.
    ///
    /// Each attempt is preceded by the policy's fixed delay; the first
    /// attempt waits too when `delay_before_first` is set (a reconnect
    /// after a drop), and starts immediately otherwise (initial start).
    ///
    /// Returns true when the session ended up connected.
    pub async fn establish(
        &self,
        shutdown: &mut watch::Receiver<bool>,
        delay_before_first: bool,
    ) -> bool {
        let mut attempts: u32 = 0;
        let mut delay = delay_before_first;

        loop {
            if !self.policy.should_retry(attempts) {
                warn!(attempts, "giving up on reconnect");
                self.mark_disconnected();
                return false;
            }

            if delay {
                tokio::select! {
                    () = tokio::time::sleep(self.policy.retry_delay) => {}
                    _ = shutdown.changed() => {
                        debug!("shutdown during reconnect delay");
                        return false;
                    }
                }
            }
            delay = true;

            self.state_tx.send_replace(SessionState::Connecting);
            attempts += 1;

            tokio::select! {
                result = self.link.connect() => match result {
                    Ok(()) => {
                        info!(attempts, "link established");
                        self.state_tx.send_replace(SessionState::Connected);
                        return true;
                    }
                    Err(error) => {
                        warn!(attempts, %error, "connect attempt failed");
                        self.state_tx.send_replace(SessionState::Disconnected);
                    }
                },
                _ = shutdown.changed() => {
                    debug!("shutdown during connect attempt");
                    self.state_tx.send_replace(SessionState::Disconnected);
                    return false;
                }
            }
        }
    }

    /// The link this session manages.
    pub fn link(&self) -> &Arc<L> {
        &self.link
    }
}

impl<L: DeviceLink> std::fmt::Debug for ConnectionSession<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("state", &self.state())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::sync::broadcast;

    use super::*;
    use crate::error::{ConnectionError, Error, Result};
    use crate::link::{LinkEvent, StatusSnapshot, WriteCommand};

    /// Link that fails the first `fail_first` connect attempts.
    struct FlakyLink {
        fail_first: u32,
        attempts: AtomicU32,
        events: broadcast::Sender<LinkEvent>,
    }

    impl FlakyLink {
        fn new(fail_first: u32) -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                fail_first,
                attempts: AtomicU32::new(0),
                events,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl DeviceLink for FlakyLink {
        fn connect(&self) -> impl Future<Output = Result<()>> + Send {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            let fail = attempt < self.fail_first;
            async move {
                if fail {
                    Err(Error::Connection(ConnectionError::AttemptFailed(
                        "connection refused".to_string(),
                    )))
                } else {
                    Ok(())
                }
            }
        }

        fn is_connected(&self) -> bool {
            self.attempts() > self.fail_first
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

    fn shutdown_pair() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn connects_immediately_without_initial_delay() {
        let link = Arc::new(FlakyLink::new(0));
        let session = ConnectionSession::new(Arc::clone(&link), ReconnectPolicy::default());
        let (_tx, mut shutdown) = shutdown_pair();

        assert!(session.establish(&mut shutdown, false).await);
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(link.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_fixed_delay() {
        let link = Arc::new(FlakyLink::new(2));
        let session = ConnectionSession::new(Arc::clone(&link), ReconnectPolicy::default());
        let (_tx, mut shutdown) = shutdown_pair();

        // Two failures, then success after two 5 s delays.
        assert!(session.establish(&mut shutdown, false).await);
        assert_eq!(link.attempts(), 3);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_policy_gives_up() {
        let link = Arc::new(FlakyLink::new(u32::MAX));
        let policy = ReconnectPolicy::new()
            .with_retry_delay(Duration::from_millis(10))
            .with_max_retries(3);
        let session = ConnectionSession::new(Arc::clone(&link), policy);
        let (_tx, mut shutdown) = shutdown_pair();

        assert!(!session.establish(&mut shutdown, false).await);
        assert_eq!(link.attempts(), 3);
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_reconnect_delay() {
        let link = Arc::new(FlakyLink::new(u32::MAX));
        let session = ConnectionSession::new(Arc::clone(&link), ReconnectPolicy::default());
        let (tx, mut shutdown) = shutdown_pair();

        let handle = tokio::spawn(async move {
            session.establish(&mut shutdown, true).await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();

        assert!(!handle.await.unwrap());
        assert_eq!(link.attempts(), 0);
    }

    #[tokio::test]
    async fn mark_transitions_are_edge_triggered() {
        let link = Arc::new(FlakyLink::new(0));
        let session = ConnectionSession::new(link, ReconnectPolicy::default());

        assert!(!session.mark_disconnected());
        assert!(session.mark_connected());
        assert!(!session.mark_connected());
        assert!(session.mark_disconnected());
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_waits_before_first_attempt() {
        let link = Arc::new(FlakyLink::new(0));
        let session = ConnectionSession::new(Arc::clone(&link), ReconnectPolicy::default());
        let (_tx, mut shutdown) = shutdown_pair();

        let started = tokio::time::Instant::now();
        assert!(session.establish(&mut shutdown, true).await);
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(link.attempts(), 1);
    }
}
