// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `breezart-sync` library.
//!
//! Errors are split by where they occur in the synchronization cycle:
//! connection lifecycle, periodic polls, forwarded write commands, device
//! protocol faults, value validation, and energy persistence. No error is
//! ever thrown across the aggregate boundary; everything is delivered as an
//! explicit `Result`.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A connection attempt failed or the link is unavailable.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A status pull failed while connected.
    #[error("poll error: {0}")]
    Poll(#[from] PollError),

    /// A forwarded write command was rejected or lost.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The device reported a protocol-level fault.
    #[error("device protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A value failed register-range validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The energy store failed to load or save a record.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Device configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while establishing or holding a connection.
///
/// These are handled inside the connection session (retry policy); they never
/// mutate synchronized state.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The connect attempt was refused or dropped.
    #[error("connect attempt failed: {0}")]
    AttemptFailed(String),

    /// The connect attempt did not complete in time.
    #[error("connect timed out after {0} ms")]
    Timeout(u64),

    /// An operation required a connection that is not present.
    #[error("device is not connected")]
    NotConnected,
}

/// Errors raised by a status pull while connected.
///
/// A poll error sets `last_error` on the synchronized state and leaves the
/// previous field values untouched; it does not trigger a reconnect.
#[derive(Debug, Error)]
pub enum PollError {
    /// The device did not answer the status request.
    #[error("status pull failed: {0}")]
    Failed(String),

    /// The status request timed out.
    #[error("status pull timed out after {0} ms")]
    Timeout(u64),
}

/// Errors raised by a forwarded write command.
///
/// Command errors are reported only through the caller's `Result`; they never
/// appear in `last_error`.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The device refused the written value.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// The command could not be delivered.
    #[error("command delivery failed: {0}")]
    Failed(String),
}

/// Device-level protocol faults (malformed or unsolicited replies).
///
/// These surface through `last_error` but leave the connection state alone.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A reply could not be decoded.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The device pushed an error notification.
    #[error("device fault: {0}")]
    DeviceFault(String),
}

/// Errors related to value validation and register constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed register range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i32,
        /// Maximum allowed value.
        max: i32,
        /// The actual value that was provided.
        actual: i32,
    },

    /// An unknown ventilation mode register value.
    #[error("invalid ventilation mode: {0}")]
    InvalidMode(u8),
}

/// Errors raised by the energy persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted record could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Cloneable summary of the most recent pull failure.
///
/// This is what `last_error` hands out: enough to display and classify, small
/// enough to copy on every read. A present failure means "do not trust
/// freshness"; the stale field values remain readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollFailure {
    /// Which path produced the failure.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of a [`PollFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A status pull failed.
    Poll,
    /// The device pushed a protocol error notification.
    Protocol,
}

impl PollFailure {
    /// Creates a failure summary for a failed status pull.
    #[must_use]
    pub fn poll(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Poll,
            message: message.into(),
        }
    }

    /// Creates a failure summary for a device protocol fault.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Protocol,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PollFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::Poll => write!(f, "poll failure: {}", self.message),
            FailureKind::Protocol => write!(f, "protocol failure: {}", self.message),
        }
    }
}

impl From<&Error> for PollFailure {
    fn from(err: &Error) -> Self {
        match err {
            Error::Protocol(e) => Self::protocol(e.to_string()),
            other => Self::poll(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 10,
            actual: 12,
        };
        assert_eq!(err.to_string(), "value 12 is out of range [0, 10]");
    }

    #[test]
    fn error_from_poll_error() {
        let err: Error = PollError::Failed("no reply".to_string()).into();
        assert!(matches!(err, Error::Poll(PollError::Failed(_))));
        assert_eq!(err.to_string(), "poll error: status pull failed: no reply");
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::Rejected("speed out of bounds".to_string());
        assert_eq!(err.to_string(), "command rejected: speed out of bounds");
    }

    #[test]
    fn poll_failure_from_protocol_error() {
        let err: Error = ProtocolError::MalformedReply("short frame".to_string()).into();
        let failure = PollFailure::from(&err);
        assert_eq!(failure.kind, FailureKind::Protocol);
        assert!(failure.message.contains("short frame"));
    }

    #[test]
    fn poll_failure_from_pull_error() {
        let err: Error = PollError::Timeout(1000).into();
        let failure = PollFailure::from(&err);
        assert_eq!(failure.kind, FailureKind::Poll);
    }

    #[test]
    fn poll_failure_display() {
        let failure = PollFailure::poll("timed out");
        assert_eq!(failure.to_string(), "poll failure: timed out");
    }
}
