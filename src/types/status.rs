//! Rotation status snapshots and policy decisions

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Point-in-time view of a rotating stream.
///
/// Handed to the rotation policy before every write, and returned by
/// `status()` for inspection. When built for a policy, `sequence_index`
/// is the index the next sink would receive and `pending_size` is the
/// length of the buffer about to be written. From `status()` it is the
/// current index and `pending_size` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationStatus {
    pub sequence_index: u64,
    /// Bytes written to the current sink
    pub current_size: u64,
    pub pending_size: usize,
    /// When the current sink was installed
    pub period_start: DateTime<Utc>,
    pub evaluated_at: DateTime<Utc>,
}

impl RotationStatus {
    /// Time spent in the current period at evaluation time
    pub fn elapsed(&self) -> Duration {
        self.evaluated_at - self.period_start
    }

    /// Size the current sink would reach if the pending write lands in it
    pub fn projected_size(&self) -> u64 {
        self.current_size.saturating_add(self.pending_size as u64)
    }
}

/// Outcome of a rotation policy
#[derive(Debug)]
pub enum RotationDecision<S> {
    /// Keep writing to the current sink
    Continue,
    /// Close the current sink and continue with `sink`
    Rotate {
        sink: S,
        /// Identity of the new sink, reported to rotation observers
        name: Option<String>,
    },
}

impl<S> RotationDecision<S> {
    pub fn rotate(sink: S) -> Self {
        RotationDecision::Rotate { sink, name: None }
    }

    pub fn rotate_named(sink: S, name: impl Into<String>) -> Self {
        RotationDecision::Rotate {
            sink,
            name: Some(name.into()),
        }
    }

    pub fn is_rotate(&self) -> bool {
        matches!(self, RotationDecision::Rotate { .. })
    }
}

/// Notification delivered after a successful rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationEvent {
    /// Index of the newly installed sink
    pub sequence_index: u64,
    pub name: Option<String>,
    pub rotated_at: DateTime<Utc>,
}
