//! Rotating writer core
//!
//! `RotateWriter` owns exactly one sink at a time and asks a policy, before
//! every write, whether the sink should be closed off and replaced. All
//! mutable state lives behind a single mutex so that "evaluate policy,
//! maybe rotate, write, account for the bytes" is one step from the point
//! of view of every other writer.
//!
//! # Failed close during rotation
//!
//! If the old sink fails to close, the rotation is abandoned: the new sink
//! is closed and dropped, the old sink stays current with its counters
//! untouched, and the caller gets `RotateError::Rotation`. The write that
//! triggered the rotation is not performed.

use std::io;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{RotateError, RotateResult};
use crate::types::{RotationDecision, RotationEvent, RotationStatus};

use super::sink::Sink;

/// Rotation policy. Runs inside the writer's critical section, so it must
/// not call back into the same writer and should not block for long.
pub type RotatorFn<S> =
    Box<dyn Fn(&RotationStatus) -> io::Result<RotationDecision<S>> + Send + Sync>;

/// Observer called after every successful rotation, outside the lock
pub type OnRotateFn = Box<dyn Fn(&RotationEvent) + Send + Sync>;

/// Policy used when none is supplied: never rotate
pub fn default_policy<S>() -> RotatorFn<S> {
    Box::new(|_| Ok(RotationDecision::Continue))
}

struct WriterState<S> {
    sink: Option<S>,
    name: Option<String>,
    current_size: u64,
    period_start: DateTime<Utc>,
    sequence_index: u64,
}

impl<S: Sink> WriterState<S> {
    fn fresh(sink: S, name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            sink: Some(sink),
            name,
            current_size: 0,
            period_start: now,
            sequence_index: 0,
        }
    }

    fn status(&self, sequence_index: u64, pending_size: usize, now: DateTime<Utc>) -> RotationStatus {
        RotationStatus {
            sequence_index,
            current_size: self.current_size,
            pending_size,
            period_start: self.period_start,
            evaluated_at: now,
        }
    }

    fn rotate(
        &mut self,
        new_sink: S,
        name: Option<String>,
        at: DateTime<Utc>,
    ) -> RotateResult<RotationEvent> {
        let Some(old) = self.sink.as_mut() else {
            discard(new_sink, name.as_deref());
            return Err(RotateError::Closed);
        };

        if let Err(e) = old.close() {
            discard(new_sink, name.as_deref());
            return Err(RotateError::Rotation(e));
        }

        // Old sink is dropped here, already closed
        self.sink = Some(new_sink);
        self.name = name;
        self.current_size = 0;
        self.period_start = at;
        self.sequence_index += 1;

        Ok(RotationEvent {
            sequence_index: self.sequence_index,
            name: self.name.clone(),
            rotated_at: at,
        })
    }

    fn write(&mut self, buf: &[u8]) -> RotateResult<usize> {
        let sink = self.sink.as_mut().ok_or(RotateError::Closed)?;
        let n = sink.write(buf)?;
        self.current_size += n as u64;
        Ok(n)
    }
}

fn discard<S: Sink>(mut sink: S, name: Option<&str>) {
    if let Err(e) = sink.close() {
        warn!(error = %e, name = ?name, "failed to close discarded sink");
    }
}

/// Output stream that swaps its sink when the policy says so
pub struct RotateWriter<S: Sink> {
    state: Mutex<WriterState<S>>,
    policy: RotatorFn<S>,
    observer: Option<OnRotateFn>,
}

impl<S: Sink> RotateWriter<S> {
    /// Create a writer around `initial` with the never-rotate policy
    pub fn new(initial: S) -> Self {
        Self {
            state: Mutex::new(WriterState::fresh(initial, None, Utc::now())),
            policy: default_policy(),
            observer: None,
        }
    }

    /// Replace the rotation policy
    pub fn with_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&RotationStatus) -> io::Result<RotationDecision<S>> + Send + Sync + 'static,
    {
        self.policy = Box::new(policy);
        self
    }

    /// Register the rotation observer
    pub fn on_rotate<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RotationEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Set the identity of the initial sink
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.state.lock().name = Some(name.into());
        self
    }

    /// Write `buf`, rotating first if the policy asks for it.
    ///
    /// Returns the number of bytes the current sink accepted. A failed
    /// rotation aborts the write before any byte reaches a sink.
    pub fn write(&self, buf: &[u8]) -> RotateResult<usize> {
        let (event, written) = {
            let mut state = self.state.lock();
            if state.sink.is_none() {
                return Err(RotateError::Closed);
            }

            let now = Utc::now();
            let status = state.status(state.sequence_index + 1, buf.len(), now);
            let event = match (self.policy)(&status).map_err(RotateError::Rotation)? {
                RotationDecision::Continue => None,
                RotationDecision::Rotate { sink, name } => Some(state.rotate(sink, name, now)?),
            };

            (event, state.write(buf))
        };

        if let Some(event) = event {
            self.notify(&event);
        }
        written
    }

    /// Close the current sink and install `new_sink` as sink number
    /// `sequence_index + 1`, starting a new period at `at`.
    pub fn rotate(&self, new_sink: S, name: Option<String>, at: DateTime<Utc>) -> RotateResult<()> {
        let event = self.state.lock().rotate(new_sink, name, at)?;
        self.notify(&event);
        Ok(())
    }

    /// Start over with `sink` as if freshly constructed.
    /// The previous sink, if any, is dropped without being closed.
    pub fn reset(&self, sink: S) {
        self.reset_named(sink, None);
    }

    pub fn reset_named(&self, sink: S, name: Option<String>) {
        let mut state = self.state.lock();
        debug!(name = ?name, previous = ?state.name, "resetting rotating writer");
        *state = WriterState::fresh(sink, name, Utc::now());
    }

    /// Install `sink` into a closed stream, keeping the counters.
    pub fn reopen(&self, sink: S) -> RotateResult<()> {
        let mut state = self.state.lock();
        if state.sink.is_some() {
            drop(state);
            discard(sink, None);
            return Err(RotateError::AlreadyOpen);
        }

        debug!(name = ?state.name, "reopening rotating writer");
        state.sink = Some(sink);
        Ok(())
    }

    /// Close the current sink. Closing a closed stream does nothing.
    pub fn close(&self) -> RotateResult<()> {
        let sink = self.state.lock().sink.take();
        match sink {
            Some(mut sink) => Ok(sink.close()?),
            None => Ok(()),
        }
    }

    pub fn flush(&self) -> RotateResult<()> {
        let mut state = self.state.lock();
        let sink = state.sink.as_mut().ok_or(RotateError::Closed)?;
        Ok(sink.flush()?)
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().sink.is_some()
    }

    /// Identity of the current sink, if one was given
    pub fn current_name(&self) -> Option<String> {
        self.state.lock().name.clone()
    }

    /// Identity and sequence index of the current sink, read together
    pub fn current_sink(&self) -> (Option<String>, u64) {
        let state = self.state.lock();
        (state.name.clone(), state.sequence_index)
    }

    /// Snapshot of the current counters
    pub fn status(&self) -> RotationStatus {
        let state = self.state.lock();
        state.status(state.sequence_index, 0, Utc::now())
    }

    fn notify(&self, event: &RotationEvent) {
        debug!(
            sequence_index = event.sequence_index,
            name = ?event.name,
            "rotated sink"
        );
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}

impl<S: Sink> io::Write for &RotateWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RotateWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(RotateWriter::flush(self)?)
    }
}

impl<S: Sink> io::Write for RotateWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RotateWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(RotateWriter::flush(self)?)
    }
}
