//! Rotating output stream
//!
//! - `Sink`: the write/close capability a rotating writer drives
//! - `RotateWriter`: owns the current sink and swaps it on policy request
//!
//! # Write Path
//!
//! ```text
//! ┌─────────┐    ┌────────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ write() │───►│ policy(status) │───►│ rotate()     │───►│ sink.write() │
//! │         │    │ under the lock │    │ if requested │    │ size += n    │
//! └─────────┘    └────────────────┘    └──────────────┘    └──────────────┘
//!                                             │
//!                                             ▼ (after unlock)
//!                                      observer(event)
//! ```

mod rotating;
mod sink;

pub use rotating::{default_policy, OnRotateFn, RotateWriter, RotatorFn};
pub use sink::{MemorySink, Sink, WriterSink};
