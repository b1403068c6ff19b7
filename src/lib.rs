//! Rotating Writer
//!
//! A byte stream that switches its destination when a policy says so, plus
//! a retention layer that keeps only the newest rotated files on disk.
//!
//! # Features
//!
//! - **Pluggable Policy**: Decide per write whether to rotate, and into what
//! - **Thread-Safe**: One `Mutex` critical section per write or rotation
//! - **Whole Writes**: A write never straddles two destinations
//! - **Retention**: Oldest files pruned past `max_files`, rebuilt from disk on startup
//!
//! # Modules
//!
//! - `types`: Core data structures (RotationStatus, RotationDecision, RotationEvent)
//! - `writer`: Generic rotating writer over any `Sink`
//! - `file`: File-backed writer, stock policies, ledger and manager
//! - `config`: Manager configuration from defaults, JSON or environment
//! - `error`: Error type shared by every operation
//! - `logging`: `tracing` subscriber setup for binaries
//! - `utils`: File-system helpers
//!
//! # Example
//!
//! ```no_run
//! use rotate_writer::file::policy::{default_file_name, size_limit};
//! use rotate_writer::{RotateConfig, RotateFileManager};
//!
//! fn main() -> rotate_writer::RotateResult<()> {
//!     let config = RotateConfig::new("logs").with_max_files(5);
//!     let manager = RotateFileManager::new(config, size_limit(1024 * 1024, default_file_name))?;
//!     manager.discover("", ".log")?;
//!     manager.write(b"hello\n")?;
//!     manager.close()
//! }
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod types;
pub mod utils;
pub mod writer;

// Re-export commonly used items at crate root
pub use config::RotateConfig;
pub use error::{RotateError, RotateResult};
pub use file::{FileLedger, RotateFileManager, RotateFileManagerBuilder, RotateFileWriter};
pub use types::{RotationDecision, RotationEvent, RotationStatus};
pub use writer::{MemorySink, RotateWriter, Sink, WriterSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
