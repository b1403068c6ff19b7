//! File rotation and retention
//!
//! - `RotateFileWriter`: rotating writer whose sinks are files in one directory
//! - `policy`: stock file policies (never, by size, by age)
//! - `FileLedger`: ordered record of produced files with pruning and discovery
//! - `RotateFileManager`: writer and ledger wired together
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌──────────────────┐    ┌────────────────┐    ┌──────────────┐
//! │ write() │───►│ RotateFileWriter │───►│ RotationEvent  │───►│ ledger.record│
//! │         │    │ policy -> name   │    │ (after unlock) │    │ + prune()    │
//! └─────────┘    └──────────────────┘    └────────────────┘    └──────────────┘
//!
//! Startup:
//! ┌──────────────────────┐    ┌─────────────────┐
//! │ discover(prefix, sfx)│───►│ prune oldest    │───► Ready!
//! │ ordered by mtime     │    │ past max_files  │
//! └──────────────────────┘    └─────────────────┘
//! ```

mod ledger;
mod manager;
pub mod policy;
mod writer;

pub use ledger::{ActiveFile, FileLedger};
pub use manager::{OnPruneFn, RotateFileManager, RotateFileManagerBuilder};
pub use policy::{default_file_name, FileRotatorFn};
pub use writer::RotateFileWriter;
