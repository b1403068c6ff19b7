//! Rotating file manager
//!
//! Couples a `RotateFileWriter` with a `FileLedger`: every rotation is
//! recorded in the ledger, which immediately prunes the oldest files past
//! the configured maximum.
//!
//! The rotation observer runs after the writer has released its lock and
//! only then takes the ledger lock, so the two locks are never held by the
//! same thread at once. Observers of concurrent rotations may finish in any
//! order; the ledger places each file by its sequence index, so the file
//! being written to is never pruned.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::warn;

use crate::config::RotateConfig;
use crate::error::{RotateError, RotateResult};
use crate::types::{RotationEvent, RotationStatus};
use crate::writer::OnRotateFn;

use super::ledger::FileLedger;
use super::policy::{default_policy, FileRotatorFn};
use super::writer::RotateFileWriter;

/// Called after each automatic prune with the removed names and the error
/// that stopped it, if any
pub type OnPruneFn = Box<dyn Fn(&[String], Option<&RotateError>) + Send + Sync>;

/// Builder for `RotateFileManager`
pub struct RotateFileManagerBuilder {
    config: RotateConfig,
    policy: FileRotatorFn,
    on_rotate: Option<OnRotateFn>,
    on_prune: Option<OnPruneFn>,
}

impl RotateFileManagerBuilder {
    /// Set the file rotation policy (defaults to never rotating)
    pub fn policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&RotationStatus) -> Option<String> + Send + Sync + 'static,
    {
        self.policy = Box::new(policy);
        self
    }

    /// Hook called on every rotation, before the ledger is updated
    pub fn on_rotate<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RotationEvent) + Send + Sync + 'static,
    {
        self.on_rotate = Some(Box::new(hook));
        self
    }

    pub fn on_prune<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[String], Option<&RotateError>) + Send + Sync + 'static,
    {
        self.on_prune = Some(Box::new(hook));
        self
    }

    /// Open the initial file and wire the ledger to the writer
    pub fn build(self) -> RotateResult<RotateFileManager> {
        self.config.validate()?;

        let ledger = Arc::new(Mutex::new(FileLedger::new(
            &self.config.dir,
            self.config.max_files,
        )));

        let observer_ledger = ledger.clone();
        let on_rotate = self.on_rotate;
        let on_prune = self.on_prune;
        let writer = RotateFileWriter::new(self.config.initial_path(), self.policy)?.on_rotate(
            move |event| {
                if let Some(hook) = &on_rotate {
                    hook(event);
                }
                let Some(name) = event.name.as_deref() else {
                    return;
                };
                let outcome = observer_ledger.lock().record(name, event.sequence_index);
                report_prune(on_prune.as_ref(), &outcome);
            },
        );

        ledger.lock().push(self.config.initial_file.clone(), 0);

        Ok(RotateFileManager {
            writer,
            ledger,
            config: self.config,
        })
    }
}

fn report_prune(hook: Option<&OnPruneFn>, outcome: &RotateResult<Vec<String>>) {
    match outcome {
        Ok(removed) => {
            if let Some(hook) = hook {
                hook(removed, None);
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to prune files");
            if let Some(hook) = hook {
                hook(e.removed(), Some(e));
            }
        }
    }
}

/// Rotating file writer with bounded retention
pub struct RotateFileManager {
    writer: RotateFileWriter,
    ledger: Arc<Mutex<FileLedger>>,
    config: RotateConfig,
}

impl RotateFileManager {
    pub fn builder(config: RotateConfig) -> RotateFileManagerBuilder {
        RotateFileManagerBuilder {
            config,
            policy: Box::new(default_policy()),
            on_rotate: None,
            on_prune: None,
        }
    }

    /// Create a manager with `policy` and no hooks
    pub fn new<F>(config: RotateConfig, policy: F) -> RotateResult<Self>
    where
        F: Fn(&RotationStatus) -> Option<String> + Send + Sync + 'static,
    {
        Self::builder(config).policy(policy).build()
    }

    pub fn config(&self) -> &RotateConfig {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn max_files(&self) -> usize {
        self.config.max_files
    }

    // --- Writing ---

    pub fn write(&self, buf: &[u8]) -> RotateResult<usize> {
        self.writer.write(buf)
    }

    /// Rotate into `name` right away; the ledger records it like any other
    /// rotation.
    pub fn rotate(&self, name: &str, at: DateTime<Utc>) -> RotateResult<()> {
        self.writer.rotate(name, at)
    }

    pub fn flush(&self) -> RotateResult<()> {
        self.writer.flush()
    }

    pub fn close(&self) -> RotateResult<()> {
        self.writer.close()
    }

    pub fn open(&self) -> RotateResult<()> {
        self.writer.open()
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_open()
    }

    pub fn status(&self) -> RotationStatus {
        self.writer.status()
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.writer.current_path()
    }

    // --- Retention ---

    /// Rebuild the ledger from files in the directory matching
    /// `{prefix}*{suffix}`, oldest first, and prune it. The file currently
    /// written to stays tracked as the newest entry.
    ///
    /// # Returns
    ///
    /// * `Ok(removed)` - Names pruned after discovery
    pub fn discover(&self, prefix: &str, suffix: &str) -> RotateResult<Vec<String>> {
        let active = self.writer.active_file();
        self.ledger.lock().discover(prefix, suffix, active.as_ref())
    }

    /// Delete the oldest files until at most `max_files` remain
    pub fn prune(&self) -> RotateResult<Vec<String>> {
        self.ledger.lock().prune()
    }

    pub fn delete_file(&self, name: &str) -> RotateResult<()> {
        self.ledger.lock().delete_file(name)
    }

    pub fn delete_file_at(&self, idx: usize) -> RotateResult<()> {
        self.ledger.lock().delete_file_at(idx)
    }

    /// Tracked file names, oldest first
    pub fn files(&self) -> Vec<String> {
        self.ledger.lock().files()
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.ledger.lock().file_paths()
    }

    pub fn num_files(&self) -> usize {
        self.ledger.lock().len()
    }

    pub fn read_file(&self, name: &str) -> RotateResult<Vec<u8>> {
        self.ledger.lock().read_file(name)
    }

    pub fn read_file_at(&self, idx: usize) -> RotateResult<Vec<u8>> {
        self.ledger.lock().read_file_at(idx)
    }
}

impl io::Write for &RotateFileManager {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RotateFileManager::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(RotateFileManager::flush(self)?)
    }
}
