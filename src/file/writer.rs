//! File-backed rotating writer
//!
//! Wraps `RotateWriter<File>` so that policies deal in file names instead
//! of sinks. Every file lives in one directory, taken from the initial
//! path; names returned by the policy are resolved against it and opened
//! in append mode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{RotateError, RotateResult};
use crate::types::{RotationDecision, RotationEvent, RotationStatus};
use crate::utils::{ensure_dir, open_append, parent_dir};
use crate::writer::RotateWriter;

use super::ledger::ActiveFile;
use super::policy::default_policy;

/// Rotating writer over files in a single directory
pub struct RotateFileWriter {
    inner: RotateWriter<File>,
    dir: PathBuf,
}

impl RotateFileWriter {
    /// Open `initial_path` (creating its directory if needed) and rotate
    /// according to `policy`.
    pub fn new<P, F>(initial_path: P, policy: F) -> RotateResult<Self>
    where
        P: AsRef<Path>,
        F: Fn(&RotationStatus) -> Option<String> + Send + Sync + 'static,
    {
        let initial_path = initial_path.as_ref();
        let name = file_name_of(initial_path)?;
        let dir = parent_dir(initial_path);
        ensure_dir(&dir)?;

        let file = open_append(initial_path)?;

        let policy_dir = dir.clone();
        let inner = RotateWriter::new(file)
            .with_name(name)
            .with_policy(move |status| match policy(status) {
                Some(name) => {
                    let file = open_append(&policy_dir.join(&name))?;
                    Ok(RotationDecision::rotate_named(file, name))
                }
                None => Ok(RotationDecision::Continue),
            });

        Ok(Self { inner, dir })
    }

    /// Open `initial_path` with the never-rotate policy
    pub fn with_default_policy<P: AsRef<Path>>(initial_path: P) -> RotateResult<Self> {
        Self::new(initial_path, default_policy())
    }

    /// Register the rotation observer
    pub fn on_rotate<F>(self, observer: F) -> Self
    where
        F: Fn(&RotationEvent) + Send + Sync + 'static,
    {
        Self {
            inner: self.inner.on_rotate(observer),
            dir: self.dir,
        }
    }

    /// Directory holding every file this writer produces
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Name of the file currently written to
    pub fn current_name(&self) -> Option<String> {
        self.inner.current_name()
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current_name().map(|name| self.dir.join(name))
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Name and sequence index of the file currently written to
    pub fn active_file(&self) -> Option<ActiveFile> {
        match self.inner.current_sink() {
            (Some(name), sequence) => Some(ActiveFile { name, sequence }),
            (None, _) => None,
        }
    }

    /// Reopen the current file in append mode after a `close`.
    /// Does nothing if the writer is already open.
    pub fn open(&self) -> RotateResult<()> {
        if self.is_open() {
            return Ok(());
        }

        let path = self
            .current_path()
            .ok_or_else(|| RotateError::NotFound("no current file".to_string()))?;
        let file = OpenOptions::new().append(true).open(&path)?;

        match self.inner.reopen(file) {
            Err(RotateError::AlreadyOpen) => Ok(()),
            other => other,
        }
    }

    pub fn write(&self, buf: &[u8]) -> RotateResult<usize> {
        self.inner.write(buf)
    }

    /// Rotate into `dir/name`, starting a new period at `at`
    pub fn rotate(&self, name: &str, at: DateTime<Utc>) -> RotateResult<()> {
        let file = open_append(&self.dir.join(name)).map_err(RotateError::Rotation)?;
        self.inner.rotate(file, Some(name.to_string()), at)
    }

    /// Start over on `dir/name` with all counters reset
    pub fn reset(&self, name: &str) -> RotateResult<()> {
        let file = open_append(&self.dir.join(name))?;
        self.inner.reset_named(file, Some(name.to_string()));
        Ok(())
    }

    pub fn flush(&self) -> RotateResult<()> {
        self.inner.flush()
    }

    pub fn close(&self) -> RotateResult<()> {
        self.inner.close()
    }

    pub fn status(&self) -> RotationStatus {
        self.inner.status()
    }
}

impl io::Write for &RotateFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RotateFileWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(RotateFileWriter::flush(self)?)
    }
}

fn file_name_of(path: &Path) -> RotateResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            RotateError::InvalidConfig(format!("{} has no usable file name", path.display()))
        })
}
