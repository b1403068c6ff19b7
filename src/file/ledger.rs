//! File ledger and retention
//!
//! Keeps the ordered list of files a rotating writer has produced in one
//! directory, oldest first, and deletes the oldest ones once the list grows
//! past `max_files`. The ledger can be rebuilt from disk at startup.
//!
//! Entries are ordered by the sequence index of the rotation that produced
//! them, not by the order in which rotations are reported. The file being
//! written to always has the highest index, so it is never the oldest entry
//! while `max_files` is at least one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{RotateError, RotateResult};
use crate::utils::{remove_if_exists, scan_dir};

/// The file a writer is currently appending to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFile {
    pub name: String,
    /// Sequence index of the rotation that installed it
    pub sequence: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    sequence: u64,
}

/// Ordered record of rotated files, oldest first
#[derive(Debug, Clone)]
pub struct FileLedger {
    dir: PathBuf,
    max_files: usize,
    entries: Vec<Entry>,
}

impl FileLedger {
    /// Create an empty ledger for files in `dir`
    pub fn new<P: AsRef<Path>>(dir: P, max_files: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            max_files,
            entries: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked file names, oldest first
    pub fn files(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Tracked files joined onto the ledger directory, oldest first
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| self.dir.join(&e.name)).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Record the file installed by rotation number `sequence`, then prune.
    ///
    /// The entry goes after every entry with a sequence index at or below
    /// `sequence`, so rotations reported out of order still end up in
    /// rotation order. A name that is already tracked is moved.
    ///
    /// # Returns
    ///
    /// * `Ok(removed)` - Names pruned to get back under the limit
    /// * `Err(RotateError::Prune { .. })` - A deletion failed part-way
    pub fn record(&mut self, name: impl Into<String>, sequence: u64) -> RotateResult<Vec<String>> {
        self.push(name.into(), sequence);
        self.prune()
    }

    /// Insert in sequence order without pruning
    pub(crate) fn push(&mut self, name: String, sequence: u64) {
        if let Some(idx) = self.index_of(&name) {
            self.entries.remove(idx);
        }
        let at = self
            .entries
            .iter()
            .position(|e| e.sequence > sequence)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, Entry { name, sequence });
    }

    /// Replace the ledger with files found on disk, then prune.
    ///
    /// Scans the ledger directory for regular files named
    /// `{prefix}*{suffix}`, orders them by modification time (name breaks
    /// ties) and keeps the newest `max_files`. The `active` file, if any,
    /// is taken out of the scan and kept as the newest entry whatever its
    /// modification time.
    pub fn discover(
        &mut self,
        prefix: &str,
        suffix: &str,
        active: Option<&ActiveFile>,
    ) -> RotateResult<Vec<String>> {
        let entries = scan_dir(&self.dir, prefix, suffix)?;
        debug!(
            dir = %self.dir.display(),
            found = entries.len(),
            active = ?active.map(|a| &a.name),
            "discovered rotated files"
        );

        self.entries = entries
            .into_iter()
            .filter(|entry| active.map_or(true, |a| a.name != entry.name))
            .map(|entry| Entry {
                name: entry.name,
                sequence: 0,
            })
            .collect();
        if let Some(active) = active {
            self.entries.push(Entry {
                name: active.name.clone(),
                sequence: active.sequence,
            });
        }

        self.prune()
    }

    /// Delete the oldest files until at most `max_files` remain.
    ///
    /// Stops at the first failed deletion; the error carries the names
    /// removed before it.
    pub fn prune(&mut self) -> RotateResult<Vec<String>> {
        let mut removed = Vec::new();

        while self.entries.len() > self.max_files {
            let name = self.entries[0].name.clone();
            if let Err(e) = self.delete_file_at(0) {
                return Err(RotateError::Prune {
                    removed,
                    source: e.into(),
                });
            }
            info!(file = %name, "pruned rotated file");
            removed.push(name);
        }

        Ok(removed)
    }

    /// Delete a tracked file by name. A file already gone from disk
    /// counts as deleted.
    pub fn delete_file(&mut self, name: &str) -> RotateResult<()> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| RotateError::NotFound(name.to_string()))?;
        self.delete_file_at(idx)
    }

    /// Delete the tracked file at `idx` (0 is the oldest)
    pub fn delete_file_at(&mut self, idx: usize) -> RotateResult<()> {
        let path = self.path_at(idx)?;
        if !remove_if_exists(&path)? {
            debug!(path = %path.display(), "file already removed");
        }
        self.entries.remove(idx);
        Ok(())
    }

    /// Read a tracked file by name
    pub fn read_file(&self, name: &str) -> RotateResult<Vec<u8>> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| RotateError::NotFound(name.to_string()))?;
        self.read_file_at(idx)
    }

    /// Read the tracked file at `idx` (0 is the oldest)
    pub fn read_file_at(&self, idx: usize) -> RotateResult<Vec<u8>> {
        let path = self.path_at(idx)?;
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(RotateError::NotFound(self.entries[idx].name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn path_at(&self, idx: usize) -> RotateResult<PathBuf> {
        self.entries
            .get(idx)
            .map(|e| self.dir.join(&e.name))
            .ok_or_else(|| RotateError::NotFound(format!("index {}", idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn aged_file(dir: &Path, name: &str, secs: u64) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs))
            .unwrap();
    }

    #[test]
    fn test_record_prunes_oldest() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut ledger = FileLedger::new(dir, 2);

        for name in ["a", "b", "c"] {
            write_file(dir, name, name);
        }

        assert!(ledger.record("a", 1).unwrap().is_empty());
        assert!(ledger.record("b", 2).unwrap().is_empty());
        assert_eq!(ledger.record("c", 3).unwrap(), vec!["a"]);

        assert_eq!(ledger.files(), ["b", "c"]);
        assert!(!dir.join("a").exists());
        assert!(dir.join("b").exists());
    }

    #[test]
    fn test_record_keeps_names_unique() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = FileLedger::new(temp_dir.path(), 5);

        ledger.record("a", 1).unwrap();
        ledger.record("b", 2).unwrap();
        ledger.record("a", 3).unwrap();

        assert_eq!(ledger.files(), ["b", "a"]);
    }

    #[test]
    fn test_late_record_lands_in_rotation_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut ledger = FileLedger::new(dir, 1);

        for name in ["0.log", "1.log", "2.log"] {
            write_file(dir, name, name);
        }
        ledger.push("0.log".to_string(), 0);

        // Rotation 2 is reported before rotation 1
        assert_eq!(ledger.record("2.log", 2).unwrap(), vec!["0.log"]);
        assert_eq!(ledger.record("1.log", 1).unwrap(), vec!["1.log"]);

        assert_eq!(ledger.files(), ["2.log"]);
        assert!(dir.join("2.log").exists());
        assert!(!dir.join("1.log").exists());
    }

    #[test]
    fn test_prune_treats_missing_files_as_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut ledger = FileLedger::new(dir, 1);

        // "ghost" never existed on disk
        ledger.push("ghost".to_string(), 0);
        write_file(dir, "real", "x");
        let removed = ledger.record("real", 1).unwrap();

        assert_eq!(removed, vec!["ghost"]);
        assert_eq!(ledger.files(), ["real"]);
    }

    #[test]
    fn test_prune_stops_at_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut ledger = FileLedger::new(dir, 1);

        write_file(dir, "a", "a");
        // remove_file refuses directories
        fs::create_dir(dir.join("b")).unwrap();
        write_file(dir, "c", "c");
        write_file(dir, "d", "d");

        for (seq, name) in ["a", "b", "c"].into_iter().enumerate() {
            ledger.push(name.to_string(), seq as u64);
        }
        let err = ledger.record("d", 3).unwrap_err();

        assert!(matches!(err, RotateError::Prune { .. }));
        assert_eq!(err.removed(), ["a".to_string()]);
        assert_eq!(ledger.files(), ["b", "c", "d"]);
        assert!(dir.join("c").exists());
    }

    #[test]
    fn test_discover_orders_by_mtime_and_prunes() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        aged_file(dir, "log-c.txt", 30);
        aged_file(dir, "log-a.txt", 10);
        aged_file(dir, "log-d.txt", 40);
        aged_file(dir, "log-b.txt", 20);
        aged_file(dir, "keep.bin", 0);

        let mut ledger = FileLedger::new(dir, 3);
        ledger.record("stale", 1).unwrap();

        let removed = ledger.discover("log-", ".txt", None).unwrap();

        assert_eq!(removed, vec!["log-a.txt"]);
        assert_eq!(ledger.files(), ["log-b.txt", "log-c.txt", "log-d.txt"]);
        assert!(!dir.join("log-a.txt").exists());
        assert!(dir.join("keep.bin").exists());
    }

    #[test]
    fn test_discover_keeps_active_file_newest() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        aged_file(dir, "current.log", 0);
        aged_file(dir, "r1.log", 10);
        aged_file(dir, "r2.log", 20);

        let mut ledger = FileLedger::new(dir, 2);
        let active = ActiveFile {
            name: "current.log".to_string(),
            sequence: 0,
        };
        let removed = ledger.discover("", ".log", Some(&active)).unwrap();

        assert_eq!(removed, vec!["r1.log"]);
        assert_eq!(ledger.files(), ["r2.log", "current.log"]);
        assert!(dir.join("current.log").exists());

        // The next rotation still goes after the active file
        write_file(dir, "r3.log", "");
        assert_eq!(ledger.record("r3.log", 1).unwrap(), vec!["r2.log"]);
        assert_eq!(ledger.files(), ["current.log", "r3.log"]);
    }

    #[test]
    fn test_discover_missing_dir_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = FileLedger::new(temp_dir.path().join("missing"), 3);

        let err = ledger.discover("", "", None).unwrap_err();
        assert!(matches!(err, RotateError::Io(_)));
    }

    #[test]
    fn test_delete_by_name_and_index() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut ledger = FileLedger::new(dir, 10);

        for (seq, name) in ["a", "b", "c"].into_iter().enumerate() {
            write_file(dir, name, name);
            ledger.record(name, seq as u64).unwrap();
        }

        ledger.delete_file("b").unwrap();
        assert_eq!(ledger.files(), ["a", "c"]);
        assert!(!dir.join("b").exists());

        ledger.delete_file_at(0).unwrap();
        assert_eq!(ledger.files(), ["c"]);

        assert!(ledger.delete_file("b").unwrap_err().is_not_found());
        assert!(ledger.delete_file_at(5).unwrap_err().is_not_found());

        // Missing on disk still removes the entry
        fs::remove_file(dir.join("c")).unwrap();
        ledger.delete_file("c").unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_read_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut ledger = FileLedger::new(dir, 10);

        write_file(dir, "one.log", "first");
        write_file(dir, "two.log", "second");
        ledger.record("one.log", 1).unwrap();
        ledger.record("two.log", 2).unwrap();
        ledger.record("gone.log", 3).unwrap();

        assert_eq!(ledger.read_file("two.log").unwrap(), b"second");
        assert_eq!(ledger.read_file_at(0).unwrap(), b"first");
        assert_eq!(
            ledger.file_paths(),
            vec![dir.join("one.log"), dir.join("two.log"), dir.join("gone.log")]
        );

        assert!(ledger.read_file("nope.log").unwrap_err().is_not_found());
        assert!(ledger.read_file_at(3).unwrap_err().is_not_found());
        assert!(ledger.read_file("gone.log").unwrap_err().is_not_found());
    }
}
