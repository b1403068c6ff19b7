//! File-system helpers
//!
//! Thin wrappers over `std::fs` used by the file-backed writer and the
//! retention layer: directory creation, append-mode opens, idempotent
//! removal and modification-time ordered directory scans.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A regular file found by `scan_dir`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name relative to the scanned directory
    pub name: String,
    pub modified: SystemTime,
}

/// Directory a file lives in, `.` for bare file names
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Create `dir` and its parents if missing
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Open `path` for appending, creating the file (and its directory) if needed
pub fn open_append(path: &Path) -> io::Result<File> {
    ensure_dir(&parent_dir(path))?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Remove a file, treating an already-missing file as success.
///
/// # Returns
///
/// * `Ok(true)` - File was removed
/// * `Ok(false)` - File did not exist
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// List regular files in `dir` whose name starts with `prefix` and ends
/// with `suffix`, oldest modification time first. Ties are broken by name
/// so that the order is reproducible.
pub fn scan_dir(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if !file_type.is_file() {
            continue;
        }

        // Non UTF-8 names can never match a rotation name
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !name.starts_with(prefix) || !name.ends_with(suffix) {
            continue;
        }

        let metadata = entry.metadata()?;
        entries.push(FileEntry {
            name,
            modified: metadata.modified()?,
        });
    }

    entries.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, modified: SystemTime) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("logs/app.log")), PathBuf::from("logs"));
        assert_eq!(parent_dir(Path::new("app.log")), PathBuf::from("."));
    }

    #[test]
    fn test_open_append_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("out.log");

        {
            use std::io::Write;
            let mut file = open_append(&path).unwrap();
            file.write_all(b"one\n").unwrap();
            let mut file = open_append(&path).unwrap();
            file.write_all(b"two\n").unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_remove_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.log");
        fs::write(&path, "x").unwrap();

        assert!(remove_if_exists(&path).unwrap());
        assert!(!path.exists());
        assert!(!remove_if_exists(&path).unwrap());
    }

    #[test]
    fn test_scan_dir_filters_and_orders() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        touch(dir, "app-3.log", base + Duration::from_secs(30));
        touch(dir, "app-1.log", base + Duration::from_secs(10));
        touch(dir, "app-2.log", base + Duration::from_secs(20));
        touch(dir, "other-1.log", base);
        touch(dir, "app-4.txt", base);
        fs::create_dir(dir.join("app-dir.log")).unwrap();

        let names: Vec<String> = scan_dir(dir, "app-", ".log")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();

        assert_eq!(names, vec!["app-1.log", "app-2.log", "app-3.log"]);
    }

    #[test]
    fn test_scan_dir_breaks_ties_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let same = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        touch(dir, "b.log", same);
        touch(dir, "c.log", same);
        touch(dir, "a.log", same);

        let names: Vec<String> = scan_dir(dir, "", ".log")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();

        assert_eq!(names, vec!["a.log", "b.log", "c.log"]);
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(scan_dir(&missing, "", "").is_err());
    }
}
