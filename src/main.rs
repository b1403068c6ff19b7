//! rotate-tee - Binary Entry Point
//!
//! Copies stdin into rotating files under `ROTATE_DIR`.
//!
//! Usage: `rotate-tee [config.json]`. Environment variables override the
//! JSON file.

use std::env;
use std::io::{self, BufRead};
use std::sync::Arc;

use tracing::{error, info};

use rotate_writer::file::policy::{default_policy, size_limit};
use rotate_writer::logging::init_logging;
use rotate_writer::{RotateConfig, RotateFileManager, RotateResult, RotationStatus};

fn load_config() -> RotateResult<RotateConfig> {
    match env::args().nth(1) {
        Some(path) => RotateConfig::from_json_file(path)?.merge_env(|key| env::var(key).ok()),
        None => RotateConfig::from_env(),
    }
}

/// Copy `reader` into `manager` one line at a time, bytes untouched.
/// Returns the number of bytes copied.
fn copy_lines<R: BufRead>(mut reader: R, manager: &RotateFileManager) -> RotateResult<u64> {
    let mut buf = Vec::new();
    let mut copied = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(copied);
        }
        manager.write(&buf)?;
        copied += buf.len() as u64;
    }
}

fn build_manager(config: RotateConfig) -> RotateResult<RotateFileManager> {
    let prefix = config.prefix.clone();
    let suffix = config.suffix.clone();
    let namer = move |status: &RotationStatus| {
        format!(
            "{}{}-{}{}",
            prefix,
            status.evaluated_at.format("%Y%m%dT%H%M%S"),
            status.sequence_index,
            suffix
        )
    };

    let builder = RotateFileManager::builder(config.clone())
        .on_rotate(|event| info!(name = ?event.name, index = event.sequence_index, "rotated"));
    let builder = match config.max_bytes {
        Some(max_bytes) => builder.policy(size_limit(max_bytes, namer)),
        None => builder.policy(default_policy()),
    };
    builder.build()
}

fn main() -> RotateResult<()> {
    init_logging("info");

    let config = load_config()?;
    info!(
        dir = %config.dir.display(),
        max_files = config.max_files,
        max_bytes = ?config.max_bytes,
        "starting rotate-tee"
    );

    let manager = Arc::new(build_manager(config.clone())?);
    let removed = manager.discover(&config.prefix, &config.suffix)?;
    if !removed.is_empty() {
        info!(count = removed.len(), "pruned files left over from a previous run");
    }

    let signal_manager = manager.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if let Err(e) = signal_manager.close() {
            error!(error = %e, "failed to close on signal");
        }
        std::process::exit(0);
    }) {
        error!(error = %e, "failed to install signal handler");
    }

    let copied = copy_lines(io::stdin().lock(), &manager)?;

    manager.close()?;
    info!(bytes = copied, files = manager.num_files(), "stdin closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_copy_lines_keeps_raw_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let manager = RotateFileManager::builder(RotateConfig::new(temp_dir.path()))
            .build()
            .unwrap();

        let input: &[u8] = b"plain\r\nbad \xff\xfe byte\nno newline";
        let copied = copy_lines(Cursor::new(input), &manager).unwrap();

        assert_eq!(copied, input.len() as u64);
        assert_eq!(manager.read_file("current.log").unwrap(), input);
    }
}
