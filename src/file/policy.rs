//! File rotation policies
//!
//! A file policy looks at the rotation status and either returns the name
//! of the file to rotate into, or `None` to keep writing where it is. The
//! file writer turns the name into an opened file inside `dir`.

use chrono::SecondsFormat;

use crate::types::RotationStatus;

/// Decides whether to rotate and into which file name
pub type FileRotatorFn = Box<dyn Fn(&RotationStatus) -> Option<String> + Send + Sync>;

/// `"{index}-{period start, RFC 3339}"`
pub fn default_file_name(status: &RotationStatus) -> String {
    format!(
        "{}-{}",
        status.sequence_index,
        status.period_start.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Never rotate
pub fn default_policy() -> impl Fn(&RotationStatus) -> Option<String> + Send + Sync + 'static {
    |_| None
}

/// Rotate before a write that would push a non-empty file past `max_bytes`.
///
/// A single write larger than `max_bytes` still lands whole in a fresh
/// file; files are never split mid-write.
pub fn size_limit<N>(
    max_bytes: u64,
    namer: N,
) -> impl Fn(&RotationStatus) -> Option<String> + Send + Sync + 'static
where
    N: Fn(&RotationStatus) -> String + Send + Sync + 'static,
{
    move |status| {
        if status.current_size > 0 && status.projected_size() > max_bytes {
            Some(namer(status))
        } else {
            None
        }
    }
}

/// Rotate once the current period is at least `limit` old
pub fn max_age<N>(
    limit: chrono::Duration,
    namer: N,
) -> impl Fn(&RotationStatus) -> Option<String> + Send + Sync + 'static
where
    N: Fn(&RotationStatus) -> String + Send + Sync + 'static,
{
    move |status| (status.elapsed() >= limit).then(|| namer(status))
}
