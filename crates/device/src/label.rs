//! Volume-label lookup.
//!
//! Labels are cosmetic, so every provider fails soft: a missing helper
//! binary, an unreadable device, or a label-less volume all collapse to a
//! fallback string instead of an error.

use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::mounts::MountEntry;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fallback when the label cannot be determined at all.
pub const LABEL_UNKNOWN: &str = "Unknown";

/// Fallback for a Linux volume that simply has no label set.
pub const LABEL_UNNAMED: &str = "Unnamed Drive";

/// Fallback for a macOS volume diskutil reports as label-less.
pub const LABEL_UNTITLED: &str = "Untitled";

/// Regex pattern for the label line in `diskutil info` output.
const VOLUME_NAME_PATTERN: &str = r"Volume Name:\s+(.*)";

/// Compiled label-line regex. Compiled once, reused forever.
static VOLUME_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VOLUME_NAME_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Provider trait and implementations
// ---------------------------------------------------------------------------

/// Source of volume labels for mounted devices.
pub trait LabelProvider: Send + Sync {
    /// Best-effort label for the mounted volume; never errors.
    fn volume_label(&self, mount: &MountEntry) -> String;
}

/// Label provider for the current platform.
pub fn platform_provider() -> Box<dyn LabelProvider> {
    #[cfg(target_os = "linux")]
    return Box::new(LsblkLabelProvider);
    #[cfg(target_os = "macos")]
    return Box::new(DiskutilLabelProvider);
    #[cfg(windows)]
    return Box::new(MountTableLabelProvider);
    #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
    Box::new(UnknownLabelProvider)
}

/// Reads the label from `lsblk -no LABEL <device>`.
pub struct LsblkLabelProvider;

impl LabelProvider for LsblkLabelProvider {
    fn volume_label(&self, mount: &MountEntry) -> String {
        match Command::new("lsblk")
            .args(["-no", "LABEL", &mount.device])
            .output()
        {
            Ok(output) if output.status.success() => {
                normalize_linux_label(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::debug!(
                    device = %mount.device,
                    status = %output.status,
                    "lsblk failed"
                );
                LABEL_UNKNOWN.to_string()
            }
            Err(err) => {
                tracing::debug!(device = %mount.device, error = %err, "lsblk not available");
                LABEL_UNKNOWN.to_string()
            }
        }
    }
}

/// Reads the label from `diskutil info <mount point>`.
pub struct DiskutilLabelProvider;

impl LabelProvider for DiskutilLabelProvider {
    fn volume_label(&self, mount: &MountEntry) -> String {
        match Command::new("diskutil")
            .args(["info", &mount.mount_point])
            .output()
        {
            Ok(output) if output.status.success() => {
                parse_diskutil_label(&String::from_utf8_lossy(&output.stdout))
                    .unwrap_or_else(|| LABEL_UNKNOWN.to_string())
            }
            Ok(output) => {
                tracing::debug!(
                    mount = %mount.mount_point,
                    status = %output.status,
                    "diskutil failed"
                );
                LABEL_UNKNOWN.to_string()
            }
            Err(err) => {
                tracing::debug!(mount = %mount.mount_point, error = %err, "diskutil not available");
                LABEL_UNKNOWN.to_string()
            }
        }
    }
}

/// Uses the label carried on the mount entry itself (Windows reports it
/// with the logical-disk listing).
pub struct MountTableLabelProvider;

impl LabelProvider for MountTableLabelProvider {
    fn volume_label(&self, mount: &MountEntry) -> String {
        mount
            .label
            .clone()
            .unwrap_or_else(|| LABEL_UNKNOWN.to_string())
    }
}

/// Always answers [`LABEL_UNKNOWN`]; for platforms without a lookup.
pub struct UnknownLabelProvider;

impl LabelProvider for UnknownLabelProvider {
    fn volume_label(&self, _mount: &MountEntry) -> String {
        LABEL_UNKNOWN.to_string()
    }
}

// ---------------------------------------------------------------------------
// Output normalization
// ---------------------------------------------------------------------------

pub(crate) fn normalize_linux_label(raw: &str) -> String {
    let label = raw.trim();
    if label.is_empty() {
        LABEL_UNNAMED.to_string()
    } else {
        label.to_string()
    }
}

pub(crate) fn parse_diskutil_label(output: &str) -> Option<String> {
    let captures = VOLUME_NAME_RE.captures(output)?;
    let label = captures[1].trim();
    if label.contains("Not applicable") {
        Some(LABEL_UNTITLED.to_string())
    } else {
        Some(label.to_string())
    }
}
