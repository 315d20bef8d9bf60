//! Mounted-volume enumeration.
//!
//! Each platform reports its mount table differently; the parsers are kept
//! as pure functions over the raw text so they stay testable everywhere,
//! and only [`list_mounts`] touches the running system.

/// One mounted volume.
#[derive(Debug, Clone)]
pub struct MountEntry {
    /// Directory (or drive root on Windows) where the volume is attached.
    pub mount_point: String,
    /// Backing device node, e.g. `/dev/sdb1`. Equal to the drive id on
    /// Windows.
    pub device: String,
    /// Filesystem type as reported by the platform.
    pub fs_type: String,
    /// Volume label, when the platform reports it with the mount table
    /// (Windows does; Unix needs a separate lookup).
    pub label: Option<String>,
    /// Free bytes, when reported with the mount table.
    pub free: Option<u64>,
    /// Total bytes, when reported with the mount table.
    pub total: Option<u64>,
}

/// Pick the mount whose mount point is the longest prefix of `path`.
///
/// `/media/usb` must win over `/media` (and both over `/`) for a path
/// inside the USB device, so the longest matching prefix is the volume
/// that actually contains the path.
pub fn select_mount<'a>(mounts: &'a [MountEntry], path: &str) -> Option<&'a MountEntry> {
    mounts
        .iter()
        .filter(|entry| mount_covers(&entry.mount_point, path))
        .max_by_key(|entry| entry.mount_point.len())
}

fn mount_covers(mount_point: &str, path: &str) -> bool {
    if cfg!(windows) {
        // Drive letters compare case-insensitively.
        path.to_lowercase().starts_with(&mount_point.to_lowercase())
    } else {
        path.starts_with(mount_point)
    }
}

// ---------------------------------------------------------------------------
// Platform table readers
// ---------------------------------------------------------------------------

/// Enumerate currently mounted volumes.
#[cfg(target_os = "linux")]
pub fn list_mounts() -> std::io::Result<Vec<MountEntry>> {
    let content = std::fs::read_to_string("/proc/self/mounts")?;
    Ok(parse_mount_table(&content))
}

/// Enumerate currently mounted volumes.
#[cfg(target_os = "macos")]
pub fn list_mounts() -> std::io::Result<Vec<MountEntry>> {
    let output = std::process::Command::new("mount").output()?;
    Ok(parse_mount_output(&String::from_utf8_lossy(&output.stdout)))
}

/// Enumerate logical drives with their labels and capacities.
#[cfg(windows)]
pub fn list_mounts() -> std::io::Result<Vec<MountEntry>> {
    let output = std::process::Command::new("powershell")
        .args([
            "-NoProfile",
            "-Command",
            "Get-CimInstance Win32_LogicalDisk | \
             Select-Object DeviceID,FileSystem,VolumeName,FreeSpace,Size | \
             ConvertTo-Csv -NoTypeInformation",
        ])
        .output()?;
    Ok(parse_cim_rows(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub fn list_mounts() -> std::io::Result<Vec<MountEntry>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "mount enumeration not supported on this platform",
    ))
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse `/proc/self/mounts` content: `device mountpoint fstype options ...`
/// per line, with spaces in paths encoded as octal escapes.
pub(crate) fn parse_mount_table(content: &str) -> Vec<MountEntry> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            Some(MountEntry {
                mount_point: decode_octal_escapes(mount_point),
                device: decode_octal_escapes(device),
                fs_type: fs_type.to_string(),
                label: None,
                free: None,
                total: None,
            })
        })
        .collect()
}

/// Decode the `\040`-style octal escapes the kernel uses for whitespace in
/// mount table fields.
pub(crate) fn decode_octal_escapes(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let digits: String = chars.clone().take(3).collect();
        if digits.len() == 3 && digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            if let Ok(code) = u8::from_str_radix(&digits, 8) {
                out.push(code as char);
                chars.nth(2);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Parse BSD `mount` output: `/dev/disk1s1 on /Volumes/USB (exfat, local)`.
pub(crate) fn parse_mount_output(output: &str) -> Vec<MountEntry> {
    output
        .lines()
        .filter_map(|line| {
            let (device, rest) = line.split_once(" on ")?;
            let (mount_point, attrs) = match rest.rsplit_once(" (") {
                Some((mount_point, attrs)) => (mount_point, attrs),
                None => (rest, ""),
            };
            let fs_type = attrs
                .trim_end_matches(')')
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Some(MountEntry {
                mount_point: mount_point.to_string(),
                device: device.to_string(),
                fs_type,
                label: None,
                free: None,
                total: None,
            })
        })
        .collect()
}

/// Parse `ConvertTo-Csv` rows of Win32_LogicalDisk:
/// `DeviceID,FileSystem,VolumeName,FreeSpace,Size`.
pub(crate) fn parse_cim_rows(csv: &str) -> Vec<MountEntry> {
    let mut lines = csv.lines().filter(|line| !line.trim().is_empty());
    let _header = lines.next();
    lines
        .filter_map(|line| {
            let fields = split_csv_line(line);
            let device_id = fields.first()?.clone();
            if device_id.is_empty() {
                return None;
            }
            Some(MountEntry {
                mount_point: format!("{device_id}\\"),
                device: device_id,
                fs_type: fields.get(1).cloned().unwrap_or_default(),
                label: fields.get(2).cloned().filter(|label| !label.is_empty()),
                free: fields.get(3).and_then(|value| value.parse().ok()),
                total: fields.get(4).and_then(|value| value.parse().ok()),
            })
        })
        .collect()
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
