//! Serial extraction from the boot configuration.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::volume::{IsoError, Volume};

/// Root file holding the boot line on every retail PS2 disc.
const BOOT_CONFIG_NAME: &str = "SYSTEM.CNF";

/// The boot config is a handful of lines; cap the read so a damaged
/// directory record cannot balloon it.
const BOOT_CONFIG_MAX_BYTES: usize = 64 * 1024;

/// Regex pattern capturing the serial token from a boot line such as
/// `BOOT2 = cdrom0:\SLUS_200.02;1`.
const BOOT_LINE_PATTERN: &str = r"(?i)cdrom0:\s?\\(.*?);";

/// Compiled boot-line regex. Compiled once, reused forever.
static BOOT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BOOT_LINE_PATTERN).expect("valid regex"));

/// Pull the product serial out of a disc image.
///
/// Opens the image as an ISO9660 volume, reads `SYSTEM.CNF` from the root
/// directory, and captures the token from the boot line. The serial is
/// returned in its raw on-disc form (`SLUS_200.02`), with the original
/// casing preserved.
///
/// Every failure mode collapses to `None`: unreadable file, not an ISO9660
/// volume, missing or malformed boot config, no matching boot line. Causes
/// are logged at debug level.
pub fn extract_serial(path: &Path) -> Option<String> {
    match try_extract(path) {
        Ok(serial) => serial,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "Serial extraction failed");
            None
        }
    }
}

fn try_extract(path: &Path) -> Result<Option<String>, IsoError> {
    let mut volume = Volume::open(path)?;
    let extent = volume.find_in_root(BOOT_CONFIG_NAME)?;
    let content = volume.read_extent(extent, BOOT_CONFIG_MAX_BYTES)?;
    let text = String::from_utf8_lossy(&content);
    Ok(BOOT_LINE_RE
        .captures(&text)
        .map(|captures| captures[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn image_on_disk(dir: &tempfile::TempDir, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("game.iso");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn extracts_raw_serial_from_boot_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_on_disk(&dir, &testing::build_disc_image("SLUS_200.02"));

        assert_eq!(extract_serial(&path), Some("SLUS_200.02".to_string()));
    }

    #[test]
    fn boot_line_match_is_case_insensitive_but_preserves_casing() {
        let dir = tempfile::tempdir().unwrap();
        let cnf = b"BOOT2 = CDROM0:\\slus_200.02;1\r\n";
        let path = image_on_disk(&dir, &testing::build_image(&[("SYSTEM.CNF", cnf)]));

        assert_eq!(extract_serial(&path), Some("slus_200.02".to_string()));
    }

    #[test]
    fn tolerates_missing_space_after_equals() {
        let dir = tempfile::tempdir().unwrap();
        let cnf = b"BOOT2=cdrom0:\\SCES_500.03;1\nVER = 1.00\n";
        let path = image_on_disk(&dir, &testing::build_image(&[("SYSTEM.CNF", cnf)]));

        assert_eq!(extract_serial(&path), Some("SCES_500.03".to_string()));
    }

    #[test]
    fn lowercase_recorded_filename_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let cnf = testing::system_cnf("SLPS_251.05");
        let path = image_on_disk(&dir, &testing::build_image(&[("system.cnf", &cnf)]));

        assert_eq!(extract_serial(&path), Some("SLPS_251.05".to_string()));
    }

    #[test]
    fn missing_boot_config_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_on_disk(&dir, &testing::build_image(&[("README.TXT", b"hi")]));

        assert_eq!(extract_serial(&path), None);
    }

    #[test]
    fn boot_config_without_boot_line_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let cnf = b"VER = 1.00\r\nVMODE = NTSC\r\n";
        let path = image_on_disk(&dir, &testing::build_image(&[("SYSTEM.CNF", cnf)]));

        assert_eq!(extract_serial(&path), None);
    }

    #[test]
    fn non_iso_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_on_disk(&dir, b"definitely not a disc image");

        assert_eq!(extract_serial(&path), None);
    }

    #[test]
    fn missing_file_yields_none() {
        assert_eq!(extract_serial(Path::new("/no/such/file.iso")), None);
    }
}
