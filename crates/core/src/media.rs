//! Naming and classification rules for PS2 disc images.
//!
//! Everything the pipeline derives from a serial, a title, or an image size
//! lives here: canonical serial form, filesystem-safe titles, the CD/DVD
//! split, and the OPL-compatible file names for images and cover art.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Images strictly larger than this are filed as DVDs (700 MiB, the CD-R
/// capacity OPL uses to pick the read mode).
pub const DVD_THRESHOLD_BYTES: u64 = 734_003_200;

/// Destination folder for CD-sized images.
pub const SUBFOLDER_CD: &str = "CD";

/// Destination folder for DVD-sized images.
pub const SUBFOLDER_DVD: &str = "DVD";

/// Folder on the storage device that holds cover art.
pub const ART_SUBFOLDER: &str = "ART";

/// Display title used when a serial has no catalog entry.
pub const UNKNOWN_TITLE: &str = "Unknown Game";

/// Regex pattern matching characters that are unsafe in file names.
pub const UNSAFE_TITLE_PATTERN: &str = r#"[<>:"/\\|?*]"#;

/// Compiled unsafe-character regex. Compiled once, reused forever.
static UNSAFE_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UNSAFE_TITLE_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Serial and title normalization
// ---------------------------------------------------------------------------

/// Canonical form of a disc serial: underscores become hyphens, dots are
/// dropped, letters are uppercased.
///
/// Both `SLUS_200.02` (the on-disc boot form) and `SLUS-200.02` collapse to
/// `SLUS-20002`, the form used for catalog keys and cover file names.
///
/// ```
/// use romen_core::media::canonical_serial;
///
/// assert_eq!(canonical_serial("SLUS_200.02"), "SLUS-20002");
/// ```
pub fn canonical_serial(serial: &str) -> String {
    serial.replace('_', "-").replace('.', "").to_uppercase()
}

/// Strip characters that are unsafe in file names and trim whitespace.
///
/// The title text itself is otherwise preserved, including inner spacing.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_TITLE_RE.replace_all(title, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Media classification and file naming
// ---------------------------------------------------------------------------

/// Destination subfolder for an image of `size` bytes.
///
/// Sizes up to and including [`DVD_THRESHOLD_BYTES`] are CDs; anything
/// strictly larger is a DVD.
pub fn media_subfolder(size: u64) -> &'static str {
    if size > DVD_THRESHOLD_BYTES {
        SUBFOLDER_DVD
    } else {
        SUBFOLDER_CD
    }
}

/// OPL-compatible image file name: `<serial>.<title>.iso`.
///
/// The serial keeps its raw on-disc form (OPL parses it back out of the
/// file name); the title must already be sanitized.
pub fn image_filename(serial: &str, clean_title: &str) -> String {
    format!("{serial}.{clean_title}.iso")
}

/// Cover art file name stored under the device's ART folder.
pub fn cover_filename(serial: &str) -> String {
    format!("{}_COV.jpg", canonical_serial(serial))
}

/// Remote URL for a serial's cover art under `base`.
pub fn cover_art_url(base: &str, serial: &str) -> String {
    format!("{}/{}.jpg", base.trim_end_matches('/'), canonical_serial(serial))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- canonical_serial -------------------------------------------------

    #[test]
    fn canonical_serial_normalizes_boot_form() {
        assert_eq!(canonical_serial("SLUS_200.02"), "SLUS-20002");
    }

    #[test]
    fn canonical_serial_normalizes_hyphen_form() {
        assert_eq!(canonical_serial("SLUS-200.02"), "SLUS-20002");
    }

    #[test]
    fn canonical_serial_uppercases() {
        assert_eq!(canonical_serial("slus_200.02"), "SLUS-20002");
    }

    #[test]
    fn canonical_serial_passes_through_clean_input() {
        assert_eq!(canonical_serial("SCES-50003"), "SCES-50003");
    }

    #[test]
    fn canonical_serial_of_empty_is_empty() {
        assert_eq!(canonical_serial(""), "");
    }

    // -- sanitize_title ---------------------------------------------------

    #[test]
    fn sanitize_title_strips_unsafe_characters() {
        assert_eq!(
            sanitize_title("Kingdom Hearts: Final Mix"),
            "Kingdom Hearts Final Mix"
        );
        assert_eq!(sanitize_title(r#"A/B\C<D>E"F|G?H*I"#), "ABCDEFGHI");
    }

    #[test]
    fn sanitize_title_trims_whitespace() {
        assert_eq!(sanitize_title("  Gran Turismo 3 "), "Gran Turismo 3");
    }

    #[test]
    fn sanitize_title_keeps_inner_punctuation() {
        assert_eq!(sanitize_title("Ico (PAL)"), "Ico (PAL)");
    }

    // -- media_subfolder --------------------------------------------------

    #[test]
    fn small_images_are_cds() {
        assert_eq!(media_subfolder(650 * 1024 * 1024), SUBFOLDER_CD);
    }

    #[test]
    fn large_images_are_dvds() {
        assert_eq!(media_subfolder(800 * 1024 * 1024), SUBFOLDER_DVD);
    }

    #[test]
    fn threshold_size_is_still_a_cd() {
        assert_eq!(media_subfolder(DVD_THRESHOLD_BYTES), SUBFOLDER_CD);
        assert_eq!(media_subfolder(DVD_THRESHOLD_BYTES + 1), SUBFOLDER_DVD);
    }

    // -- file naming ------------------------------------------------------

    #[test]
    fn image_filename_keeps_raw_serial() {
        assert_eq!(
            image_filename("SLUS_200.02", "Gran Turismo 3"),
            "SLUS_200.02.Gran Turismo 3.iso"
        );
    }

    #[test]
    fn cover_filename_uses_canonical_serial() {
        assert_eq!(cover_filename("SLUS_200.02"), "SLUS-20002_COV.jpg");
    }

    #[test]
    fn cover_art_url_joins_base_and_canonical_serial() {
        assert_eq!(
            cover_art_url("https://covers.example/default", "SLUS_200.02"),
            "https://covers.example/default/SLUS-20002.jpg"
        );
        assert_eq!(
            cover_art_url("https://covers.example/default/", "SLUS-20002"),
            "https://covers.example/default/SLUS-20002.jpg"
        );
    }
}
