//! Low-level ISO9660 volume access.
//!
//! Numeric fields in descriptors are recorded in both byte orders; only the
//! little-endian half is read. Directory records never span a sector
//! boundary, so a zero length byte means "skip to the next sector".

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Logical sector size for ISO9660 data tracks.
pub(crate) const SECTOR_SIZE: usize = 2048;

/// Volume descriptors start at sector 16; everything before is the system
/// area.
const DESCRIPTOR_START_SECTOR: u64 = 16;

/// Upper bound on the descriptor scan; real discs terminate well before.
const MAX_DESCRIPTORS: u64 = 64;

/// Standard identifier carried by every volume descriptor.
const STANDARD_IDENTIFIER: &[u8] = b"CD001";

const TYPE_PRIMARY: u8 = 1;
const TYPE_TERMINATOR: u8 = 255;

/// Offset of the root directory record inside the primary volume descriptor.
const ROOT_RECORD_OFFSET: usize = 156;

/// Directory records are at least 33 header bytes plus a one-byte name.
const MIN_RECORD_LEN: usize = 34;

const FLAG_DIRECTORY: u8 = 0x02;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub(crate) enum IsoError {
    #[error("I/O error reading volume: {0}")]
    Io(#[from] std::io::Error),

    #[error("no primary volume descriptor found")]
    MissingPrimaryDescriptor,

    #[error("malformed directory record")]
    MalformedRecord,

    #[error("file not found in root directory: {0}")]
    FileNotFound(String),
}

/// Location and length of a file's data within the volume.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Extent {
    pub lba: u32,
    pub len: u32,
}

struct DirRecord<'a> {
    len: usize,
    extent: Extent,
    flags: u8,
    identifier: &'a [u8],
}

pub(crate) struct Volume {
    file: File,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

impl Volume {
    pub fn open(path: &Path) -> Result<Self, IsoError> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    fn read_sector(&mut self, lba: u64) -> Result<[u8; SECTOR_SIZE], IsoError> {
        self.file.seek(SeekFrom::Start(lba * SECTOR_SIZE as u64))?;
        let mut buf = [0u8; SECTOR_SIZE];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Scan the descriptor sequence for the primary volume descriptor.
    ///
    /// A sector without the `CD001` identifier means this is not an ISO9660
    /// volume at all; the set terminator means the sequence ended without a
    /// primary descriptor.
    fn primary_descriptor(&mut self) -> Result<[u8; SECTOR_SIZE], IsoError> {
        for index in 0..MAX_DESCRIPTORS {
            let sector = self.read_sector(DESCRIPTOR_START_SECTOR + index)?;
            if &sector[1..6] != STANDARD_IDENTIFIER {
                return Err(IsoError::MissingPrimaryDescriptor);
            }
            match sector[0] {
                TYPE_PRIMARY => return Ok(sector),
                TYPE_TERMINATOR => return Err(IsoError::MissingPrimaryDescriptor),
                _ => {}
            }
        }
        Err(IsoError::MissingPrimaryDescriptor)
    }

    fn root_directory(&mut self) -> Result<Extent, IsoError> {
        let pvd = self.primary_descriptor()?;
        let record =
            parse_record(&pvd, ROOT_RECORD_OFFSET)?.ok_or(IsoError::MalformedRecord)?;
        Ok(record.extent)
    }

    /// Find a file by name in the root directory, ignoring case and the
    /// `;version` suffix on recorded identifiers.
    pub fn find_in_root(&mut self, name: &str) -> Result<Extent, IsoError> {
        let dir = self.root_directory()?;
        let sectors = u64::from(dir.len).div_ceil(SECTOR_SIZE as u64);
        for index in 0..sectors {
            let sector = self.read_sector(u64::from(dir.lba) + index)?;
            let mut pos = 0usize;
            while pos < SECTOR_SIZE {
                let Some(record) = parse_record(&sector, pos)? else {
                    break;
                };
                if record.flags & FLAG_DIRECTORY == 0
                    && identifier_matches(record.identifier, name)
                {
                    return Ok(record.extent);
                }
                pos += record.len;
            }
        }
        Err(IsoError::FileNotFound(name.to_string()))
    }

    /// Read at most `cap` bytes of an extent's data. A truncated image
    /// yields however many bytes are actually present.
    pub fn read_extent(&mut self, extent: Extent, cap: usize) -> Result<Vec<u8>, IsoError> {
        let len = (extent.len as usize).min(cap);
        self.file
            .seek(SeekFrom::Start(u64::from(extent.lba) * SECTOR_SIZE as u64))?;
        let mut buf = Vec::with_capacity(len);
        (&mut self.file).take(len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Record parsing
// ---------------------------------------------------------------------------

fn le_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Parse the directory record starting at `pos`, or `None` for the zero
/// padding that ends a sector's records.
fn parse_record(buf: &[u8], pos: usize) -> Result<Option<DirRecord<'_>>, IsoError> {
    let len = *buf.get(pos).ok_or(IsoError::MalformedRecord)? as usize;
    if len == 0 {
        return Ok(None);
    }
    if len < MIN_RECORD_LEN {
        return Err(IsoError::MalformedRecord);
    }
    let record = buf.get(pos..pos + len).ok_or(IsoError::MalformedRecord)?;

    let lba = le_u32(record, 2).ok_or(IsoError::MalformedRecord)?;
    let data_len = le_u32(record, 10).ok_or(IsoError::MalformedRecord)?;
    let flags = record[25];
    let ident_len = record[32] as usize;
    let identifier = record
        .get(33..33 + ident_len)
        .ok_or(IsoError::MalformedRecord)?;

    Ok(Some(DirRecord {
        len,
        extent: Extent {
            lba,
            len: data_len,
        },
        flags,
        identifier,
    }))
}

fn identifier_matches(identifier: &[u8], wanted: &str) -> bool {
    let identifier = String::from_utf8_lossy(identifier);
    let base = identifier.split(';').next().unwrap_or_default();
    let base = base.strip_suffix('.').unwrap_or(base);
    base.eq_ignore_ascii_case(wanted)
}
