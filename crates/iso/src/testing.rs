//! In-memory ISO9660 image builder for tests.
//!
//! Produces the smallest volume the reader understands: a zeroed system
//! area, a primary volume descriptor, a set terminator, a single root
//! directory sector, and the file data. All root directory records fit in
//! one sector; callers pass identifiers without the `;1` version suffix.

const SECTOR: usize = 2048;
const PVD_SECTOR: usize = 16;
const ROOT_DIR_SECTOR: u32 = 18;
const FIRST_FILE_SECTOR: u32 = 19;

fn directory_record(lba: u32, data_len: u32, flags: u8, identifier: &[u8]) -> Vec<u8> {
    let mut len = 33 + identifier.len();
    if len % 2 == 1 {
        len += 1;
    }
    let mut record = vec![0u8; len];
    record[0] = len as u8;
    record[2..6].copy_from_slice(&lba.to_le_bytes());
    record[6..10].copy_from_slice(&lba.to_be_bytes());
    record[10..14].copy_from_slice(&data_len.to_le_bytes());
    record[14..18].copy_from_slice(&data_len.to_be_bytes());
    record[25] = flags;
    record[28..30].copy_from_slice(&1u16.to_le_bytes());
    record[30..32].copy_from_slice(&1u16.to_be_bytes());
    record[32] = identifier.len() as u8;
    record[33..33 + identifier.len()].copy_from_slice(identifier);
    record
}

/// Build a complete image containing `files` in the root directory.
///
/// File names are recorded verbatim plus a `;1` version suffix, so tests
/// can control the on-disc casing.
pub fn build_image(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut root = Vec::new();
    root.extend_from_slice(&directory_record(ROOT_DIR_SECTOR, SECTOR as u32, 0x02, &[0x00]));
    root.extend_from_slice(&directory_record(ROOT_DIR_SECTOR, SECTOR as u32, 0x02, &[0x01]));

    let mut data = Vec::new();
    let mut next_lba = FIRST_FILE_SECTOR;
    for (name, content) in files {
        let identifier = format!("{name};1");
        root.extend_from_slice(&directory_record(
            next_lba,
            content.len() as u32,
            0x00,
            identifier.as_bytes(),
        ));
        let padded = content.len().div_ceil(SECTOR) * SECTOR;
        data.extend_from_slice(content);
        data.resize(data.len() + (padded - content.len()), 0);
        next_lba += (padded / SECTOR) as u32;
    }
    assert!(root.len() <= SECTOR, "root directory exceeds one sector");
    root.resize(SECTOR, 0);

    let mut pvd = vec![0u8; SECTOR];
    pvd[0] = 1;
    pvd[1..6].copy_from_slice(b"CD001");
    pvd[6] = 1;
    pvd[156..190].copy_from_slice(&directory_record(ROOT_DIR_SECTOR, SECTOR as u32, 0x02, &[0x00]));

    let mut terminator = vec![0u8; SECTOR];
    terminator[0] = 255;
    terminator[1..6].copy_from_slice(b"CD001");
    terminator[6] = 1;

    let mut image = vec![0u8; PVD_SECTOR * SECTOR];
    image.extend_from_slice(&pvd);
    image.extend_from_slice(&terminator);
    image.extend_from_slice(&root);
    image.extend_from_slice(&data);
    image
}

/// Standard boot configuration contents for `serial` in its raw on-disc
/// form.
pub fn system_cnf(serial: &str) -> Vec<u8> {
    format!("BOOT2 = cdrom0:\\{serial};1\r\nVER = 1.00\r\nVMODE = NTSC\r\n").into_bytes()
}

/// Complete bootable-looking image whose boot line carries `serial`.
pub fn build_disc_image(serial: &str) -> Vec<u8> {
    let cnf = system_cnf(serial);
    build_image(&[("SYSTEM.CNF", &cnf)])
}
