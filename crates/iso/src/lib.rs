//! Minimal ISO9660 reading for PS2 disc images.
//!
//! Implements just enough of ECMA-119 to find a file in the root directory
//! and read its contents: locate the primary volume descriptor, walk the
//! root directory records, and pull out the boot configuration. This is not
//! a general-purpose filesystem driver; nested directories, Joliet, and
//! Rock Ridge extensions are out of scope because `SYSTEM.CNF` always sits
//! in the root.

mod volume;

pub mod serial;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use serial::extract_serial;
