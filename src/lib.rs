//! Library for working with NTFS reparse points.
//!
//! A reparse point is a tagged blob of metadata attached to a file or
//! directory, interpreted by filesystem drivers to redirect operations on
//! the path (junctions, symbolic links, mount points, and vendor-defined
//! formats). This crate works on the attribute itself: checking for it,
//! reading its tag, GUID and raw payload, attaching a vendor-defined
//! ("custom") reparse point, and removing a reparse point of either buffer
//! layout. Payloads are opaque bytes; nothing here decodes the contents of
//! system tags such as symlink targets.
#![cfg(windows)]
#![deny(rust_2018_idioms)]

mod error;
mod internals;
#[cfg(test)]
mod tests;

use std::path::Path;

pub use crate::error::{Error, Result};
pub use crate::internals::MAX_CUSTOM_DATA_SIZE;
pub use windows_sys::core::GUID;
pub use windows_sys::Win32::System::SystemServices::{IO_REPARSE_TAG_MOUNT_POINT, IO_REPARSE_TAG_SYMLINK};

/// Returns whether `tag` is a Microsoft-defined ("system") reparse tag.
///
/// System tags (junctions, symlinks, mount points) have the high bit set and
/// their on-disk buffers carry no GUID field; all other values are
/// vendor-defined tags whose buffers embed one.
pub const fn is_microsoft_tag(tag: u32) -> bool {
    tag & 0x8000_0000 != 0
}

/// Determines whether the specified path carries the reparse point
/// attribute.
///
/// Reads the attribute bits only; no handle is opened. Missing and
/// inaccessible paths report `false`.
///
/// # Example
///
/// ```rust
/// assert!(reparse::exists(r"C:\Users\Default User"));
/// assert!(!reparse::exists(r"C:\no\such\path"));
/// ```
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    internals::exists(path.as_ref())
}

/// Gets the reparse tag of the reparse point at `path`.
///
/// Fails with [`Error::NotAReparsePoint`] if the path is missing or has no
/// reparse point attached.
///
/// # Example
///
/// ```rust
/// fn main() -> reparse::Result<()> {
///     let tag = reparse::get_tag(r"C:\Users\Default User")?;
///     assert_eq!(tag, reparse::IO_REPARSE_TAG_MOUNT_POINT);
///     Ok(())
/// }
/// ```
pub fn get_tag<P: AsRef<Path>>(path: P) -> Result<u32> {
    internals::get_tag(path.as_ref())
}

/// Gets the GUID field of the reparse point at `path`.
///
/// Only custom reparse points store a GUID. For a system-tagged point
/// (see [`is_microsoft_tag`]) the returned value is whatever payload bytes
/// occupy the GUID's buffer region; treat it as undefined rather than a
/// real identifier.
///
/// # Example
///
/// ```rust,no_run
/// fn main() -> reparse::Result<()> {
///     let guid = reparse::get_guid(r"C:\some\custom\point")?;
///     println!("{:08x}-{:04x}-{:04x}", guid.data1, guid.data2, guid.data3);
///     Ok(())
/// }
/// ```
pub fn get_guid<P: AsRef<Path>>(path: P) -> Result<GUID> {
    internals::get_guid(path.as_ref())
}

/// Reads the raw payload of the reparse point at `path`.
///
/// The payload is returned as-is: the bytes following the GUID field for a
/// custom point, or everything after the fixed header for a system one. No
/// tag-specific decoding is applied.
pub fn get_data<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    internals::get_data(path.as_ref())
}

/// Deletes the reparse point at `path`.
///
/// The file or directory itself is left in place; only its reparse point
/// attribute is removed. The on-disk buffer layout cannot be queried ahead
/// of time, so the delete request is issued with a tag-only header first
/// and, if the driver rejects that, once more with the GUID populated. The
/// second outcome is final.
///
/// # Example
///
/// ```rust,no_run
/// fn main() -> reparse::Result<()> {
///     reparse::delete(r"C:\some\custom\point")
/// }
/// ```
pub fn delete<P: AsRef<Path>>(path: P) -> Result<()> {
    internals::delete(path.as_ref())
}

/// Attaches a custom reparse point to `path`, with the caller's `tag`,
/// `guid` and raw `payload`.
///
/// The target must already exist (this call attaches the attribute, it does
/// not create the file), and an empty payload or one larger than
/// [`MAX_CUSTOM_DATA_SIZE`] is rejected before any handle is opened.
///
/// # Example
///
/// ```rust
/// use std::fs::File;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let tmpdir = tempfile::tempdir()?;
///     let file = tmpdir.path().join("blob");
///     File::create(&file)?;
///
///     let guid = reparse::GUID { data1: 0xfe1b, data2: 0, data3: 0, data4: [0; 8] };
///     reparse::create_custom(&file, b"\x01\x02", &guid, 0x100)?;
///     assert_eq!(reparse::get_tag(&file)?, 0x100);
///     reparse::delete(&file)?;
///     Ok(())
/// }
/// ```
pub fn create_custom<P: AsRef<Path>>(path: P, payload: &[u8], guid: &GUID, tag: u32) -> Result<()> {
    internals::create_custom(path.as_ref(), payload, guid, tag)
}
