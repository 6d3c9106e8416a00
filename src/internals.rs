mod c;
mod cast;
mod helpers;

use std::io;
use std::mem;
use std::os::windows::io::AsRawHandle;
use std::path::Path;
use std::ptr;
use std::slice;

use self::c::{
    FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT, GUID, HANDLE, MAXIMUM_REPARSE_DATA_BUFFER_SIZE,
    REPARSE_GUID_DATA_BUFFER, REPARSE_GUID_DATA_BUFFER_HEADER_SIZE,
};
use self::cast::BytesAsReparseGuidDataBuffer;
use crate::{Error, Result};

/// Largest payload a custom reparse point can carry: the maximum transfer
/// size minus the GUID-bearing header.
pub const MAX_CUSTOM_DATA_SIZE: usize =
    MAXIMUM_REPARSE_DATA_BUFFER_SIZE as usize - REPARSE_GUID_DATA_BUFFER_HEADER_SIZE as usize;

pub fn exists(path: &Path) -> bool {
    match helpers::path_attributes(path) {
        Ok(attributes) => attributes & FILE_ATTRIBUTE_REPARSE_POINT != 0,
        // Missing and inaccessible paths carry no reparse point.
        Err(_) => false,
    }
}

fn is_directory(path: &Path) -> bool {
    helpers::path_attributes(path).is_ok_and(|a| a & FILE_ATTRIBUTE_DIRECTORY != 0)
}

/// One FSCTL_GET_REPARSE_POINT round trip. The handle is released before
/// this returns; the filled scratch buffer is handed to the caller.
fn query(path: &Path) -> Result<BytesAsReparseGuidDataBuffer> {
    if !exists(path) {
        return Err(Error::NotAReparsePoint);
    }
    let file = helpers::open_reparse_point(path, false, is_directory(path)).map_err(Error::HandleOpenFailed)?;
    let mut data = BytesAsReparseGuidDataBuffer::new();
    helpers::get_reparse_point(file.as_raw_handle() as HANDLE, data.as_mut_ptr())?;
    Ok(data)
}

pub fn get_tag(path: &Path) -> Result<u32> {
    let mut data = query(path)?;
    // The tag occupies the first four bytes of both buffer layouts.
    let rgdb = unsafe { &*data.as_mut_ptr() };
    Ok(rgdb.ReparseTag)
}

pub fn get_guid(path: &Path) -> Result<GUID> {
    let mut data = query(path)?;
    let rgdb = unsafe { &*data.as_mut_ptr() };
    Ok(rgdb.ReparseGuid)
}

pub fn get_data(path: &Path) -> Result<Vec<u8>> {
    let mut data = query(path)?;
    let rgdb = unsafe { &*data.as_mut_ptr() };
    let len = usize::from(rgdb.ReparseDataLength);
    // A Microsoft-tagged buffer has no GUID field; its payload occupies the
    // region where the GUID would sit.
    let payload = if crate::is_microsoft_tag(rgdb.ReparseTag) {
        (&rgdb.ReparseGuid as *const GUID).cast::<u8>()
    } else {
        rgdb.GenericReparseBuffer.DataBuffer.as_ptr()
    };
    Ok(unsafe { slice::from_raw_parts(payload, len) }.to_vec())
}

/// The two-attempt delete protocol, over an injected request issuer.
///
/// There is no query for which of the two header layouts a reparse point
/// demands, so the tag-only form is tried first and the GUID-populated form
/// second. The second attempt's outcome is final; attempts are never
/// reordered and nothing runs after attempt two.
pub(crate) fn delete_with<F>(tag: u32, guid: GUID, mut issue: F) -> io::Result<()>
where
    F: FnMut(&REPARSE_GUID_DATA_BUFFER) -> io::Result<()>,
{
    let mut rgdb: REPARSE_GUID_DATA_BUFFER = unsafe { mem::zeroed() };
    rgdb.ReparseTag = tag;
    match issue(&rgdb) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!("tag-only delete rejected ({e}), retrying with the guid populated");
            rgdb.ReparseGuid = guid;
            issue(&rgdb)
        }
    }
}

pub fn delete(path: &Path) -> Result<()> {
    if !exists(path) {
        return Err(Error::NotAReparsePoint);
    }
    // The driver rejects a delete whose tag does not match the point on
    // disk, so both header fields are fetched up front.
    let tag = get_tag(path).map_err(|_| Error::TagUnknown)?;
    let guid = get_guid(path).map_err(|_| Error::TagUnknown)?;
    let file = helpers::open_reparse_point(path, true, is_directory(path)).map_err(Error::HandleOpenFailed)?;
    let handle = file.as_raw_handle() as HANDLE;
    delete_with(tag, guid, |rgdb| helpers::delete_reparse_point(handle, rgdb))?;
    Ok(())
}

pub fn create_custom(path: &Path, payload: &[u8], guid: &GUID, tag: u32) -> Result<()> {
    // Validated before any handle is opened.
    if payload.is_empty() {
        return Err(Error::InvalidArgument("payload is empty"));
    }
    if payload.len() > MAX_CUSTOM_DATA_SIZE {
        return Err(Error::InvalidArgument("payload exceeds MAX_CUSTOM_DATA_SIZE"));
    }
    let file = helpers::open_reparse_point(path, true, is_directory(path)).map_err(Error::HandleOpenFailed)?;
    let mut data = BytesAsReparseGuidDataBuffer::new();
    let rgdb = data.as_mut_ptr();
    unsafe {
        let rgdb = &mut *rgdb;
        rgdb.ReparseTag = tag;
        rgdb.ReparseDataLength = payload.len() as u16;
        rgdb.Reserved = 0;
        rgdb.ReparseGuid = *guid;
        // Safe because payload.len() <= MAX_CUSTOM_DATA_SIZE
        ptr::copy_nonoverlapping(
            payload.as_ptr(),
            rgdb.GenericReparseBuffer.DataBuffer.as_mut_ptr(),
            payload.len(),
        );
    }
    let in_buffer_size = u32::from(REPARSE_GUID_DATA_BUFFER_HEADER_SIZE) + payload.len() as u32;
    log::trace!("setting reparse point: tag {tag:#010x}, {} payload bytes", payload.len());
    helpers::set_reparse_point(file.as_raw_handle() as HANDLE, rgdb, in_buffer_size)?;
    Ok(())
}
