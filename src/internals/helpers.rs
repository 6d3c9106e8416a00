use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::fs::OpenOptionsExt;
use std::path::Path;
use std::ptr;

use super::c::{
    DeviceIoControl, FILE_FLAG_BACKUP_SEMANTICS, FILE_FLAG_OPEN_REPARSE_POINT, FILE_SHARE_READ, FILE_SHARE_WRITE,
    FSCTL_DELETE_REPARSE_POINT, FSCTL_GET_REPARSE_POINT, FSCTL_SET_REPARSE_POINT, GENERIC_READ, GENERIC_WRITE,
    GetFileAttributesW, HANDLE, INVALID_FILE_ATTRIBUTES, MAXIMUM_REPARSE_DATA_BUFFER_SIZE, REPARSE_GUID_DATA_BUFFER,
    REPARSE_GUID_DATA_BUFFER_HEADER_SIZE,
};

/// Attribute bits of `path`, without following the reparse point.
pub fn path_attributes(path: &Path) -> io::Result<u32> {
    let path = os_str_to_utf16(path.as_os_str());
    let attributes = unsafe { GetFileAttributesW(path.as_ptr()) };
    if attributes == INVALID_FILE_ATTRIBUTES {
        return Err(io::Error::last_os_error());
    }
    Ok(attributes)
}

/// Opens `path` so that the reparse point itself is visible instead of being
/// traversed. Directories additionally need backup semantics, otherwise the
/// open is rejected.
pub fn open_reparse_point(path: &Path, rdwr: bool, directory: bool) -> io::Result<File> {
    let (access, share) = if rdwr {
        (GENERIC_WRITE, FILE_SHARE_READ | FILE_SHARE_WRITE)
    } else {
        (GENERIC_READ, FILE_SHARE_READ)
    };
    let mut flags = FILE_FLAG_OPEN_REPARSE_POINT;
    if directory {
        flags |= FILE_FLAG_BACKUP_SEMANTICS;
    }
    let mut opts = OpenOptions::new();
    opts.access_mode(access).share_mode(share).custom_flags(flags);
    match opts.open(path) {
        #[cfg(feature = "unstable_admin")]
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            // Obtain privilege in case we don't have it yet
            log::debug!("open of {} denied, retrying with backup privilege", path.display());
            set_privilege(rdwr)?;
            opts.open(path)
        }
        other => other,
    }
}

#[cfg(feature = "unstable_admin")]
fn set_privilege(rdwr: bool) -> io::Result<()> {
    use std::mem;

    use scopeguard::ScopeGuard;

    use super::c::{
        AdjustTokenPrivileges, CloseHandle, GetCurrentProcess, GetLastError, LookupPrivilegeValueW, OpenProcessToken,
        ERROR_NOT_ALL_ASSIGNED, SE_BACKUP_NAME, SE_PRIVILEGE_ENABLED, SE_RESTORE_NAME, TOKEN_ADJUST_PRIVILEGES,
        TOKEN_PRIVILEGES,
    };

    const TOKEN_PRIVILEGES_SIZE: u32 = mem::size_of::<TOKEN_PRIVILEGES>() as _;
    unsafe {
        let mut handle: HANDLE = 0;
        if OpenProcessToken(GetCurrentProcess(), TOKEN_ADJUST_PRIVILEGES, &mut handle) == 0 {
            return Err(io::Error::last_os_error());
        }
        let handle = scopeguard::guard(handle, |h| {
            CloseHandle(h);
        });
        let mut tp: TOKEN_PRIVILEGES = mem::zeroed();
        let name = if rdwr { SE_RESTORE_NAME } else { SE_BACKUP_NAME };
        if LookupPrivilegeValueW(ptr::null(), name, &mut tp.Privileges[0].Luid) == 0 {
            return Err(io::Error::last_os_error());
        }
        tp.PrivilegeCount = 1;
        tp.Privileges[0].Attributes = SE_PRIVILEGE_ENABLED;
        if AdjustTokenPrivileges(*handle, 0, &tp, TOKEN_PRIVILEGES_SIZE, ptr::null_mut(), ptr::null_mut()) == 0 {
            return Err(io::Error::last_os_error());
        }
        if GetLastError() == ERROR_NOT_ALL_ASSIGNED {
            return Err(io::Error::from_raw_os_error(ERROR_NOT_ALL_ASSIGNED as i32));
        }

        let handle = ScopeGuard::into_inner(handle);
        if CloseHandle(handle) == 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}

pub fn get_reparse_point(handle: HANDLE, rgdb: *mut REPARSE_GUID_DATA_BUFFER) -> io::Result<()> {
    // Call DeviceIoControl to get the reparse point data
    let mut bytes_returned: u32 = 0;
    if unsafe {
        DeviceIoControl(
            handle,
            FSCTL_GET_REPARSE_POINT,
            ptr::null(),
            0,
            rgdb.cast(),
            MAXIMUM_REPARSE_DATA_BUFFER_SIZE,
            &mut bytes_returned,
            ptr::null_mut(),
        )
    } == 0
    {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub fn set_reparse_point(handle: HANDLE, rgdb: *const REPARSE_GUID_DATA_BUFFER, len: u32) -> io::Result<()> {
    let mut bytes_returned: u32 = 0;
    if unsafe {
        DeviceIoControl(
            handle,
            FSCTL_SET_REPARSE_POINT,
            rgdb.cast(),
            len,
            ptr::null_mut(),
            0,
            &mut bytes_returned,
            ptr::null_mut(),
        )
    } == 0
    {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// See https://msdn.microsoft.com/en-us/library/windows/desktop/aa364560(v=vs.85).aspx
//
// The driver only looks at the header fields, so the request length is the
// GUID header size for both buffer layouts.
pub fn delete_reparse_point(handle: HANDLE, rgdb: *const REPARSE_GUID_DATA_BUFFER) -> io::Result<()> {
    let mut bytes_returned: u32 = 0;
    if unsafe {
        DeviceIoControl(
            handle,
            FSCTL_DELETE_REPARSE_POINT,
            rgdb.cast(),
            u32::from(REPARSE_GUID_DATA_BUFFER_HEADER_SIZE),
            ptr::null_mut(),
            0,
            &mut bytes_returned,
            ptr::null_mut(),
        )
    } == 0
    {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn os_str_to_utf16(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(std::iter::once(0)).collect()
}
