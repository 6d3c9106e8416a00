use std::alloc::Layout;
use std::mem::{offset_of, size_of};
use std::os::windows::io::RawHandle;

pub use windows_sys::core::GUID;
pub use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_NOT_ALL_ASSIGNED, GENERIC_READ, GENERIC_WRITE, HANDLE,
};
pub use windows_sys::Win32::Security::{
    AdjustTokenPrivileges, LookupPrivilegeValueW, SE_PRIVILEGE_ENABLED, TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES,
};
// See more in <https://learn.microsoft.com/en-us/windows/win32/secauthz/privilege-constants>.
pub use windows_sys::Win32::Security::{SE_BACKUP_NAME, SE_RESTORE_NAME};
pub use windows_sys::Win32::Storage::FileSystem::{
    GetFileAttributesW, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT, FILE_FLAG_BACKUP_SEMANTICS,
    FILE_FLAG_OPEN_REPARSE_POINT, FILE_SHARE_READ, FILE_SHARE_WRITE, INVALID_FILE_ATTRIBUTES,
    MAXIMUM_REPARSE_DATA_BUFFER_SIZE, REPARSE_GUID_DATA_BUFFER,
};
pub use windows_sys::Win32::System::Ioctl::{
    FSCTL_DELETE_REPARSE_POINT, FSCTL_GET_REPARSE_POINT, FSCTL_SET_REPARSE_POINT,
};
pub use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
pub use windows_sys::Win32::System::IO::DeviceIoControl;

// Makes sure layout of RawHandle and windows-sys's HANDLE are the same
// for pointer casts between them.
const _: () = {
    let std_layout = Layout::new::<RawHandle>();
    let win_sys_layout = Layout::new::<HANDLE>();
    assert!(std_layout.size() == win_sys_layout.size());
    assert!(std_layout.align() == win_sys_layout.align());
};

/// Reparse Data Buffer header size: tag, data length and reserved field.
/// A system-tagged buffer has no GUID; its payload starts right after this.
pub const REPARSE_DATA_BUFFER_HEADER_SIZE: u16 = offset_of!(REPARSE_GUID_DATA_BUFFER, ReparseGuid) as u16;
/// Reparse GUID Data Buffer header size: the above plus the GUID field.
pub const REPARSE_GUID_DATA_BUFFER_HEADER_SIZE: u16 =
    offset_of!(REPARSE_GUID_DATA_BUFFER, GenericReparseBuffer) as u16;

// Safety checks for correct header sizes.
const _: () = {
    assert!(REPARSE_DATA_BUFFER_HEADER_SIZE == 8);
    assert!(REPARSE_GUID_DATA_BUFFER_HEADER_SIZE as usize == 8 + size_of::<GUID>());
};
