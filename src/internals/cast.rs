use std::alloc::{alloc_zeroed, handle_alloc_error, Layout};
use std::mem::align_of;

use super::c::{MAXIMUM_REPARSE_DATA_BUFFER_SIZE, REPARSE_GUID_DATA_BUFFER};

type MaybeU8 = std::mem::MaybeUninit<u8>;

// The alignment makes the byte block reinterpretable as a
// REPARSE_GUID_DATA_BUFFER.
#[repr(align(4))]
struct Raw([MaybeU8; MAXIMUM_REPARSE_DATA_BUFFER_SIZE as usize]);

const _: () = {
    let a = align_of::<Raw>();
    let b = align_of::<REPARSE_GUID_DATA_BUFFER>();
    assert!(a % b == 0);
};

/// Scratch block of `MAXIMUM_REPARSE_DATA_BUFFER_SIZE` bytes used as the
/// in/out buffer of one reparse point control request.
///
/// The block starts zeroed, so a GET response shorter than the GUID header
/// leaves deterministic zero bytes behind it rather than uninitialized
/// memory.
pub struct BytesAsReparseGuidDataBuffer {
    value: Box<Raw>,
}

impl BytesAsReparseGuidDataBuffer {
    pub fn new() -> Self {
        const LAYOUT: Layout = Layout::new::<Raw>();
        let boxed = unsafe {
            let ptr = alloc_zeroed(LAYOUT).cast::<Raw>();
            if ptr.is_null() {
                handle_alloc_error(LAYOUT);
            }
            Box::from_raw(ptr)
        };
        Self { value: boxed }
    }

    pub fn as_mut_ptr(&mut self) -> *mut REPARSE_GUID_DATA_BUFFER {
        self.value.0.as_mut_ptr().cast::<REPARSE_GUID_DATA_BUFFER>()
    }
}
