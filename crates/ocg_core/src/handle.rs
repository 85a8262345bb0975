//! Opaque handles for native resources
//!
//! Handles own a pointer whose lifetime belongs to the native library. They
//! are neither `Copy` nor `Clone`, and never expose the address itself.

use crate::ffi::RawDuel;
use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DUEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a duel handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuelId(pub u64);

impl fmt::Display for DuelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duel#{}", self.0)
    }
}

/// A live native duel
///
/// Created by `create_duel`/`create_duel_v2`, consumed by `end_duel`.
pub struct DuelHandle {
    ptr: NonNull<c_void>,
    id: DuelId,
}

// Safety: a duel may move between threads, but the engine is not
// re-entrant per duel, so the handle is deliberately not Sync.
unsafe impl Send for DuelHandle {}

impl DuelHandle {
    /// Wrap a raw duel pointer, returning `None` for null
    ///
    /// # Safety
    /// `ptr` must be a duel created by the native library and not yet ended.
    /// Implementations that never hand the pointer to the library (test
    /// doubles) may pass any non-null value.
    pub unsafe fn from_raw(ptr: RawDuel) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self {
            ptr,
            id: DuelId(NEXT_DUEL_ID.fetch_add(1, Ordering::Relaxed)),
        })
    }

    /// Identifier used in events and logs
    pub fn id(&self) -> DuelId {
        self.id
    }

    pub(crate) fn as_raw(&self) -> RawDuel {
        self.ptr.as_ptr()
    }
}

impl fmt::Debug for DuelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DuelHandle").field(&self.id.0).finish()
    }
}

/// Opaque value returned by the native side with no further meaning here
pub struct NativeOpaque {
    ptr: *mut u8,
}

// Safety: the value is never dereferenced on the Rust side
unsafe impl Send for NativeOpaque {}

impl NativeOpaque {
    pub(crate) fn new(ptr: *mut u8) -> Self {
        Self { ptr }
    }

    /// A null opaque value, for implementations without a native side
    pub fn null() -> Self {
        Self::new(std::ptr::null_mut())
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

impl fmt::Debug for NativeOpaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("NativeOpaque(null)")
        } else {
            f.write_str("NativeOpaque(..)")
        }
    }
}
