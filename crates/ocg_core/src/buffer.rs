//! Fixed-capacity byte buffers for the native `uint8*` parameters
//!
//! The native side writes or reads without being told a length, so every
//! buffer is allocated at the largest size the engine uses and zero-padded.

use crate::error::{OcgError, Result};
use crate::seed::create_seed_array;

/// Byte buffer handed to the native library
pub struct OcgBuffer {
    data: Box<[u8]>,
    // Bytes supplied by the caller, before the zero padding
    len: usize,
}

impl OcgBuffer {
    /// Capacity of every buffer (the engine's largest query buffer)
    pub const CAPACITY: usize = 0x4000;

    /// Create a zeroed buffer
    pub fn new() -> Self {
        Self {
            data: vec![0u8; Self::CAPACITY].into_boxed_slice(),
            len: 0,
        }
    }

    /// Create an input buffer holding `bytes`, zero-padded to capacity
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > Self::CAPACITY {
            return Err(OcgError::BufferOverflow {
                len: bytes.len(),
                capacity: Self::CAPACITY,
            });
        }

        let mut buffer = Self::new();
        buffer.data[..bytes.len()].copy_from_slice(bytes);
        buffer.len = bytes.len();
        Ok(buffer)
    }

    /// Create a seed-sequence buffer for `create_duel_v2`
    pub fn from_seeds(seeds: &[u32]) -> Result<Self> {
        Self::from_bytes(&create_seed_array(seeds))
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The bytes the caller put in, without the padding
    pub fn contents(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Writable view, for implementations that fill the buffer themselves
    ///
    /// Writes through it do not change [`contents`](Self::contents).
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The first `len` bytes, as reported by a native call
    ///
    /// Negative lengths yield an empty slice; lengths past capacity are clamped.
    pub fn filled(&self, len: i32) -> &[u8] {
        let len = usize::try_from(len).unwrap_or(0).min(self.data.len());
        &self.data[..len]
    }

    /// Zero the whole buffer
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.len = 0;
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }
}

impl Default for OcgBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OcgBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcgBuffer")
            .field("capacity", &self.capacity())
            .field("contents", &self.len)
            .finish()
    }
}
