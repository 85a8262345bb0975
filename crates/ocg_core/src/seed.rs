//! Seed sequences for `create_duel_v2`
//!
//! A sequence of N seeds is packed as N little-endian `u32` words.

use crate::error::{OcgError, Result};

/// Pack seeds into a little-endian byte array
pub fn create_seed_array(seeds: &[u32]) -> Vec<u8> {
    seeds.iter().flat_map(|seed| seed.to_le_bytes()).collect()
}

/// Read `count` seeds back from a packed byte array
pub fn read_seed_array(bytes: &[u8], count: usize) -> Result<Vec<u32>> {
    let expected = count.checked_mul(4).unwrap_or(usize::MAX);
    if bytes.len() < expected {
        return Err(OcgError::SeedBufferTooShort {
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes[..expected]
        .chunks_exact(4)
        .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        .collect())
}
