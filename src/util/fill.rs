//! Deterministic data patterns for write/verify round trips
//!
//! Every transfer a task writes is filled from a pattern keyed on the writing
//! task's ordinal and the absolute byte offset of each byte. The same task can
//! therefore regenerate the expected bytes during the read-back phase without
//! any cross-task communication, and any corruption shows up as a byte-level
//! mismatch regardless of which rank's "home" region the data landed in.

/// First mismatch found while verifying a transfer buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Absolute file offset of the mismatching byte
    pub offset: u64,
    /// Expected value
    pub expected: u8,
    /// Actual value
    pub actual: u8,
}

/// Generate the expected byte for (task ordinal, absolute file offset)
///
/// Uses the same LCG step for both fill and verify so the two sides always
/// agree. The ordinal is folded into the seed so two tasks never produce the
/// same byte stream for the same offset range.
#[inline(always)]
fn pattern_byte(ordinal: usize, offset: u64) -> u8 {
    let seed = (ordinal as u64)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ offset;
    let state = seed.wrapping_mul(1103515245).wrapping_add(12345);
    (state >> 16) as u8
}

/// Fill a transfer buffer with the deterministic pattern
///
/// # Arguments
///
/// * `buffer` - The buffer to fill (one transfer's worth of data)
/// * `ordinal` - Ordinal of the task that owns this write
/// * `file_offset` - Absolute file offset of the first byte of the buffer
pub fn fill_transfer(buffer: &mut [u8], ordinal: usize, file_offset: u64) {
    for (i, byte) in buffer.iter_mut().enumerate() {
        *byte = pattern_byte(ordinal, file_offset + i as u64);
    }
}

/// Verify that a transfer buffer matches the deterministic pattern
///
/// Returns `None` when every byte matches, or the first mismatch otherwise.
pub fn verify_transfer(buffer: &[u8], ordinal: usize, file_offset: u64) -> Option<Mismatch> {
    for (i, &byte) in buffer.iter().enumerate() {
        let expected = pattern_byte(ordinal, file_offset + i as u64);
        if byte != expected {
            return Some(Mismatch {
                offset: file_offset + i as u64,
                expected,
                actual: byte,
            });
        }
    }
    None
}
