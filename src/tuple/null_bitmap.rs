//! Null bitmap helpers.
//!
//! Every tuple starts with `ceil(n / 8)` bytes of null flags, one bit per
//! attribute. Bits are assigned most-significant-bit first: attribute 0 is
//! bit 7 of byte 0, attribute 8 is bit 7 of byte 1. A set bit means NULL.

/// Returns the bitmap size in bytes for `field_count` attributes.
pub const fn bitmap_len(field_count: usize) -> usize {
    field_count.div_ceil(8)
}

const fn mask(index: usize) -> u8 {
    0x80 >> (index % 8)
}

/// Marks attribute `index` as null.
///
/// # Panics
///
/// Panics if `bitmap` is shorter than `index / 8 + 1` bytes.
pub fn set_null(bitmap: &mut [u8], index: usize) {
    bitmap[index / 8] |= mask(index);
}

/// Returns true if attribute `index` is flagged null.
///
/// # Panics
///
/// Panics if `bitmap` is shorter than `index / 8 + 1` bytes.
pub fn is_null(bitmap: &[u8], index: usize) -> bool {
    bitmap[index / 8] & mask(index) != 0
}
