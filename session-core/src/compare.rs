//! Constant-time comparison of secret digests

/// Compares two byte sequences in time independent of where they first differ
///
/// Only a length mismatch returns early; lengths are not secret. For equal lengths every byte pair
/// is inspected exactly once.
pub fn equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    difference(a, b, |_| ()) == 0
}

/// Accumulates differences of all byte pairs, calling `inspect` with the index of every visited pair
fn difference(a: &[u8], b: &[u8], mut inspect: impl FnMut(usize)) -> u8 {
    let acc = a
        .iter()
        .zip(b)
        .enumerate()
        .fold(0u8, |acc, (idx, (x, y))| {
            inspect(idx);
            acc | (x ^ y)
        });

    std::hint::black_box(acc)
}
