use crate::error::{BenchError, Result};
use rand::Rng;

/// Longest password whose search space still fits in a `u64`
pub const MAX_PASSWORD_LENGTH: usize = 19;

/// Size of the search space for passwords of `width` digits (`10^width`)
pub fn search_space(width: usize) -> Result<u64> {
    if width == 0 || width > MAX_PASSWORD_LENGTH {
        return Err(BenchError::InvalidConfig(format!(
            "password length must be between 1 and {}, got {}",
            MAX_PASSWORD_LENGTH, width
        )));
    }

    10u64.checked_pow(width as u32).ok_or_else(|| {
        BenchError::InvalidConfig(format!("search space for length {} overflows", width))
    })
}

/// Zero-padded decimal representation of `index`, exactly `width` characters.
///
/// `index` must be below `10^width`; larger values produce a longer string.
pub fn generate(index: u64, width: usize) -> String {
    format!("{:0width$}", index, width = width)
}

/// Write the candidate for `index` into `buf` without allocating.
///
/// The buffer length is the candidate width. Digits beyond the buffer are
/// dropped, so callers keep `index < 10^buf.len()`.
#[inline]
pub fn write_candidate(mut index: u64, buf: &mut [u8]) {
    for slot in buf.iter_mut().rev() {
        *slot = b'0' + (index % 10) as u8;
        index /= 10;
    }
}

/// Check that `target` is a `width`-digit decimal string
pub fn validate_target(target: &str, width: usize) -> Result<()> {
    if target.len() != width {
        return Err(BenchError::InvalidConfig(format!(
            "target '{}' has {} digits, expected {}",
            target,
            target.len(),
            width
        )));
    }
    if !target.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BenchError::InvalidConfig(format!(
            "target '{}' must contain only decimal digits",
            target
        )));
    }
    Ok(())
}

/// Pick a random target in `[N/4, N)` so it never sits in the cheap first quarter
pub fn random_target<R: Rng + ?Sized>(width: usize, rng: &mut R) -> Result<String> {
    let space = search_space(width)?;
    let min = space / 4;
    let index = rng.gen_range(min..space);
    Ok(generate(index, width))
}
