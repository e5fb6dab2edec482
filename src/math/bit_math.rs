use crate::error::MathError;
use alloy_primitives::U256;

/// Index (0–255) of the highest set bit of a bitmap word.
///
/// Scanning toward lower prices picks the highest initialized bit at or
/// below the starting position, which is exactly this bit once the word
/// has been masked.
pub fn most_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok((255 - x.leading_zeros()) as u8)
}

/// Index (0–255) of the lowest set bit of a bitmap word.
///
/// Mirror of [`most_significant_bit`] for scans toward higher prices.
pub fn least_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(x.trailing_zeros() as u8)
}
