use crate::error::MathError;
use alloy_primitives::U256;

const U256_ONE: U256 = U256::ONE;
const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

#[cold]
#[inline(always)]
fn cold_path() {}

#[inline(always)]
pub(crate) fn likely(b: bool) -> bool {
    if !b {
        cold_path();
    }
    b
}

#[inline(always)]
pub(crate) fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
    }
    b
}

/// Computes `a * b / denominator` rounded down, with the product held at
/// 512 bits so only the quotient has to fit in a `U256`.
///
/// The high half of the product comes from `mul_mod(.., U256::MAX)`; the
/// division is then a multiplication by the modular inverse of the odd
/// part of the denominator.
#[inline(always)]
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if unlikely(denominator.is_zero()) {
        return Err(MathError::DivisionByZero);
    }

    let mut low = a.wrapping_mul(b);
    let (mut high, borrow) = a.mul_mod(b, U256::MAX).overflowing_sub(low);
    if borrow {
        high = high.wrapping_sub(U256_ONE);
    }

    if likely(high.is_zero()) {
        return Ok(low.wrapping_div(denominator));
    }
    if unlikely(denominator <= high) {
        return Err(MathError::Overflow);
    }

    // make the product divisible by denominator
    let remainder = a.mul_mod(b, denominator);
    let (reduced, borrow) = low.overflowing_sub(remainder);
    low = reduced;
    if borrow {
        high = high.wrapping_sub(U256_ONE);
    }

    // factor powers of two out of the denominator
    let twos = denominator & denominator.wrapping_neg();
    let odd = denominator.wrapping_div(twos);
    low = low.wrapping_div(twos);
    let flip = twos.wrapping_neg().wrapping_div(twos).wrapping_add(U256_ONE);
    low |= high.wrapping_mul(flip);

    // inverse of `odd` mod 2^256; each Newton step doubles the correct bits
    let mut inverse = U256_THREE.wrapping_mul(odd) ^ U256_TWO;
    for _ in 0..6 {
        inverse = inverse.wrapping_mul(U256_TWO.wrapping_sub(odd.wrapping_mul(inverse)));
    }

    Ok(low.wrapping_mul(inverse))
}

/// Like [`mul_div`], but rounds the result up when there is a
/// non‑zero remainder, returning an overflow error if the result
/// would exceed `U256::MAX`.
#[inline(always)]
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let mut result = mul_div(a, b, denominator)?;

    if !a.mul_mod(b, denominator).is_zero() {
        result = result.checked_add(U256_ONE).ok_or(MathError::Overflow)?;
    }
    Ok(result)
}

/// Divides `a` by `b`, rounding the result up to the next integer
/// when there is a non‑zero remainder.
///
/// Returns `MathError::DivisionByZero` when `b` is zero.
#[inline(always)]
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if unlikely(b.is_zero()) {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    // quotient < U256::MAX whenever there is a remainder
    Ok(if remainder.is_zero() {
        quotient
    } else {
        quotient.wrapping_add(U256_ONE)
    })
}

/// Converts a 256‑bit intermediate into `u128`, failing when it does not fit.
#[inline(always)]
pub fn to_u128(x: U256) -> Result<u128, MathError> {
    u128::try_from(x).map_err(|_| MathError::Overflow)
}
