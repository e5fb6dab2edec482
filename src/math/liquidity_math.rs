use crate::Q96;
use crate::error::MathError;
use crate::math::math_helpers::{mul_div, to_u128};
use crate::math::sqrt_price_math::{get_amount_0_delta_base, get_amount_1_delta_base};
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use alloy_primitives::U256;

/// Applies a signed delta to an unsigned liquidity value.
pub fn add_delta(x: u128, y: i128) -> Result<u128, MathError> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs()).ok_or(MathError::Underflow)
    } else {
        x.checked_add(y as u128).ok_or(MathError::Overflow)
    }
}

/// Largest `liquidity_gross` any single tick may hold for a given spacing,
/// so that active liquidity cannot overflow `u128` even if every usable
/// tick is at the cap.
pub fn max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

#[inline]
fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Liquidity provided by `amount0` over `[sqrt_a, sqrt_b]`:
/// `amount0 * sqrtA * sqrtB / (sqrtB - sqrtA)`, rounded down.
pub fn get_liquidity_for_amount_0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let intermediate = mul_div(lower, upper, Q96)?;
    to_u128(mul_div(amount0, intermediate, upper - lower)?)
}

/// Liquidity provided by `amount1` over `[sqrt_a, sqrt_b]`:
/// `amount1 / (sqrtB - sqrtA)`, rounded down.
pub fn get_liquidity_for_amount_1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    to_u128(mul_div(amount1, Q96, upper - lower)?)
}

/// Most liquidity that `amount0` and `amount1` can back over a range at
/// the current price.
///
/// Below the range only token0 counts, above it only token1, inside it the
/// scarcer side wins.
pub fn get_liquidity_for_amounts(
    sqrt_ratio_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= lower {
        get_liquidity_for_amount_0(lower, upper, amount0)
    } else if sqrt_ratio_x96 < upper {
        let liquidity0 = get_liquidity_for_amount_0(sqrt_ratio_x96, upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount_1(lower, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount_1(lower, upper, amount1)
    }
}

/// Token amounts backing `liquidity` over a range at the current price,
/// rounded down.
pub fn get_amounts_for_liquidity(
    sqrt_ratio_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
) -> Result<(U256, U256), crate::error::Error> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= lower {
        let amount0 = get_amount_0_delta_base(lower, upper, liquidity, false)?;
        Ok((amount0, U256::ZERO))
    } else if sqrt_ratio_x96 < upper {
        let amount0 = get_amount_0_delta_base(sqrt_ratio_x96, upper, liquidity, false)?;
        let amount1 = get_amount_1_delta_base(lower, sqrt_ratio_x96, liquidity, false)?;
        Ok((amount0, amount1))
    } else {
        let amount1 = get_amount_1_delta_base(lower, upper, liquidity, false)?;
        Ok((U256::ZERO, amount1))
    }
}
