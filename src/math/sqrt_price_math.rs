//! Price movement and token amounts for a single liquidity range.
//!
//! Every function works on Q64.96 square-root prices. Prices that move
//! because of an input are rounded so the pool never gives away more than
//! it received; amounts owed to the pool round up, amounts paid out round
//! down.

use crate::RESOLUTION;
use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up, unlikely};
use crate::{
    Q96, U160_MAX,
    error::{Error, MathError, StateError},
};
use alloy_primitives::{I256, U256};

/// Next sqrt price after `amount` of token0 is added to (or removed from)
/// the virtual reserves. Rounds up, so the price moves less in favour of
/// the trader.
///
/// Uses `L * P / (L + amount * P)` when the product fits, and falls back
/// to `L / (L / P + amount)` otherwise.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if amount.is_zero() {
        return Ok(sqrt_p_x96);
    }
    if unlikely(sqrt_p_x96.is_zero()) {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let numerator1: U256 = U256::from(liquidity) << RESOLUTION;
    let product: U256 = amount.wrapping_mul(sqrt_p_x96);
    let product_fits = product / amount == sqrt_p_x96;

    if add {
        if product_fits {
            let denominator = numerator1.wrapping_add(product);
            if denominator >= numerator1 {
                return Ok(mul_div_rounding_up(numerator1, sqrt_p_x96, denominator)?);
            }
        }
        let denominator = (numerator1 / sqrt_p_x96)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(div_rounding_up(numerator1, denominator)?)
    } else {
        if !product_fits || numerator1 <= product {
            return Err(StateError::InsufficientReserves.into());
        }
        Ok(mul_div_rounding_up(
            numerator1,
            sqrt_p_x96,
            numerator1 - product,
        )?)
    }
}

/// Next sqrt price after `amount` of token1 is added to (or removed from)
/// the virtual reserves. Rounds down.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if unlikely(liquidity == 0) {
        return Err(StateError::LiquidityIsZero.into());
    }
    let liquidity = U256::from(liquidity);

    let result = if add {
        let quotient = if amount <= U160_MAX {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };
        sqrt_p_x96.checked_add(quotient).ok_or(MathError::Overflow)?
    } else {
        let quotient = if amount <= U160_MAX {
            div_rounding_up(amount << RESOLUTION, liquidity)?
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };
        if sqrt_p_x96 <= quotient {
            return Err(StateError::InsufficientReserves.into());
        }
        sqrt_p_x96 - quotient
    };

    if result <= U160_MAX {
        Ok(result)
    } else {
        Err(MathError::Overflow.into())
    }
}

/// Unsigned token0 amount between two prices for `liquidity`:
/// `L * (sqrtB - sqrtA) / (sqrtA * sqrtB)`.
///
/// The prices may be passed in either order.
pub fn get_amount_0_delta_base(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    let (low, high) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if low.is_zero() {
        return Err(StateError::SqrtRatioIsZero.into());
    }

    let scaled_liquidity = U256::from(liquidity) << RESOLUTION;
    let spread = high - low;

    if round_up {
        let over_high = mul_div_rounding_up(scaled_liquidity, spread, high)?;
        Ok(div_rounding_up(over_high, low)?)
    } else {
        Ok(mul_div(scaled_liquidity, spread, high)? / low)
    }
}

/// Unsigned token1 amount between two prices for `liquidity`:
/// `L * (sqrtB - sqrtA)`.
pub fn get_amount_1_delta_base(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (low, high) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let liquidity = U256::from(liquidity);
    let spread = high - low;

    if round_up {
        mul_div_rounding_up(liquidity, spread, Q96)
    } else {
        mul_div(liquidity, spread, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change.
///
/// Adding liquidity rounds up (owed to the pool), removing rounds down
/// and comes back negative.
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let round_up = liquidity >= 0;
    let amount = get_amount_0_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        round_up,
    )?;
    signed(amount, round_up).map_err(Error::from)
}

/// Signed token1 delta for a signed liquidity change.
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, MathError> {
    let round_up = liquidity >= 0;
    let amount = get_amount_1_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        round_up,
    )?;
    signed(amount, round_up)
}

fn ensure_active(sqrt_p_x96: U256, liquidity: u128) -> Result<(), StateError> {
    if unlikely(sqrt_p_x96.is_zero()) {
        Err(StateError::SqrtPriceIsZero)
    } else if unlikely(liquidity == 0) {
        Err(StateError::LiquidityIsZero)
    } else {
        Ok(())
    }
}

#[inline]
fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

#[inline]
fn signed(amount: U256, positive: bool) -> Result<I256, MathError> {
    let value = I256::try_from(amount).map_err(|_| MathError::Overflow)?;
    Ok(if positive { value } else { -value })
}

/// Next sqrt price when `amount_in` enters the pool. Selling token0
/// (`zero_for_one`) pushes the price down, selling token1 pushes it up.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    ensure_active(sqrt_p_x96, liquidity)?;

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price when `amount_out` leaves the pool.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    ensure_active(sqrt_p_x96, liquidity)?;

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_out, false)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    const PRICE_ONE: &str = "79228162514264337593543950336";
    const PRICE_1_21: &str = "87150978765690771352898345369";
    const PRICE_HIGH: &str = "20282409603651670423947251286016";

    fn u(s: &str) -> U256 {
        U256::from_str(s).unwrap()
    }

    fn is_state(result: Result<U256, Error>, expected: StateError) -> bool {
        matches!(result, Err(Error::StateError(e)) if e == expected)
    }

    fn is_overflow(result: Result<U256, Error>) -> bool {
        matches!(result, Err(Error::ArithmeticOverflow(MathError::Overflow)))
    }

    #[test]
    fn input_rejects_degenerate_state() {
        let amount = U256::from(100_000_000_000_000_000u128);
        assert!(is_state(
            get_next_sqrt_price_from_input(U256::ZERO, 0, amount, false),
            StateError::SqrtPriceIsZero
        ));
        assert!(is_state(
            get_next_sqrt_price_from_input(U256::ONE, 0, amount, true),
            StateError::LiquidityIsZero
        ));
    }

    #[test]
    fn input_overflowing_the_price_fails() {
        let result = get_next_sqrt_price_from_input(U160_MAX, 1024, U256::from(1024), false);
        assert!(is_overflow(result));
    }

    #[test]
    fn input_cannot_underflow_the_price() {
        let half = U256::ONE << 255;
        let result = get_next_sqrt_price_from_input(U256::ONE, 1, half, true).unwrap();
        assert_eq!(result, U256::ONE);
    }

    #[test]
    fn zero_input_keeps_price() {
        for zero_for_one in [true, false] {
            let result =
                get_next_sqrt_price_from_input(u(PRICE_ONE), 1e17 as u128, U256::ZERO, zero_for_one);
            assert_eq!(result.unwrap(), u(PRICE_ONE));
        }
    }

    #[test]
    fn max_input_hits_minimum_price() {
        let liquidity = u128::MAX;
        let amount = U256::MAX - ((U256::from(liquidity) << 96) / U160_MAX);
        let result = get_next_sqrt_price_from_input(U160_MAX, liquidity, amount, true);
        assert_eq!(result.unwrap(), U256::ONE);
    }

    #[test]
    fn input_tenth_of_a_token() {
        let tenth = u("100000000000000000");
        let up = get_next_sqrt_price_from_input(u(PRICE_ONE), 1e18 as u128, tenth, false);
        assert_eq!(up.unwrap(), u(PRICE_1_21));

        let down = get_next_sqrt_price_from_input(u(PRICE_ONE), 1e18 as u128, tenth, true);
        assert_eq!(down.unwrap(), u("72025602285694852357767227579"));
    }

    #[test]
    fn input_wider_than_96_bits() {
        let result = get_next_sqrt_price_from_input(
            u(PRICE_ONE),
            1e19 as u128,
            u("1267650600228229401496703205376"),
            true,
        );
        assert_eq!(result.unwrap(), u("624999999995069620"));

        let result = get_next_sqrt_price_from_input(u(PRICE_ONE), 1, U256::MAX >> 1, true);
        assert_eq!(result.unwrap(), U256::ONE);
    }

    #[test]
    fn output_rejects_degenerate_state() {
        let amount = U256::from(1_000_000_000u64);
        assert!(is_state(
            get_next_sqrt_price_from_output(U256::ZERO, 0, amount, false),
            StateError::SqrtPriceIsZero
        ));
        assert!(is_state(
            get_next_sqrt_price_from_output(U256::ONE, 0, amount, false),
            StateError::LiquidityIsZero
        ));
    }

    #[test]
    fn output_at_or_beyond_virtual_reserves_fails() {
        // reserves are 4 token0 and 262144 token1
        for (amount, zero_for_one) in [(4u64, false), (5, false), (262144, true), (262145, true)] {
            let result =
                get_next_sqrt_price_from_output(u(PRICE_HIGH), 1024, U256::from(amount), zero_for_one);
            assert!(
                is_state(result, StateError::InsufficientReserves),
                "amount {amount} zero_for_one {zero_for_one}"
            );
        }
    }

    #[test]
    fn output_just_below_virtual_reserves() {
        let result = get_next_sqrt_price_from_output(u(PRICE_HIGH), 1024, U256::from(262143), true);
        assert_eq!(result.unwrap(), u("77371252455336267181195264"));
    }

    #[test]
    fn zero_output_keeps_price() {
        for zero_for_one in [true, false] {
            let result = get_next_sqrt_price_from_output(
                u(PRICE_ONE),
                1e17 as u128,
                U256::ZERO,
                zero_for_one,
            );
            assert_eq!(result.unwrap(), u(PRICE_ONE));
        }
    }

    #[test]
    fn output_tenth_of_a_token() {
        let tenth = U256::from(1e17 as u128);
        let up = get_next_sqrt_price_from_output(u(PRICE_ONE), 1e18 as u128, tenth, false);
        assert_eq!(up.unwrap(), u("88031291682515930659493278152"));

        let down = get_next_sqrt_price_from_output(u(PRICE_ONE), 1e18 as u128, tenth, true);
        assert_eq!(down.unwrap(), u("71305346262837903834189555302"));
    }

    #[test]
    fn impossible_output_fails() {
        let result = get_next_sqrt_price_from_output(u(PRICE_ONE), 1, U256::MAX, true);
        assert!(is_overflow(result));

        let result = get_next_sqrt_price_from_output(u(PRICE_ONE), 1, U256::MAX, false);
        assert!(is_state(result, StateError::InsufficientReserves));
    }

    #[test]
    fn amount_0_delta_values() {
        let zero = get_amount_0_delta_base(u(PRICE_ONE), u(PRICE_ONE), 0, true).unwrap();
        assert_eq!(zero, U256::ZERO);

        let zero = get_amount_0_delta_base(u(PRICE_ONE), u(PRICE_1_21), 0, true).unwrap();
        assert_eq!(zero, U256::ZERO);

        let up = get_amount_0_delta_base(u(PRICE_ONE), u(PRICE_1_21), 1e18 as u128, true).unwrap();
        assert_eq!(up, u("90909090909090910"));

        let down =
            get_amount_0_delta_base(u(PRICE_ONE), u(PRICE_1_21), 1e18 as u128, false).unwrap();
        assert_eq!(down, up - U256::ONE);
    }

    #[test]
    fn amount_0_delta_with_wide_prices() {
        let a = u("2787593149816327892691964784081045188247552");
        let b = u("22300745198530623141535718272648361505980416");
        let up = get_amount_0_delta_base(a, b, 1e18 as u128, true).unwrap();
        let down = get_amount_0_delta_base(a, b, 1e18 as u128, false).unwrap();
        assert_eq!(up, down + U256::ONE);
    }

    #[test]
    fn amount_1_delta_values() {
        let zero = get_amount_1_delta_base(u(PRICE_ONE), u(PRICE_ONE), 0, true).unwrap();
        assert_eq!(zero, U256::ZERO);

        let up = get_amount_1_delta_base(u(PRICE_ONE), u(PRICE_1_21), 1e18 as u128, true).unwrap();
        assert_eq!(up, u("100000000000000000"));

        let down =
            get_amount_1_delta_base(u(PRICE_ONE), u(PRICE_1_21), 1e18 as u128, false).unwrap();
        assert_eq!(down, up - U256::ONE);
    }

    #[test]
    fn signed_deltas_follow_liquidity_sign() {
        let l = 1e18 as i128;
        let add0 = get_amount_0_delta(u(PRICE_ONE), u(PRICE_1_21), l).unwrap();
        let remove0 = get_amount_0_delta(u(PRICE_ONE), u(PRICE_1_21), -l).unwrap();
        assert_eq!(add0, I256::try_from(90909090909090910i64).unwrap());
        assert_eq!(remove0, I256::try_from(-90909090909090909i64).unwrap());

        let add1 = get_amount_1_delta(u(PRICE_ONE), u(PRICE_1_21), l).unwrap();
        let remove1 = get_amount_1_delta(u(PRICE_ONE), u(PRICE_1_21), -l).unwrap();
        assert_eq!(add1, I256::try_from(100000000000000000i64).unwrap());
        assert_eq!(remove1, I256::try_from(-99999999999999999i64).unwrap());
    }

    #[test]
    fn price_and_amount_agree_on_tiny_input() {
        let sqrt_price = u("1025574284609383690408304870162715216695788925244");
        let liquidity = 50015962439936049619261659728067971248;
        let amount_in = U256::from(406);

        let sqrt_q = get_next_sqrt_price_from_input(sqrt_price, liquidity, amount_in, true).unwrap();
        assert_eq!(sqrt_q, u("1025574284609383582644711336373707553698163132913"));

        let amount_0 = get_amount_0_delta_base(sqrt_q, sqrt_price, liquidity, true).unwrap();
        assert_eq!(amount_0, amount_in);
    }
}
