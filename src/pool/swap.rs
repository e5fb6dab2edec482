use crate::error::{Error, MathError, StateError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up, unlikely};
use crate::math::sqrt_price_math::{get_amount_0_delta_base, get_amount_1_delta_base};
use crate::math::swap_math::{FEE_DENOMINATOR, compute_swap_step};
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};
use crate::pool::state::{Pool, Slot0};
use crate::{Q128, U256_1, U256_E6};
use alloy_primitives::{I256, U256};
use tracing::{debug, trace};

/// Derives a sqrt-price limit from the current price and a slippage
/// tolerance in percent (`0.5` means the price may move 0.5%).
///
/// The result is clamped into the range accepted by [`Pool::swap`].
pub fn calculate_sqrt_price_limit(sqrt_price_x96: U256, zero_for_one: bool, tolerance: f64) -> U256 {
    let tolerance = if tolerance.is_finite() {
        tolerance.clamp(0.0, 99.99)
    } else {
        0.0
    };
    let price_factor = if zero_for_one {
        1.0 - tolerance / 100.0
    } else {
        1.0 + tolerance / 100.0
    };
    // sqrt price moves with the square root of the price
    let scaled = (price_factor.sqrt() * 1e6).round() as u64;

    let limit = mul_div(sqrt_price_x96, U256::from(scaled), U256_E6).unwrap_or(U256::MAX);
    limit.clamp(MIN_SQRT_RATIO + U256_1, MAX_SQRT_RATIO - U256_1)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Swap direction: `true` for token0 → token1, `false` for token1 → token0.
    pub zero_for_one: bool,
    /// Signed amount being swapped. Positive means “exact in”, negative means “exact out”.
    pub amount_specified: I256,
    /// Sqrt‑price limit in Q96 that bounds how far the price is allowed to move.
    ///
    /// Use [`calculate_sqrt_price_limit`] to derive this from a percentage slippage tolerance.
    pub sqrt_price_limit_x96: U256,
    /// UNIX timestamp (seconds) after which the swap is rejected.
    pub deadline: Option<u64>,
}

impl SwapParams {
    #[inline]
    pub fn new(zero_for_one: bool, amount_specified: I256, sqrt_price_limit_x96: U256) -> Self {
        Self {
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
            deadline: None,
        }
    }

    /// Parameters with the loosest valid price limit for the direction.
    #[inline]
    pub fn unbounded(zero_for_one: bool, amount_specified: I256) -> Self {
        let limit = if zero_for_one {
            MIN_SQRT_RATIO + U256_1
        } else {
            MAX_SQRT_RATIO - U256_1
        };
        Self::new(zero_for_one, amount_specified, limit)
    }

    #[inline]
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Outcome of a swap. Deltas are from the pool's point of view: positive
/// amounts are paid in by the trader, negative amounts are paid out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapResult {
    pub amount0_delta: I256,
    pub amount1_delta: I256,
    /// Total fee charged, denominated in the input token.
    pub fees_paid: U256,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// Active liquidity after the swap.
    pub liquidity: u128,
    /// Number of initialized ticks crossed.
    pub ticks_crossed: u32,
}

// running totals of a swap, written back to the pool only on success
struct SwapState {
    amount_specified_remaining: I256,
    amount_calculated: I256,
    sqrt_price_x96: U256,
    tick: i32,
    liquidity: u128,
    // fee growth of the input token
    fee_growth_global_x128: U256,
    swap_fee: U256,
}

#[derive(Default)]
struct StepComputations {
    sqrt_price_start_x96: U256,
    tick_next: i32,
    initialized: bool,
    sqrt_price_next_x96: U256,
    amount_in: U256,
    amount_out: U256,
    fee_amount: U256,
}

// accumulator values a tick must be crossed with at commit time
struct Crossing {
    tick: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
}

struct SwapOutcome {
    result: SwapResult,
    fee_growth_global_x128: U256,
    crossings: Vec<Crossing>,
}

#[inline]
fn to_i256(value: U256) -> Result<I256, MathError> {
    I256::try_from(value).map_err(|_| MathError::Overflow)
}

impl Pool {
    /// Executes a swap and commits the new price, tick, liquidity, fee
    /// growth and crossed ticks.
    ///
    /// `now` is compared against the optional deadline in `params`. Hitting
    /// the price limit is a partial fill, not an error. Running out of
    /// liquidity is only an error when nothing could be swapped at all.
    pub fn swap(&mut self, params: SwapParams, now: u64) -> Result<SwapResult, Error> {
        let outcome = self.simulate(&params, now)?;
        let result = outcome.result;

        for crossing in &outcome.crossings {
            if let Some(info) = self.ticks.get_mut(&crossing.tick) {
                info.cross(
                    crossing.fee_growth_global_0_x128,
                    crossing.fee_growth_global_1_x128,
                );
            }
        }

        self.slot0 = Some(Slot0 {
            sqrt_price_x96: result.sqrt_price_x96,
            tick: result.tick,
        });
        self.liquidity = result.liquidity;
        if params.zero_for_one {
            self.fee_growth_global_0_x128 = outcome.fee_growth_global_x128;
        } else {
            self.fee_growth_global_1_x128 = outcome.fee_growth_global_x128;
        }

        debug!(
            zero_for_one = params.zero_for_one,
            amount0 = %result.amount0_delta,
            amount1 = %result.amount1_delta,
            fees = %result.fees_paid,
            tick = result.tick,
            ticks_crossed = result.ticks_crossed,
            "swap executed"
        );
        Ok(result)
    }

    /// Runs the swap against the current state without committing it.
    pub fn quote(&self, params: SwapParams, now: u64) -> Result<SwapResult, Error> {
        self.simulate(&params, now).map(|outcome| outcome.result)
    }

    fn simulate(&self, params: &SwapParams, now: u64) -> Result<SwapOutcome, Error> {
        if let Some(deadline) = params.deadline {
            if now > deadline {
                return Err(Error::Expired { deadline, now });
            }
        }
        let slot0 = self.slot0()?;

        let zero_for_one = params.zero_for_one;
        let amount_specified = params.amount_specified;
        let fee_growth_global_x128 = if zero_for_one {
            self.fee_growth_global_0_x128
        } else {
            self.fee_growth_global_1_x128
        };

        if amount_specified.is_zero() {
            return Ok(SwapOutcome {
                result: SwapResult {
                    amount0_delta: I256::ZERO,
                    amount1_delta: I256::ZERO,
                    fees_paid: U256::ZERO,
                    sqrt_price_x96: slot0.sqrt_price_x96,
                    tick: slot0.tick,
                    liquidity: self.liquidity,
                    ticks_crossed: 0,
                },
                fee_growth_global_x128,
                crossings: Vec::new(),
            });
        }

        let sqrt_price_limit_x96 = params.sqrt_price_limit_x96;
        let limit_is_valid = if zero_for_one {
            sqrt_price_limit_x96 < slot0.sqrt_price_x96 && sqrt_price_limit_x96 > MIN_SQRT_RATIO
        } else {
            sqrt_price_limit_x96 > slot0.sqrt_price_x96 && sqrt_price_limit_x96 < MAX_SQRT_RATIO
        };
        if unlikely(!limit_is_valid) {
            return Err(Error::InvalidPriceLimit);
        }

        let exact_input = amount_specified.is_positive();

        let mut state = SwapState {
            amount_specified_remaining: amount_specified,
            amount_calculated: I256::ZERO,
            sqrt_price_x96: slot0.sqrt_price_x96,
            tick: slot0.tick,
            liquidity: self.liquidity,
            fee_growth_global_x128,
            swap_fee: U256::ZERO,
        };
        let mut crossings = Vec::new();
        let mut exhausted = false;

        while !state.amount_specified_remaining.is_zero()
            && state.sqrt_price_x96 != sqrt_price_limit_x96
        {
            if state.liquidity == 0
                && !self
                    .bitmap
                    .has_initialized_beyond(state.tick, self.tick_spacing(), zero_for_one)
            {
                exhausted = true;
                break;
            }

            let mut step = StepComputations {
                sqrt_price_start_x96: state.sqrt_price_x96,
                ..StepComputations::default()
            };

            (step.tick_next, step.initialized) = self.bitmap.next_initialized_tick_within_one_word(
                state.tick,
                self.tick_spacing(),
                zero_for_one,
            )?;
            step.tick_next = step.tick_next.clamp(MIN_TICK, MAX_TICK);
            step.sqrt_price_next_x96 = get_sqrt_ratio_at_tick(step.tick_next)?;

            let sqrt_price_target_x96 = if zero_for_one {
                step.sqrt_price_next_x96.max(sqrt_price_limit_x96)
            } else {
                step.sqrt_price_next_x96.min(sqrt_price_limit_x96)
            };

            (
                state.sqrt_price_x96,
                step.amount_in,
                step.amount_out,
                step.fee_amount,
            ) = compute_swap_step(
                state.sqrt_price_x96,
                sqrt_price_target_x96,
                state.liquidity,
                state.amount_specified_remaining,
                self.fee().fee_pips(),
            )?;

            let paid_in = to_i256(
                step.amount_in
                    .checked_add(step.fee_amount)
                    .ok_or(MathError::Overflow)?,
            )?;
            let paid_out = to_i256(step.amount_out)?;

            if exact_input {
                state.amount_specified_remaining = state
                    .amount_specified_remaining
                    .checked_sub(paid_in)
                    .ok_or(MathError::Underflow)?;
                state.amount_calculated = state
                    .amount_calculated
                    .checked_sub(paid_out)
                    .ok_or(MathError::Underflow)?;
            } else {
                state.amount_specified_remaining = state
                    .amount_specified_remaining
                    .checked_add(paid_out)
                    .ok_or(MathError::Overflow)?;
                state.amount_calculated = state
                    .amount_calculated
                    .checked_add(paid_in)
                    .ok_or(MathError::Overflow)?;
            }

            state.swap_fee = state
                .swap_fee
                .checked_add(step.fee_amount)
                .ok_or(MathError::Overflow)?;

            // with no liquidity in range the fee simply stays with the pool
            if state.liquidity > 0 {
                let growth = mul_div(step.fee_amount, Q128, U256::from(state.liquidity))?;
                state.fee_growth_global_x128 = state
                    .fee_growth_global_x128
                    .checked_add(growth)
                    .ok_or(MathError::Overflow)?;
            }

            if state.sqrt_price_x96 == step.sqrt_price_next_x96 {
                if step.initialized {
                    let info = self
                        .ticks
                        .get(&step.tick_next)
                        .ok_or(StateError::InvalidTick(step.tick_next))?;

                    let (fee_growth_global_0_x128, fee_growth_global_1_x128) = if zero_for_one {
                        (state.fee_growth_global_x128, self.fee_growth_global_1_x128)
                    } else {
                        (self.fee_growth_global_0_x128, state.fee_growth_global_x128)
                    };
                    crossings.push(Crossing {
                        tick: step.tick_next,
                        fee_growth_global_0_x128,
                        fee_growth_global_1_x128,
                    });

                    let liquidity_net = if zero_for_one {
                        info.liquidity_net.checked_neg().ok_or(MathError::Overflow)?
                    } else {
                        info.liquidity_net
                    };
                    state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                    trace!(tick = step.tick_next, liquidity = state.liquidity, "crossed tick");
                }
                state.tick = if zero_for_one {
                    step.tick_next - 1
                } else {
                    step.tick_next
                };
            } else if state.sqrt_price_x96 != step.sqrt_price_start_x96 {
                state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
            }
        }

        if exhausted && state.amount_specified_remaining == amount_specified {
            return Err(Error::InsufficientLiquidity);
        }

        let consumed = amount_specified
            .checked_sub(state.amount_specified_remaining)
            .ok_or(MathError::Overflow)?;
        let (amount0_delta, amount1_delta) = if zero_for_one == exact_input {
            (consumed, state.amount_calculated)
        } else {
            (state.amount_calculated, consumed)
        };

        Ok(SwapOutcome {
            result: SwapResult {
                amount0_delta,
                amount1_delta,
                fees_paid: state.swap_fee,
                sqrt_price_x96: state.sqrt_price_x96,
                tick: state.tick,
                liquidity: state.liquidity,
                ticks_crossed: crossings.len() as u32,
            },
            fee_growth_global_x128: state.fee_growth_global_x128,
            crossings,
        })
    }

    /// Upper bound on the input, fee included, that the pool can absorb in
    /// one direction before its liquidity runs out.
    ///
    /// Useful as the upper end of a search over trade sizes.
    pub fn max_input_amount(&self, zero_for_one: bool) -> Result<U256, Error> {
        let slot0 = self.slot0()?;
        let spacing = self.tick_spacing();

        let mut sqrt_price_x96 = slot0.sqrt_price_x96;
        let mut tick = slot0.tick;
        let mut liquidity = self.liquidity;
        let mut max_token_amount = U256::ZERO;

        loop {
            if liquidity == 0 && !self.bitmap.has_initialized_beyond(tick, spacing, zero_for_one) {
                break;
            }

            let (tick_next, initialized) =
                self.bitmap
                    .next_initialized_tick_within_one_word(tick, spacing, zero_for_one)?;
            let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
            let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next)?;

            let step_amount = if zero_for_one {
                get_amount_0_delta_base(sqrt_price_next_x96, sqrt_price_x96, liquidity, true)?
            } else {
                get_amount_1_delta_base(sqrt_price_x96, sqrt_price_next_x96, liquidity, true)?
            };
            max_token_amount = max_token_amount.saturating_add(step_amount);
            sqrt_price_x96 = sqrt_price_next_x96;

            if tick_next == MIN_TICK || tick_next == MAX_TICK {
                break;
            }

            if initialized {
                if let Some(info) = self.ticks.get(&tick_next) {
                    let liquidity_net = if zero_for_one {
                        info.liquidity_net.checked_neg().ok_or(MathError::Overflow)?
                    } else {
                        info.liquidity_net
                    };
                    liquidity = add_delta(liquidity, liquidity_net)?;
                }
            }
            tick = if zero_for_one { tick_next - 1 } else { tick_next };
        }

        let fee_complement = U256::from(FEE_DENOMINATOR - self.fee().fee_pips());
        Ok(mul_div_rounding_up(max_token_amount, U256_E6, fee_complement).unwrap_or(U256::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::FeeTier;
    use alloy_primitives::Address;
    use std::str::FromStr;

    const L: u128 = 1_000_000_000_000_000_000;

    fn i(v: i128) -> I256 {
        I256::try_from(v).unwrap()
    }

    fn pool_at(tick: i32) -> Pool {
        let mut pool = Pool::new(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            FeeTier::Medium,
        )
        .unwrap();
        pool.initialize(get_sqrt_ratio_at_tick(tick).unwrap()).unwrap();
        pool
    }

    fn add_liquidity(pool: &mut Pool, lower: i32, upper: i32, amount: u128) {
        let change = pool
            .prepare_liquidity_change(lower, upper, amount as i128)
            .unwrap();
        pool.apply_liquidity_change(change).unwrap();
    }

    #[test]
    fn single_range_exact_input_matches_closed_form() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);

        let start = pool.slot0().unwrap().sqrt_price_x96;
        let (next, amount_in, amount_out, fee) = compute_swap_step(
            start,
            get_sqrt_ratio_at_tick(-60).unwrap(),
            L,
            i(1000),
            3000,
        )
        .unwrap();

        let result = pool.swap(SwapParams::unbounded(true, i(1000)), 0).unwrap();

        assert_eq!(result.amount0_delta, i(1000));
        assert_eq!(result.amount1_delta, -to_i256(amount_out).unwrap());
        assert_eq!(amount_in + fee, U256::from(1000u64));
        assert_eq!(result.fees_paid, fee);
        assert_eq!(result.sqrt_price_x96, next);
        assert_eq!(result.ticks_crossed, 0);

        // reference values for L = 1e18 at tick 0
        assert_eq!(amount_in, U256::from(997u64));
        assert_eq!(amount_out, U256::from(996u64));
        assert_eq!(fee, U256::from(3u64));
        assert_eq!(result.tick, -1);

        let (fg0, fg1) = pool.fee_growth_global();
        assert_eq!(fg0, mul_div(fee, Q128, U256::from(L)).unwrap());
        assert_eq!(fg0, U256::from_str("1020847100762815390390").unwrap());
        assert_eq!(fg1, U256::ZERO);
        assert_eq!(pool.liquidity(), L);
    }

    #[test]
    fn zero_amount_is_a_no_op() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);
        let before = (pool.slot0().unwrap(), pool.liquidity(), pool.fee_growth_global());

        let result = pool.swap(SwapParams::unbounded(true, I256::ZERO), 0).unwrap();
        assert_eq!(result.amount0_delta, I256::ZERO);
        assert_eq!(result.amount1_delta, I256::ZERO);
        assert_eq!(
            (pool.slot0().unwrap(), pool.liquidity(), pool.fee_growth_global()),
            before
        );
    }

    #[test]
    fn uninitialized_pool_rejects_swaps() {
        let pool = Pool::new(
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            FeeTier::Medium,
        )
        .unwrap();
        assert_eq!(
            pool.quote(SwapParams::unbounded(true, i(1)), 0),
            Err(Error::NotInitialized)
        );
    }

    #[test]
    fn expired_deadline_is_checked_first() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);
        let params = SwapParams::unbounded(true, i(1000)).with_deadline(100);

        assert_eq!(
            pool.swap(params, 101),
            Err(Error::Expired {
                deadline: 100,
                now: 101
            })
        );
        assert_eq!(pool.slot0().unwrap().tick, 0);
        // at the deadline itself the swap is still allowed
        assert!(pool.swap(params, 100).is_ok());
    }

    #[test]
    fn price_limit_must_point_in_swap_direction() {
        let pool = pool_at(0);
        let price = pool.slot0().unwrap().sqrt_price_x96;
        for (zero_for_one, limit) in [
            (true, price),
            (true, price + U256_1),
            (true, MIN_SQRT_RATIO),
            (false, price),
            (false, price - U256_1),
            (false, MAX_SQRT_RATIO),
        ] {
            let params = SwapParams::new(zero_for_one, i(10), limit);
            assert_eq!(pool.quote(params, 0), Err(Error::InvalidPriceLimit));
        }
    }

    #[test]
    fn empty_pool_has_insufficient_liquidity() {
        let mut pool = pool_at(0);
        let before = pool.slot0().unwrap();
        assert_eq!(
            pool.swap(SwapParams::unbounded(false, i(1000)), 0),
            Err(Error::InsufficientLiquidity)
        );
        assert_eq!(pool.slot0().unwrap(), before);
    }

    #[test]
    fn partial_fill_when_liquidity_runs_out() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);

        let huge = i(1_000_000_000_000_000_000_000);
        let result = pool.swap(SwapParams::unbounded(true, huge), 0).unwrap();

        assert!(result.amount0_delta > I256::ZERO && result.amount0_delta < huge);
        assert!(result.amount1_delta < I256::ZERO);
        assert_eq!(result.ticks_crossed, 1);
        assert_eq!(result.liquidity, 0);
        assert_eq!(result.sqrt_price_x96, get_sqrt_ratio_at_tick(-60).unwrap());
        assert_eq!(pool.liquidity(), 0);

        // the next swap in the same direction finds nothing
        assert_eq!(
            pool.quote(SwapParams::unbounded(true, i(1)), 0),
            Err(Error::InsufficientLiquidity)
        );
    }

    #[test]
    fn price_limit_stops_the_swap() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -600, 600, L);

        let limit = get_sqrt_ratio_at_tick(-30).unwrap();
        let amount = i(10_000_000_000_000_000);
        let result = pool.swap(SwapParams::new(true, amount, limit), 0).unwrap();

        assert_eq!(result.sqrt_price_x96, limit);
        assert_eq!(result.tick, -30);
        assert!(result.amount0_delta < amount);
    }

    #[test]
    fn crossing_into_adjacent_range() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);
        add_liquidity(&mut pool, 60, 180, 2 * L);

        let result = pool
            .swap(SwapParams::unbounded(false, i(10_000_000_000_000_000)), 0)
            .unwrap();

        assert_eq!(result.ticks_crossed, 1);
        assert!(result.tick >= 60 && result.tick < 180);
        assert_eq!(pool.liquidity(), 2 * L);

        // tick 60 was crossed upward: its outside growth is now the global growth
        let info = pool.tick(60).unwrap();
        let (_, fg1) = pool.fee_growth_global();
        assert!(info.fee_growth_outside_1_x128 > U256::ZERO);
        assert!(info.fee_growth_outside_1_x128 <= fg1);
    }

    #[test]
    fn crossing_a_gap_without_liquidity() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);
        add_liquidity(&mut pool, 600, 1200, L);

        let result = pool
            .swap(SwapParams::unbounded(false, i(10_000_000_000_000_000)), 0)
            .unwrap();

        // 60 leaves the first range, 600 enters the second
        assert_eq!(result.ticks_crossed, 2);
        assert!(result.tick >= 600);
        assert_eq!(pool.liquidity(), L);
    }

    #[test]
    fn exact_output_receives_requested_amount() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -600, 600, L);

        let result = pool.swap(SwapParams::unbounded(true, i(-1_000_000)), 0).unwrap();
        assert_eq!(result.amount1_delta, i(-1_000_000));
        assert!(result.amount0_delta > i(1_000_000));
        assert!(result.fees_paid > U256::ZERO);
    }

    #[test]
    fn quote_matches_swap_and_leaves_state() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);
        add_liquidity(&mut pool, -180, -60, L);
        let params = SwapParams::unbounded(true, i(5_000_000_000_000_000));

        let quoted = pool.quote(params, 0).unwrap();
        assert_eq!(pool.slot0().unwrap().tick, 0);
        assert_eq!(pool.fee_growth_global(), (U256::ZERO, U256::ZERO));

        let executed = pool.swap(params, 0).unwrap();
        assert_eq!(quoted, executed);
    }

    #[test]
    fn round_trip_swap_returns_to_original_tick_range() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -600, 600, L);

        pool.swap(SwapParams::unbounded(true, i(1_000_000_000_000)), 0)
            .unwrap();
        let down = pool.slot0().unwrap();
        pool.swap(SwapParams::unbounded(false, i(1_000_000_000_000)), 0)
            .unwrap();
        let up = pool.slot0().unwrap();

        assert!(down.tick <= 0);
        assert!(up.sqrt_price_x96 > down.sqrt_price_x96);
        let (fg0, fg1) = pool.fee_growth_global();
        assert!(fg0 > U256::ZERO && fg1 > U256::ZERO);
    }

    #[test]
    fn max_input_amount_drains_range() {
        let mut pool = pool_at(0);
        add_liquidity(&mut pool, -60, 60, L);

        let max_in = pool.max_input_amount(true).unwrap();
        let to_boundary = get_amount_0_delta_base(
            get_sqrt_ratio_at_tick(-60).unwrap(),
            get_sqrt_ratio_at_tick(0).unwrap(),
            L,
            true,
        )
        .unwrap();
        assert!(max_in > to_boundary);

        // swapping that much ends exactly at the range edge with nothing left
        let result = pool
            .swap(SwapParams::unbounded(true, to_i256(max_in).unwrap()), 0)
            .unwrap();
        assert_eq!(result.sqrt_price_x96, get_sqrt_ratio_at_tick(-60).unwrap());
        assert_eq!(pool.liquidity(), 0);
    }

    #[test]
    fn max_input_amount_without_liquidity_is_zero() {
        let pool = pool_at(0);
        assert_eq!(pool.max_input_amount(true).unwrap(), U256::ZERO);
        assert_eq!(pool.max_input_amount(false).unwrap(), U256::ZERO);
    }

    #[test]
    fn sqrt_price_limit_from_tolerance() {
        let price = get_sqrt_ratio_at_tick(0).unwrap();
        let down = calculate_sqrt_price_limit(price, true, 1.0);
        let up = calculate_sqrt_price_limit(price, false, 1.0);
        assert!(down < price && up > price);

        // sqrt(0.99) and sqrt(1.01) to six digits
        assert_eq!(down, mul_div(price, U256::from(994987u64), U256_E6).unwrap());
        assert_eq!(up, mul_div(price, U256::from(1004988u64), U256_E6).unwrap());

        let floor = calculate_sqrt_price_limit(MIN_SQRT_RATIO, true, 50.0);
        assert_eq!(floor, MIN_SQRT_RATIO + U256_1);
        let nan = calculate_sqrt_price_limit(price, true, f64::NAN);
        assert_eq!(nan, price);
    }
}
