use crate::FastMap;
use crate::error::{Error, MathError};
use crate::math::liquidity_math::{add_delta, max_liquidity_per_tick};
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_bitmap::TickBitmap;
use crate::math::tick_math::{MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use crate::pool::fee_tier::FeeTier;
use crate::pool::tick::{TickInfo, fee_growth_inside};
use alloy_primitives::{Address, I256, U256};
use tracing::debug;

/// Current price and the tick it falls in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// Returns the pair ordered by address, the canonical `(token0, token1)`.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// One concentrated-liquidity pool: price, active liquidity, fee growth
/// accumulators and the sparse tick table with its bitmap index.
///
/// Mutations go through [`Pool::swap`] and the position ledger; both compute
/// their full effect first and only then write it back, so a failed call
/// leaves the pool untouched.
#[derive(Clone, Debug)]
pub struct Pool {
    token0: Address,
    token1: Address,
    fee: FeeTier,
    tick_spacing: i32,
    max_liquidity_per_tick: u128,
    pub(crate) slot0: Option<Slot0>,
    pub(crate) liquidity: u128,
    pub(crate) fee_growth_global_0_x128: U256,
    pub(crate) fee_growth_global_1_x128: U256,
    pub(crate) ticks: FastMap<i32, TickInfo>,
    pub(crate) bitmap: TickBitmap,
}

/// Effect of a liquidity change on the pool, computed against the current
/// state and applied with [`Pool::apply_liquidity_change`].
#[derive(Clone, Debug)]
pub(crate) struct LiquidityChange {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity_delta: i128,
    lower: TickInfo,
    upper: TickInfo,
    flipped_lower: bool,
    flipped_upper: bool,
    liquidity_after: u128,
    pub fee_growth_inside_0_x128: U256,
    pub fee_growth_inside_1_x128: U256,
    /// Signed token amounts; positive is owed to the pool.
    pub amount0: I256,
    pub amount1: I256,
}

impl Pool {
    /// Creates an uninitialized pool for the pair. Token order does not
    /// matter; the pool stores them sorted.
    pub fn new(token_a: Address, token_b: Address, fee: FeeTier) -> Result<Self, Error> {
        if token_a == token_b {
            return Err(Error::IdenticalTokens(token_a));
        }
        let (token0, token1) = sort_tokens(token_a, token_b);
        let tick_spacing = fee.tick_spacing();

        Ok(Self {
            token0,
            token1,
            fee,
            tick_spacing,
            max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
            slot0: None,
            liquidity: 0,
            fee_growth_global_0_x128: U256::ZERO,
            fee_growth_global_1_x128: U256::ZERO,
            ticks: FastMap::default(),
            bitmap: TickBitmap::new(),
        })
    }

    /// Sets the starting price. Allowed exactly once.
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<Slot0, Error> {
        if self.slot0.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        let slot0 = Slot0 {
            sqrt_price_x96,
            tick,
        };
        self.slot0 = Some(slot0);
        debug!(token0 = %self.token0, token1 = %self.token1, %sqrt_price_x96, tick, "pool initialized");
        Ok(slot0)
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn fee(&self) -> FeeTier {
        self.fee
    }

    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    pub fn max_liquidity_per_tick(&self) -> u128 {
        self.max_liquidity_per_tick
    }

    pub fn is_initialized(&self) -> bool {
        self.slot0.is_some()
    }

    /// Current price and tick, or [`Error::NotInitialized`].
    pub fn slot0(&self) -> Result<Slot0, Error> {
        self.slot0.ok_or(Error::NotInitialized)
    }

    /// Liquidity active at the current tick.
    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    /// `(fee_growth_global_0_x128, fee_growth_global_1_x128)`.
    pub fn fee_growth_global(&self) -> (U256, U256) {
        (self.fee_growth_global_0_x128, self.fee_growth_global_1_x128)
    }

    pub fn tick(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Initialized ticks in ascending order.
    pub fn initialized_ticks(&self) -> Vec<i32> {
        self.bitmap.initialized_ticks(self.tick_spacing)
    }

    pub fn bitmap(&self) -> &TickBitmap {
        &self.bitmap
    }

    /// Sum of `liquidity_net` over every tick. Zero for a consistent pool.
    pub fn liquidity_net_sum(&self) -> I256 {
        self.ticks.values().fold(I256::ZERO, |acc, info| {
            let magnitude = I256::from_raw(U256::from(info.liquidity_net.unsigned_abs()));
            if info.liquidity_net < 0 {
                acc.saturating_sub(magnitude)
            } else {
                acc.saturating_add(magnitude)
            }
        })
    }

    /// Fee growth per unit of liquidity inside `[tick_lower, tick_upper)`.
    pub fn fee_growth_inside(&self, tick_lower: i32, tick_upper: i32) -> Result<(U256, U256), Error> {
        self.check_ticks(tick_lower, tick_upper)?;
        let tick_current = self.slot0()?.tick;
        let empty = TickInfo::default();
        Ok(fee_growth_inside(
            self.ticks.get(&tick_lower).unwrap_or(&empty),
            self.ticks.get(&tick_upper).unwrap_or(&empty),
            tick_lower,
            tick_upper,
            tick_current,
            self.fee_growth_global_0_x128,
            self.fee_growth_global_1_x128,
        ))
    }

    pub(crate) fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> Result<(), Error> {
        let spacing = self.tick_spacing;
        if tick_lower >= tick_upper
            || tick_lower < MIN_TICK
            || tick_upper > MAX_TICK
            || tick_lower % spacing != 0
            || tick_upper % spacing != 0
        {
            return Err(Error::InvalidTickRange {
                tick_lower,
                tick_upper,
                tick_spacing: spacing,
            });
        }
        Ok(())
    }

    /// Computes how a liquidity change of `liquidity_delta` over the range
    /// would affect ticks, active liquidity and token balances, without
    /// writing anything.
    ///
    /// A zero delta only refreshes fee growth inside the range.
    pub(crate) fn prepare_liquidity_change(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<LiquidityChange, Error> {
        self.check_ticks(tick_lower, tick_upper)?;
        let slot0 = self.slot0()?;
        let (fg0, fg1) = self.fee_growth_global();

        let mut lower = self.ticks.get(&tick_lower).cloned().unwrap_or_default();
        let mut upper = self.ticks.get(&tick_upper).cloned().unwrap_or_default();
        let mut flipped_lower = false;
        let mut flipped_upper = false;

        if liquidity_delta != 0 {
            flipped_lower = lower.update(
                tick_lower,
                slot0.tick,
                liquidity_delta,
                fg0,
                fg1,
                false,
                self.max_liquidity_per_tick,
            )?;
            flipped_upper = upper.update(
                tick_upper,
                slot0.tick,
                liquidity_delta,
                fg0,
                fg1,
                true,
                self.max_liquidity_per_tick,
            )?;
        }

        let (inside0, inside1) = fee_growth_inside(
            &lower,
            &upper,
            tick_lower,
            tick_upper,
            slot0.tick,
            fg0,
            fg1,
        );

        let mut amount0 = I256::ZERO;
        let mut amount1 = I256::ZERO;
        let mut liquidity_after = self.liquidity;

        if liquidity_delta != 0 {
            let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
            let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;

            if slot0.tick < tick_lower {
                // range sits above the price, only token0
                amount0 = get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity_delta)?;
            } else if slot0.tick < tick_upper {
                amount0 = get_amount_0_delta(slot0.sqrt_price_x96, sqrt_upper, liquidity_delta)?;
                amount1 = get_amount_1_delta(sqrt_lower, slot0.sqrt_price_x96, liquidity_delta)?;
                liquidity_after = add_delta(self.liquidity, liquidity_delta)?;
            } else {
                amount1 = get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity_delta)?;
            }
        }

        Ok(LiquidityChange {
            tick_lower,
            tick_upper,
            liquidity_delta,
            lower,
            upper,
            flipped_lower,
            flipped_upper,
            liquidity_after,
            fee_growth_inside_0_x128: inside0,
            fee_growth_inside_1_x128: inside1,
            amount0,
            amount1,
        })
    }

    /// Writes a change produced by [`Pool::prepare_liquidity_change`].
    ///
    /// The change must have been prepared against the current state.
    pub(crate) fn apply_liquidity_change(&mut self, change: LiquidityChange) -> Result<(), MathError> {
        if change.liquidity_delta == 0 {
            return Ok(());
        }
        let removing = change.liquidity_delta < 0;

        for (tick, info, flipped) in [
            (change.tick_lower, change.lower, change.flipped_lower),
            (change.tick_upper, change.upper, change.flipped_upper),
        ] {
            if flipped {
                self.bitmap.flip(tick, self.tick_spacing)?;
            }
            if removing && flipped {
                self.ticks.remove(&tick);
            } else {
                self.ticks.insert(tick, info);
            }
        }

        self.liquidity = change.liquidity_after;
        Ok(())
    }
}
