//! Liquidity positions and the per-pool ledger that owns them.

mod ledger;

pub use ledger::PositionLedger;

use crate::Q128;
use crate::error::MathError;
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::{mul_div, to_u128};
use alloy_primitives::{Address, U256};

/// Identifies a position inside one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    #[inline]
    pub const fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

/// Liquidity and uncollected tokens of one owner over one range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub liquidity: u128,
    /// Fee growth inside the range as of the last accrual.
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
    /// Fees plus withdrawn principal waiting to be collected.
    pub tokens_owed_0: u128,
    pub tokens_owed_1: u128,
}

impl Position {
    /// Fees earned since the last accrual at the given inside growth.
    pub fn pending_fees(
        &self,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(u128, u128), MathError> {
        let liquidity = U256::from(self.liquidity);
        let delta0 = fee_growth_inside_0_x128.wrapping_sub(self.fee_growth_inside_0_last_x128);
        let delta1 = fee_growth_inside_1_x128.wrapping_sub(self.fee_growth_inside_1_last_x128);
        Ok((
            to_u128(mul_div(delta0, liquidity, Q128)?)?,
            to_u128(mul_div(delta1, liquidity, Q128)?)?,
        ))
    }

    /// Credits pending fees, moves the checkpoints and applies the
    /// liquidity delta.
    pub(crate) fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(), MathError> {
        let (fees0, fees1) =
            self.pending_fees(fee_growth_inside_0_x128, fee_growth_inside_1_x128)?;

        self.liquidity = add_delta(self.liquidity, liquidity_delta)?;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;
        self.credit(fees0, fees1)
    }

    pub(crate) fn credit(&mut self, amount0: u128, amount1: u128) -> Result<(), MathError> {
        self.tokens_owed_0 = self
            .tokens_owed_0
            .checked_add(amount0)
            .ok_or(MathError::Overflow)?;
        self.tokens_owed_1 = self
            .tokens_owed_1
            .checked_add(amount1)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Nothing left to withdraw or collect.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed_0 == 0 && self.tokens_owed_1 == 0
    }
}
