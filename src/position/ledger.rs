use crate::error::{Error, MathError};
use crate::math::math_helpers::to_u128;
use crate::pool::Pool;
use crate::position::{Position, PositionKey};
use crate::{FastMap, FastSet};
use alloy_primitives::{Address, U256};
use tracing::debug;

/// Positions of a single pool together with operator approvals.
///
/// The ledger never holds tokens. Amounts returned by [`mint`](Self::mint)
/// are owed to the pool, amounts returned by [`collect`](Self::collect) are
/// owed to the owner; settling them is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: FastMap<PositionKey, Position>,
    // (owner, operator)
    operators: FastSet<(Address, Address)>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, key: &PositionKey) -> Option<&Position> {
        self.positions.get(key)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PositionKey, &Position)> {
        self.positions.iter()
    }

    /// Lets `operator` burn and collect on behalf of `owner`, or revokes it.
    pub fn set_approval_for_all(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
        debug!(%owner, %operator, approved, "operator approval updated");
    }

    pub fn is_approved_or_owner(&self, caller: Address, owner: Address) -> bool {
        caller == owner || self.operators.contains(&(owner, caller))
    }

    fn authorize(&self, caller: Address, owner: Address) -> Result<(), Error> {
        if self.is_approved_or_owner(caller, owner) {
            Ok(())
        } else {
            Err(Error::Unauthorized { caller, owner })
        }
    }

    /// Adds `amount` of liquidity to `owner`'s position over the range and
    /// returns the token amounts the pool needs in exchange, rounded up.
    ///
    /// Anyone may mint on behalf of an owner.
    pub fn mint(
        &mut self,
        pool: &mut Pool,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        if amount == 0 {
            return Err(Error::InvalidLiquidityDelta);
        }
        let liquidity_delta = i128::try_from(amount).map_err(|_| Error::InvalidLiquidityDelta)?;

        let change = pool.prepare_liquidity_change(tick_lower, tick_upper, liquidity_delta)?;
        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let mut position = self.positions.get(&key).cloned().unwrap_or_default();
        position.update(
            liquidity_delta,
            change.fee_growth_inside_0_x128,
            change.fee_growth_inside_1_x128,
        )?;

        let amount0 = change.amount0.unsigned_abs();
        let amount1 = change.amount1.unsigned_abs();

        pool.apply_liquidity_change(change)?;
        self.positions.insert(key, position);

        debug!(%owner, tick_lower, tick_upper, amount, %amount0, %amount1, "minted liquidity");
        Ok((amount0, amount1))
    }

    /// Removes `amount` of liquidity from a position. The released tokens,
    /// rounded down, are credited to the position's owed balance together
    /// with any fees accrued so far and are paid out by
    /// [`collect`](Self::collect).
    ///
    /// A zero `amount` only accrues fees.
    pub fn burn(
        &mut self,
        pool: &mut Pool,
        caller: Address,
        key: PositionKey,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        self.authorize(caller, key.owner)?;

        let available = self.positions.get(&key).map_or(0, |p| p.liquidity);
        if amount > available || available == 0 {
            return Err(Error::InsufficientPositionLiquidity {
                available,
                requested: amount,
            });
        }
        let mut position = self.positions.get(&key).cloned().unwrap_or_default();
        let liquidity_delta = i128::try_from(amount)
            .map(|amount| -amount)
            .map_err(|_| Error::InvalidLiquidityDelta)?;

        let change = pool.prepare_liquidity_change(key.tick_lower, key.tick_upper, liquidity_delta)?;
        position.update(
            liquidity_delta,
            change.fee_growth_inside_0_x128,
            change.fee_growth_inside_1_x128,
        )?;

        let amount0 = change.amount0.unsigned_abs();
        let amount1 = change.amount1.unsigned_abs();
        position.credit(to_u128(amount0)?, to_u128(amount1)?)?;

        pool.apply_liquidity_change(change)?;
        self.store(key, position);

        debug!(owner = %key.owner, %caller, tick_lower = key.tick_lower, tick_upper = key.tick_upper, amount, %amount0, %amount1, "burned liquidity");
        Ok((amount0, amount1))
    }

    /// Pays out up to the requested amounts from the position's owed
    /// balance. Fees earned since the last accrual are credited first.
    ///
    /// Collecting from a position that does not exist yields nothing.
    pub fn collect(
        &mut self,
        pool: &Pool,
        caller: Address,
        key: PositionKey,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        self.authorize(caller, key.owner)?;

        let Some(mut position) = self.positions.get(&key).cloned() else {
            return Ok((0, 0));
        };

        if position.liquidity > 0 {
            let (inside0, inside1) = pool.fee_growth_inside(key.tick_lower, key.tick_upper)?;
            position.update(0, inside0, inside1)?;
        }

        let amount0 = amount0_requested.min(position.tokens_owed_0);
        let amount1 = amount1_requested.min(position.tokens_owed_1);
        position.tokens_owed_0 -= amount0;
        position.tokens_owed_1 -= amount1;
        self.store(key, position);

        debug!(owner = %key.owner, %caller, tick_lower = key.tick_lower, tick_upper = key.tick_upper, amount0, amount1, "collected");
        Ok((amount0, amount1))
    }

    /// Owed balance including fees not yet accrued into the record.
    pub fn owed_fees(&self, pool: &Pool, key: &PositionKey) -> Result<(u128, u128), Error> {
        let Some(position) = self.positions.get(key) else {
            return Ok((0, 0));
        };
        let (pending0, pending1) = if position.liquidity > 0 {
            let (inside0, inside1) = pool.fee_growth_inside(key.tick_lower, key.tick_upper)?;
            position.pending_fees(inside0, inside1)?
        } else {
            (0, 0)
        };
        Ok((
            position
                .tokens_owed_0
                .checked_add(pending0)
                .ok_or(MathError::Overflow)?,
            position
                .tokens_owed_1
                .checked_add(pending1)
                .ok_or(MathError::Overflow)?,
        ))
    }

    fn store(&mut self, key: PositionKey, position: Position) {
        if position.is_empty() {
            self.positions.remove(&key);
        } else {
            self.positions.insert(key, position);
        }
    }
}
