//! Thread-safe collection of pools keyed by token pair and fee tier.
//!
//! Each pool sits behind its own mutex together with its position ledger,
//! so every mutation on one pool is serialized while different pools run
//! in parallel. The outer map lock is only held for lookups and inserts.

use crate::error::Error;
use crate::pool::{FeeTier, Pool, Slot0, SwapParams, SwapResult, sort_tokens};
use crate::position::{PositionKey, PositionLedger};
use crate::FastMap;
use alloy_primitives::{Address, B256, U256, keccak256};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Source of the current time, in UNIX seconds, for deadline checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }
}

impl<F> Clock for F
where
    F: Fn() -> u64 + Send + Sync,
{
    fn now(&self) -> u64 {
        self()
    }
}

/// Canonical pool identity: sorted tokens plus fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeTier,
}

impl PoolKey {
    pub fn new(token_a: Address, token_b: Address, fee: u32) -> Result<Self, Error> {
        if token_a == token_b {
            return Err(Error::IdenticalTokens(token_a));
        }
        let fee = FeeTier::try_from(fee)?;
        let (token0, token1) = sort_tokens(token_a, token_b);
        Ok(Self {
            token0,
            token1,
            fee,
        })
    }

    /// `keccak256(token0 ‖ token1 ‖ fee)`, fee as big-endian `u32`.
    pub fn id(&self) -> PoolId {
        let mut buf = [0u8; 44];
        buf[..20].copy_from_slice(self.token0.as_slice());
        buf[20..40].copy_from_slice(self.token1.as_slice());
        buf[40..].copy_from_slice(&self.fee.fee_pips().to_be_bytes());
        PoolId(keccak256(buf))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolId(pub B256);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only copy of a pool's state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolSnapshot {
    pub id: PoolId,
    pub key: PoolKey,
    /// `None` until the pool is initialized.
    pub slot0: Option<Slot0>,
    pub liquidity: u128,
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub initialized_ticks: Vec<i32>,
    pub positions: usize,
}

#[derive(Debug)]
struct PoolEntry {
    key: PoolKey,
    pool: Pool,
    positions: PositionLedger,
}

type SharedEntry = Arc<Mutex<PoolEntry>>;

pub struct PoolRegistry<C: Clock = SystemClock> {
    pools: RwLock<FastMap<PoolId, SharedEntry>>,
    clock: C,
}

impl PoolRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PoolRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PoolRegistry<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            pools: RwLock::new(FastMap::default()),
            clock,
        }
    }

    /// Registers an uninitialized pool for the pair and fee.
    pub fn create_pool(&self, token_a: Address, token_b: Address, fee: u32) -> Result<PoolId, Error> {
        let key = PoolKey::new(token_a, token_b, fee)?;
        let id = key.id();

        let mut pools = self.pools.write();
        if pools.contains_key(&id) {
            return Err(Error::PoolAlreadyExists);
        }
        let entry = PoolEntry {
            key,
            pool: Pool::new(key.token0, key.token1, key.fee)?,
            positions: PositionLedger::new(),
        };
        pools.insert(id, Arc::new(Mutex::new(entry)));
        drop(pools);

        debug!(pool = %id, token0 = %key.token0, token1 = %key.token1, fee = %key.fee, "pool created");
        Ok(id)
    }

    /// Id of the pool for the pair and fee, if it was created.
    pub fn get_pool(&self, token_a: Address, token_b: Address, fee: u32) -> Option<PoolId> {
        let id = PoolKey::new(token_a, token_b, fee).ok()?.id();
        self.pools.read().contains_key(&id).then_some(id)
    }

    pub fn pool_ids(&self) -> Vec<PoolId> {
        self.pools.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }

    fn entry(&self, id: &PoolId) -> Result<SharedEntry, Error> {
        self.pools.read().get(id).cloned().ok_or(Error::PoolNotFound)
    }

    /// Runs `f` with read access to the pool and its ledger while holding
    /// the pool lock.
    pub fn with_pool<R>(
        &self,
        id: &PoolId,
        f: impl FnOnce(&Pool, &PositionLedger) -> R,
    ) -> Result<R, Error> {
        let entry = self.entry(id)?;
        let guard = entry.lock();
        Ok(f(&guard.pool, &guard.positions))
    }

    pub fn snapshot(&self, id: &PoolId) -> Result<PoolSnapshot, Error> {
        let entry = self.entry(id)?;
        let guard = entry.lock();
        let (fee_growth_global_0_x128, fee_growth_global_1_x128) = guard.pool.fee_growth_global();
        Ok(PoolSnapshot {
            id: *id,
            key: guard.key,
            slot0: guard.pool.slot0().ok(),
            liquidity: guard.pool.liquidity(),
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
            initialized_ticks: guard.pool.initialized_ticks(),
            positions: guard.positions.len(),
        })
    }

    pub fn initialize(&self, id: &PoolId, sqrt_price_x96: U256) -> Result<Slot0, Error> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        guard.pool.initialize(sqrt_price_x96)
    }

    pub fn mint(
        &self,
        id: &PoolId,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        let PoolEntry {
            pool, positions, ..
        } = &mut *guard;
        positions.mint(pool, owner, tick_lower, tick_upper, amount)
    }

    pub fn burn(
        &self,
        id: &PoolId,
        caller: Address,
        key: PositionKey,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        let PoolEntry {
            pool, positions, ..
        } = &mut *guard;
        positions.burn(pool, caller, key, amount)
    }

    pub fn collect(
        &self,
        id: &PoolId,
        caller: Address,
        key: PositionKey,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        let PoolEntry {
            pool, positions, ..
        } = &mut *guard;
        positions.collect(pool, caller, key, amount0_requested, amount1_requested)
    }

    pub fn set_approval_for_all(
        &self,
        id: &PoolId,
        owner: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), Error> {
        let entry = self.entry(id)?;
        entry
            .lock()
            .positions
            .set_approval_for_all(owner, operator, approved);
        Ok(())
    }

    /// Executes a swap. The deadline in `params`, if any, is checked against
    /// the registry's clock.
    pub fn swap(&self, id: &PoolId, params: SwapParams) -> Result<SwapResult, Error> {
        let entry = self.entry(id)?;
        let now = self.clock.now();
        entry.lock().pool.swap(params, now)
    }

    /// Same as [`swap`](Self::swap) without committing anything.
    pub fn quote(&self, id: &PoolId, params: SwapParams) -> Result<SwapResult, Error> {
        let entry = self.entry(id)?;
        let now = self.clock.now();
        entry.lock().pool.quote(params, now)
    }
}
