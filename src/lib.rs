//! Concentrated-liquidity AMM pool engine in pure Rust.
//!
//! This crate exposes:
//! - Low‑level math primitives (`math::*`) for ticks, prices, swap steps and bitmaps.
//! - A [`Pool`] state machine that executes Uniswap V3‑style swaps and tracks
//!   per‑tick liquidity and fee growth.
//! - A [`PositionLedger`] that mints, burns and collects per‑owner positions.
//! - A thread‑safe [`PoolRegistry`] that creates pools keyed by token pair and
//!   fee tier and serializes mutations per pool.
//!
//! The engine only computes token deltas; moving balances is left to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use clmm_pool::{
//!     math::tick_math::get_sqrt_ratio_at_tick,
//!     Address, FeeTier, PoolRegistry, SwapParams, I256, U256,
//! };
//!
//! let registry = PoolRegistry::new();
//! let usdc = Address::repeat_byte(0x01);
//! let weth = Address::repeat_byte(0x02);
//! let lp = Address::repeat_byte(0xaa);
//!
//! let pool_id = registry.create_pool(usdc, weth, 3000).unwrap();
//! registry.initialize(&pool_id, get_sqrt_ratio_at_tick(0).unwrap()).unwrap();
//!
//! let (amount0, amount1) = registry
//!     .mint(&pool_id, lp, -600, 600, 1_000_000_000_000_000_000u128)
//!     .unwrap();
//! println!("deposit {amount0} token0 and {amount1} token1");
//!
//! let params = SwapParams::unbounded(true, I256::try_from(1_000_000i64).unwrap());
//! let result = registry.swap(&pool_id, params).unwrap();
//! assert_eq!(result.amount0_delta, I256::try_from(1_000_000i64).unwrap());
//! assert!(result.amount1_delta < I256::ZERO);
//! # let _ = (FeeTier::Medium, U256::ZERO);
//! ```

pub use alloy_primitives::{Address, B256, I256, U256};

pub mod error;
mod hash;
pub mod math;
pub mod pool;
pub mod position;
pub mod registry;

pub use error::{Error, MathError, Result, StateError};
pub use hash::{FastMap, FastSet};
pub use pool::{FeeTier, Pool, Slot0, SwapParams, SwapResult, TickInfo};
pub use position::{Position, PositionKey, PositionLedger};
pub use registry::{Clock, PoolId, PoolKey, PoolRegistry, PoolSnapshot, SystemClock};

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);

const U256_127: U256 = U256::from_limbs([127, 0, 0, 0]);
const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);

const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);
const U256_E6: U256 = U256::from_limbs([1000000, 0, 0, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
/// 2^128, the scale of every fee-growth accumulator.
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
