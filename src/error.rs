use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - out of bounds")]
    OutOfBounds,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - sqrtPrice out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("State error - sqrtPrice is 0")]
    SqrtPriceIsZero,
    #[error("State error - sqrtRatio is 0")]
    SqrtRatioIsZero,

    #[error("State error - tick {0} out of bounds")]
    InvalidTick(i32),

    #[error("State error - liquidity is 0")]
    LiquidityIsZero,

    #[error("State error - requested amount exceeds pool reserves")]
    InsufficientReserves,
}

/// Every failure a pool, position or registry operation can surface.
///
/// Mutating operations return one of these before touching any state, so an
/// `Err` always means the pool is exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(#[from] MathError),

    #[error(transparent)]
    StateError(#[from] StateError),

    #[error("invalid tick range [{tick_lower}, {tick_upper}) for tick spacing {tick_spacing}")]
    InvalidTickRange {
        tick_lower: i32,
        tick_upper: i32,
        tick_spacing: i32,
    },

    #[error("fee {0} is not a supported fee tier")]
    InvalidFeeTier(u32),

    #[error("pool already exists")]
    PoolAlreadyExists,

    #[error("pool not found")]
    PoolNotFound,

    #[error("tokens must be distinct, got {0} twice")]
    IdenticalTokens(Address),

    #[error("pool is not initialized")]
    NotInitialized,

    #[error("pool is already initialized")]
    AlreadyInitialized,

    #[error("sqrt price limit is out of range for the swap direction")]
    InvalidPriceLimit,

    #[error("liquidity delta must be non-zero")]
    InvalidLiquidityDelta,

    #[error("liquidity gross at tick {0} would exceed the per-tick maximum")]
    TickLiquidityOverflow(i32),

    #[error("insufficient liquidity to make progress in the swap direction")]
    InsufficientLiquidity,

    #[error("position holds {available} liquidity, {requested} requested")]
    InsufficientPositionLiquidity { available: u128, requested: u128 },

    #[error("deadline {deadline} has passed (now {now})")]
    Expired { deadline: u64, now: u64 },

    #[error("{caller} is not authorized to act for {owner}")]
    Unauthorized { caller: Address, owner: Address },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
