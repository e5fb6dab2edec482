//! In-memory pool state: price, per-tick liquidity and fee accounting, and
//! the swap loop that walks initialized ticks.

mod fee_tier;
mod state;
pub mod swap;
mod tick;

pub use fee_tier::FeeTier;
pub(crate) use state::LiquidityChange;
pub use state::{Pool, Slot0, sort_tokens};
pub use swap::{SwapParams, SwapResult, calculate_sqrt_price_limit};
pub use tick::{TickInfo, fee_growth_inside};
