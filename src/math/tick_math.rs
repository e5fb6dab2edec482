use crate::error::StateError;
use crate::math::bit_math::most_significant_bit;
use crate::{U256_127, U256_128};
use alloy_primitives::{I256, U256};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`; prices must stay strictly below it.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

/// `log_sqrt(1.0001)` in Q128 and the error bounds used to pick between
/// two candidate ticks.
pub const SQRT_10001: I256 = I256::from_raw(U256::from_limbs([11745905768312294533, 13863, 0, 0]));
pub const TICK_LOW: I256 = I256::from_raw(U256::from_limbs([
    6552757943157144234,
    184476617836266586,
    0,
    0,
]));
pub const TICK_HIGH: I256 = I256::from_raw(U256::from_limbs([
    4998474450511881007,
    15793544031827761793,
    0,
    0,
]));

const Q128_SHIFT: usize = 128;

/// `2^128 / sqrt(1.0001^(2^i))` for the tick bits above bit 0.
const TICK_BIT_FACTORS: [(u32, U256); 19] = [
    (1 << 1, U256::from_limbs([6459403834229662010, 18444899583751176498, 0, 0])),
    (1 << 2, U256::from_limbs([17226890335427755468, 18443055278223354162, 0, 0])),
    (1 << 3, U256::from_limbs([2032852871939366096, 18439367220385604838, 0, 0])),
    (1 << 4, U256::from_limbs([14545316742740207172, 18431993317065449817, 0, 0])),
    (1 << 5, U256::from_limbs([5129152022828963008, 18417254355718160513, 0, 0])),
    (1 << 6, U256::from_limbs([4894419605888772193, 18387811781193591352, 0, 0])),
    (1 << 7, U256::from_limbs([1280255884321894483, 18329067761203520168, 0, 0])),
    (1 << 8, U256::from_limbs([15924666964335305636, 18212142134806087854, 0, 0])),
    (1 << 9, U256::from_limbs([8010504389359918676, 17980523815641551639, 0, 0])),
    (1 << 10, U256::from_limbs([10668036004952895731, 17526086738831147013, 0, 0])),
    (1 << 11, U256::from_limbs([4878133418470705625, 16651378430235024244, 0, 0])),
    (1 << 12, U256::from_limbs([9537173718739605541, 15030750278693429944, 0, 0])),
    (1 << 13, U256::from_limbs([9972618978014552549, 12247334978882834399, 0, 0])),
    (1 << 14, U256::from_limbs([10428997489610666743, 8131365268884726200, 0, 0])),
    (1 << 15, U256::from_limbs([9305304367709015974, 3584323654723342297, 0, 0])),
    (1 << 16, U256::from_limbs([14301143598189091785, 696457651847595233, 0, 0])),
    (1 << 17, U256::from_limbs([7393154844743099908, 26294789957452057, 0, 0])),
    (1 << 18, U256::from_limbs([2209338891292245656, 37481735321082, 0, 0])),
    (1 << 19, U256::from_limbs([10518117631919034274, 76158723, 0, 0])),
];

/// `sqrt(1.0001^tick) * 2^96`, rounded up so that
/// `get_tick_at_sqrt_ratio(get_sqrt_ratio_at_tick(t)) == t`.
///
/// Fails with [`StateError::InvalidTick`] outside `[MIN_TICK, MAX_TICK]`.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::InvalidTick(tick));
    }

    // Q128 ratio for negative ticks, inverted at the end for positive ones
    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };
    for (bit, factor) in TICK_BIT_FACTORS {
        if abs_tick & bit != 0 {
            ratio = ratio.wrapping_mul(factor) >> Q128_SHIFT;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128 -> Q96, rounding up
    let truncated = ratio.as_limbs()[0] & u64::from(u32::MAX) != 0;
    Ok((ratio >> 32usize) + U256::from(truncated as u8))
}

/// Greatest tick whose sqrt ratio is at or below `sqrt_price_x96`.
///
/// Accepts `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`; anything else is
/// [`StateError::SqrtPriceOutOfBounds`].
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, StateError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    let ratio = sqrt_price_x96 << 32usize;
    let msb = most_significant_bit(ratio).map_err(|_| StateError::SqrtPriceIsZero)? as usize;

    // normalize the mantissa to [2^127, 2^128)
    let mut mantissa = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };
    let mut log_2: I256 =
        (I256::from_raw(U256::from(msb)) - I256::from_raw(U256_128)) << 64usize;

    // fractional bits of log2 by repeated squaring
    for bit in (50..64usize).rev() {
        mantissa = mantissa.overflowing_mul(mantissa).0 >> U256_127;
        let carry = mantissa >> Q128_SHIFT;
        log_2 |= I256::from_raw(carry << bit);
        mantissa >>= carry;
    }

    let log_sqrt10001 = log_2.wrapping_mul(SQRT_10001);
    let tick_low = ((log_sqrt10001 - TICK_LOW) >> Q128_SHIFT).low_i32();
    let tick_high = ((log_sqrt10001 + TICK_HIGH) >> Q128_SHIFT).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}
