#![allow(dead_code)]

use clmm_pool::math::bit_math::{least_significant_bit, most_significant_bit};
use clmm_pool::math::liquidity_math::{get_amounts_for_liquidity, get_liquidity_for_amounts};
use clmm_pool::math::math_helpers::{mul_div, mul_div_rounding_up};
use clmm_pool::math::sqrt_price_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use clmm_pool::math::swap_math::compute_swap_step;
use clmm_pool::math::tick_bitmap::TickBitmap;
use clmm_pool::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use clmm_pool::{Address, FeeTier, I256, Pool, PositionLedger, Q128, SwapParams, U256};
use criterion::{BatchSize, Criterion};
use std::hint::black_box;

pub const LIQUIDITY: u128 = 1_000_000_000_000_000_000;

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    let ticks = [-887272, -200_000, -60, 0, 60, 200_000, 887272];
    let prices: Vec<U256> = ticks
        .iter()
        .map(|&tick| get_sqrt_ratio_at_tick(tick).unwrap())
        .collect();

    group.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| {
            for &tick in &ticks {
                black_box(get_sqrt_ratio_at_tick(black_box(tick)).unwrap());
            }
        })
    });
    group.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| {
            // the max tick's price is outside the accepted range
            for &price in &prices[..prices.len() - 1] {
                black_box(get_tick_at_sqrt_ratio(black_box(price)).unwrap());
            }
        })
    });
    group.finish();
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqrt_price_math");
    let lower = get_sqrt_ratio_at_tick(-600).unwrap();
    let upper = get_sqrt_ratio_at_tick(600).unwrap();
    let price = get_sqrt_ratio_at_tick(0).unwrap();
    let amount = U256::from(1_000_000_000_000u64);

    group.bench_function("get_amount_0_delta", |b| {
        b.iter(|| get_amount_0_delta(black_box(lower), black_box(upper), black_box(LIQUIDITY as i128)))
    });
    group.bench_function("get_amount_1_delta", |b| {
        b.iter(|| get_amount_1_delta(black_box(lower), black_box(upper), black_box(-(LIQUIDITY as i128))))
    });
    group.bench_function("get_next_sqrt_price_from_input", |b| {
        b.iter(|| get_next_sqrt_price_from_input(black_box(price), LIQUIDITY, black_box(amount), true))
    });
    group.bench_function("get_next_sqrt_price_from_output", |b| {
        b.iter(|| get_next_sqrt_price_from_output(black_box(price), LIQUIDITY, black_box(amount), false))
    });
    group.finish();
}

pub fn bench_liquidity_math(c: &mut Criterion) {
    let lower = get_sqrt_ratio_at_tick(-600).unwrap();
    let upper = get_sqrt_ratio_at_tick(600).unwrap();
    let price = get_sqrt_ratio_at_tick(17).unwrap();
    let amount = U256::from(1_000_000_000_000_000u64);

    let mut group = c.benchmark_group("liquidity_math");
    group.bench_function("get_liquidity_for_amounts", |b| {
        b.iter(|| get_liquidity_for_amounts(black_box(price), lower, upper, black_box(amount), black_box(amount)))
    });
    group.bench_function("get_amounts_for_liquidity", |b| {
        b.iter(|| get_amounts_for_liquidity(black_box(price), lower, upper, black_box(LIQUIDITY)))
    });
    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let current = get_sqrt_ratio_at_tick(0).unwrap();
    let target = get_sqrt_ratio_at_tick(-60).unwrap();
    let exact_in = I256::try_from(1_000_000_000_000i64).unwrap();
    let exact_out = I256::try_from(-1_000_000_000_000i64).unwrap();

    let mut group = c.benchmark_group("swap_math");
    group.bench_function("compute_swap_step_exact_in", |b| {
        b.iter(|| compute_swap_step(black_box(current), black_box(target), LIQUIDITY, black_box(exact_in), 3000))
    });
    group.bench_function("compute_swap_step_exact_out", |b| {
        b.iter(|| compute_swap_step(black_box(current), black_box(target), LIQUIDITY, black_box(exact_out), 3000))
    });
    group.finish();
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let a = U256::from(LIQUIDITY) << 96;
    let b = get_sqrt_ratio_at_tick(1000).unwrap();
    let denominator = get_sqrt_ratio_at_tick(-1000).unwrap();

    let mut group = c.benchmark_group("math_helpers");
    group.bench_function("mul_div", |bench| {
        bench.iter(|| mul_div(black_box(a), black_box(b), black_box(denominator)))
    });
    group.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| mul_div_rounding_up(black_box(a), black_box(b), black_box(denominator)))
    });
    group.bench_function("mul_div_q128", |bench| {
        bench.iter(|| mul_div(black_box(U256::from(3u8)), Q128, black_box(U256::from(LIQUIDITY))))
    });
    group.finish();
}

pub fn bench_tick_bitmap(c: &mut Criterion) {
    let spacing = 60;
    let mut bitmap = TickBitmap::new();
    for tick in (-60_000..=60_000).step_by(600) {
        bitmap.flip(tick, spacing).unwrap();
    }

    let mut group = c.benchmark_group("tick_bitmap");
    group.bench_function("next_initialized_tick_lte", |b| {
        b.iter(|| bitmap.next_initialized_tick_within_one_word(black_box(1_234), spacing, true))
    });
    group.bench_function("next_initialized_tick_gt", |b| {
        b.iter(|| bitmap.next_initialized_tick_within_one_word(black_box(-1_234), spacing, false))
    });
    group.bench_function("has_initialized_beyond", |b| {
        b.iter(|| bitmap.has_initialized_beyond(black_box(-59_999), spacing, true))
    });
    group.bench_function("flip", |b| {
        b.iter_batched(
            || bitmap.clone(),
            |mut bitmap| bitmap.flip(black_box(120), spacing),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_bit_math(c: &mut Criterion) {
    let values = [
        U256::from(1u8),
        U256::from(u64::MAX),
        U256::from(1u8) << 200,
        U256::MAX,
    ];

    let mut group = c.benchmark_group("bit_math");
    group.bench_function("most_significant_bit", |b| {
        b.iter(|| {
            for &value in &values {
                black_box(most_significant_bit(black_box(value)).unwrap());
            }
        })
    });
    group.bench_function("least_significant_bit", |b| {
        b.iter(|| {
            for &value in &values {
                black_box(least_significant_bit(black_box(value)).unwrap());
            }
        })
    });
    group.finish();
}

/// Pool at tick 0 with `ranges` adjacent positions of `LIQUIDITY` on each side.
pub fn pool_with_ranges(ranges: i32) -> Pool {
    let mut pool = Pool::new(
        Address::repeat_byte(0x01),
        Address::repeat_byte(0x02),
        FeeTier::Medium,
    )
    .unwrap();
    pool.initialize(get_sqrt_ratio_at_tick(0).unwrap()).unwrap();

    let mut ledger = PositionLedger::new();
    let lp = Address::repeat_byte(0xaa);
    for i in 0..ranges {
        let width = 600;
        ledger
            .mint(&mut pool, lp, -(i + 1) * width, -i * width, LIQUIDITY)
            .unwrap();
        ledger
            .mint(&mut pool, lp, i * width, (i + 1) * width, LIQUIDITY)
            .unwrap();
    }
    pool
}

pub fn bench_pool_swap(c: &mut Criterion) {
    let pool = pool_with_ranges(20);
    let small = SwapParams::unbounded(true, I256::try_from(1_000_000_000i64).unwrap());
    let crossing = SwapParams::unbounded(
        false,
        I256::try_from(200_000_000_000_000_000i128).unwrap(),
    );

    let mut group = c.benchmark_group("pool");
    group.bench_function("quote_within_range", |b| {
        b.iter(|| pool.quote(black_box(small), 0))
    });
    group.bench_function("quote_crossing_ticks", |b| {
        b.iter(|| pool.quote(black_box(crossing), 0))
    });
    group.bench_function("swap_crossing_ticks", |b| {
        b.iter_batched(
            || pool.clone(),
            |mut pool| pool.swap(black_box(crossing), 0),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("max_input_amount", |b| {
        b.iter(|| pool.max_input_amount(black_box(true)))
    });
    group.finish();
}

pub fn bench_mint(c: &mut Criterion) {
    let pool = pool_with_ranges(4);
    let lp = Address::repeat_byte(0xbb);

    c.bench_function("pool/mint", |b| {
        b.iter_batched(
            || (pool.clone(), PositionLedger::new()),
            |(mut pool, mut ledger)| ledger.mint(&mut pool, lp, -1200, 1800, black_box(LIQUIDITY)),
            BatchSize::SmallInput,
        )
    });
}
