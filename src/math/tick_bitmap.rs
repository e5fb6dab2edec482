use crate::U256_1;
use crate::error::MathError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use alloy_primitives::U256;
use std::collections::BTreeMap;
use std::ops::{Bound, Shr};

/// Word index and bit position of a compressed tick (`tick / tick_spacing`).
pub fn position(compressed: i32) -> (i16, u8) {
    (compressed.shr(8) as i16, (compressed % 256) as u8)
}

/// Floor division of `tick` by `tick_spacing`, rounding toward negative
/// infinity so that negative ticks land in the right word.
#[inline]
pub fn compress(tick: i32, tick_spacing: i32) -> i32 {
    let mut compressed = tick / tick_spacing;
    if tick < 0 && tick % tick_spacing != 0 {
        compressed -= 1;
    }
    compressed
}

/// Sparse bitmap of initialized ticks, one bit per multiple of the tick
/// spacing, packed into 256-bit words keyed by word index.
///
/// Words that become empty are dropped, so every stored word has at least
/// one bit set. The map is ordered, which lets a swap ask whether any
/// initialized tick exists in a direction without walking word by word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickBitmap {
    words: BTreeMap<i16, U256>,
}

impl TickBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Word at `word_pos`, zero if nothing is initialized there.
    pub fn word(&self, word_pos: i16) -> U256 {
        self.words.get(&word_pos).copied().unwrap_or(U256::ZERO)
    }

    /// Number of non-empty words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `tick` is currently marked initialized.
    pub fn is_initialized(&self, tick: i32, tick_spacing: i32) -> bool {
        if tick % tick_spacing != 0 {
            return false;
        }
        let (word_pos, bit_pos) = position(tick / tick_spacing);
        !(self.word(word_pos) & (U256_1 << bit_pos)).is_zero()
    }

    /// Toggles the initialized bit of `tick`.
    ///
    /// `tick` must be a multiple of `tick_spacing`, otherwise
    /// [`MathError::OutOfBounds`] is returned and nothing changes.
    pub fn flip(&mut self, tick: i32, tick_spacing: i32) -> Result<(), MathError> {
        if tick % tick_spacing != 0 {
            return Err(MathError::OutOfBounds);
        }

        let (word_pos, bit_pos) = position(tick / tick_spacing);
        let flipped = self.word(word_pos) ^ (U256_1 << bit_pos);
        if flipped.is_zero() {
            self.words.remove(&word_pos);
        } else {
            self.words.insert(word_pos, flipped);
        }
        Ok(())
    }

    /// Next initialized tick in the same word as `tick`.
    ///
    /// With `lte` the search covers `tick` itself and everything to its
    /// left; otherwise it starts strictly to the right. When nothing is
    /// initialized the word boundary is returned together with `false`, so
    /// callers can step word by word.
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> Result<(i32, bool), MathError> {
        let compressed = compress(tick, tick_spacing);

        if lte {
            let (word_pos, bit_pos) = position(compressed);
            // all bits at or below bit_pos
            let mask: U256 = (U256_1 << bit_pos) - U256_1 + (U256_1 << bit_pos);
            let masked = self.word(word_pos) & mask;

            let initialized = !masked.is_zero();
            let next = if initialized {
                (compressed - (bit_pos - most_significant_bit(masked)?) as i32) * tick_spacing
            } else {
                (compressed - bit_pos as i32) * tick_spacing
            };
            Ok((next, initialized))
        } else {
            let (word_pos, bit_pos) = position(compressed + 1);
            // all bits at or above bit_pos
            let mask: U256 = !((U256_1 << bit_pos) - U256_1);
            let masked = self.word(word_pos) & mask;

            let initialized = !masked.is_zero();
            let next = if initialized {
                (compressed + 1 + (least_significant_bit(masked)? - bit_pos) as i32) * tick_spacing
            } else {
                (compressed + 1 + (255u8 - bit_pos) as i32) * tick_spacing
            };
            Ok((next, initialized))
        }
    }

    /// Whether any initialized tick exists in the search direction from
    /// `tick`, using the same inclusivity as
    /// [`next_initialized_tick_within_one_word`](Self::next_initialized_tick_within_one_word).
    pub fn has_initialized_beyond(&self, tick: i32, tick_spacing: i32, lte: bool) -> bool {
        let compressed = compress(tick, tick_spacing);

        if lte {
            let (word_pos, bit_pos) = position(compressed);
            let mask: U256 = (U256_1 << bit_pos) - U256_1 + (U256_1 << bit_pos);
            !(self.word(word_pos) & mask).is_zero()
                || self
                    .words
                    .range((Bound::Unbounded, Bound::Excluded(word_pos)))
                    .next()
                    .is_some()
        } else {
            let (word_pos, bit_pos) = position(compressed + 1);
            let mask: U256 = !((U256_1 << bit_pos) - U256_1);
            !(self.word(word_pos) & mask).is_zero()
                || self
                    .words
                    .range((Bound::Excluded(word_pos), Bound::Unbounded))
                    .next()
                    .is_some()
        }
    }

    /// Every initialized tick in ascending order.
    pub fn initialized_ticks(&self, tick_spacing: i32) -> Vec<i32> {
        let mut ticks = Vec::new();
        for (&word_pos, &word) in &self.words {
            let mut remaining = word;
            while let Ok(bit) = least_significant_bit(remaining) {
                let compressed = ((word_pos as i32) << 8) + bit as i32;
                ticks.push(compressed * tick_spacing);
                remaining ^= U256_1 << bit;
            }
        }
        ticks
    }
}
