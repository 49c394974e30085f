// SPDX-License-Identifier: Apache-2.0

//! Fixed sample tables for the wave generator, and the cursor used to walk them (and the
//! motor behavior tables) as closed rings.

use crate::peripherals::Sample;

/// Number of samples in one period of every waveform.
///
/// 41 samples every 4.878 ms produce a 5 Hz output.
pub const RING_LEN: usize = 41;

/// Position inside a fixed-length table. Never reaches the table length: every step wraps
/// back to 0 after the last entry.
#[derive(Default, Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingIndex(usize);

impl RingIndex {
    /// Cursor at the first entry.
    pub const START: Self = Self(0);

    /// Get current position
    pub fn get(&self) -> usize {
        self.0
    }

    /// Add with defined wrapping. Result will be within range \[0, `limit` - 1\].
    ///
    /// `limit` of 0 (an empty table) always yields 0.
    pub fn wrapping_counter_add(&self, rhs: usize, limit: usize) -> usize {
        if limit == 0 {
            0
        } else {
            (self.0 % limit + rhs % limit) % limit
        }
    }

    /// Step to the next entry of a table holding `limit` entries.
    pub fn advance(&mut self, limit: usize) {
        self.0 = self.wrapping_counter_add(1, limit);
    }

    /// Return to the first entry.
    pub fn reset(&mut self) {
        *self = Self::START;
    }
}

/// One period of a waveform, as 12-bit DAC magnitudes.
pub struct SampleRing {
    /// Raw samples, in output order
    samples: [u16; RING_LEN],
}

impl SampleRing {
    /// Wrap a sample table.
    pub const fn new(samples: [u16; RING_LEN]) -> Self {
        Self { samples }
    }

    /// Sample at `index`. The index is wrapped, so any [`RingIndex`] is valid.
    pub fn sample(&self, index: RingIndex) -> Sample {
        Sample::new(self.samples[index.get() % RING_LEN])
    }

    /// Number of samples in the ring
    pub const fn len(&self) -> usize {
        RING_LEN
    }

    /// Always `false`; rings are never empty.
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Square wave: high for the first half period, low for the second.
pub static SQUARE: SampleRing = SampleRing::new([
    4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095, 4095,
    4095, 4095, 4095, 4095, 4095, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    4095,
]);

/// Sine wave centred on mid-scale, peak at index 10 and trough at index 30.
pub static SINE: SampleRing = SampleRing::new([
    2048, 2368, 2680, 2977, 3251, 3495, 3704, 3872, 3995, 4070, 4095, 4070, 3995, 3872, 3704,
    3495, 3251, 2977, 2680, 2368, 2048, 1727, 1415, 1118, 844, 600, 391, 223, 100, 25, 0, 25,
    100, 223, 391, 600, 844, 1118, 1415, 1727, 2047,
]);

/// Triangle wave: ramps from 0 to full scale at index 20 and back down.
pub static TRIANGLE: SampleRing = SampleRing::new([
    0, 205, 409, 614, 819, 1024, 1228, 1433, 1638, 1843, 2048, 2252, 2457, 2662, 2867, 3071,
    3276, 3481, 3685, 3890, 4095, 3890, 3685, 3481, 3276, 3071, 2866, 2662, 2457, 2252, 2047,
    1843, 1638, 1433, 1229, 1024, 819, 614, 409, 205, 0,
]);
