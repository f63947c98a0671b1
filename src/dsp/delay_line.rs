//! # Delay Line (Multichannel Ring Buffer)
//!
//! A delay line stores the last couple of seconds of audio so it can be
//! played back later. Think of a circular tape loop with a write head
//! that records each incoming block and a read head trailing some
//! distance behind it. The distance between the two heads is the delay.
//!
//! Unlike a per-sample delay line, this one moves whole blocks at a time:
//!
//! 1. [`write()`](DelayLine::write) copies the host's block into the ring
//!    at the write cursor.
//! 2. [`read_and_mix()`](DelayLine::read_and_mix) copies a block from
//!    `delay_offset` samples behind the cursor back into the host's
//!    buffer, scaled by a gain, *on top of* the dry signal already there.
//! 3. [`advance()`](DelayLine::advance) moves the cursor forward by the
//!    block length, once all channels are done.
//!
//! ## One cursor for all channels
//!
//! Every channel shares the same write position. If each channel had its
//! own, a channel that was skipped for one block would drift out of time
//! with the others. That's also why `advance()` is separate from
//! `write()`: it must run exactly once per block, not once per channel.
//!
//! ## Wrapping
//!
//! A block usually fits between the cursor and the end of the buffer, in
//! which case it's a single contiguous copy. When it doesn't, it's split:
//!
//! ```text
//! capacity = 100, write_pos = 95, block = [0 1 2 3 4 5 6 7 8 9]
//!
//! index:  0 1 2 3 4  ...  95 96 97 98 99
//! value:  5 6 7 8 9  ...   0  1  2  3  4
//! ```
//!
//! The copy loops below handle any number of splits, so even a block
//! longer than the whole buffer is safe. Only its last `capacity` samples
//! survive, which is what a tape loop would do too.

use std::num::NonZeroUsize;

/// A fixed-capacity ring buffer per channel with one shared write cursor.
///
/// All storage is allocated in [`new()`](Self::new); nothing after that
/// allocates, locks, or does I/O, so every method except `new` is safe
/// to call from `process()`.
pub struct DelayLine {
    /// One buffer per channel, each exactly `capacity` samples long.
    channels: Vec<Vec<f32>>,

    /// Where the next block will be written. Always `< capacity`.
    write_pos: usize,

    capacity: usize,
}

impl DelayLine {
    /// Create a silent delay line with `num_channels` rings of `capacity`
    /// samples each.
    ///
    /// `NonZeroUsize` keeps the modulo arithmetic from dividing by zero.
    pub fn new(num_channels: usize, capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            channels: vec![vec![0.0; capacity]; num_channels],
            write_pos: 0,
            capacity,
        }
    }

    /// Length of each channel's ring, in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of channel rings.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Index the next block will be written at, shared by all channels.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Copy `source` into `channel`'s ring starting at the write cursor,
    /// wrapping past the end of the buffer as needed.
    ///
    /// Old data is overwritten unconditionally. The cursor is **not**
    /// moved; call [`advance()`](Self::advance) once every channel has
    /// been written and read for this block.
    ///
    /// Writing to a channel that doesn't exist is a no-op.
    pub fn write(&mut self, channel: usize, source: &[f32]) {
        let capacity = self.capacity;
        let Some(ring) = self.channels.get_mut(channel) else {
            return;
        };

        // Anything before the last `capacity` samples would be overwritten
        // by the same call anyway.
        let skip = source.len().saturating_sub(capacity);
        let mut remaining = &source[skip..];
        let mut pos = (self.write_pos + skip % capacity) % capacity;

        // Usually one iteration, two when the block straddles the end.
        while !remaining.is_empty() {
            let n = remaining.len().min(capacity - pos);
            ring[pos..pos + n].copy_from_slice(&remaining[..n]);
            remaining = &remaining[n..];
            pos = (pos + n) % capacity;
        }
    }

    /// Read `destination.len()` samples starting `delay_offset` samples
    /// behind the write cursor and **add** them to `destination`, scaled
    /// by a gain that ramps linearly from `start_gain` to `end_gain`.
    ///
    /// This accumulates rather than replaces: `destination` should already
    /// hold the dry signal.
    ///
    /// # Read position
    ///
    /// ```text
    /// read_pos = (write_pos - delay_offset) mod capacity
    /// ```
    ///
    /// computed as `(write_pos + capacity - delay_offset % capacity) %
    /// capacity` so it never goes negative. An offset of `capacity` or
    /// more wraps around instead of reading out of bounds.
    ///
    /// With `delay_offset == 0` (before `advance()`), this reads back the
    /// block that was just written.
    pub fn read_and_mix(
        &self,
        channel: usize,
        destination: &mut [f32],
        delay_offset: usize,
        start_gain: f32,
        end_gain: f32,
    ) {
        let Some(ring) = self.channels.get(channel) else {
            return;
        };

        let capacity = self.capacity;
        let count = destination.len();
        let mut read_pos = (self.write_pos + capacity - delay_offset % capacity) % capacity;

        // A constant gain gives a zero step, so every sample gets exactly
        // `start_gain`.
        let gain_step = if count > 0 {
            (end_gain - start_gain) / count as f32
        } else {
            0.0
        };

        let mut done = 0;
        while done < count {
            let n = (count - done).min(capacity - read_pos);
            let delayed = &ring[read_pos..read_pos + n];

            for (i, (out, &sample)) in destination[done..done + n]
                .iter_mut()
                .zip(delayed)
                .enumerate()
            {
                let gain = start_gain + gain_step * (done + i) as f32;
                *out += sample * gain;
            }

            done += n;
            read_pos = (read_pos + n) % capacity;
        }
    }

    /// Move the shared write cursor forward by `count` samples.
    pub fn advance(&mut self, count: usize) {
        self.write_pos = (self.write_pos + count % self.capacity) % self.capacity;
    }

    /// Silence every channel and rewind the cursor, keeping the allocation.
    pub fn clear(&mut self) {
        for ring in &mut self.channels {
            ring.fill(0.0);
        }
        self.write_pos = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
