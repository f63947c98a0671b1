//! # Block Processor
//!
//! Ties the interval mapper and the delay line together. Once per host
//! block it:
//!
//! 1. Silences output channels that have no matching input.
//! 2. Turns the parameter snapshot into a delay offset in samples.
//! 3. Writes each input channel into the delay line, then mixes the
//!    delayed copy back on top of the dry signal, in place.
//! 4. Advances the shared write cursor once.
//!
//! The processor is a two-state machine. It starts **Unprepared** and
//! only becomes **Ready** after [`configure()`](BlockProcessor::configure)
//! succeeds. [`teardown()`](BlockProcessor::teardown) drops the buffers
//! and goes back to Unprepared. Processing while Unprepared is a no-op.

use std::num::NonZeroUsize;

use nih_plug::{nih_log, nih_warn};

use super::delay_line::DelayLine;
use super::interval::{interval_to_delay_seconds, seconds_to_samples};
use crate::error::ConfigError;

/// Length of the delay line in seconds.
pub const DELAY_LINE_SECONDS: f64 = 2.0;

/// Everything the processor needs from the parameter store for one block.
///
/// Taken once per block so every sample in the block sees the same
/// values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParameters {
    /// Raw "Intervals" selection. Anything outside `0..=6` falls back to
    /// the 1/8 note.
    pub interval_index: i32,
    pub tempo_bpm: f64,
    /// Level of the delayed copy, `0.0..=1.0`.
    pub gain: f32,
}

enum ProcessorState {
    Unprepared,
    Ready {
        delay_line: DelayLine,
        sample_rate: f64,
        /// Longest offset that never reads samples the current block has
        /// already overwritten: `capacity - max_block_size`.
        max_delay_offset: usize,
    },
}

/// Runs host blocks through a [`DelayLine`], owning it once configured.
pub struct BlockProcessor {
    state: ProcessorState,
    capacity_seconds: f64,
    /// Gain used at the end of the previous block. The next block ramps
    /// from here so gain automation doesn't click.
    last_gain: Option<f32>,
}

impl Default for BlockProcessor {
    fn default() -> Self {
        Self::with_capacity_seconds(DELAY_LINE_SECONDS)
    }
}

impl BlockProcessor {
    /// An Unprepared processor whose delay line will hold
    /// `capacity_seconds` of audio once configured.
    pub fn with_capacity_seconds(capacity_seconds: f64) -> Self {
        Self {
            state: ProcessorState::Unprepared,
            capacity_seconds,
            last_gain: None,
        }
    }

    /// Allocate a zeroed delay line for the given playback setup and
    /// enter the Ready state.
    ///
    /// Allocates, so this must never run on the audio thread. Calling it
    /// again with new settings replaces the old delay line entirely.
    ///
    /// An invalid sample rate or a channel count of zero is rejected
    /// before anything is allocated, and leaves the current state alone.
    pub fn configure(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<(), ConfigError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        if num_channels == 0 {
            return Err(ConfigError::NoChannels);
        }

        let capacity = NonZeroUsize::new(seconds_to_samples(self.capacity_seconds, sample_rate))
            .unwrap_or(NonZeroUsize::MIN);

        if max_block_size >= capacity.get() {
            nih_warn!(
                "Block size {max_block_size} doesn't fit in a {}-sample delay line",
                capacity.get()
            );
        }

        self.state = ProcessorState::Ready {
            delay_line: DelayLine::new(num_channels, capacity),
            sample_rate,
            max_delay_offset: capacity.get().saturating_sub(max_block_size),
        };
        self.last_gain = None;

        nih_log!(
            "Delay line ready: {num_channels} channel(s) x {} samples at {sample_rate} Hz",
            capacity.get()
        );

        Ok(())
    }

    /// Drop the delay line and return to the Unprepared state.
    pub fn teardown(&mut self) {
        self.state = ProcessorState::Unprepared;
        self.last_gain = None;
    }

    /// Silence the delay line without reallocating it.
    pub fn reset(&mut self) {
        if let ProcessorState::Ready { delay_line, .. } = &mut self.state {
            delay_line.clear();
        }
        self.last_gain = None;
    }

    /// Whether `configure()` has succeeded since the last teardown.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ProcessorState::Ready { .. })
    }

    /// Delay line length in samples, if configured.
    pub fn capacity(&self) -> Option<usize> {
        match &self.state {
            ProcessorState::Ready { delay_line, .. } => Some(delay_line.capacity()),
            ProcessorState::Unprepared => None,
        }
    }

    /// The offset, in samples, that `params` maps to at the configured
    /// sample rate.
    ///
    /// Musical intervals longer than the delay line can hold are clamped
    /// to the longest delay it can serve.
    pub fn delay_offset_samples(&self, params: &DelayParameters) -> Option<usize> {
        match &self.state {
            ProcessorState::Ready {
                sample_rate,
                max_delay_offset,
                ..
            } => {
                let seconds = interval_to_delay_seconds(params.interval_index, params.tempo_bpm);
                Some(seconds_to_samples(seconds, *sample_rate).min(*max_delay_offset))
            }
            ProcessorState::Unprepared => None,
        }
    }

    /// Process one block in place.
    ///
    /// `channels` holds one equally long slice per output channel. The
    /// first `num_input_channels` of them carry input; the rest are
    /// silenced.
    ///
    /// Returns the delay offset that was applied, or `None` if the
    /// processor hasn't been configured (in which case `channels` is left
    /// untouched).
    pub fn process_block(
        &mut self,
        channels: &mut [&mut [f32]],
        num_input_channels: usize,
        params: DelayParameters,
    ) -> Option<usize> {
        let delay_offset = self.delay_offset_samples(&params)?;
        let ProcessorState::Ready { delay_line, .. } = &mut self.state else {
            return None;
        };

        for channel in channels.iter_mut().skip(num_input_channels) {
            channel.fill(0.0);
        }

        let end_gain = if params.gain.is_nan() {
            0.0
        } else {
            params.gain.clamp(0.0, 1.0)
        };
        let start_gain = self.last_gain.unwrap_or(end_gain);
        self.last_gain = Some(end_gain);

        let block_size = channels.first().map_or(0, |c| c.len());

        for (channel_idx, samples) in channels
            .iter_mut()
            .enumerate()
            .take(num_input_channels)
        {
            // Write first: with a short enough offset the read below picks
            // up part of this very block.
            delay_line.write(channel_idx, samples);
            delay_line.read_and_mix(channel_idx, samples, delay_offset, start_gain, end_gain);
        }

        delay_line.advance(block_size);

        Some(delay_offset)
    }
}
