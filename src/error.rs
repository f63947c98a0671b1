//! Errors the host can trigger by handing us an unusable audio setup.
//!
//! Everything that can go wrong *during* processing (an out-of-range
//! interval index, a delay longer than the buffer) is normalized in place
//! instead: the audio thread has no way to report an error mid-block.

use thiserror::Error;

/// Rejected playback configuration. Returned by
/// [`BlockProcessor::configure`](crate::dsp::processor::BlockProcessor::configure)
/// before any buffer is allocated.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
    #[error("channel count must be at least 1")]
    NoChannels,
}
