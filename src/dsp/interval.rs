//! # Interval-to-Time Mapping
//!
//! The delay time is chosen musically: the user picks a note value from a
//! fixed table and the current tempo turns it into seconds:
//!
//! ```text
//! delay_seconds = 60 / (tempo_bpm * note_value)
//! ```
//!
//! At 120 BPM this gives:
//!
//! | index | note value | seconds |
//! |-------|------------|---------|
//! | 0     | 1/32       | 16.0    |
//! | 1     | 1/16       | 8.0     |
//! | 2     | 1/8        | 4.0     |
//! | 3     | 1/4        | 2.0     |
//! | 4     | 1/2        | 1.0     |
//! | 5     | 1          | 0.5     |
//! | 6     | 2          | 0.25    |
//!
//! Everything here is pure arithmetic on the stack, so it's safe to call
//! from `process()`.

/// Note values relative to a whole note, indexed by the "Intervals"
/// parameter.
pub const NOTE_VALUES: [f64; 7] = [
    1.0 / 32.0,
    1.0 / 16.0,
    1.0 / 8.0,
    1.0 / 4.0,
    1.0 / 2.0,
    1.0,
    2.0,
];

/// Display names matching [`NOTE_VALUES`].
pub const NOTE_NAMES: [&str; 7] = ["1/32", "1/16", "1/8", "1/4", "1/2", "1", "2"];

/// Index substituted for anything outside `0..=6` (the 1/8 note).
pub const FALLBACK_INTERVAL_INDEX: usize = 2;

/// Tempo used when the host doesn't report one.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Resolve a raw interval index to a valid table slot.
///
/// Automation data or an uninitialized parameter can hand us anything;
/// an invalid index quietly becomes [`FALLBACK_INTERVAL_INDEX`].
pub fn normalize_interval_index(interval_index: i32) -> usize {
    usize::try_from(interval_index)
        .ok()
        .filter(|&i| i < NOTE_VALUES.len())
        .unwrap_or(FALLBACK_INTERVAL_INDEX)
}

/// Delay time in seconds for the given interval at the given tempo.
///
/// A non-positive or non-finite tempo is replaced by
/// [`DEFAULT_TEMPO_BPM`], so the result is always finite and positive.
pub fn interval_to_delay_seconds(interval_index: i32, tempo_bpm: f64) -> f64 {
    let note_value = NOTE_VALUES[normalize_interval_index(interval_index)];
    let tempo = if tempo_bpm.is_finite() && tempo_bpm > 0.0 {
        tempo_bpm
    } else {
        DEFAULT_TEMPO_BPM
    };

    60.0 / (tempo * note_value)
}

/// Convert seconds to a whole number of samples, rounding to nearest.
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    (seconds * sample_rate).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_formula() {
        for tempo in [60.0, 90.0, 120.0, 133.5, 174.0] {
            for (index, note_value) in NOTE_VALUES.iter().enumerate() {
                let expected = 60.0 / (tempo * note_value);
                let result = interval_to_delay_seconds(index as i32, tempo);
                assert_eq!(
                    result, expected,
                    "index {index} at {tempo} BPM: expected {expected}, got {result}"
                );
            }
        }
    }

    #[test]
    fn test_known_values_at_120_bpm() {
        let expected = [16.0, 8.0, 4.0, 2.0, 1.0, 0.5, 0.25];
        for (index, seconds) in expected.into_iter().enumerate() {
            assert_eq!(interval_to_delay_seconds(index as i32, 120.0), seconds);
        }
    }

    /// The old fixed "one second" delay is the half note at 120 BPM.
    #[test]
    fn test_half_note_at_120_is_one_second() {
        let seconds = interval_to_delay_seconds(4, DEFAULT_TEMPO_BPM);
        assert_eq!(seconds_to_samples(seconds, 44100.0), 44100);
    }

    #[test]
    fn test_out_of_range_index_uses_fallback() {
        let fallback = interval_to_delay_seconds(FALLBACK_INTERVAL_INDEX as i32, 120.0);
        for index in [-1, -100, 7, 42, i32::MIN, i32::MAX] {
            assert_eq!(
                interval_to_delay_seconds(index, 120.0),
                fallback,
                "index {index} should fall back to the 1/8 note"
            );
        }
    }

    #[test]
    fn test_invalid_tempo_uses_default() {
        let expected = interval_to_delay_seconds(3, DEFAULT_TEMPO_BPM);
        for tempo in [0.0, -120.0, f64::NAN, f64::INFINITY] {
            assert_eq!(interval_to_delay_seconds(3, tempo), expected);
        }
    }

    #[test]
    fn test_seconds_to_samples_rounds() {
        assert_eq!(seconds_to_samples(0.5, 44100.0), 22050);
        assert_eq!(seconds_to_samples(0.25, 48000.0), 12000);
        // 14700.294 samples rounds down.
        assert_eq!(seconds_to_samples(0.333_34, 44100.0), 14700);
        assert_eq!(seconds_to_samples(0.0, 44100.0), 0);
    }
}
