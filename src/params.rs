//! # Plugin Parameters
//!
//! This is the parameter store the audio thread reads from. nih-plug keeps
//! every parameter value in an atomic, so the UI or the host's automation
//! can change a value at any time while `process()` reads it without
//! locking. The latest write wins.
//!
//! The **string IDs** (`#[id = "..."]`) are what the host uses to save and
//! recall state. nih-plug serializes every `#[id]` parameter into the
//! plugin's state blob, so there's nothing to persist by hand. Never change
//! these IDs once published or existing sessions will lose their settings.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::interval::{NOTE_NAMES, NOTE_VALUES};
use crate::dsp::processor::DelayParameters;

pub const INTERVALS_ID: &str = "Intervals";
pub const GAIN_ID: &str = "gain";

/// The 1/4 note.
const INTERVAL_DEFAULT: i32 = 3;
const GAIN_DEFAULT: f32 = 0.5;

/// Range and default of one parameter, in plain (unnormalized) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterLayout {
    pub id: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

#[derive(Params)]
pub struct PluginParams {
    /// **Intervals**: which note value the delay time follows.
    ///
    /// A choice of seven, stored as an index into the note table:
    /// 1/32, 1/16, 1/8, 1/4, 1/2, 1 and 2 bars. Default: 1/4.
    #[id = "Intervals"]
    pub interval: IntParam,

    /// **Gain**: how loud the delayed copy is mixed in on top of the dry
    /// signal. 0% = no echo, 100% = echo as loud as the original.
    #[id = "gain"]
    pub gain: FloatParam,
}

impl Default for PluginParams {
    fn default() -> Self {
        let max_interval = NOTE_VALUES.len() as i32 - 1;

        Self {
            interval: IntParam::new(
                "Intervals",
                INTERVAL_DEFAULT,
                IntRange::Linear {
                    min: 0,
                    max: max_interval,
                },
            )
            .with_unit(" bar")
            .with_value_to_string(Arc::new(|index: i32| {
                NOTE_NAMES
                    .get(index as usize)
                    .copied()
                    .unwrap_or("?")
                    .to_string()
            }))
            .with_string_to_value(Arc::new(|string: &str| {
                let name = string.trim().trim_end_matches("bar").trim();
                NOTE_NAMES
                    .iter()
                    .position(|&n| n == name)
                    .map(|index| index as i32)
            })),

            gain: FloatParam::new(
                "Gain",
                GAIN_DEFAULT,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}

impl PluginParams {
    /// Read everything the processor needs for one block.
    ///
    /// Tempo isn't a parameter; it comes from the host transport. The gain
    /// is passed through as stored; the processor sanitizes it.
    pub fn snapshot(&self, tempo_bpm: f64) -> DelayParameters {
        DelayParameters {
            interval_index: self.interval.value(),
            tempo_bpm,
            gain: self.gain.value(),
        }
    }

    /// Current plain value of the parameter with the given ID.
    pub fn value(&self, id: &str) -> Option<f32> {
        match id {
            INTERVALS_ID => Some(self.interval.value() as f32),
            GAIN_ID => Some(self.gain.value()),
            _ => None,
        }
    }

    /// Ranges and defaults of every parameter, in declaration order.
    pub fn default_layout() -> Vec<ParameterLayout> {
        vec![
            ParameterLayout {
                id: INTERVALS_ID,
                min: 0.0,
                max: (NOTE_VALUES.len() - 1) as f32,
                default: INTERVAL_DEFAULT as f32,
            },
            ParameterLayout {
                id: GAIN_ID,
                min: 0.0,
                max: 1.0,
                default: GAIN_DEFAULT,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PluginParams::default();
        assert_eq!(params.value(INTERVALS_ID), Some(3.0));
        assert_eq!(params.value(GAIN_ID), Some(0.5));
    }

    #[test]
    fn test_unknown_id() {
        let params = PluginParams::default();
        assert_eq!(params.value("feedback"), None);
        assert_eq!(params.value(""), None);
    }

    /// The layout agrees with what a freshly created store reports.
    #[test]
    fn test_default_layout_matches_store() {
        let params = PluginParams::default();
        let layout = PluginParams::default_layout();

        let ids: Vec<_> = layout.iter().map(|l| l.id).collect();
        assert_eq!(ids, [INTERVALS_ID, GAIN_ID]);

        for entry in &layout {
            assert_eq!(params.value(entry.id), Some(entry.default));
            assert!(entry.min <= entry.default && entry.default <= entry.max);
        }
        assert_eq!(layout[0].max, 6.0);
    }

    #[test]
    fn test_snapshot() {
        let params = PluginParams::default();
        let snapshot = params.snapshot(98.5);

        assert_eq!(
            snapshot,
            DelayParameters {
                interval_index: 3,
                tempo_bpm: 98.5,
                gain: 0.5,
            }
        );
    }

    #[test]
    fn test_interval_display() {
        let params = PluginParams::default();
        assert_eq!(params.interval.to_string(), "1/4 bar");
    }
}
