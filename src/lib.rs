//! # Tempo Delay: A Tempo-Synced AU/VST3/CLAP Delay Plugin
//!
//! A block-based delay built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//! The delay time is a musical interval (1/32 up to 2 bars) at the host's
//! tempo, and a copy of the input delayed by that much is mixed back on
//! top of the dry signal.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬───────────────────────────────────────────────►(+)──► Output
//!         │                                                 ▲
//!         │    ┌───────────────────────────┐                │
//!         └───►│ Ring Buffer / Delay Line  │──► × gain ─────┘
//!              │ (2 s, one per channel,    │
//!              │  read N samples behind)   │
//!              └───────────────────────────┘
//!                           ▲
//!        N = round(60 / (tempo * note value) * sample_rate)
//! ```
//!
//! All the DSP lives in [`dsp`]; this file is the host glue.

pub mod dsp;
pub mod error;
pub mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::interval::DEFAULT_TEMPO_BPM;
use dsp::processor::BlockProcessor;
use nih_plug::prelude::*;
use params::PluginParams;

struct TempoDelay {
    /// Shared with the host and UI. Every value is stored atomically, so
    /// `process()` can read it while another thread writes.
    params: Arc<PluginParams>,

    /// Owned exclusively by the audio thread once `initialize()` returns.
    processor: BlockProcessor,

    num_input_channels: usize,
}

impl Default for TempoDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            // Unprepared until initialize() tells us the sample rate and
            // channel count.
            processor: BlockProcessor::default(),
            num_input_channels: 0,
        }
    }
}

impl Plugin for TempoDelay {
    const NAME: &'static str = "Tempo Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        // Stereo layout
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        // Mono fallback
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per block, so there's nothing to gain from
    // having the host split blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is loaded and whenever the sample rate,
    /// block size, or channel layout changes. The only place that
    /// allocates.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.num_input_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(0);

        match self.processor.configure(
            buffer_config.sample_rate as f64,
            buffer_config.max_buffer_size as usize,
            self.num_input_channels,
        ) {
            Ok(()) => true,
            Err(err) => {
                nih_error!("Can't initialize delay line: {err}");
                false
            }
        }
    }

    /// Playback stopped or the plugin was bypassed: drop old echoes so
    /// they don't play when the transport starts again.
    fn reset(&mut self) {
        self.processor.reset();
    }

    fn deactivate(&mut self) {
        self.processor.teardown();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        nih_debug_assert!(
            self.processor.is_ready(),
            "process() called before initialize()"
        );

        let tempo_bpm = context
            .transport()
            .tempo
            .filter(|tempo| tempo.is_finite() && *tempo > 0.0)
            .unwrap_or(DEFAULT_TEMPO_BPM);
        let params = self.params.snapshot(tempo_bpm);

        match self
            .processor
            .process_block(buffer.as_slice(), self.num_input_channels, params)
        {
            // Nothing feeds back into the delay line, so the tail is a
            // single echo: one delay period after the input goes quiet.
            Some(delay_offset) => ProcessStatus::Tail(delay_offset as u32),
            None => ProcessStatus::Normal,
        }
    }
}

impl ClapPlugin for TempoDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.tempo-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A delay locked to musical note values at the host tempo");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for TempoDelay {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssTempoDelay1";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(TempoDelay);
nih_export_vst3!(TempoDelay);

// AUv2 entry point for Logic Pro, generated from the CLAP export.
clap_wrapper::export_auv2!();
