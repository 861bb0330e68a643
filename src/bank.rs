use std::collections::HashMap;

use crate::effects::{EffectSettings, EffectsChain};
use crate::error::SynthError;
use crate::render::{quantize, RenderedVoice};
use crate::tuning::{semitone_freq, KeyMap};
use crate::waveform::WaveformType;

/// The global knobs that decide what a rebuild produces. Taken as an
/// immutable snapshot per rebuild, so a bank can never mix two parameter
/// sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParameters {
    pub waveform: WaveformType,
    pub effects: EffectSettings,
}

impl Default for SynthParameters {
    fn default() -> Self {
        SynthParameters {
            waveform: WaveformType::Sine,
            effects: EffectSettings::default(),
        }
    }
}

/// Fixed synthesis constants. Overridable so tests can shrink them.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub reference_pitch: f64, // Hz
    pub sample_rate: u32,
    pub note_duration: f64, // seconds, long enough for a sustained note
    pub volume: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            reference_pitch: 440.0,
            sample_rate: 44100,
            note_duration: 3.0,
            volume: 0.1,
        }
    }
}

/// One rendered voice per playable key, all built from the same snapshot.
#[derive(Debug, Clone)]
pub struct SoundBank {
    voices: HashMap<char, RenderedVoice>,
}

impl SoundBank {
    /// Run the full pipeline for every key in the map. Any failure aborts
    /// the whole build, so a bank is never half-filled and never quietly
    /// substitutes a different waveform.
    pub fn build(
        keymap: &KeyMap,
        params: &SynthParameters,
        config: &SynthConfig,
    ) -> Result<Self, SynthError> {
        let chain = EffectsChain::with_settings(params.effects);

        let mut voices = HashMap::with_capacity(keymap.len());
        for (key, offset) in keymap.iter() {
            let freq = semitone_freq(config.reference_pitch, offset);
            let raw = params.waveform.render(freq, config.note_duration, config.sample_rate)?;
            let shaped = chain.apply(raw.samples, config.sample_rate)?;
            voices.insert(
                key,
                RenderedVoice::new(quantize(&shaped, config.volume), config.sample_rate),
            );
        }

        Ok(SoundBank { voices })
    }

    pub fn voice(&self, key: char) -> Option<&RenderedVoice> {
        self.voices.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.voices.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
