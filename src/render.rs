use std::sync::Arc;

use crate::error::SynthError;

/// Finalized fixed-point audio for one key, ready for looped playback.
#[derive(Debug, Clone)]
pub struct RenderedVoice {
    pub samples: Arc<Vec<i16>>,
    pub sample_rate: u32,
}

/// Scale by the output volume and quantize into the i16 playback format.
/// Out-of-range values saturate at the rails; wrapping would be audible as
/// harsh corruption.
pub fn quantize(samples: &[f32], volume: f32) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            let scaled = s * volume * i16::MAX as f32;
            scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
        })
        .collect()
}

impl RenderedVoice {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        RenderedVoice {
            samples: Arc::new(samples),
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Bounce to a 16-bit mono wav, mostly for checking a patch by ear
    pub fn write_wav(&self, path: &str) -> Result<(), SynthError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| SynthError::AudioError(e.to_string()))?;
        for &s in self.samples.iter() {
            writer
                .write_sample(s)
                .map_err(|e| SynthError::AudioError(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| SynthError::AudioError(e.to_string()))?;

        Ok(())
    }
}
