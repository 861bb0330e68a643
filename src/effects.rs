use crate::error::SynthError;
use crate::utils::{edge_fade, lerp_at};

use std::f64::consts::TAU;

// Fade applied at the phaser's buffer edges to keep the loop wrap clean
const EDGE_FADE_SECONDS: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct PhaserParams {
    pub depth: f64, // max delay sweep in seconds
    pub rate: f64,  // LFO rate in Hz
}

impl Default for PhaserParams {
    fn default() -> Self {
        PhaserParams {
            depth: 0.001,
            rate: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EchoParams {
    pub delay: f64, // seconds until the repeat
    pub decay: f32, // gain of the repeat, 0 < decay < 1
}

impl Default for EchoParams {
    fn default() -> Self {
        EchoParams {
            delay: 0.15,
            decay: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChorusParams {
    pub depth: f64, // modulation depth in seconds
    pub rate: f64,  // base LFO rate in Hz
    pub voices: usize,
}

impl Default for ChorusParams {
    fn default() -> Self {
        ChorusParams {
            depth: 0.002,
            rate: 1.5,
            voices: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Phaser,
    Echo,
    Chorus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectSettings {
    pub phaser: bool,
    pub echo: bool,
    pub chorus: bool,
}

impl EffectSettings {
    pub fn set(&mut self, effect: Effect, enabled: bool) {
        match effect {
            Effect::Phaser => self.phaser = enabled,
            Effect::Echo => self.echo = enabled,
            Effect::Chorus => self.chorus = enabled,
        }
    }

    pub fn is_enabled(&self, effect: Effect) -> bool {
        match effect {
            Effect::Phaser => self.phaser,
            Effect::Echo => self.echo,
            Effect::Chorus => self.chorus,
        }
    }

    pub fn has_any(&self) -> bool {
        self.phaser || self.echo || self.chorus
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectsChain {
    pub settings: EffectSettings,
    pub phaser: PhaserParams,
    pub echo: EchoParams,
    pub chorus: ChorusParams,
}

impl EffectsChain {
    pub fn with_settings(settings: EffectSettings) -> Self {
        EffectsChain {
            settings,
            ..EffectsChain::default()
        }
    }

    /// Run the enabled stages over the buffer in fixed order. Disabled
    /// stages pass the buffer through untouched.
    pub fn apply(&self, input: Vec<f32>, sample_rate: u32) -> Result<Vec<f32>, SynthError> {
        let phaser = |buf: &[f32]| apply_phaser(buf, sample_rate, &self.phaser);
        let echo = |buf: &[f32]| apply_echo(buf, sample_rate, &self.echo);
        let chorus = |buf: &[f32]| apply_chorus(buf, sample_rate, &self.chorus);

        // The order is part of the sound: echo and chorus act on the
        // phaser's output, not the raw oscillator
        let stages: [(bool, &dyn Fn(&[f32]) -> Result<Vec<f32>, SynthError>); 3] = [
            (self.settings.phaser, &phaser),
            (self.settings.echo, &echo),
            (self.settings.chorus, &chorus),
        ];

        stages.into_iter().try_fold(input, |buf, (enabled, stage)| {
            if enabled { stage(&buf) } else { Ok(buf) }
        })
    }
}

/// Sweeping comb filter: a short delay whose length wobbles with an LFO,
/// mixed back under the dry signal at a fixed 70/30 ratio.
pub fn apply_phaser(
    input: &[f32],
    sample_rate: u32,
    params: &PhaserParams,
) -> Result<Vec<f32>, SynthError> {
    let n = input.len();
    let fade = (EDGE_FADE_SECONDS * sample_rate as f64).round() as usize;
    if n < fade * 2 {
        return Err(SynthError::BufferTooShort(format!(
            "phaser edge fades need {} samples, buffer has {}",
            fade * 2,
            n
        )));
    }

    let sr = sample_rate as f64;
    let max_delay = params.depth * sr;

    let mut output = Vec::with_capacity(n);
    for i in 0..n {
        let lfo = (1.0 + (TAU * params.rate * i as f64 / sr).sin()) / 2.0;
        let delayed = lerp_at(input, i as f64 - lfo * max_delay);
        output.push(0.7 * input[i] + 0.3 * delayed);
    }

    // The clamped read-back smears the buffer edges, which the loop wrap
    // would turn into a click
    edge_fade(&mut output, fade);
    Ok(output)
}

/// Single decayed repeat. The tail that falls past the original length is
/// cut off rather than wrapped into the loop, so nothing is audible before
/// `delay` seconds into each pass.
pub fn apply_echo(
    input: &[f32],
    sample_rate: u32,
    params: &EchoParams,
) -> Result<Vec<f32>, SynthError> {
    let n = input.len();
    let delay_samples = (params.delay * sample_rate as f64).round() as usize;
    if delay_samples == 0 {
        return Err(SynthError::BufferTooShort(format!(
            "echo delay of {}s rounds to zero samples",
            params.delay
        )));
    }
    if delay_samples >= n {
        return Err(SynthError::BufferTooShort(format!(
            "echo delay of {} samples does not fit a {} sample buffer",
            delay_samples, n
        )));
    }

    let mut extended = input.to_vec();
    extended.resize(n + delay_samples, 0.0);
    for (i, &s) in input.iter().enumerate() {
        extended[i + delay_samples] += s * params.decay;
    }
    extended.truncate(n);
    Ok(extended)
}

/// Several detuned copies stacked under a half-volume dry signal. Each voice
/// modulates at its own LFO multiple so none of them lock together, which is
/// where the thickening comes from.
pub fn apply_chorus(
    input: &[f32],
    sample_rate: u32,
    params: &ChorusParams,
) -> Result<Vec<f32>, SynthError> {
    let sr = sample_rate as f64;

    // Half-volume dry leaves headroom for the added voices
    let mut output: Vec<f32> = input.iter().map(|&s| s * 0.5).collect();
    if params.voices == 0 {
        return Ok(output);
    }

    let voice_gain = 0.5 / params.voices as f32;
    for v in 0..params.voices {
        let rate = params.rate * (v + 1) as f64;
        for (i, out) in output.iter_mut().enumerate() {
            let lfo = params.depth * (TAU * rate * i as f64 / sr).sin();
            let pos = i as f64 - (lfo * sr).floor();
            *out += lerp_at(input, pos) * voice_gain;
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    fn sine_buffer(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (TAU * 440.0 * i as f64 / SR as f64).sin() as f32)
            .collect()
    }

    fn noise_buffer(n: usize) -> Vec<f32> {
        let mut rng = fastrand::Rng::with_seed(1712);
        (0..n).map(|_| rng.f32() * 2.0 - 1.0).collect()
    }

    #[test]
    fn disabled_chain_is_identity() {
        let input = noise_buffer(4096);
        let chain = EffectsChain::default();
        let output = chain.apply(input.clone(), SR).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn chain_runs_stages_in_fixed_order() {
        let input = sine_buffer(SR as usize);

        let mut chain = EffectsChain::default();
        chain.settings.phaser = true;
        chain.settings.echo = true;

        let chained = chain.apply(input.clone(), SR).unwrap();
        let phased = apply_phaser(&input, SR, &chain.phaser).unwrap();
        let manual = apply_echo(&phased, SR, &chain.echo).unwrap();
        assert_eq!(chained, manual);
    }

    #[test]
    fn settings_toggle_each_effect_independently() {
        let mut settings = EffectSettings::default();
        assert!(!settings.has_any());

        settings.set(Effect::Echo, true);
        assert!(settings.is_enabled(Effect::Echo));
        assert!(!settings.is_enabled(Effect::Phaser));
        assert!(settings.has_any());

        settings.set(Effect::Echo, false);
        assert!(!settings.has_any());
    }

    #[test]
    fn phaser_preserves_length_and_fades_edges() {
        let input = sine_buffer(SR as usize);
        let output = apply_phaser(&input, SR, &PhaserParams::default()).unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output[0], 0.0);
        // last sample sits one step into the fade-out ramp
        let fade = (0.01 * SR as f64).round() as f32;
        assert!(output[output.len() - 1].abs() <= 1.0 / fade);
    }

    #[test]
    fn phaser_stays_within_mix_bounds() {
        let input = noise_buffer(SR as usize);
        let peak_in = input.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        let output = apply_phaser(&input, SR, &PhaserParams::default()).unwrap();
        let peak_out = output.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        // 0.7 dry + 0.3 delayed can never exceed the input peak
        assert!(peak_out <= peak_in + 1e-6);
    }

    #[test]
    fn phaser_rejects_buffer_shorter_than_fades() {
        let input = sine_buffer(500); // fades alone need 882
        let err = apply_phaser(&input, SR, &PhaserParams::default()).unwrap_err();
        assert!(matches!(err, SynthError::BufferTooShort(_)));
    }

    #[test]
    fn echo_preserves_length() {
        let input = noise_buffer(SR as usize);
        let output = apply_echo(&input, SR, &EchoParams::default()).unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[test]
    fn echo_leaves_prefix_untouched() {
        let input = noise_buffer(SR as usize);
        let params = EchoParams::default();
        let delay_samples = (params.delay * SR as f64).round() as usize;
        let output = apply_echo(&input, SR, &params).unwrap();
        assert_eq!(&output[..delay_samples], &input[..delay_samples]);
    }

    #[test]
    fn echo_adds_decayed_copy_at_offset() {
        let input = sine_buffer(SR as usize);
        let params = EchoParams::default();
        let delay_samples = (params.delay * SR as f64).round() as usize;
        let output = apply_echo(&input, SR, &params).unwrap();
        for i in 0..(input.len() - delay_samples) {
            let expected = input[i + delay_samples] + input[i] * params.decay;
            assert!((output[i + delay_samples] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn echo_rejects_delay_past_buffer_end() {
        let input = sine_buffer(1000); // default delay is 6615 samples
        let err = apply_echo(&input, SR, &EchoParams::default()).unwrap_err();
        assert!(matches!(err, SynthError::BufferTooShort(_)));
    }

    #[test]
    fn echo_rejects_subsample_delay() {
        let input = sine_buffer(1000);
        let params = EchoParams {
            delay: 0.000001,
            ..EchoParams::default()
        };
        let err = apply_echo(&input, SR, &params).unwrap_err();
        assert!(matches!(err, SynthError::BufferTooShort(_)));
    }

    #[test]
    fn chorus_keeps_energy_bounded() {
        // worst case: half dry plus every voice constructive is still <= 1
        for voices in [1, 3, 8] {
            let input = noise_buffer(SR as usize / 2);
            let params = ChorusParams {
                voices,
                ..ChorusParams::default()
            };
            let output = apply_chorus(&input, SR, &params).unwrap();
            let peak = output.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
            assert!(peak <= 1.0 + 1e-6, "{} voices peaked at {}", voices, peak);
        }
    }

    #[test]
    fn chorus_preserves_length() {
        let input = sine_buffer(2048);
        let output = apply_chorus(&input, SR, &ChorusParams::default()).unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[test]
    fn chorus_with_zero_voices_is_half_volume_dry() {
        let input = sine_buffer(2048);
        let params = ChorusParams {
            voices: 0,
            ..ChorusParams::default()
        };
        let output = apply_chorus(&input, SR, &params).unwrap();
        for (o, i) in output.iter().zip(&input) {
            assert_eq!(*o, i * 0.5);
        }
    }

    #[test]
    fn chorus_actually_thickens() {
        // with modulation the output must differ from a plain rescale
        let input = sine_buffer(SR as usize / 4);
        let output = apply_chorus(&input, SR, &ChorusParams::default()).unwrap();
        let diverges = output
            .iter()
            .zip(&input)
            .any(|(o, i)| (o - i).abs() > 1e-3 && (o - i * 0.5).abs() > 1e-3);
        assert!(diverges);
    }
}
