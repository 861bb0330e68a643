use crate::error::SynthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformType {
    Sine,
    Square,
    Triangle,
}

/// One cycle-aligned render plus the duration it actually covers. The sample
/// that would follow the buffer is in phase with sample 0, so repeating the
/// buffer back to back produces a continuous tone.
#[derive(Debug, Clone)]
pub struct LoopBuffer {
    pub samples: Vec<f32>,
    pub duration: f64,
}

impl WaveformType {
    pub fn from_name(name: &str) -> Result<Self, SynthError> {
        match name.to_lowercase().as_str() {
            "sine" => Ok(WaveformType::Sine),
            "square" => Ok(WaveformType::Square),
            "triangle" => Ok(WaveformType::Triangle),
            _ => Err(SynthError::InvalidWaveform(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WaveformType::Sine => "sine",
            WaveformType::Square => "square",
            WaveformType::Triangle => "triangle",
        }
    }

    pub fn generate_sample(&self, phase: f64) -> f32 { // Phase should be in the range [0.0, 1.0)
        match self {
            WaveformType::Sine => (phase * std::f64::consts::TAU).sin() as f32,
            WaveformType::Square => if phase < 0.5 { 1.0 } else { -1.0 },
            WaveformType::Triangle => {
                (if phase < 0.5 { phase * 4.0 - 1.0 } else { 3.0 - phase * 4.0 }) as f32
            }
        }
    }

    // Square reads much louder than the other shapes at equal peak
    fn loudness(&self) -> f32 {
        match self {
            WaveformType::Square => 0.4,
            _ => 1.0,
        }
    }

    /// Render a whole number of cycles at `frequency`, trimming the partial
    /// period off the tail of `target_duration`. The trimmed duration is
    /// reported back in the returned buffer.
    pub fn render(
        &self,
        frequency: f64,
        target_duration: f64,
        sample_rate: u32,
    ) -> Result<LoopBuffer, SynthError> {
        let periods = (frequency * target_duration).floor();
        if periods < 1.0 {
            return Err(SynthError::DegenerateDuration(format!(
                "{}s at {} Hz holds no whole period",
                target_duration, frequency
            )));
        }

        let duration = periods / frequency;
        let n = (sample_rate as f64 * duration).round() as usize;
        let gain = self.loudness();

        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            let t = duration * i as f64 / n as f64;
            let phase = (frequency * t).fract();
            samples.push(self.generate_sample(phase) * gain);
        }

        Ok(LoopBuffer { samples, duration })
    }
}
