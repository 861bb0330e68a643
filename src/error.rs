use std::fmt;

impl std::error::Error for SynthError {}

#[derive(Debug, Clone)]
pub enum SynthError {
    InvalidWaveform(String),
    DegenerateDuration(String),
    BufferTooShort(String),
    AudioError(String),
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SynthError::InvalidWaveform(msg) => write!(f, "Invalid Waveform: {}", msg),
            SynthError::DegenerateDuration(msg) => write!(f, "Degenerate Duration: {}", msg),
            SynthError::BufferTooShort(msg) => write!(f, "Buffer Too Short: {}", msg),
            SynthError::AudioError(msg) => write!(f, "Audio Error: {}", msg),
        }
    }
}
