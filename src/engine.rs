use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};

use crate::bank::{SoundBank, SynthConfig, SynthParameters};
use crate::effects::{Effect, EffectSettings};
use crate::error::SynthError;
use crate::render::RenderedVoice;
use crate::tuning::{semitone_freq, KeyMap};
use crate::waveform::WaveformType;

/// Opaque handle for one looping voice started on the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

struct ActiveVoice {
    samples: Arc<Vec<i16>>,
    position: usize,
}

/// Discrete inputs from the key/UI layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    NoteOn(char),
    NoteOff(char),
    SetWaveform(WaveformType),
    SetEffect(Effect, bool),
}

/// Thin playback wrapper around the output device: loops finished buffers
/// and owns the voice handles. Knows nothing about keys or synthesis.
pub struct Mixer {
    stream_config: StreamConfig,
    sample_rate: u32,
    voices: Arc<Mutex<HashMap<VoiceId, ActiveVoice>>>,
    next_id: u64,
    stream: Option<Stream>,
}

impl Mixer {
    pub fn new() -> Result<Self, SynthError> {
        let host = cpal::default_host();
        let device = host.default_output_device()
            .ok_or_else(|| SynthError::AudioError("No output device found".to_string()));
        let config = device?.default_output_config()
            .map_err(|e| SynthError::AudioError(e.to_string()))?;
        let stream_config = config.config();

        Ok(Mixer {
            sample_rate: stream_config.sample_rate.0,
            stream_config,
            voices: Arc::new(Mutex::new(HashMap::new())),
            next_id: 0,
            stream: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start looping a rendered voice until it is stopped. The buffer is
    /// cycle aligned, so the wrap from the last sample back to the first
    /// lands in phase.
    pub fn start_loop(&mut self, voice: &RenderedVoice) -> Result<VoiceId, SynthError> {
        if self.stream.is_none() {
            self.start_stream()?;
        }

        self.next_id += 1;
        let id = VoiceId(self.next_id);
        self.voices.lock().unwrap().insert(
            id,
            ActiveVoice {
                samples: Arc::clone(&voice.samples),
                position: 0,
            },
        );
        Ok(id)
    }

    pub fn stop(&mut self, id: VoiceId) {
        self.voices.lock().unwrap().remove(&id);
    }

    pub fn stop_all(&mut self) {
        self.voices.lock().unwrap().clear();
    }

    pub fn active_voices(&self) -> usize {
        self.voices.lock().unwrap().len()
    }

    fn start_stream(&mut self) -> Result<(), SynthError> {
        let host = cpal::default_host();
        let device = host.default_output_device()
            .ok_or_else(|| SynthError::AudioError("No output device".to_string()))?;

        let config = self.stream_config.clone();
        let channels = config.channels as usize;
        let voices = Arc::clone(&self.voices);

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut voices_lock = voices.lock().unwrap();

                for frame in data.chunks_mut(channels) {
                    let mut mixed = 0.0f32;
                    for voice in voices_lock.values_mut() {
                        if voice.samples.is_empty() {
                            continue;
                        }
                        mixed += voice.samples[voice.position] as f32 / 32768.0;
                        voice.position = (voice.position + 1) % voice.samples.len();
                    }
                    for sample in frame.iter_mut() {
                        *sample = mixed;
                    }
                }
            },
            |err| eprintln!("Stream error: {}", err),
            None,
        ).map_err(|e| SynthError::AudioError(e.to_string()))?;

        stream.play().map_err(|e| SynthError::AudioError(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }
}

/// Event-driven front end: holds the current parameter state, the bank
/// built from it, and which keys are sounding right now.
pub struct SynthEngine {
    config: SynthConfig,
    keymap: KeyMap,
    params: SynthParameters,
    bank: Arc<SoundBank>,
    mixer: Mixer,
    playing: HashMap<char, VoiceId>,
}

impl SynthEngine {
    /// Build against the default output device, adopting its sample rate
    /// over the configured one.
    pub fn new(mut config: SynthConfig) -> Result<Self, SynthError> {
        let mixer = Mixer::new()?;
        config.sample_rate = mixer.sample_rate();
        println!("Output sample rate: {} Hz", config.sample_rate);

        let keymap = KeyMap::chromatic();
        let params = SynthParameters::default();
        let bank = Arc::new(SoundBank::build(&keymap, &params, &config)?);

        Ok(SynthEngine {
            config,
            keymap,
            params,
            bank,
            mixer,
            playing: HashMap::new(),
        })
    }

    pub fn waveform(&self) -> WaveformType {
        self.params.waveform
    }

    pub fn effects(&self) -> EffectSettings {
        self.params.effects
    }

    /// The bank currently in service. Held behind an Arc so a caller can
    /// keep reading a consistent mapping across a rebuild.
    pub fn bank(&self) -> Arc<SoundBank> {
        Arc::clone(&self.bank)
    }

    pub fn frequency_of(&self, key: char) -> Option<f64> {
        self.keymap
            .offset_of(key)
            .map(|offset| semitone_freq(self.config.reference_pitch, offset))
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Result<(), SynthError> {
        match event {
            InputEvent::NoteOn(key) => {
                // Unmapped keys and key repeat while held are both ignored
                if self.playing.contains_key(&key) {
                    return Ok(());
                }
                if let Some(voice) = self.bank.voice(key) {
                    let id = self.mixer.start_loop(voice)?;
                    self.playing.insert(key, id);
                }
                Ok(())
            }
            InputEvent::NoteOff(key) => {
                if let Some(id) = self.playing.remove(&key) {
                    self.mixer.stop(id);
                }
                Ok(())
            }
            InputEvent::SetWaveform(kind) => {
                self.params.waveform = kind;
                self.rebuild()
            }
            InputEvent::SetEffect(effect, enabled) => {
                self.params.effects.set(effect, enabled);
                self.rebuild()
            }
        }
    }

    /// Rebuild the bank from a snapshot of the current parameters and swap
    /// it in whole. Voices already sounding keep their old buffers; on
    /// failure the previous bank stays in service.
    pub fn rebuild(&mut self) -> Result<(), SynthError> {
        let snapshot = self.params;
        let bank = SoundBank::build(&self.keymap, &snapshot, &self.config)?;
        self.bank = Arc::new(bank);
        Ok(())
    }
}
