//  _______           _______ _________ _______ _________ _
// (  ____ \|\     /|(  ____ \\__   __/(  ___  )\__   __/( (    /|
// | (    \/| )   ( || (    \/   ) (   | (   ) |   ) (   |  \  ( |
// | (_____ | |   | || (_____    | |   | (___) |   | |   |   \ | |
// (_____  )| |   | |(_____  )   | |   |  ___  |   | |   | (\ \) |
//       ) || |   | |      ) |   | |   | (   ) |   | |   | | \   |
// /\____) || (___) |/\____) |   | |   | )   ( |___) (___| )  \  |
// \_______)(_______)\_______)   )_(   |/     \|\_______/|/    )_)

pub mod error;
pub mod tuning;
pub mod waveform;
pub mod effects;
pub mod render;
pub mod bank;
pub mod engine;
pub mod utils;

pub use error::SynthError;
pub use tuning::{semitone_freq, KeyMap};
pub use waveform::{LoopBuffer, WaveformType};
pub use effects::{
    apply_chorus, apply_echo, apply_phaser, ChorusParams, EchoParams, Effect, EffectSettings,
    EffectsChain, PhaserParams,
};
pub use render::{quantize, RenderedVoice};
pub use bank::{SoundBank, SynthConfig, SynthParameters};
pub use engine::{InputEvent, Mixer, SynthEngine, VoiceId};
