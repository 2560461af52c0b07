// Musical value types shared across the engine

use serde::{Deserialize, Serialize};

/// A pitch as a MIDI note number (0-127).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pitch(pub u8);

impl Pitch {
    /// Kick reference pitch.
    pub const C1: Pitch = Pitch(24);
    /// Melodic reference pitch.
    pub const C4: Pitch = Pitch(60);
    /// Percussion reference pitch.
    pub const G4: Pitch = Pitch(67);

    pub fn midi(self) -> u8 {
        self.0
    }

    /// Transpose up by semitones, saturating at the top of the MIDI range.
    pub fn transpose(self, semitones: u8) -> Pitch {
        Pitch(self.0.saturating_add(semitones).min(127))
    }
}

/// Note-length subdivision tokens, used both as trigger durations and as
/// arpeggiator rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subdivision {
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "16n")]
    Sixteenth,
    #[serde(rename = "32n")]
    ThirtySecond,
}

impl Subdivision {
    pub fn token(self) -> &'static str {
        match self {
            Subdivision::Quarter => "4n",
            Subdivision::Eighth => "8n",
            Subdivision::Sixteenth => "16n",
            Subdivision::ThirtySecond => "32n",
        }
    }

    /// Duration in seconds at the given tempo.
    pub fn seconds(self, bpm: f64) -> f64 {
        let beat = 60.0 / bpm;
        match self {
            Subdivision::Quarter => beat,
            Subdivision::Eighth => beat / 2.0,
            Subdivision::Sixteenth => beat / 4.0,
            Subdivision::ThirtySecond => beat / 8.0,
        }
    }
}

/// Timbre shape of the melodic voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    #[default]
    Basic,
    Fm,
    Saw,
    Pulse,
}

/// ADSR envelope parameters (attack/decay/release in seconds, sustain as a
/// 0..1 level ratio).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl AdsrParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self::new(0.005, 0.1, 0.3, 1.0)
    }
}

/// The closed set of sequencer tracks. `Melodic` is the synth voice; the
/// rest are the fixed-timbre percussion voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Melodic,
    Kick,
    Snare,
    Hihat,
    Perc,
}

impl Track {
    pub const COUNT: usize = 5;
    pub const ALL: [Track; Track::COUNT] = [
        Track::Melodic,
        Track::Kick,
        Track::Snare,
        Track::Hihat,
        Track::Perc,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The closed set of performance effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectId {
    Distortion,
    Bitcrusher,
    Delay,
    Reverb,
    Filter,
    Stutter,
}

impl EffectId {
    pub const COUNT: usize = 6;
    pub const ALL: [EffectId; EffectId::COUNT] = [
        EffectId::Distortion,
        EffectId::Bitcrusher,
        EffectId::Delay,
        EffectId::Reverb,
        EffectId::Filter,
        EffectId::Stutter,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectId::Distortion => "distortion",
            EffectId::Bitcrusher => "bitcrusher",
            EffectId::Delay => "delay",
            EffectId::Reverb => "reverb",
            EffectId::Filter => "filter",
            EffectId::Stutter => "stutter",
        }
    }
}
