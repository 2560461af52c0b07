// External collaborator capabilities
//
// The engine drives sound generation, the effects chain, the shared
// transport, waveform analysis and audio capture through these traits.
// Real DSP implementations live outside this crate; the engine only
// configures and reacts to them.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::types::{AdsrParams, EffectId, Pitch, Subdivision, Timbre, Track};

/// Number of samples in the pull-based waveform buffer.
pub const WAVEFORM_SIZE: usize = 256;

/// One melodic voice with a selectable timbre shape plus four fixed-timbre
/// percussion voices.
pub trait SoundSource {
    /// Trigger one voice. `pitch` is `None` for unpitched voices (noise
    /// snare, hihat). `time` is the scheduled time in seconds from the
    /// shared clock; 0.0 means immediately.
    fn trigger(
        &mut self,
        track: Track,
        pitch: Option<Pitch>,
        duration: Subdivision,
        time: f64,
        velocity: f32,
    );

    fn set_timbre(&mut self, timbre: Timbre);

    /// Single 0..1 macro parameter, mapped per timbre shape: fm maps to
    /// modulation index 0..20, saw to detune spread 0..50, pulse to pulse
    /// width 0.1..0.9, basic has no effect.
    fn set_color(&mut self, color: f32);

    fn set_envelope(&mut self, envelope: AdsrParams);
}

/// Named effects with per-effect intensity, plus cutoff ramping for the
/// filter sweep.
pub trait EffectsRack {
    /// Set an effect's intensity; 0.0 disables it.
    fn set_effect(&mut self, effect: EffectId, intensity: f32);

    /// Ramp the lowpass filter cutoff to `cutoff_hz` over `ramp_secs`.
    fn ramp_filter_cutoff(&mut self, cutoff_hz: f32, ramp_secs: f32);
}

/// The shared time source driving tick delivery, tempo and global swing.
pub trait Transport {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn bpm(&self) -> f64;
    fn set_bpm(&mut self, bpm: f64);

    /// Global swing: amount 0..1 applied at the given subdivision. One
    /// swing value times both the step sequencer clock and the arpeggiator
    /// pattern player.
    fn set_swing(&mut self, amount: f64, subdivision: Subdivision);
}

/// Pull-based waveform analysis for visualization.
pub trait WaveformAnalyser {
    /// Fill `out` with the most recent waveform samples.
    fn fill_waveform(&self, out: &mut [f32]);
}

/// Encoded audio returned by a capture sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl AudioClip {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture sink produced no data")]
    Empty,
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Capture sink: opened at the start of a recording session, closed at the
/// end, yielding the encoded audio.
pub trait CaptureSink {
    fn start(&mut self) -> Result<(), CaptureError>;
    fn stop(&mut self) -> Result<AudioClip, CaptureError>;
}

/// Shared single-threaded handle to a collaborator. All mutation happens on
/// one cooperative scheduling context, so `Rc<RefCell>` is the whole
/// synchronization story.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Bundle of collaborator handles the engine is constructed from.
pub struct EngineHost {
    pub synth: Shared<dyn SoundSource>,
    pub rack: Shared<dyn EffectsRack>,
    pub transport: Shared<dyn Transport>,
    pub analyser: Shared<dyn WaveformAnalyser>,
    pub sink: Shared<dyn CaptureSink>,
}
