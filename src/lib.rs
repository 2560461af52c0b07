// stepsynth - real-time performance and sequencing engine
//
// A host-agnostic control layer for a small software synth: step
// sequencing, an arpeggiator, momentary/lockable effects, bar-aligned
// recording and snapshot-based patch save/load. Audio rendering itself
// lives behind the collaborator traits in `backend`.

pub mod arp;
pub mod backend;
pub mod capture;
pub mod clock;
pub mod effects;
pub mod engine;
pub mod messaging;
pub mod recorder;
pub mod sequencer;
pub mod state;
pub mod types;

pub use arp::{ArpConfig, ArpConfigUpdate, ArpPattern, Arpeggiator};
pub use backend::{
    shared, AudioClip, CaptureError, CaptureSink, EffectsRack, EngineHost, Shared, SoundSource,
    Transport, WaveformAnalyser, WAVEFORM_SIZE,
};
pub use capture::MemoryCaptureSink;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use effects::{EffectController, EffectStatus, LOCK_HOLD};
pub use engine::{AudioEngine, StepBus, Subscription};
pub use messaging::{Notification, NotificationCategory, NotificationLevel};
pub use recorder::{RecordError, RecordStatus, Recorder};
pub use sequencer::{StepGrid, StepSequencer, STEP_COUNT};
pub use state::{DrumSteps, EngineSnapshot, StateError, StateStore};
pub use types::{AdsrParams, EffectId, Pitch, Subdivision, Timbre, Track};
