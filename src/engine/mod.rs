// Audio engine - the performance surface over the host collaborators
//
// Owns the step sequencer, arpeggiator, effect machines, recorder and
// state store, and routes every operation through an explicit host handle
// bundle. There is no global engine; callers construct one per host.

pub mod events;

use std::cell::Cell;
use std::rc::Rc;

use rand::Rng;

use crate::arp::{ArpConfig, ArpConfigUpdate, Arpeggiator};
use crate::backend::{AudioClip, EngineHost, WAVEFORM_SIZE};
use crate::clock::{Clock, MonotonicClock};
use crate::effects::{EffectController, EffectStatus};
use crate::messaging::{
    create_notification_channel, Notification, NotificationCategory, NotificationConsumer,
    NotificationProducer,
};
use crate::recorder::{RecordError, RecordStatus, Recorder};
use crate::sequencer::{StepGrid, StepSequencer, STEP_COUNT};
use crate::state::{DrumSteps, EngineSnapshot, StateError, StateStore};
use crate::types::{AdsrParams, EffectId, Pitch, Subdivision, Timbre, Track};

pub use events::{StepBus, Subscription};

const NOTIFICATION_CAPACITY: usize = 64;

pub struct AudioEngine {
    host: EngineHost,
    sequencer: StepSequencer,
    arp: Arpeggiator,
    effects: EffectController,
    recorder: Recorder,
    store: StateStore,
    bus: StepBus,
    initialized: Rc<Cell<bool>>,
    timbre: Timbre,
    color: f32,
    envelope: AdsrParams,
    notifications: NotificationProducer,
    notification_rx: Option<NotificationConsumer>,
}

impl AudioEngine {
    pub fn new(host: EngineHost) -> Self {
        Self::with_clock(host, Rc::new(MonotonicClock::new()))
    }

    /// Build an engine whose effect lock window runs on the given clock.
    pub fn with_clock(host: EngineHost, clock: Rc<dyn Clock>) -> Self {
        let initialized = Rc::new(Cell::new(false));
        let recorder = Recorder::new(
            initialized.clone(),
            host.transport.clone(),
            host.sink.clone(),
        );
        let (notifications, notification_rx) =
            create_notification_channel(NOTIFICATION_CAPACITY);

        Self {
            host,
            sequencer: StepSequencer::new(),
            arp: Arpeggiator::new(),
            effects: EffectController::new(clock),
            recorder,
            store: StateStore::new(),
            bus: StepBus::new(),
            initialized,
            timbre: Timbre::default(),
            color: 0.5,
            envelope: AdsrParams::default(),
            notifications,
            notification_rx: Some(notification_rx),
        }
    }

    /// Push the default voice configuration to the host and arm the
    /// engine. Operations that touch audio output require this first.
    pub fn initialize(&mut self) {
        let mut synth = self.host.synth.borrow_mut();
        synth.set_timbre(self.timbre);
        synth.set_color(self.color);
        synth.set_envelope(self.envelope);
        drop(synth);

        self.initialized.set(true);
        log::info!("engine initialized");
        self.notify(Notification::info(
            NotificationCategory::Engine,
            "engine ready".to_string(),
        ));
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    // --- transport ---

    pub fn start(&mut self) {
        self.host.transport.borrow_mut().start();
    }

    pub fn stop(&mut self) {
        self.host.transport.borrow_mut().stop();
    }

    pub fn is_playing(&self) -> bool {
        self.host.transport.borrow().is_running()
    }

    pub fn bpm(&self) -> f64 {
        self.host.transport.borrow().bpm()
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.host.transport.borrow_mut().set_bpm(bpm);
    }

    // --- sequencing ---

    /// Clock tick entry point. Fires the due step triggers, then fans the
    /// wrapped step index out to subscribers.
    pub fn handle_tick(&mut self, step: usize, time: f64) {
        {
            let mut synth = self.host.synth.borrow_mut();
            self.sequencer.on_tick(step, time, &mut *synth);
        }
        self.bus.publish(step % STEP_COUNT);
    }

    pub fn update_track(&mut self, track: Track, grid: StepGrid) {
        self.sequencer.update_track(track, grid);
    }

    pub fn grid(&self, track: Track) -> StepGrid {
        self.sequencer.grid(track)
    }

    pub fn subscribe_steps(&mut self, callback: impl FnMut(usize) + 'static) -> Subscription {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe_steps(&mut self, token: Subscription) {
        self.bus.unsubscribe(token);
    }

    // --- live notes and the arpeggiator ---

    /// Live note input. The held set always feeds the arpeggiator, so
    /// toggling it on later picks up notes that are already down; while it
    /// is inactive the note also sounds directly.
    pub fn note_on(&mut self, pitch: Pitch) {
        self.arp.note_on(pitch);
        if self.arp.is_active() {
            self.ensure_running_for_arp();
        } else {
            self.play_note(pitch);
        }
    }

    pub fn note_off(&mut self, pitch: Pitch) {
        self.arp.note_off(pitch);
    }

    /// Trigger the melodic voice immediately.
    pub fn play_note(&mut self, pitch: Pitch) {
        self.host.synth.borrow_mut().trigger(
            Track::Melodic,
            Some(pitch),
            Subdivision::Eighth,
            0.0,
            1.0,
        );
    }

    pub fn set_arp_active(&mut self, active: bool) {
        self.arp.set_active(active);
        if active {
            self.ensure_running_for_arp();
        }
    }

    pub fn arp_active(&self) -> bool {
        self.arp.is_active()
    }

    pub fn apply_arp_config(&mut self, update: ArpConfigUpdate) {
        let mut transport = self.host.transport.borrow_mut();
        self.arp.apply_config(update, &mut *transport);
    }

    pub fn arp_config(&self) -> ArpConfig {
        self.arp.config()
    }

    pub fn arp_sequence(&self) -> &[Pitch] {
        self.arp.sequence()
    }

    /// One pattern-ordered traversal of the expanded sequence.
    pub fn arp_traversal(&self, rng: &mut impl Rng) -> Vec<Pitch> {
        self.arp.traversal(rng)
    }

    /// An active arpeggiator with notes to play needs the transport
    /// running; starting it here means enabling mid-performance produces
    /// sound without a separate play action.
    fn ensure_running_for_arp(&mut self) {
        if self.arp.sequence().is_empty() {
            return;
        }
        let mut transport = self.host.transport.borrow_mut();
        if !transport.is_running() {
            transport.start();
        }
    }

    // --- effects ---

    pub fn press_effect(&mut self, id: EffectId) {
        let mut rack = self.host.rack.borrow_mut();
        self.effects.press(id, &mut *rack);
    }

    pub fn release_effect(&mut self, id: EffectId) {
        let mut rack = self.host.rack.borrow_mut();
        self.effects.release(id, &mut *rack);
    }

    pub fn effect_status(&self, id: EffectId) -> EffectStatus {
        self.effects.status(id)
    }

    // --- voice configuration ---

    pub fn set_timbre(&mut self, timbre: Timbre) {
        self.timbre = timbre;
        self.host.synth.borrow_mut().set_timbre(timbre);
    }

    pub fn timbre(&self) -> Timbre {
        self.timbre
    }

    pub fn set_color(&mut self, color: f32) {
        self.color = color.clamp(0.0, 1.0);
        self.host.synth.borrow_mut().set_color(self.color);
    }

    pub fn color(&self) -> f32 {
        self.color
    }

    pub fn set_envelope(&mut self, envelope: AdsrParams) {
        self.envelope = envelope;
        self.host.synth.borrow_mut().set_envelope(envelope);
    }

    pub fn envelope(&self) -> AdsrParams {
        self.envelope
    }

    /// Fill `out` (typically [`WAVEFORM_SIZE`] samples) with the latest
    /// waveform for visualization.
    pub fn waveform(&self, out: &mut [f32]) {
        debug_assert!(out.len() <= WAVEFORM_SIZE);
        self.host.analyser.borrow().fill_waveform(out);
    }

    // --- recording ---

    /// A shared handle to the recorder, for driving a capture concurrently
    /// with other engine calls.
    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    pub fn record_status(&self) -> RecordStatus {
        self.recorder.status()
    }

    /// Record `bars` bars through the capture sink. The engine is held
    /// exclusively for the duration; use [`AudioEngine::recorder`] when
    /// sequencing must keep running from the same call site.
    pub async fn record(&mut self, bars: u32) -> Result<AudioClip, RecordError> {
        let result = self.recorder.start(bars).await;
        match &result {
            Ok(clip) => self.notify(Notification::info(
                NotificationCategory::Recorder,
                format!("recorded {} bars ({} bytes)", bars, clip.data.len()),
            )),
            Err(err) => self.notify(Notification::error(
                NotificationCategory::Recorder,
                format!("recording failed: {err}"),
            )),
        }
        result
    }

    // --- state ---

    /// Full snapshot of the saveable configuration.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            bpm: Some(self.bpm()),
            timbre_type: Some(self.timbre),
            color: Some(self.color),
            melodic_steps: Some(self.sequencer.grid(Track::Melodic)),
            drum_steps: Some(DrumSteps {
                kick: Some(self.sequencer.grid(Track::Kick)),
                snare: Some(self.sequencer.grid(Track::Snare)),
                hihat: Some(self.sequencer.grid(Track::Hihat)),
                perc: Some(self.sequencer.grid(Track::Perc)),
            }),
            envelope: Some(self.envelope),
        }
    }

    /// Apply a snapshot field by field; absent fields leave current state
    /// untouched. A drum block that is present restores all four tracks,
    /// missing tracks as empty grids.
    pub fn restore(&mut self, snapshot: &EngineSnapshot) {
        if let Some(bpm) = snapshot.bpm {
            self.set_bpm(bpm);
        }
        if let Some(timbre) = snapshot.timbre_type {
            self.set_timbre(timbre);
        }
        if let Some(color) = snapshot.color {
            self.set_color(color);
        }
        if let Some(melodic) = snapshot.melodic_steps {
            self.sequencer.update_track(Track::Melodic, melodic);
        }
        if let Some(drums) = &snapshot.drum_steps {
            self.sequencer
                .update_track(Track::Kick, drums.kick.unwrap_or_default());
            self.sequencer
                .update_track(Track::Snare, drums.snare.unwrap_or_default());
            self.sequencer
                .update_track(Track::Hihat, drums.hihat.unwrap_or_default());
            self.sequencer
                .update_track(Track::Perc, drums.perc.unwrap_or_default());
        }
        if let Some(envelope) = snapshot.envelope {
            self.set_envelope(envelope);
        }
    }

    pub fn export_json(&self) -> Result<String, StateError> {
        self.store.export(&self.snapshot())
    }

    /// Import a patch document. The document is parsed and validated in
    /// full before anything is applied, so a malformed payload leaves the
    /// engine exactly as it was.
    pub fn import_json(&mut self, json: &str) -> Result<(), StateError> {
        match self.store.import(json) {
            Ok(snapshot) => {
                self.restore(&snapshot);
                self.notify(Notification::info(
                    NotificationCategory::State,
                    "patch loaded".to_string(),
                ));
                Ok(())
            }
            Err(err) => {
                log::warn!("patch import rejected: {err}");
                self.notify(Notification::error(
                    NotificationCategory::State,
                    format!("patch import rejected: {err}"),
                ));
                Err(err)
            }
        }
    }

    // --- notifications ---

    /// Take the consumer end of the notification channel. Yields `Some`
    /// once; the observer side keeps it for the engine's lifetime.
    pub fn take_notifications(&mut self) -> Option<NotificationConsumer> {
        self.notification_rx.take()
    }

    fn notify(&mut self, notification: Notification) {
        // Dropped on overflow; notifications are advisory.
        let _ = ringbuf::traits::Producer::try_push(&mut self.notifications, notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        shared, AudioClip, CaptureError, CaptureSink, EffectsRack, SoundSource, Transport,
        WaveformAnalyser,
    };
    use ringbuf::traits::Consumer;
    use std::cell::RefCell;

    #[derive(Default)]
    struct NullSynth {
        triggers: Vec<(Track, Option<Pitch>)>,
        timbre: Option<Timbre>,
        color: Option<f32>,
    }

    impl SoundSource for NullSynth {
        fn trigger(
            &mut self,
            track: Track,
            pitch: Option<Pitch>,
            _duration: Subdivision,
            _time: f64,
            _velocity: f32,
        ) {
            self.triggers.push((track, pitch));
        }
        fn set_timbre(&mut self, timbre: Timbre) {
            self.timbre = Some(timbre);
        }
        fn set_color(&mut self, color: f32) {
            self.color = Some(color);
        }
        fn set_envelope(&mut self, _envelope: AdsrParams) {}
    }

    #[derive(Default)]
    struct NullRack;

    impl EffectsRack for NullRack {
        fn set_effect(&mut self, _effect: EffectId, _intensity: f32) {}
        fn ramp_filter_cutoff(&mut self, _cutoff_hz: f32, _ramp_secs: f32) {}
    }

    struct NullTransport {
        running: bool,
        bpm: f64,
    }

    impl Default for NullTransport {
        fn default() -> Self {
            Self {
                running: false,
                bpm: 120.0,
            }
        }
    }

    impl Transport for NullTransport {
        fn start(&mut self) {
            self.running = true;
        }
        fn stop(&mut self) {
            self.running = false;
        }
        fn is_running(&self) -> bool {
            self.running
        }
        fn bpm(&self) -> f64 {
            self.bpm
        }
        fn set_bpm(&mut self, bpm: f64) {
            self.bpm = bpm;
        }
        fn set_swing(&mut self, _amount: f64, _subdivision: Subdivision) {}
    }

    struct FlatAnalyser;

    impl WaveformAnalyser for FlatAnalyser {
        fn fill_waveform(&self, out: &mut [f32]) {
            out.fill(0.25);
        }
    }

    struct NullSink;

    impl CaptureSink for NullSink {
        fn start(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }
        fn stop(&mut self) -> Result<AudioClip, CaptureError> {
            Ok(AudioClip {
                mime_type: "audio/wav",
                data: vec![0],
            })
        }
    }

    fn test_host() -> (
        EngineHost,
        Rc<RefCell<NullSynth>>,
        Rc<RefCell<NullTransport>>,
    ) {
        let synth = shared(NullSynth::default());
        let transport = shared(NullTransport::default());
        let host = EngineHost {
            synth: synth.clone(),
            rack: shared(NullRack),
            transport: transport.clone(),
            analyser: shared(FlatAnalyser),
            sink: shared(NullSink),
        };
        (host, synth, transport)
    }

    #[test]
    fn test_initialize_pushes_voice_defaults() {
        let (host, synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);

        assert!(!engine.is_initialized());
        engine.initialize();

        assert!(engine.is_initialized());
        assert_eq!(synth.borrow().timbre, Some(Timbre::Basic));
        assert_eq!(synth.borrow().color, Some(0.5));
    }

    #[test]
    fn test_note_on_plays_directly_when_arp_inactive() {
        let (host, synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);

        engine.note_on(Pitch(60));

        assert_eq!(
            synth.borrow().triggers,
            vec![(Track::Melodic, Some(Pitch(60)))]
        );
        // The held set was fed regardless.
        assert_eq!(engine.arp_sequence(), &[Pitch(60)]);
    }

    #[test]
    fn test_arp_enable_with_held_notes_starts_transport() {
        let (host, _synth, transport) = test_host();
        let mut engine = AudioEngine::new(host);

        engine.note_on(Pitch(60));
        engine.note_on(Pitch(64));
        assert!(!transport.borrow().running);

        engine.set_arp_active(true);

        assert!(transport.borrow().running);
        assert_eq!(engine.arp_sequence().len(), 2);
    }

    #[test]
    fn test_arp_enable_with_no_notes_leaves_transport_alone() {
        let (host, _synth, transport) = test_host();
        let mut engine = AudioEngine::new(host);

        engine.set_arp_active(true);

        assert!(!transport.borrow().running);
    }

    #[test]
    fn test_tick_fires_sequencer_and_subscribers() {
        let (host, synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);
        engine.update_track(Track::Kick, StepGrid::default().with_step(2, true));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        engine.subscribe_steps(move |step| sink.borrow_mut().push(step));

        engine.handle_tick(2, 0.0);
        engine.handle_tick(18, 0.0);

        assert_eq!(synth.borrow().triggers.len(), 2);
        // Subscribers see the wrapped index.
        assert_eq!(*seen.borrow(), vec![2, 2]);
    }

    #[test]
    fn test_color_is_clamped() {
        let (host, synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);

        engine.set_color(3.5);
        assert_eq!(engine.color(), 1.0);
        assert_eq!(synth.borrow().color, Some(1.0));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let (host, _synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);
        engine.set_bpm(93.0);
        engine.set_timbre(Timbre::Pulse);
        engine.set_color(0.6);
        engine.update_track(Track::Melodic, StepGrid::default().with_step(0, true));
        engine.update_track(Track::Hihat, StepGrid::filled(true));

        let snapshot = engine.snapshot();

        let (host2, _synth2, _transport2) = test_host();
        let mut restored = AudioEngine::new(host2);
        restored.restore(&snapshot);

        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_partial_drum_restore_defaults_missing_tracks() {
        let (host, _synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);
        engine.update_track(Track::Snare, StepGrid::filled(true));

        engine.restore(&EngineSnapshot {
            drum_steps: Some(DrumSteps {
                kick: Some(StepGrid::filled(true)),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(engine.grid(Track::Kick), StepGrid::filled(true));
        // The snare grid in the block was absent, so it restores empty.
        assert_eq!(engine.grid(Track::Snare), StepGrid::default());
    }

    #[test]
    fn test_malformed_import_leaves_state_untouched() {
        let (host, _synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);
        engine.set_bpm(140.0);
        engine.update_track(Track::Kick, StepGrid::filled(true));

        let result = engine.import_json("{\"version\":1,\"timestamp\":3");

        assert!(result.is_err());
        assert_eq!(engine.bpm(), 140.0);
        assert_eq!(engine.grid(Track::Kick), StepGrid::filled(true));
    }

    #[test]
    fn test_import_emits_error_notification() {
        let (host, _synth, _transport) = test_host();
        let mut engine = AudioEngine::new(host);
        let mut rx = engine.take_notifications().unwrap();

        let _ = engine.import_json("not json");

        let notification = rx.try_pop().unwrap();
        assert_eq!(notification.level, crate::messaging::NotificationLevel::Error);
        assert_eq!(notification.category, NotificationCategory::State);
    }

    #[test]
    fn test_waveform_pull() {
        let (host, _synth, _transport) = test_host();
        let engine = AudioEngine::new(host);

        let mut buffer = [0.0f32; WAVEFORM_SIZE];
        engine.waveform(&mut buffer);
        assert!(buffer.iter().all(|sample| *sample == 0.25));
    }
}
