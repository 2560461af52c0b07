// stepsynth demo host
//
// Wires the engine to simulated collaborators, programs a basic beat,
// drives sixteen steps by hand, records one bar while feeding the capture
// sink, then prints the exported patch document.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

use stepsynth::{
    shared, AdsrParams, ArpConfigUpdate, AudioClip, AudioEngine, CaptureError, CaptureSink,
    EffectId, EffectsRack, EngineHost, MemoryCaptureSink, Pitch, SoundSource, StepGrid,
    Subdivision, Timbre, Track, Transport, WaveformAnalyser,
};

const SAMPLE_RATE: u32 = 44_100;

#[derive(Default)]
struct SimSynth;

impl SoundSource for SimSynth {
    fn trigger(
        &mut self,
        track: Track,
        pitch: Option<Pitch>,
        duration: Subdivision,
        _time: f64,
        velocity: f32,
    ) {
        log::debug!(
            "trigger {:?} pitch={:?} dur={} vel={}",
            track,
            pitch.map(Pitch::midi),
            duration.token(),
            velocity
        );
    }

    fn set_timbre(&mut self, timbre: Timbre) {
        log::debug!("timbre -> {timbre:?}");
    }

    fn set_color(&mut self, color: f32) {
        log::debug!("color -> {color}");
    }

    fn set_envelope(&mut self, envelope: AdsrParams) {
        log::debug!("envelope -> {envelope:?}");
    }
}

#[derive(Default)]
struct SimRack;

impl EffectsRack for SimRack {
    fn set_effect(&mut self, effect: EffectId, intensity: f32) {
        log::debug!("effect {} -> {intensity}", effect.name());
    }

    fn ramp_filter_cutoff(&mut self, cutoff_hz: f32, ramp_secs: f32) {
        log::debug!("filter cutoff -> {cutoff_hz} Hz over {ramp_secs}s");
    }
}

struct SimTransport {
    running: bool,
    bpm: f64,
}

impl Transport for SimTransport {
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
    fn set_swing(&mut self, amount: f64, subdivision: Subdivision) {
        log::debug!("swing -> {amount} at {}", subdivision.token());
    }
}

struct SineAnalyser;

impl WaveformAnalyser for SineAnalyser {
    fn fill_waveform(&self, out: &mut [f32]) {
        let len = out.len().max(1) as f32;
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = (TAU * i as f32 / len).sin();
        }
    }
}

/// CaptureSink passthrough so the demo keeps a concrete handle for
/// feeding samples while the engine owns the trait object.
struct SharedSink(Rc<RefCell<MemoryCaptureSink>>);

impl CaptureSink for SharedSink {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.0.borrow_mut().start()
    }
    fn stop(&mut self) -> Result<AudioClip, CaptureError> {
        self.0.borrow_mut().stop()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let memory_sink = Rc::new(RefCell::new(MemoryCaptureSink::new(SAMPLE_RATE)));
    let host = EngineHost {
        synth: shared(SimSynth),
        rack: shared(SimRack),
        transport: shared(SimTransport {
            running: false,
            bpm: 120.0,
        }),
        analyser: shared(SineAnalyser),
        sink: shared(SharedSink(memory_sink.clone())),
    };

    let mut engine = AudioEngine::new(host);
    engine.initialize();

    // Four-on-the-floor kick, offbeat hats, a sparse melody.
    let mut kick = StepGrid::default();
    let mut hihat = StepGrid::default();
    let mut melody = StepGrid::default();
    for step in 0..16 {
        if step % 4 == 0 {
            kick = kick.with_step(step, true);
        }
        if step % 4 == 2 {
            hihat = hihat.with_step(step, true);
        }
    }
    melody = melody.with_step(0, true).with_step(10, true);
    engine.update_track(Track::Kick, kick);
    engine.update_track(Track::Hihat, hihat);
    engine.update_track(Track::Melodic, melody);

    engine.set_timbre(Timbre::Fm);
    engine.set_color(0.4);
    engine.apply_arp_config(ArpConfigUpdate {
        swing: Some(0.2),
        ..Default::default()
    });

    let token = engine.subscribe_steps(|step| {
        if step == 0 {
            log::info!("bar start");
        }
    });

    engine.start();
    let step_secs = Subdivision::Sixteenth.seconds(engine.bpm());
    for step in 0..16usize {
        engine.handle_tick(step, step as f64 * step_secs);
    }
    engine.unsubscribe_steps(token);

    // Record one bar while a feeder pushes audio into the sink, the way a
    // host's render callback would.
    let recorder = engine.recorder();
    let feeder = async {
        let chunk = vec![0.1f32; (SAMPLE_RATE / 5) as usize];
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            memory_sink.borrow_mut().push_samples(&chunk);
        }
    };
    let (recorded, ()) = tokio::join!(recorder.start(1), feeder);
    match recorded {
        Ok(clip) => log::info!("captured {} bytes of {}", clip.data.len(), clip.mime_type),
        Err(err) => log::error!("recording failed: {err}"),
    }

    match engine.export_json() {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("export failed: {err}"),
    }
}
