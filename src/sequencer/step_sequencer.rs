// Step sequencer - five 16-step trigger rows driven by the shared clock

use crate::backend::SoundSource;
use crate::sequencer::grid::{StepGrid, STEP_COUNT};
use crate::types::{Pitch, Subdivision, Track};

/// What a track fires when its step flag is set.
#[derive(Debug, Clone, Copy)]
struct TriggerSpec {
    pitch: Option<Pitch>,
    duration: Subdivision,
    velocity: f32,
}

const fn trigger_spec(track: Track) -> TriggerSpec {
    match track {
        Track::Melodic => TriggerSpec {
            pitch: Some(Pitch::C4),
            duration: Subdivision::Eighth,
            velocity: 1.0,
        },
        Track::Kick => TriggerSpec {
            pitch: Some(Pitch::C1),
            duration: Subdivision::Eighth,
            velocity: 1.0,
        },
        // Noise one-shot, no pitch.
        Track::Snare => TriggerSpec {
            pitch: None,
            duration: Subdivision::Eighth,
            velocity: 1.0,
        },
        Track::Hihat => TriggerSpec {
            pitch: None,
            duration: Subdivision::ThirtySecond,
            velocity: 0.3,
        },
        Track::Perc => TriggerSpec {
            pitch: Some(Pitch::G4),
            duration: Subdivision::Eighth,
            velocity: 1.0,
        },
    }
}

/// Owns the five per-track step grids and converts clock ticks into voice
/// triggers.
pub struct StepSequencer {
    grids: [StepGrid; Track::COUNT],
}

impl StepSequencer {
    pub fn new() -> Self {
        Self {
            grids: [StepGrid::default(); Track::COUNT],
        }
    }

    /// Replace a track's grid in one whole-value swap.
    pub fn update_track(&mut self, track: Track, grid: StepGrid) {
        self.grids[track.index()] = grid;
    }

    pub fn grid(&self, track: Track) -> StepGrid {
        self.grids[track.index()]
    }

    /// Fire every track whose flag at `step` is set. `step` wraps modulo 16.
    pub fn on_tick(&self, step: usize, time: f64, synth: &mut dyn SoundSource) {
        let step = step % STEP_COUNT;
        for track in Track::ALL {
            if self.grids[track.index()].get(step) {
                let spec = trigger_spec(track);
                synth.trigger(track, spec.pitch, spec.duration, time, spec.velocity);
            }
        }
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdsrParams, Timbre};

    #[derive(Debug, Clone, PartialEq)]
    struct Trigger {
        track: Track,
        pitch: Option<Pitch>,
        duration: Subdivision,
        velocity: f32,
    }

    #[derive(Default)]
    struct RecordingSynth {
        triggers: Vec<Trigger>,
    }

    impl SoundSource for RecordingSynth {
        fn trigger(
            &mut self,
            track: Track,
            pitch: Option<Pitch>,
            duration: Subdivision,
            _time: f64,
            velocity: f32,
        ) {
            self.triggers.push(Trigger {
                track,
                pitch,
                duration,
                velocity,
            });
        }

        fn set_timbre(&mut self, _timbre: Timbre) {}
        fn set_color(&mut self, _color: f32) {}
        fn set_envelope(&mut self, _envelope: AdsrParams) {}
    }

    #[test]
    fn test_silent_grids_fire_nothing() {
        let sequencer = StepSequencer::new();
        let mut synth = RecordingSynth::default();

        for step in 0..STEP_COUNT {
            sequencer.on_tick(step, 0.0, &mut synth);
        }
        assert!(synth.triggers.is_empty());
    }

    #[test]
    fn test_set_steps_fire_their_tracks() {
        let mut sequencer = StepSequencer::new();
        sequencer.update_track(Track::Kick, StepGrid::default().with_step(0, true));
        sequencer.update_track(Track::Melodic, StepGrid::default().with_step(0, true));

        let mut synth = RecordingSynth::default();
        sequencer.on_tick(0, 0.0, &mut synth);

        assert_eq!(synth.triggers.len(), 2);
        assert_eq!(synth.triggers[0].track, Track::Melodic);
        assert_eq!(synth.triggers[0].pitch, Some(Pitch::C4));
        assert_eq!(synth.triggers[1].track, Track::Kick);
        assert_eq!(synth.triggers[1].pitch, Some(Pitch::C1));

        // Other steps stay silent.
        synth.triggers.clear();
        sequencer.on_tick(1, 0.0, &mut synth);
        assert!(synth.triggers.is_empty());
    }

    #[test]
    fn test_hihat_fires_short_and_quiet() {
        let mut sequencer = StepSequencer::new();
        sequencer.update_track(Track::Hihat, StepGrid::default().with_step(4, true));

        let mut synth = RecordingSynth::default();
        sequencer.on_tick(4, 0.0, &mut synth);

        assert_eq!(synth.triggers.len(), 1);
        let hat = &synth.triggers[0];
        assert_eq!(hat.pitch, None);
        assert_eq!(hat.duration, Subdivision::ThirtySecond);
        assert_eq!(hat.velocity, 0.3);
    }

    #[test]
    fn test_tick_index_wraps_modulo_16() {
        let mut sequencer = StepSequencer::new();
        sequencer.update_track(Track::Snare, StepGrid::default().with_step(0, true));

        let mut synth = RecordingSynth::default();
        sequencer.on_tick(16, 0.0, &mut synth);
        sequencer.on_tick(32, 0.0, &mut synth);

        assert_eq!(synth.triggers.len(), 2);
    }

    #[test]
    fn test_grid_swap_is_whole_value() {
        let mut sequencer = StepSequencer::new();
        let first = StepGrid::default().with_step(0, true);
        let second = StepGrid::default().with_step(1, true);

        sequencer.update_track(Track::Perc, first);
        sequencer.update_track(Track::Perc, second);

        // The replaced grid is gone in its entirety.
        assert_eq!(sequencer.grid(Track::Perc), second);
        let mut synth = RecordingSynth::default();
        sequencer.on_tick(0, 0.0, &mut synth);
        assert!(synth.triggers.is_empty());
        sequencer.on_tick(1, 0.0, &mut synth);
        assert_eq!(synth.triggers.len(), 1);
    }
}
