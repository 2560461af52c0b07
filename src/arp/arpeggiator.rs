// Arpeggiator - held-note set and the derived octave-expanded sequence
//
// The expanded sequence is a pure function of (held notes, octave span) and
// is rebuilt on every dependency change; nothing ever edits it by hand.

use rand::Rng;

use crate::backend::Transport;
use crate::types::{Pitch, Subdivision};

use super::pattern::ArpPattern;

pub const MIN_OCTAVES: u8 = 1;
pub const MAX_OCTAVES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArpConfig {
    pub pattern: ArpPattern,
    pub rate: Subdivision,
    /// Octave span, 1..=3.
    pub octaves: u8,
    /// Global swing amount 0..1, written through to the shared transport.
    pub swing: f64,
}

impl Default for ArpConfig {
    fn default() -> Self {
        Self {
            pattern: ArpPattern::Up,
            rate: Subdivision::Eighth,
            octaves: MIN_OCTAVES,
            swing: 0.0,
        }
    }
}

/// Partial config update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArpConfigUpdate {
    pub pattern: Option<ArpPattern>,
    pub rate: Option<Subdivision>,
    pub octaves: Option<u8>,
    pub swing: Option<f64>,
}

pub struct Arpeggiator {
    active: bool,
    /// Held pitches in press order, no duplicates.
    held: Vec<Pitch>,
    config: ArpConfig,
    /// Derived: held notes sorted ascending, one layer per octave.
    sequence: Vec<Pitch>,
}

impl Arpeggiator {
    pub fn new() -> Self {
        Self {
            active: false,
            held: Vec::new(),
            config: ArpConfig::default(),
            sequence: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> ArpConfig {
        self.config
    }

    pub fn held_notes(&self) -> &[Pitch] {
        &self.held
    }

    /// The expanded, octave-extended sequence fed to the pattern player.
    pub fn sequence(&self) -> &[Pitch] {
        &self.sequence
    }

    /// Add a held note if absent. Returns whether the set changed.
    pub fn note_on(&mut self, pitch: Pitch) -> bool {
        if self.held.contains(&pitch) {
            return false;
        }
        self.held.push(pitch);
        self.regenerate();
        true
    }

    pub fn note_off(&mut self, pitch: Pitch) {
        if let Some(index) = self.held.iter().position(|held| *held == pitch) {
            self.held.remove(index);
            self.regenerate();
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.regenerate();
    }

    /// Toggle the arpeggiator. Enabling with notes already held leaves the
    /// sequence ready so playback starts without another note event;
    /// disabling clears the held set so no note can stick on.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if active {
            self.regenerate();
        } else {
            self.clear();
        }
    }

    /// Merge a partial config update. A swing change is written through to
    /// the shared transport; the one global swing also times the step
    /// sequencer clock, and that coupling is deliberate.
    pub fn apply_config(&mut self, update: ArpConfigUpdate, transport: &mut dyn Transport) {
        if let Some(pattern) = update.pattern {
            self.config.pattern = pattern;
        }
        if let Some(rate) = update.rate {
            self.config.rate = rate;
        }
        if let Some(octaves) = update.octaves {
            self.config.octaves = octaves.clamp(MIN_OCTAVES, MAX_OCTAVES);
            self.regenerate();
        }
        if let Some(swing) = update.swing {
            self.config.swing = swing.clamp(0.0, 1.0);
            transport.set_swing(self.config.swing, Subdivision::Eighth);
        }
    }

    /// One traversal of the expanded sequence in the configured pattern
    /// order.
    pub fn traversal(&self, rng: &mut impl Rng) -> Vec<Pitch> {
        self.config.pattern.traverse(&self.sequence, rng)
    }

    /// Rebuild the derived sequence: held notes sorted ascending by pitch
    /// (stable), then each octave layer transposed up 12 semitones more
    /// than the last.
    fn regenerate(&mut self) {
        let mut sorted = self.held.clone();
        sorted.sort_by_key(|pitch| pitch.midi());

        self.sequence.clear();
        for octave in 0..self.config.octaves {
            self.sequence
                .extend(sorted.iter().map(|pitch| pitch.transpose(octave * 12)));
        }
    }
}

impl Default for Arpeggiator {
    fn default() -> Self {
        Self::new()
    }
}
