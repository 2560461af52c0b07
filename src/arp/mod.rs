// Arpeggiator module - held notes, octave expansion, traversal patterns

pub mod arpeggiator;
pub mod pattern;

pub use arpeggiator::{ArpConfig, ArpConfigUpdate, Arpeggiator, MAX_OCTAVES, MIN_OCTAVES};
pub use pattern::ArpPattern;
