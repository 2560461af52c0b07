// Sequencer module - step grids and the tick-driven trigger engine

pub mod grid;
pub mod step_sequencer;

pub use grid::{StepGrid, STEP_COUNT};
pub use step_sequencer::StepSequencer;
