// Step grid - one fixed row of 16 on/off slots per track

use serde::{Deserialize, Serialize};

/// Steps per pattern cycle.
pub const STEP_COUNT: usize = 16;

/// A fixed row of 16 on/off steps.
///
/// Grids are `Copy` and always replaced wholesale, so a clock tick observes
/// either the old or the new generation of a track's grid, never a partial
/// mix of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepGrid([bool; STEP_COUNT]);

impl StepGrid {
    pub fn new(steps: [bool; STEP_COUNT]) -> Self {
        Self(steps)
    }

    /// Grid with every step set to `on`.
    pub fn filled(on: bool) -> Self {
        Self([on; STEP_COUNT])
    }

    /// Read one step; the index wraps modulo 16.
    pub fn get(&self, step: usize) -> bool {
        self.0[step % STEP_COUNT]
    }

    pub fn steps(&self) -> &[bool; STEP_COUNT] {
        &self.0
    }

    /// A copy of this grid with one step changed. Callers swap the whole
    /// grid back in rather than mutating in place.
    pub fn with_step(self, step: usize, on: bool) -> Self {
        let mut steps = self.0;
        steps[step % STEP_COUNT] = on;
        Self(steps)
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|on| *on)
    }
}

impl Default for StepGrid {
    fn default() -> Self {
        Self([false; STEP_COUNT])
    }
}

impl From<[bool; STEP_COUNT]> for StepGrid {
    fn from(steps: [bool; STEP_COUNT]) -> Self {
        Self(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_is_silent() {
        let grid = StepGrid::default();
        assert!(grid.is_empty());
        for step in 0..STEP_COUNT {
            assert!(!grid.get(step));
        }
    }

    #[test]
    fn test_with_step_leaves_original_untouched() {
        let original = StepGrid::default();
        let updated = original.with_step(3, true);

        assert!(!original.get(3));
        assert!(updated.get(3));
        assert!(!updated.is_empty());
    }

    #[test]
    fn test_step_index_wraps() {
        let grid = StepGrid::default().with_step(0, true);
        assert!(grid.get(16));
        assert!(grid.get(32));
        assert!(!grid.get(17));
    }

    #[test]
    fn test_grid_serializes_as_plain_array() {
        let grid = StepGrid::default().with_step(0, true);
        let json = serde_json::to_string(&grid).unwrap();
        assert!(json.starts_with("[true,false"));

        let back: StepGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }
}
