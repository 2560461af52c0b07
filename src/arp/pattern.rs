// Traversal orders for the arpeggiator pattern player

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Pitch;

/// Order in which the pattern player walks the expanded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArpPattern {
    #[default]
    Up,
    Down,
    UpDown,
    Random,
}

impl ArpPattern {
    /// One full traversal of `sequence` in this pattern's order.
    ///
    /// `UpDown` walks forward then back without repeating either endpoint;
    /// `Random` draws a fresh uniform permutation per traversal.
    pub fn traverse(self, sequence: &[Pitch], rng: &mut impl Rng) -> Vec<Pitch> {
        match self {
            ArpPattern::Up => sequence.to_vec(),
            ArpPattern::Down => {
                let mut order = sequence.to_vec();
                order.reverse();
                order
            }
            ArpPattern::UpDown => {
                let mut order = sequence.to_vec();
                if sequence.len() > 2 {
                    order.extend(sequence[1..sequence.len() - 1].iter().rev().copied());
                }
                order
            }
            ArpPattern::Random => {
                let mut order = sequence.to_vec();
                order.shuffle(rng);
                order
            }
        }
    }
}
