// Effects module - momentary/lockable performance effects

pub mod controller;
pub mod profile;

pub use controller::{EffectController, EffectStatus, LOCK_HOLD};
pub use profile::{profile, EffectProfile};
