// Per-effect engage/disengage actions
//
// Dispatch table keyed by effect id: adding an effect means adding a row
// here, not growing a central conditional.

use crate::backend::EffectsRack;
use crate::types::EffectId;

/// Cutoff target while the filter sweep is engaged.
pub const FILTER_ENGAGED_HZ: f32 = 200.0;
/// Cutoff target with the filter open.
pub const FILTER_OPEN_HZ: f32 = 20_000.0;
pub const FILTER_ENGAGE_SECS: f32 = 0.5;
/// Release sweep is asymmetric: faster than the engage sweep.
pub const FILTER_RELEASE_SECS: f32 = 0.1;

/// How one effect is applied and reverted on the rack.
pub struct EffectProfile {
    pub id: EffectId,
    pub engage: fn(&mut dyn EffectsRack),
    pub disengage: fn(&mut dyn EffectsRack),
}

// Indexed by EffectId::index().
pub const PROFILES: [EffectProfile; EffectId::COUNT] = [
    EffectProfile {
        id: EffectId::Distortion,
        engage: |rack| rack.set_effect(EffectId::Distortion, 0.8),
        disengage: |rack| rack.set_effect(EffectId::Distortion, 0.0),
    },
    EffectProfile {
        id: EffectId::Bitcrusher,
        engage: |rack| rack.set_effect(EffectId::Bitcrusher, 1.0),
        disengage: |rack| rack.set_effect(EffectId::Bitcrusher, 0.0),
    },
    EffectProfile {
        id: EffectId::Delay,
        engage: |rack| rack.set_effect(EffectId::Delay, 0.5),
        disengage: |rack| rack.set_effect(EffectId::Delay, 0.0),
    },
    EffectProfile {
        id: EffectId::Reverb,
        engage: |rack| rack.set_effect(EffectId::Reverb, 0.5),
        disengage: |rack| rack.set_effect(EffectId::Reverb, 0.0),
    },
    EffectProfile {
        id: EffectId::Filter,
        engage: |rack| rack.ramp_filter_cutoff(FILTER_ENGAGED_HZ, FILTER_ENGAGE_SECS),
        disengage: |rack| rack.ramp_filter_cutoff(FILTER_OPEN_HZ, FILTER_RELEASE_SECS),
    },
    EffectProfile {
        id: EffectId::Stutter,
        engage: |rack| rack.set_effect(EffectId::Stutter, 1.0),
        disengage: |rack| rack.set_effect(EffectId::Stutter, 0.0),
    },
];

pub fn profile(id: EffectId) -> &'static EffectProfile {
    &PROFILES[id.index()]
}
