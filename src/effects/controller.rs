// Momentary/lockable effect state machine
//
// Idle -> press -> Active: the effect engages and a lock window opens.
// Releasing inside the window reverts; holding past it latches the effect
// on (Locked), and the next press unlocks. Each effect id runs its own
// independent machine.

use std::rc::Rc;
use std::time::Duration;

use crate::backend::EffectsRack;
use crate::clock::Clock;
use crate::types::EffectId;

use super::profile::profile;

/// How long a press must be held before the effect latches on.
pub const LOCK_HOLD: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Latch {
    Idle,
    Held { since: Duration },
    Locked,
}

/// Snapshot of one effect's state for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectStatus {
    pub active: bool,
    pub locked: bool,
}

pub struct EffectController {
    clock: Rc<dyn Clock>,
    latches: [Latch; EffectId::COUNT],
}

impl EffectController {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            latches: [Latch::Idle; EffectId::COUNT],
        }
    }

    pub fn press(&mut self, id: EffectId, rack: &mut dyn EffectsRack) {
        match self.promoted(id) {
            Latch::Idle => {
                (profile(id).engage)(rack);
                self.latches[id.index()] = Latch::Held {
                    since: self.clock.now(),
                };
            }
            // Already down; nothing to do.
            Latch::Held { .. } => {}
            Latch::Locked => {
                (profile(id).disengage)(rack);
                self.latches[id.index()] = Latch::Idle;
            }
        }
    }

    pub fn release(&mut self, id: EffectId, rack: &mut dyn EffectsRack) {
        match self.promoted(id) {
            Latch::Held { .. } => {
                (profile(id).disengage)(rack);
                self.latches[id.index()] = Latch::Idle;
            }
            // A locked effect holds through the release that follows the
            // latch point; an idle release is a no-op.
            Latch::Idle => {}
            Latch::Locked => {
                self.latches[id.index()] = Latch::Locked;
            }
        }
    }

    pub fn status(&self, id: EffectId) -> EffectStatus {
        match self.promoted(id) {
            Latch::Idle => EffectStatus {
                active: false,
                locked: false,
            },
            Latch::Held { .. } => EffectStatus {
                active: true,
                locked: false,
            },
            Latch::Locked => EffectStatus {
                active: true,
                locked: true,
            },
        }
    }

    /// The latch with lock promotion applied: a press held past `LOCK_HOLD`
    /// is Locked no matter when we next look at it. Promotion is evaluated
    /// against the injected clock rather than a background timer, so a
    /// stale expiry can never lock an effect that has already gone idle.
    fn promoted(&self, id: EffectId) -> Latch {
        match self.latches[id.index()] {
            Latch::Held { since } if self.clock.now().saturating_sub(since) >= LOCK_HOLD => {
                Latch::Locked
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum RackCall {
        Set(EffectId, f32),
        Ramp(f32, f32),
    }

    #[derive(Default)]
    struct MockRack {
        calls: Vec<RackCall>,
    }

    impl EffectsRack for MockRack {
        fn set_effect(&mut self, effect: EffectId, intensity: f32) {
            self.calls.push(RackCall::Set(effect, intensity));
        }
        fn ramp_filter_cutoff(&mut self, cutoff_hz: f32, ramp_secs: f32) {
            self.calls.push(RackCall::Ramp(cutoff_hz, ramp_secs));
        }
    }

    fn controller() -> (EffectController, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        (EffectController::new(clock.clone()), clock)
    }

    #[test]
    fn test_short_press_reverts() {
        let (mut fx, clock) = controller();
        let mut rack = MockRack::default();

        fx.press(EffectId::Delay, &mut rack);
        assert!(fx.status(EffectId::Delay).active);

        clock.advance(Duration::from_millis(1000));
        fx.release(EffectId::Delay, &mut rack);

        let status = fx.status(EffectId::Delay);
        assert!(!status.active);
        assert!(!status.locked);
        assert_eq!(
            rack.calls,
            vec![
                RackCall::Set(EffectId::Delay, 0.5),
                RackCall::Set(EffectId::Delay, 0.0),
            ]
        );
    }

    #[test]
    fn test_long_hold_locks() {
        let (mut fx, clock) = controller();
        let mut rack = MockRack::default();

        fx.press(EffectId::Reverb, &mut rack);
        clock.advance(LOCK_HOLD);

        let status = fx.status(EffectId::Reverb);
        assert!(status.active);
        assert!(status.locked);

        // The release after the latch point keeps the effect engaged.
        fx.release(EffectId::Reverb, &mut rack);
        assert!(fx.status(EffectId::Reverb).active);
        assert_eq!(rack.calls, vec![RackCall::Set(EffectId::Reverb, 0.5)]);
    }

    #[test]
    fn test_press_unlocks_a_locked_effect() {
        let (mut fx, clock) = controller();
        let mut rack = MockRack::default();

        fx.press(EffectId::Stutter, &mut rack);
        clock.advance(Duration::from_millis(3500));
        fx.release(EffectId::Stutter, &mut rack);
        assert!(fx.status(EffectId::Stutter).locked);

        fx.press(EffectId::Stutter, &mut rack);
        let status = fx.status(EffectId::Stutter);
        assert!(!status.active);
        assert!(!status.locked);
        assert_eq!(
            rack.calls,
            vec![
                RackCall::Set(EffectId::Stutter, 1.0),
                RackCall::Set(EffectId::Stutter, 0.0),
            ]
        );
    }

    #[test]
    fn test_release_just_inside_window_reverts() {
        let (mut fx, clock) = controller();
        let mut rack = MockRack::default();

        fx.press(EffectId::Bitcrusher, &mut rack);
        clock.advance(LOCK_HOLD - Duration::from_millis(1));
        fx.release(EffectId::Bitcrusher, &mut rack);

        assert!(!fx.status(EffectId::Bitcrusher).active);
    }

    #[test]
    fn test_filter_ramps_are_asymmetric() {
        let (mut fx, clock) = controller();
        let mut rack = MockRack::default();

        fx.press(EffectId::Filter, &mut rack);
        clock.advance(Duration::from_millis(200));
        fx.release(EffectId::Filter, &mut rack);

        assert_eq!(
            rack.calls,
            vec![RackCall::Ramp(200.0, 0.5), RackCall::Ramp(20_000.0, 0.1)]
        );
    }

    #[test]
    fn test_effects_are_independent() {
        let (mut fx, clock) = controller();
        let mut rack = MockRack::default();

        fx.press(EffectId::Distortion, &mut rack);
        clock.advance(LOCK_HOLD);
        fx.press(EffectId::Delay, &mut rack);

        assert!(fx.status(EffectId::Distortion).locked);
        let delay = fx.status(EffectId::Delay);
        assert!(delay.active);
        assert!(!delay.locked);
    }

    #[test]
    fn test_idle_release_is_a_no_op() {
        let (mut fx, _clock) = controller();
        let mut rack = MockRack::default();

        fx.release(EffectId::Delay, &mut rack);
        assert!(rack.calls.is_empty());
        assert!(!fx.status(EffectId::Delay).active);
    }
}
