//! Gesture disambiguation
//!
//! Classifies the primitive stream of one input channel into long presses,
//! taps, double taps and two-point rotation drags. [`GestureMachine::step`]
//! is a pure transition: it consumes the current state and one input and
//! returns the next state with at most one outcome. The long-press timer is
//! a deadline held inside [`GestureState::ArmedSingle`]; leaving that state
//! drops the deadline, so a cancelled timer can never fire.

use std::time::Duration;

use furnish_input::{InputEvent, Primitive};
use glam::Vec2;

use crate::config::GestureConfig;

/// Baseline captured when a two-point drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSession {
    /// Midpoint x of the two contacts at drag start
    pub start_midpoint_x: f32,
    /// Selected object's yaw at drag start
    pub baseline_yaw: f32,
}

impl RotationSession {
    /// Absolute yaw for the current midpoint
    pub fn yaw_at(&self, midpoint_x: f32, sensitivity: f32) -> f32 {
        self.baseline_yaw + (midpoint_x - self.start_midpoint_x) * sensitivity
    }
}

/// Disambiguator states
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// One contact down, long-press deadline pending
    ArmedSingle {
        started_at: Duration,
        origin: Vec2,
        deadline: Duration,
    },
    /// Two contacts down over a selection
    Rotating(RotationSession),
    /// The current press was dropped; waits for every contact to lift
    Cancelled,
}

/// What a transition resolved to
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureOutcome {
    #[default]
    None,
    /// An armed press was dropped without resolving
    Cancelled,
    /// Press held past the long-press duration
    LongPress { point: Vec2 },
    /// Short tap with no recent predecessor
    Tap,
    /// Second short tap inside the double-tap window
    DoubleTap { point: Vec2 },
    RotationStarted,
    /// New absolute yaw for the selected object
    Rotate { yaw: f32 },
    RotationEnded,
}

/// One input to the machine
#[derive(Debug, Clone, Copy)]
pub enum GestureInput<'a> {
    Event(&'a InputEvent),
    /// Frame clock; fires a due long-press deadline
    Tick(Duration),
}

/// Facts about the world the machine depends on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureContext {
    /// Yaw of the selected object, if there is one
    pub selected_yaw: Option<f32>,
}

/// Gesture state plus the last short-tap time used for double taps
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureMachine {
    pub state: GestureState,
    pub last_tap: Option<Duration>,
}

impl GestureMachine {
    /// Apply one input and return the next machine with its outcome
    pub fn step(
        self,
        input: GestureInput<'_>,
        ctx: &GestureContext,
        config: &GestureConfig,
    ) -> (Self, GestureOutcome) {
        match input {
            GestureInput::Tick(now) => self.tick(now),
            GestureInput::Event(event) => self.event(event, ctx, config),
        }
    }

    fn with(self, state: GestureState, outcome: GestureOutcome) -> (Self, GestureOutcome) {
        (Self { state, ..self }, outcome)
    }

    fn tick(self, now: Duration) -> (Self, GestureOutcome) {
        match self.state {
            GestureState::ArmedSingle { origin, deadline, .. } if now >= deadline => {
                self.with(GestureState::Idle, GestureOutcome::LongPress { point: origin })
            }
            _ => (self, GestureOutcome::None),
        }
    }

    fn event(
        self,
        event: &InputEvent,
        ctx: &GestureContext,
        config: &GestureConfig,
    ) -> (Self, GestureOutcome) {
        // A second contact preempts anything single-point, due deadline or not
        if let Primitive::Press { .. } = event.primitive {
            if event.press_count() >= 2 {
                return self.second_contact(event, ctx);
            }
        }

        match self.state {
            GestureState::Idle | GestureState::Cancelled => self.idle(event, config),
            GestureState::ArmedSingle {
                origin, deadline, ..
            } => {
                if event.at >= deadline {
                    // The deadline passed before this event arrived
                    return self.with(GestureState::Idle, GestureOutcome::LongPress { point: origin });
                }
                self.armed(event, origin, config)
            }
            GestureState::Rotating(session) => self.rotating(event, session, ctx, config),
        }
    }

    fn second_contact(self, event: &InputEvent, ctx: &GestureContext) -> (Self, GestureOutcome) {
        match self.state {
            // A third contact ends the drag; lifting it does not resume the old baseline
            GestureState::Rotating(_) => {
                self.with(GestureState::Cancelled, GestureOutcome::RotationEnded)
            }
            GestureState::Cancelled if event.press_count() > 2 => (self, GestureOutcome::None),
            state => match (ctx.selected_yaw, event.midpoint()) {
                (Some(baseline_yaw), Some(midpoint)) if event.press_count() == 2 => {
                    let session = RotationSession {
                        start_midpoint_x: midpoint.x,
                        baseline_yaw,
                    };
                    self.with(GestureState::Rotating(session), GestureOutcome::RotationStarted)
                }
                _ => {
                    let outcome = if matches!(state, GestureState::ArmedSingle { .. }) {
                        GestureOutcome::Cancelled
                    } else {
                        GestureOutcome::None
                    };
                    self.with(GestureState::Cancelled, outcome)
                }
            },
        }
    }

    fn idle(self, event: &InputEvent, config: &GestureConfig) -> (Self, GestureOutcome) {
        match event.primitive {
            Primitive::Press { point } if event.press_count() == 1 => {
                let state = GestureState::ArmedSingle {
                    started_at: event.at,
                    origin: point,
                    deadline: event.at + config.long_press(),
                };
                self.with(state, GestureOutcome::None)
            }
            Primitive::Release if event.press_count() == 0 => {
                self.with(GestureState::Idle, GestureOutcome::None)
            }
            _ => (self, GestureOutcome::None),
        }
    }

    fn armed(self, event: &InputEvent, origin: Vec2, config: &GestureConfig) -> (Self, GestureOutcome) {
        match event.primitive {
            Primitive::Move => {
                let Some(point) = event.primary() else {
                    return (self, GestureOutcome::None);
                };
                let delta = (point - origin).abs();
                if delta.x > config.drag_threshold_px || delta.y > config.drag_threshold_px {
                    self.with(GestureState::Cancelled, GestureOutcome::Cancelled)
                } else {
                    (self, GestureOutcome::None)
                }
            }
            Primitive::Release => {
                let double = self
                    .last_tap
                    .is_some_and(|last| event.at.saturating_sub(last) < config.double_tap());
                let next = Self {
                    state: GestureState::Idle,
                    last_tap: Some(event.at),
                };
                if double {
                    (next, GestureOutcome::DoubleTap { point: origin })
                } else {
                    (next, GestureOutcome::Tap)
                }
            }
            Primitive::Press { .. } => (self, GestureOutcome::None),
        }
    }

    fn rotating(
        self,
        event: &InputEvent,
        session: RotationSession,
        ctx: &GestureContext,
        config: &GestureConfig,
    ) -> (Self, GestureOutcome) {
        match event.primitive {
            _ if event.press_count() < 2 => {
                self.with(GestureState::Idle, GestureOutcome::RotationEnded)
            }
            _ if event.press_count() > 2 => {
                self.with(GestureState::Cancelled, GestureOutcome::RotationEnded)
            }
            Primitive::Move => match (ctx.selected_yaw, event.midpoint()) {
                (Some(_), Some(midpoint)) => {
                    let yaw = session.yaw_at(midpoint.x, config.rotation_sensitivity);
                    (self, GestureOutcome::Rotate { yaw })
                }
                // Selection went away mid-drag
                _ => self.with(GestureState::Cancelled, GestureOutcome::RotationEnded),
            },
            _ => (self, GestureOutcome::None),
        }
    }
}

/// Owns a [`GestureMachine`] and its configuration
#[derive(Debug, Clone, Default)]
pub struct GestureDisambiguator {
    machine: GestureMachine,
    config: GestureConfig,
}

impl GestureDisambiguator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            machine: GestureMachine::default(),
            config,
        }
    }

    /// Feed one normalized input event
    pub fn handle(&mut self, event: &InputEvent, ctx: &GestureContext) -> GestureOutcome {
        self.apply(GestureInput::Event(event), ctx)
    }

    /// Advance the clock; fires a due long press
    pub fn tick(&mut self, now: Duration, ctx: &GestureContext) -> GestureOutcome {
        self.apply(GestureInput::Tick(now), ctx)
    }

    fn apply(&mut self, input: GestureInput<'_>, ctx: &GestureContext) -> GestureOutcome {
        let before = self.machine.state;
        let (machine, outcome) = self.machine.step(input, ctx, &self.config);
        self.machine = machine;

        if std::mem::discriminant(&before) != std::mem::discriminant(&machine.state) {
            log::debug!("Gesture {:?} -> {:?} ({:?})", before, machine.state, outcome);
        }
        outcome
    }

    pub fn state(&self) -> &GestureState {
        &self.machine.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Drop any in-flight gesture and the double-tap history
    pub fn reset(&mut self) {
        self.machine = GestureMachine::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn event(primitive: Primitive, contacts: &[(f32, f32)], at: u64) -> InputEvent {
        InputEvent {
            primitive,
            contacts: contacts.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
            at: ms(at),
        }
    }

    fn press(x: f32, y: f32, at: u64) -> InputEvent {
        event(Primitive::Press { point: Vec2::new(x, y) }, &[(x, y)], at)
    }

    fn release(at: u64) -> InputEvent {
        event(Primitive::Release, &[], at)
    }

    const NO_SELECTION: GestureContext = GestureContext { selected_yaw: None };
    const SELECTED: GestureContext = GestureContext {
        selected_yaw: Some(0.5),
    };

    #[test]
    fn test_press_arms_long_press() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(10.0, 10.0, 0), &NO_SELECTION);

        assert!(matches!(
            gestures.state(),
            GestureState::ArmedSingle { deadline, .. } if *deadline == ms(500)
        ));
    }

    #[test]
    fn test_tick_fires_long_press_once() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(10.0, 20.0, 0), &NO_SELECTION);

        assert_eq!(gestures.tick(ms(499), &NO_SELECTION), GestureOutcome::None);
        assert_eq!(
            gestures.tick(ms(500), &NO_SELECTION),
            GestureOutcome::LongPress { point: Vec2::new(10.0, 20.0) }
        );
        assert_eq!(gestures.tick(ms(600), &NO_SELECTION), GestureOutcome::None);
        assert_eq!(gestures.handle(&release(700), &NO_SELECTION), GestureOutcome::None);
    }

    #[test]
    fn test_late_release_resolves_as_long_press() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(1.0, 1.0, 0), &NO_SELECTION);

        assert_eq!(
            gestures.handle(&release(650), &NO_SELECTION),
            GestureOutcome::LongPress { point: Vec2::new(1.0, 1.0) }
        );
        assert_eq!(*gestures.state(), GestureState::Idle);
    }

    #[test]
    fn test_drag_beyond_threshold_cancels() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(100.0, 100.0, 0), &NO_SELECTION);

        let wander = event(Primitive::Move, &[(108.0, 95.0)], 50);
        assert_eq!(gestures.handle(&wander, &NO_SELECTION), GestureOutcome::None);

        let drag = event(Primitive::Move, &[(100.0, 111.0)], 80);
        assert_eq!(gestures.handle(&drag, &NO_SELECTION), GestureOutcome::Cancelled);

        // Neither a long press nor a tap follows
        assert_eq!(gestures.tick(ms(900), &NO_SELECTION), GestureOutcome::None);
        assert_eq!(gestures.handle(&release(950), &NO_SELECTION), GestureOutcome::None);
        assert_eq!(*gestures.state(), GestureState::Idle);
    }

    #[test]
    fn test_tap_then_double_tap() {
        let mut gestures = GestureDisambiguator::default();

        gestures.handle(&press(5.0, 5.0, 0), &NO_SELECTION);
        assert_eq!(gestures.handle(&release(80), &NO_SELECTION), GestureOutcome::Tap);

        gestures.handle(&press(6.0, 5.0, 200), &NO_SELECTION);
        assert_eq!(
            gestures.handle(&release(250), &NO_SELECTION),
            GestureOutcome::DoubleTap { point: Vec2::new(6.0, 5.0) }
        );
    }

    #[test]
    fn test_slow_taps_never_double() {
        let mut gestures = GestureDisambiguator::default();

        gestures.handle(&press(5.0, 5.0, 0), &NO_SELECTION);
        gestures.handle(&release(50), &NO_SELECTION);
        gestures.handle(&press(5.0, 5.0, 300), &NO_SELECTION);
        assert_eq!(gestures.handle(&release(350), &NO_SELECTION), GestureOutcome::Tap);
    }

    #[test]
    fn test_second_contact_starts_rotation_over_selection() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(100.0, 500.0, 0), &SELECTED);

        let second = event(
            Primitive::Press { point: Vec2::new(300.0, 500.0) },
            &[(100.0, 500.0), (300.0, 500.0)],
            40,
        );
        assert_eq!(gestures.handle(&second, &SELECTED), GestureOutcome::RotationStarted);

        let drag = event(Primitive::Move, &[(100.0, 500.0), (360.0, 500.0)], 60);
        match gestures.handle(&drag, &SELECTED) {
            GestureOutcome::Rotate { yaw } => assert_relative_eq!(yaw, 0.5 + 30.0 * 0.01),
            other => panic!("expected rotation, got {:?}", other),
        }

        // The preempted long press never fires
        assert_eq!(gestures.tick(ms(2000), &SELECTED), GestureOutcome::None);

        let lift = event(Primitive::Release, &[(360.0, 500.0)], 2100);
        assert_eq!(gestures.handle(&lift, &SELECTED), GestureOutcome::RotationEnded);
        assert_eq!(*gestures.state(), GestureState::Idle);
    }

    #[test]
    fn test_second_contact_after_deadline_still_preempts() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(100.0, 500.0, 0), &SELECTED);

        let second = event(
            Primitive::Press { point: Vec2::new(300.0, 500.0) },
            &[(100.0, 500.0), (300.0, 500.0)],
            700,
        );
        assert_eq!(gestures.handle(&second, &SELECTED), GestureOutcome::RotationStarted);
    }

    #[test]
    fn test_second_contact_without_selection_cancels() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(100.0, 500.0, 0), &NO_SELECTION);

        let second = event(
            Primitive::Press { point: Vec2::new(300.0, 500.0) },
            &[(100.0, 500.0), (300.0, 500.0)],
            40,
        );
        assert_eq!(gestures.handle(&second, &NO_SELECTION), GestureOutcome::Cancelled);
        assert_eq!(*gestures.state(), GestureState::Cancelled);

        let one_left = event(Primitive::Release, &[(100.0, 500.0)], 60);
        assert_eq!(gestures.handle(&one_left, &NO_SELECTION), GestureOutcome::None);
        assert_eq!(*gestures.state(), GestureState::Cancelled);

        assert_eq!(gestures.handle(&release(80), &NO_SELECTION), GestureOutcome::None);
        assert_eq!(*gestures.state(), GestureState::Idle);
    }

    #[test]
    fn test_rotation_ends_when_selection_disappears() {
        let mut gestures = GestureDisambiguator::default();
        let both = event(
            Primitive::Press { point: Vec2::new(300.0, 0.0) },
            &[(100.0, 0.0), (300.0, 0.0)],
            0,
        );
        gestures.handle(&both, &SELECTED);

        let drag = event(Primitive::Move, &[(100.0, 0.0), (320.0, 0.0)], 20);
        assert_eq!(gestures.handle(&drag, &NO_SELECTION), GestureOutcome::RotationEnded);
        assert_eq!(*gestures.state(), GestureState::Cancelled);
    }

    #[test]
    fn test_third_contact_ends_rotation() {
        let mut gestures = GestureDisambiguator::default();
        let both = event(
            Primitive::Press { point: Vec2::new(600.0, 0.0) },
            &[(400.0, 0.0), (600.0, 0.0)],
            0,
        );
        assert_eq!(gestures.handle(&both, &SELECTED), GestureOutcome::RotationStarted);

        let third = event(
            Primitive::Press { point: Vec2::new(0.0, 0.0) },
            &[(0.0, 0.0), (400.0, 0.0), (600.0, 0.0)],
            20,
        );
        assert_eq!(gestures.handle(&third, &SELECTED), GestureOutcome::RotationEnded);
        assert_eq!(*gestures.state(), GestureState::Cancelled);

        let drag = event(Primitive::Move, &[(0.0, 0.0), (400.0, 0.0), (601.0, 0.0)], 30);
        assert_eq!(gestures.handle(&drag, &SELECTED), GestureOutcome::None);

        // Back to two contacts by a release, the drag stays over
        let lift = event(Primitive::Release, &[(400.0, 0.0), (601.0, 0.0)], 40);
        assert_eq!(gestures.handle(&lift, &SELECTED), GestureOutcome::None);
        let drag = event(Primitive::Move, &[(400.0, 0.0), (700.0, 0.0)], 50);
        assert_eq!(gestures.handle(&drag, &SELECTED), GestureOutcome::None);
        assert_eq!(*gestures.state(), GestureState::Cancelled);
    }

    #[test]
    fn test_three_contacts_never_start_rotation() {
        let mut gestures = GestureDisambiguator::default();
        gestures.handle(&press(100.0, 0.0, 0), &NO_SELECTION);
        let second = event(
            Primitive::Press { point: Vec2::new(200.0, 0.0) },
            &[(100.0, 0.0), (200.0, 0.0)],
            10,
        );
        gestures.handle(&second, &NO_SELECTION);
        assert_eq!(*gestures.state(), GestureState::Cancelled);

        // A selection appearing does not turn a third contact into a drag
        let third = event(
            Primitive::Press { point: Vec2::new(300.0, 0.0) },
            &[(100.0, 0.0), (200.0, 0.0), (300.0, 0.0)],
            20,
        );
        assert_eq!(gestures.handle(&third, &SELECTED), GestureOutcome::None);
        assert_eq!(*gestures.state(), GestureState::Cancelled);
    }

    #[test]
    fn test_step_is_pure() {
        let machine = GestureMachine::default();
        let config = GestureConfig::default();
        let down = press(0.0, 0.0, 0);

        let (a, _) = machine.step(GestureInput::Event(&down), &NO_SELECTION, &config);
        let (b, _) = machine.step(GestureInput::Event(&down), &NO_SELECTION, &config);
        assert_eq!(a, b);
        assert_eq!(machine.state, GestureState::Idle);
    }

    #[test]
    fn test_yaw_is_unbounded() {
        let session = RotationSession {
            start_midpoint_x: 0.0,
            baseline_yaw: 6.0,
        };
        assert_relative_eq!(session.yaw_at(1000.0, 0.01), 16.0);
        assert_relative_eq!(session.yaw_at(-1000.0, 0.01), -4.0);
    }
}
