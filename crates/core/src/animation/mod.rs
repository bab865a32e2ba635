use serde::{Deserialize, Serialize};

use crate::timeline::{Generation, Scheduler};

/// Fraction in `[0, 1]`. Out-of-range input is clamped and NaN reads as 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Progress(f32);

impl Progress {
    pub const ZERO: Progress = Progress(0.0);
    pub const ONE: Progress = Progress(1.0);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl From<f32> for Progress {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Progress> for f32 {
    fn from(value: Progress) -> Self {
        value.0
    }
}

/// How the displayed value follows the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AnimationPolicy {
    /// Snap to the target immediately.
    None,
    /// Ease in-out from the displayed value to the target over `duration`
    /// seconds.
    Simple { duration: f64 },
    /// Sweep 0 -> 1 -> 0 linearly, one leg per `duration` seconds, until
    /// cancelled. The target is ignored while the loop runs.
    ForwardBackward { duration: f64 },
}

impl Default for AnimationPolicy {
    fn default() -> Self {
        AnimationPolicy::Simple { duration: 1.0 }
    }
}

impl AnimationPolicy {
    /// Timed policies without a usable duration behave like `None`.
    pub fn normalized(self) -> Self {
        match self {
            AnimationPolicy::Simple { duration } | AnimationPolicy::ForwardBackward { duration }
                if !(duration.is_finite() && duration > 0.0) =>
            {
                AnimationPolicy::None
            }
            other => other,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match *self {
            AnimationPolicy::None => None,
            AnimationPolicy::Simple { duration } | AnimationPolicy::ForwardBackward { duration } => {
                Some(duration)
            }
        }
    }
}

/// Quadratic ease-in-out over normalized time.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Curve {
    Linear,
    EaseInOut,
}

impl Curve {
    fn apply(self, t: f64) -> f64 {
        match self {
            Curve::Linear => t.clamp(0.0, 1.0),
            Curve::EaseInOut => ease_in_out(t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f32,
    to: f32,
    started_at: f64,
    duration: f64,
    curve: Curve,
}

impl Transition {
    /// Value at `now` and whether the transition has completed.
    fn sample(&self, now: f64) -> (f32, bool) {
        let t = (now - self.started_at) / self.duration;
        if t >= 1.0 {
            return (self.to, true);
        }
        let eased = self.curve.apply(t) as f32;
        (self.from + (self.to - self.from) * eased, false)
    }
}

/// Per-instance animation state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationState {
    /// Value currently on screen.
    pub displayed: Progress,
    /// Value requested by the host.
    pub target: Progress,
    /// Direction of the next forward/backward leg.
    pub forward: bool,
    pub running: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            displayed: Progress::ZERO,
            target: Progress::ZERO,
            forward: true,
            running: false,
        }
    }
}

/// Progress animation state machine shared by every indicator shape.
///
/// The controller never owns a timer. Callers pass the current time into
/// [`Self::set_target`], [`Self::start`] and [`Self::tick`]; the last one is
/// expected at frame cadence. Follow-up legs of the forward/backward loop are
/// queued on a [`Scheduler`] under the current [`Generation`], so bumping the
/// generation in [`Self::cancel`] turns every queued leg into a no-op.
#[derive(Debug)]
pub struct AnimationController {
    policy: AnimationPolicy,
    state: AnimationState,
    transition: Option<Transition>,
    legs: Scheduler,
    generation: Generation,
}

impl AnimationController {
    pub fn new(policy: AnimationPolicy) -> Self {
        Self {
            policy: policy.normalized(),
            state: AnimationState::default(),
            transition: None,
            legs: Scheduler::new(),
            generation: Generation::default(),
        }
    }

    pub fn policy(&self) -> AnimationPolicy {
        self.policy
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn displayed(&self) -> Progress {
        self.state.displayed
    }

    pub fn target(&self) -> Progress {
        self.state.target
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Swaps the policy. Anything in flight is cancelled; the displayed value
    /// stays where it is.
    pub fn set_policy(&mut self, policy: AnimationPolicy) {
        let policy = policy.normalized();
        if policy != self.policy {
            self.cancel();
            self.policy = policy;
        }
    }

    /// Stores the clamped target and reacts according to the policy.
    ///
    /// Returns the value to render right away when the policy snaps;
    /// timed policies report their values through [`Self::tick`].
    pub fn set_target(&mut self, value: f32, now: f64) -> Option<Progress> {
        self.state.target = Progress::new(value);
        self.follow_target(now)
    }

    /// Like [`Self::set_target`], but `animated == false` jumps straight to
    /// the target under any policy except a running forward/backward loop,
    /// which keeps ownership of the displayed value.
    pub fn set_progress(&mut self, value: f32, animated: bool, now: f64) -> Option<Progress> {
        if animated {
            return self.set_target(value, now);
        }

        self.state.target = Progress::new(value);
        if matches!(self.policy, AnimationPolicy::ForwardBackward { .. }) && self.state.running {
            return None;
        }
        Some(self.snap())
    }

    /// Begins producing values for the current target. Called when the host
    /// first displays the indicator.
    pub fn start(&mut self, now: f64) -> Option<Progress> {
        tracing::debug!(policy = ?self.policy, now, "starting animation");
        self.follow_target(now)
    }

    /// Stops every in-flight or perpetual transition. No tick produces a
    /// value afterwards until the controller is started again.
    pub fn cancel(&mut self) {
        if self.state.running {
            tracing::debug!(
                generation = self.generation.value(),
                displayed = self.state.displayed.get(),
                "cancelling animation"
            );
        }
        self.generation = self.generation.next();
        self.transition = None;
        self.legs.clear();
        self.state.running = false;
    }

    /// Advances the animation to `now`. Returns the displayed value whenever
    /// an animation is running, including the final value of a transition
    /// that completes during this tick.
    pub fn tick(&mut self, now: f64) -> Option<Progress> {
        if !self.state.running {
            return None;
        }

        self.run_due_legs(now);

        let Some(transition) = self.transition else {
            self.state.running = false;
            return None;
        };

        let (value, finished) = transition.sample(now);
        self.state.displayed = Progress::new(value);
        if finished && !matches!(self.policy, AnimationPolicy::ForwardBackward { .. }) {
            self.transition = None;
            self.state.running = false;
            tracing::trace!(value, "transition finished");
        }

        Some(self.state.displayed)
    }

    fn follow_target(&mut self, now: f64) -> Option<Progress> {
        match self.policy {
            AnimationPolicy::None => Some(self.snap()),
            AnimationPolicy::Simple { duration } => {
                // Restart from wherever the previous transition got to.
                let from = self.sample(now);
                self.state.displayed = from;
                if from == self.state.target {
                    self.transition = None;
                    self.state.running = false;
                    return Some(from);
                }

                self.transition = Some(Transition {
                    from: from.get(),
                    to: self.state.target.get(),
                    started_at: now,
                    duration,
                    curve: Curve::EaseInOut,
                });
                self.state.running = true;
                None
            }
            AnimationPolicy::ForwardBackward { duration } => {
                if !self.state.running {
                    tracing::debug!(duration, "starting forward/backward loop");
                    self.state.running = true;
                    self.begin_leg(now, duration);
                }
                None
            }
        }
    }

    fn snap(&mut self) -> Progress {
        self.transition = None;
        self.legs.clear();
        self.state.running = false;
        self.state.displayed = self.state.target;
        self.state.displayed
    }

    fn sample(&self, now: f64) -> Progress {
        match self.transition {
            Some(transition) => Progress::new(transition.sample(now).0),
            None => self.state.displayed,
        }
    }

    fn begin_leg(&mut self, at: f64, duration: f64) {
        let to = if self.state.forward { 1.0 } else { 0.0 };
        self.transition = Some(Transition {
            from: self.state.displayed.get(),
            to,
            started_at: at,
            duration,
            curve: Curve::Linear,
        });
        self.legs.schedule_after(at, duration, self.generation);
    }

    fn run_due_legs(&mut self, now: f64) {
        let AnimationPolicy::ForwardBackward { duration } = self.policy else {
            return;
        };

        while let Some(tick) = self.legs.pop_due(now, self.generation) {
            self.finish_leg();

            // After a long stall, jump over the legs that fully elapsed
            // instead of replaying them one by one.
            let mut due = tick.due;
            let skipped = ((now - due) / duration).floor();
            if skipped >= 1.0 {
                if skipped % 2.0 == 1.0 {
                    self.finish_leg();
                }
                due += skipped * duration;
            }

            self.begin_leg(due, duration);

            // Legs shorter than the float spacing at `due` cannot move the
            // deadline; leave the rest for the next tick.
            if self.legs.next_due().map_or(true, |next| next <= tick.due) {
                break;
            }
        }
    }

    fn finish_leg(&mut self) {
        self.state.displayed = if self.state.forward {
            Progress::ONE
        } else {
            Progress::ZERO
        };
        self.state.forward = !self.state.forward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn simple(duration: f64) -> AnimationController {
        AnimationController::new(AnimationPolicy::Simple { duration })
    }

    #[test]
    fn progress_clamps_on_write() {
        assert_eq!(Progress::new(-0.3).get(), 0.0);
        assert_eq!(Progress::new(1.7).get(), 1.0);
        assert_eq!(Progress::new(0.42).get(), 0.42);
        assert_eq!(Progress::new(f32::NAN).get(), 0.0);
        assert_eq!(Progress::new(f32::INFINITY).get(), 1.0);
    }

    #[test]
    fn progress_deserializes_through_clamp() {
        let value: Progress = serde_json::from_str("4.5").unwrap();
        assert_eq!(value, Progress::ONE);
    }

    #[test]
    fn set_target_stores_clamped_value() {
        let mut controller = simple(1.0);
        for (input, expected) in [(-0.3, 0.0), (1.7, 1.0), (0.42, 0.42)] {
            controller.set_target(input, 0.0);
            assert_eq!(controller.target().get(), expected);
        }
    }

    #[test]
    fn none_policy_snaps_without_ticks() {
        let mut controller = AnimationController::new(AnimationPolicy::None);
        let emitted = controller.set_target(0.6, 0.0);

        assert_eq!(emitted, Some(Progress::new(0.6)));
        assert_eq!(controller.displayed().get(), 0.6);
        assert!(!controller.is_running());
        assert_eq!(controller.tick(0.1), None);
    }

    #[test]
    fn zero_duration_behaves_like_none() {
        for policy in [
            AnimationPolicy::Simple { duration: 0.0 },
            AnimationPolicy::ForwardBackward { duration: -1.0 },
            AnimationPolicy::Simple {
                duration: f64::NAN,
            },
        ] {
            let mut controller = AnimationController::new(policy);
            assert_eq!(controller.policy(), AnimationPolicy::None);
            assert_eq!(controller.set_target(0.3, 0.0), Some(Progress::new(0.3)));
        }
    }

    #[test]
    fn simple_policy_eases_to_target() {
        let mut controller = simple(1.0);
        assert_eq!(controller.set_target(1.0, 0.0), None);

        let halfway = controller.tick(0.5).unwrap().get();
        assert!(halfway > 0.0 && halfway < 1.0);

        let early = controller.tick(0.1).unwrap().get();
        assert!(early < 0.1, "ease-in starts slowly, got {early}");

        let done = controller.tick(1.0).unwrap().get();
        assert!((done - 1.0).abs() < EPS);
        assert!(!controller.is_running());
        assert_eq!(controller.tick(1.5), None);
    }

    #[test]
    fn retarget_restarts_from_displayed_value() {
        let mut controller = simple(1.0);
        controller.set_target(1.0, 0.0);
        let midway = controller.tick(0.5).unwrap().get();

        controller.set_target(0.0, 0.5);
        assert_eq!(controller.displayed().get(), midway);

        // The new transition starts exactly where the old one was.
        let resumed = controller.tick(0.5).unwrap().get();
        assert!((resumed - midway).abs() < EPS);

        let done = controller.tick(1.5).unwrap().get();
        assert_eq!(done, 0.0);
    }

    #[test]
    fn retarget_without_tick_uses_interpolated_position() {
        let mut controller = simple(2.0);
        controller.set_target(1.0, 0.0);
        controller.set_target(0.5, 1.0);
        // Halfway through an ease in-out from 0 to 1 sits at 0.5.
        assert!((controller.displayed().get() - 0.5).abs() < EPS);
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-12);
        assert_eq!(ease_in_out(-3.0), 0.0);
    }

    #[test]
    fn forward_backward_oscillates_until_cancelled() {
        let d = 0.8;
        let mut controller = AnimationController::new(AnimationPolicy::ForwardBackward { duration: d });
        assert_eq!(controller.start(0.0), None);
        assert!(controller.is_running());

        let rising = controller.tick(d * 0.5).unwrap().get();
        assert!((rising - 0.5).abs() < EPS);
        assert!((controller.tick(d).unwrap().get() - 1.0).abs() < EPS);
        let falling = controller.tick(d * 1.25).unwrap().get();
        assert!((falling - 0.75).abs() < EPS);
        assert!(controller.tick(2.0 * d).unwrap().get().abs() < EPS);
        assert!((controller.tick(3.0 * d).unwrap().get() - 1.0).abs() < EPS);

        controller.cancel();
        let frozen = controller.displayed();
        for step in 1..20 {
            assert_eq!(controller.tick(3.0 * d + step as f64 * 0.1), None);
        }
        assert_eq!(controller.displayed(), frozen);
    }

    #[test]
    fn forward_backward_ignores_target_while_looping() {
        let mut controller = AnimationController::new(AnimationPolicy::ForwardBackward { duration: 1.0 });
        controller.start(0.0);
        controller.tick(0.5);

        assert_eq!(controller.set_target(0.1, 0.5), None);
        assert_eq!(controller.target().get(), 0.1);
        assert!((controller.tick(1.0).unwrap().get() - 1.0).abs() < EPS);

        assert_eq!(controller.set_progress(0.2, false, 1.0), None);
        assert!((controller.tick(1.5).unwrap().get() - 0.5).abs() < EPS);
    }

    #[test]
    fn forward_backward_catches_up_after_stall() {
        let mut controller = AnimationController::new(AnimationPolicy::ForwardBackward { duration: 1.0 });
        controller.start(0.0);

        // Legs end at 1 (up), 2 (down), 3 (up); 3.5 is halfway down again.
        let value = controller.tick(3.5).unwrap().get();
        assert!((value - 0.5).abs() < EPS);
        assert!(!controller.state().forward);
        assert!(controller.tick(4.0).unwrap().get().abs() < EPS);
    }

    #[test]
    fn forward_backward_with_tiny_duration_keeps_ticking() {
        let mut controller =
            AnimationController::new(AnimationPolicy::ForwardBackward { duration: 1e-14 });
        controller.start(0.0);

        for now in [1000.0, 1000.0, 2000.0] {
            let value = controller.tick(now).unwrap().get();
            assert!((0.0..=1.0).contains(&value));
        }
        assert!(controller.is_running());
    }

    #[test]
    fn cancel_invalidates_queued_legs() {
        let mut controller = AnimationController::new(AnimationPolicy::ForwardBackward { duration: 1.0 });
        controller.start(0.0);
        let before = controller.generation();

        controller.cancel();
        assert_ne!(controller.generation(), before);
        assert!(!controller.is_running());
        assert_eq!(controller.tick(5.0), None);

        // A fresh start resumes oscillating from where it stopped.
        controller.start(5.0);
        assert!(controller.tick(5.5).is_some());
    }

    #[test]
    fn unanimated_progress_snaps() {
        let mut controller = simple(1.0);
        controller.set_target(1.0, 0.0);
        controller.tick(0.3);

        assert_eq!(controller.set_progress(0.25, false, 0.3), Some(Progress::new(0.25)));
        assert!(!controller.is_running());
        assert_eq!(controller.tick(0.6), None);
    }

    #[test]
    fn switching_policy_cancels_in_flight_work() {
        let mut controller = simple(1.0);
        controller.set_target(1.0, 0.0);
        let displayed = controller.tick(0.5).unwrap();

        controller.set_policy(AnimationPolicy::None);
        assert!(!controller.is_running());
        assert_eq!(controller.displayed(), displayed);
        assert_eq!(controller.start(0.6), Some(Progress::ONE));
    }

    #[test]
    fn policy_round_trips_through_json() {
        let json = serde_json::to_string(&AnimationPolicy::ForwardBackward { duration: 2.0 }).unwrap();
        assert_eq!(json, r#"{"policy":"forward_backward","duration":2.0}"#);
        let none: AnimationPolicy = serde_json::from_str(r#"{"policy":"none"}"#).unwrap();
        assert_eq!(none, AnimationPolicy::None);
    }
}
