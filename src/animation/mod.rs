use std::time::Duration;

use keyframe::EasingFunction;
use keyframe::functions::{EaseOutCubic, EaseOutQuad, Linear};

mod clock;
pub use clock::{Clock, get_monotonic_time};

use crate::common::config::{AnimationConfig, AnimationCurve};

/// Tween between two values, sampled on demand against a [`Clock`].
///
/// Nothing runs in the background: reading [`Animation::value`] evaluates the
/// curve at the clock's current time.
#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    start_time: Duration,
    clock: Clock,
    curve: Curve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
    EaseOutExpo,
}

impl Curve {
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => Linear.y(x),
            Curve::EaseOutQuad => EaseOutQuad.y(x),
            Curve::EaseOutCubic => EaseOutCubic.y(x),
            // Scaled so the curve reaches exactly 1 at the end.
            Curve::EaseOutExpo => (1. - 2f64.powf(-10. * x)) / (1. - 2f64.powi(-10)),
        }
    }
}

impl From<AnimationCurve> for Curve {
    fn from(value: AnimationCurve) -> Self {
        match value {
            AnimationCurve::Linear => Curve::Linear,
            AnimationCurve::EaseOutQuad => Curve::EaseOutQuad,
            AnimationCurve::EaseOutCubic => Curve::EaseOutCubic,
            AnimationCurve::EaseOutExpo => Curve::EaseOutExpo,
        }
    }
}

impl Animation {
    pub fn new(clock: Clock, from: f64, to: f64, config: &AnimationConfig) -> Self {
        let duration_ms = if config.off { 0 } else { u64::from(config.duration_ms) };
        Self::ease(clock, from, to, duration_ms, Curve::from(config.curve))
    }

    pub fn ease(clock: Clock, from: f64, to: f64, duration_ms: u64, curve: Curve) -> Self {
        Self {
            from,
            to,
            duration: Duration::from_millis(duration_ms),
            start_time: clock.now(),
            clock,
            curve,
        }
    }

    pub fn is_done(&self) -> bool {
        if self.clock.should_complete_instantly() {
            return true;
        }
        self.clock.now() >= self.start_time + self.duration
    }

    pub fn value(&self) -> f64 {
        if self.is_done() {
            return self.to;
        }

        let passed = self.clock.now().saturating_sub(self.start_time);
        let progress = (passed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0., 1.);
        self.from + (self.to - self.from) * self.curve.y(progress)
    }

    pub fn to(&self) -> f64 { self.to }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(clock: &Clock, from: f64, to: f64) -> Animation {
        Animation::ease(clock.clone(), from, to, 100, Curve::Linear)
    }

    #[test]
    fn samples_curve_against_clock() {
        let mut clock = Clock::with_time(Duration::from_millis(1000));
        let anim = linear(&clock, 0., 200.);
        assert_eq!(anim.value(), 0.);

        clock.set_unadjusted(Duration::from_millis(1050));
        assert!((anim.value() - 100.).abs() < 1e-9);
        assert!(!anim.is_done());

        clock.set_unadjusted(Duration::from_millis(1100));
        assert_eq!(anim.value(), 200.);
        assert!(anim.is_done());
    }

    #[test]
    fn off_config_completes_immediately() {
        let clock = Clock::with_time(Duration::ZERO);
        let config = AnimationConfig { off: true, ..Default::default() };
        let anim = Animation::new(clock, 3., 9., &config);
        assert!(anim.is_done());
        assert_eq!(anim.value(), 9.);
    }

    #[test]
    fn complete_instantly_short_circuits() {
        let mut clock = Clock::with_time(Duration::ZERO);
        let anim = linear(&clock, 0., 1.);
        clock.set_complete_instantly(true);
        assert_eq!(anim.value(), 1.);
    }

    #[test]
    fn expo_curve_does_not_jump_when_done() {
        let mut clock = Clock::with_time(Duration::ZERO);
        let anim = Animation::ease(clock.clone(), 0., 1000., 100, Curve::EaseOutExpo);
        clock.set_unadjusted(Duration::from_millis(99));
        let before = anim.value();
        clock.set_unadjusted(Duration::from_millis(100));
        assert!(anim.value() - before < 1.0, "{before}");
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        for curve in [Curve::Linear, Curve::EaseOutQuad, Curve::EaseOutCubic, Curve::EaseOutExpo] {
            assert!(curve.y(0.).abs() < 1e-9, "{curve:?}");
            assert!((curve.y(1.) - 1.).abs() < 1e-9, "{curve:?}");
        }
    }
}
