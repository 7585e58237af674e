//! Cross-faded regeneration of a layer's buffer.
//!
//! A transition owns the outgoing buffer and the freshly rasterized
//! replacement and, on its own 100 Hz schedule, produces a new blended
//! buffer per step. Each blend is a whole new frame that the owner swaps in
//! wholesale, so the compositor only ever reads fully-formed buffers.

use crate::animation::timer::PeriodicTimer;
use crate::foundation::core::Frame;
use crate::foundation::error::ScatterwallResult;
use crate::render::composite::over_in_place;

/// Cross-fade step rate.
pub const TRANSITION_TICK_MS: f64 = 10.0;

/// Number of fade positions; alpha advances in steps of `1 / ALPHA_STEPS`.
const ALPHA_STEPS: u32 = 100;

/// An in-flight cross-fade between a layer's old and fresh buffers.
pub struct RegenerationTransition {
    old: Frame,
    fresh: Frame,
    /// Fade position as an integer step so repeated increments stay exact:
    /// alpha is `step / ALPHA_STEPS`, starting at step 1 (0.01).
    step: u32,
    timer: PeriodicTimer,
}

impl RegenerationTransition {
    /// Begin a cross-fade from `old` to `fresh` starting at `start_ms`.
    pub fn new(old: Frame, fresh: Frame, start_ms: f64) -> Self {
        Self {
            old,
            fresh,
            step: 1,
            timer: PeriodicTimer::new(TRANSITION_TICK_MS, start_ms),
        }
    }

    /// Next step due time; `None` once the fade has been finished.
    pub fn next_due_ms(&self) -> Option<f64> {
        self.timer.next_due_ms()
    }

    /// Fire the step timer if due at `now_ms`.
    pub fn fire_if_due(&mut self, now_ms: f64) -> bool {
        self.timer.fire_if_due(now_ms)
    }

    /// Whether the fade has run to completion.
    pub fn is_complete(&self) -> bool {
        self.step >= ALPHA_STEPS
    }

    /// Current fade position in `[0.01, 1.0]`.
    pub fn alpha(&self) -> f32 {
        self.step as f32 / ALPHA_STEPS as f32
    }

    /// Produce the next blended buffer: old at `1 - alpha`, fresh at
    /// `alpha`, then advance one step.
    pub fn blend_step(&mut self) -> ScatterwallResult<Frame> {
        let alpha = self.alpha();
        let mut blend = Frame::transparent(self.old.size());
        over_in_place(&mut blend.data, &self.old.data, 1.0 - alpha)?;
        over_in_place(&mut blend.data, &self.fresh.data, alpha)?;
        self.step += 1;
        Ok(blend)
    }

    /// Consume the transition, yielding the fresh buffer exactly.
    pub fn into_fresh(self) -> Frame {
        self.fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::SurfaceSize;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Frame {
        let mut f = Frame::transparent(SurfaceSize::new(w, h).unwrap());
        for chunk in f.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        f
    }

    #[test]
    fn alpha_increases_monotonically_and_terminates() {
        let old = solid(2, 2, [255, 0, 0, 255]);
        let fresh = solid(2, 2, [0, 0, 255, 255]);
        let mut tr = RegenerationTransition::new(old, fresh.clone(), 0.0);

        assert!((tr.alpha() - 0.01).abs() < 1e-6);
        let mut last = 0.0f32;
        let mut steps = 0;
        while !tr.is_complete() {
            assert!(tr.alpha() > last);
            last = tr.alpha();
            tr.blend_step().unwrap();
            steps += 1;
            assert!(steps <= 200, "cross-fade failed to terminate");
        }
        assert_eq!(steps, 99);
        assert_eq!(tr.alpha(), 1.0);
        assert_eq!(tr.into_fresh(), fresh);
    }

    #[test]
    fn early_blend_is_mostly_the_old_buffer() {
        let old = solid(1, 1, [200, 0, 0, 255]);
        let fresh = solid(1, 1, [0, 200, 0, 255]);
        let mut tr = RegenerationTransition::new(old, fresh, 0.0);
        let blend = tr.blend_step().unwrap();
        assert!(blend.data[0] > 150);
        assert!(blend.data[1] < 30);
    }

    #[test]
    fn late_blend_is_mostly_the_fresh_buffer() {
        let old = solid(1, 1, [200, 0, 0, 255]);
        let fresh = solid(1, 1, [0, 200, 0, 255]);
        let mut tr = RegenerationTransition::new(old, fresh, 0.0);
        let mut blend = tr.blend_step().unwrap();
        while !tr.is_complete() {
            blend = tr.blend_step().unwrap();
        }
        assert!(blend.data[1] > 150);
        assert!(blend.data[0] < 30);
    }

    #[test]
    fn step_timer_runs_at_its_own_rate() {
        let old = solid(1, 1, [0, 0, 0, 255]);
        let fresh = solid(1, 1, [255, 255, 255, 255]);
        let mut tr = RegenerationTransition::new(old, fresh, 0.0);
        assert!(!tr.fire_if_due(9.0));
        assert!(tr.fire_if_due(10.0));
        assert!(tr.fire_if_due(20.0));
        assert!(!tr.fire_if_due(25.0));
    }
}
