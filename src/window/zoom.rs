//! Zoom factor stepping
//!
//! Manages the scale factor applied to page geometry. Steps are additive and
//! rounded to two decimals so repeated zooming never drifts (0.2 + 0.2 + ...).

/// Zoom state for the viewer
#[derive(Debug, Clone)]
pub struct Zoom {
    factor: f64,
    min: f64,
    max: f64,
    step: f64,
    /// Distance between touch points from the previous pinch sample
    last_pinch_distance: Option<f64>,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(Self::MIN_SCALE, Self::MAX_SCALE, Self::STEP)
    }
}

impl Zoom {
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f64 = 0.2;
    /// Maximum allowed zoom factor
    pub const MAX_SCALE: f64 = 2.0;
    /// Zoom in/out increment per step
    pub const STEP: f64 = 0.2;

    #[must_use]
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        let min = if min.is_finite() && min > 0.0 {
            min
        } else {
            Self::MIN_SCALE
        };
        let max = if max.is_finite() && max >= min {
            max
        } else {
            min.max(Self::MAX_SCALE)
        };
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            Self::STEP
        };
        Self {
            factor: 1.0_f64.clamp(min, max),
            min,
            max,
            step,
            last_pinch_distance: None,
        }
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Zoom in by one step, returns true if the factor changed
    pub fn step_in(&mut self) -> bool {
        self.set(self.factor + self.step)
    }

    /// Zoom out by one step, returns true if the factor changed
    pub fn step_out(&mut self) -> bool {
        self.set(self.factor - self.step)
    }

    /// Set an explicit factor, clamped and rounded
    pub fn set(&mut self, factor: f64) -> bool {
        let next = self.clamp_factor(factor);
        if (next - self.factor).abs() > f64::EPSILON {
            self.factor = next;
            true
        } else {
            false
        }
    }

    /// Back to 1.0 (new document)
    pub fn reset(&mut self) {
        self.factor = self.clamp_factor(1.0);
        self.last_pinch_distance = None;
    }

    /// Feed a two-finger distance sample; spreading zooms in, pinching zooms out.
    ///
    /// The first sample of a gesture only records the distance.
    pub fn pinch(&mut self, distance: f64) -> bool {
        let changed = match self.last_pinch_distance {
            Some(last) if last > 0.0 => {
                let ratio = distance / last;
                if ratio > 1.0 {
                    self.step_in()
                } else if ratio < 1.0 {
                    self.step_out()
                } else {
                    false
                }
            }
            _ => false,
        };
        self.last_pinch_distance = Some(distance);
        changed
    }

    /// Forget the previous pinch sample (gesture ended)
    pub fn end_pinch(&mut self) {
        self.last_pinch_distance = None;
    }

    /// Clamp factor to valid range, handling NaN/Inf
    #[must_use]
    pub fn clamp_factor(&self, factor: f64) -> f64 {
        if !factor.is_finite() {
            return self.factor;
        }
        let rounded = (factor * 100.0).round() / 100.0;
        rounded.clamp(self.min, self.max)
    }
}
