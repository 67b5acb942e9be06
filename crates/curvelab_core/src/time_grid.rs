use crate::error::{CurveError, CurveResult};
use crate::parameters::ParameterSpec;
use serde::{Deserialize, Serialize};

/// Sampling domain of a curve.
///
/// Invariants: `t_min < t_max`, `t_min <= t0 <= t_max` and `point_count >= 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub t_min: f64,
    pub t_max: f64,
    pub t0: f64,
    pub increment: f64,
    pub point_count: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            t_min: 0.0,
            t_max: 10.0,
            t0: 0.0,
            increment: 1.0,
            point_count: 2,
        }
    }
}

impl TimeGrid {
    pub fn new(t_min: f64, t_max: f64, point_count: usize) -> CurveResult<Self> {
        let grid = Self {
            t_min,
            t_max,
            t0: t_min,
            increment: if point_count > 1 {
                (t_max - t_min) / (point_count - 1) as f64
            } else {
                0.0
            },
            point_count,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Reads the grid from the reserved `t` parameter: the active bounds span the
    /// grid, the current value is the start time.
    pub fn from_spec(spec: &ParameterSpec) -> CurveResult<Self> {
        let grid = Self {
            t_min: spec.active_min,
            t_max: spec.active_max,
            t0: spec.value,
            increment: spec.increment,
            point_count: spec.sample_count,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> CurveResult<()> {
        if !(self.t_min.is_finite() && self.t_max.is_finite() && self.t0.is_finite()) {
            return Err(CurveError::invalid("Time grid bounds must be finite."));
        }
        if self.point_count < 2 {
            return Err(CurveError::invalid(format!(
                "Time grid needs at least 2 points, got {}.",
                self.point_count
            )));
        }
        if self.t_min >= self.t_max {
            return Err(CurveError::invalid(format!(
                "Time grid span [{}, {}] is empty.",
                self.t_min, self.t_max
            )));
        }
        if !(self.t_min <= self.t0 && self.t0 <= self.t_max) {
            return Err(CurveError::invalid(format!(
                "Time grid start {} lies outside [{}, {}].",
                self.t0, self.t_min, self.t_max
            )));
        }
        Ok(())
    }

    pub fn with_start(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    /// Moves the start time, keeping the grid unchanged on failure.
    pub fn set_start(&mut self, t0: f64) -> CurveResult<()> {
        self.with_start(t0).validate()?;
        self.t0 = t0;
        Ok(())
    }

    /// `point_count` evenly spaced samples from `t_min` to `t_max`, both inclusive.
    pub fn samples(&self) -> Vec<f64> {
        let n = self.point_count;
        let span = self.t_max - self.t_min;
        let last = (n - 1) as f64;
        (0..n)
            .map(|i| {
                if i + 1 == n {
                    self.t_max
                } else {
                    self.t_min + span * (i as f64 / last)
                }
            })
            .collect()
    }
}
