//! Span integration on top of the explicit steppers.
//!
//! `integrate` is the only entry point the curve engine uses: given a span, an
//! initial state and a list of evaluation times it returns the state at exactly
//! those times. Adaptive mode controls the local error by step doubling.

use crate::error::{CurveError, CurveResult};
use crate::solvers::{Tsit5, RK4};
use crate::traits::{DynamicalSystem, Steppable};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepperKind {
    Rk4,
    Tsit5,
}

impl StepperKind {
    fn build(self, dim: usize) -> InternalStepper {
        match self {
            StepperKind::Rk4 => InternalStepper::Rk4(RK4::new(dim)),
            StepperKind::Tsit5 => InternalStepper::Tsit5(Tsit5::new(dim)),
        }
    }
}

enum InternalStepper {
    Rk4(RK4<f64>),
    Tsit5(Tsit5<f64>),
}

impl InternalStepper {
    fn order(&self) -> i32 {
        match self {
            InternalStepper::Rk4(s) => s.order(),
            InternalStepper::Tsit5(s) => s.order(),
        }
    }

    fn step(
        &mut self,
        system: &impl DynamicalSystem<f64>,
        t: &mut f64,
        state: &mut [f64],
        dt: f64,
    ) -> CurveResult<()> {
        match self {
            InternalStepper::Rk4(s) => s.step(system, t, state, dt),
            InternalStepper::Tsit5(s) => s.step(system, t, state, dt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    pub stepper: StepperKind,
    /// When false every step has length `step_size` (clipped to evaluation times).
    pub adaptive: bool,
    /// Initial step for adaptive mode, the fixed step otherwise.
    pub step_size: f64,
    pub rtol: f64,
    pub atol: f64,
    pub min_step: f64,
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            stepper: StepperKind::Tsit5,
            adaptive: true,
            step_size: 1e-2,
            rtol: 1e-8,
            atol: 1e-10,
            min_step: 1e-12,
            max_steps: 1_000_000,
        }
    }
}

impl IntegratorSettings {
    pub fn validate(&self) -> CurveResult<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(CurveError::invalid("step_size must be positive and finite."));
        }
        if self.max_steps == 0 {
            return Err(CurveError::invalid("max_steps must be greater than zero."));
        }
        if self.adaptive {
            if !(self.rtol > 0.0 || self.atol > 0.0) || self.rtol < 0.0 || self.atol < 0.0 {
                return Err(CurveError::invalid(
                    "rtol and atol must be non-negative and not both zero.",
                ));
            }
            if !(self.min_step > 0.0) || self.min_step > self.step_size {
                return Err(CurveError::invalid(
                    "min_step must be positive and not larger than step_size.",
                ));
            }
        }
        Ok(())
    }
}

/// States sampled at the requested evaluation times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub dimension: usize,
    pub times: Vec<f64>,
    /// Row-major: `states[i * dimension..(i + 1) * dimension]` is the state at `times[i]`.
    pub states: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn state(&self, index: usize) -> &[f64] {
        &self.states[index * self.dimension..(index + 1) * self.dimension]
    }
}

/// Integrates `system` from `y0` at `span.0` towards `span.1`, recording the
/// state at every time in `t_eval`.
///
/// `t_eval` must lie inside the span and be monotone in the direction of
/// integration; backward spans (`span.1 < span.0`) are supported.
pub fn integrate<S: DynamicalSystem<f64>>(
    system: &S,
    span: (f64, f64),
    y0: &[f64],
    t_eval: &[f64],
    settings: &IntegratorSettings,
) -> CurveResult<Trajectory> {
    settings.validate()?;
    let dim = system.dimension();
    if y0.len() != dim {
        return Err(CurveError::invalid(format!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            y0.len()
        )));
    }
    let (t0, t1) = span;
    if !t0.is_finite() || !t1.is_finite() {
        return Err(CurveError::invalid("Integration span must be finite."));
    }
    if !y0.iter().all(|v| v.is_finite()) {
        return Err(CurveError::integration("initial state is not finite"));
    }
    let direction = if t1 >= t0 { 1.0 } else { -1.0 };
    validate_eval_points(t0, t1, direction, t_eval)?;

    let mut stepper = settings.stepper.build(dim);
    let mut t = t0;
    let mut state = y0.to_vec();
    let mut h = settings.step_size;
    let mut attempts = 0usize;

    let mut times = Vec::with_capacity(t_eval.len());
    let mut states = Vec::with_capacity(t_eval.len() * dim);

    for &target in t_eval {
        while (target - t) * direction > 0.0 {
            attempts += 1;
            if attempts > settings.max_steps {
                return Err(CurveError::integration(format!(
                    "step budget of {} exhausted at t = {}",
                    settings.max_steps, t
                )));
            }

            let remaining = (target - t).abs();
            let clipped = h >= remaining;
            let magnitude = if clipped { remaining } else { h };
            let dt = direction * magnitude;

            if !settings.adaptive {
                let mut t_next = t;
                stepper.step(system, &mut t_next, &mut state, dt)?;
                if !state.iter().all(|v| v.is_finite()) {
                    return Err(CurveError::integration(format!(
                        "non-finite state after step to t = {}",
                        t_next
                    )));
                }
                t = if clipped { target } else { t_next };
                continue;
            }

            let (candidate, error) = doubled_step(&mut stepper, system, t, &state, dt, settings)?;
            let factor = step_factor(error, stepper.order());
            if error <= 1.0 {
                state = candidate;
                t = if clipped { target } else { t + dt };
                h = if clipped {
                    h.max(magnitude * factor)
                } else {
                    magnitude * factor
                };
            } else {
                h = magnitude * factor;
                if h < settings.min_step {
                    return Err(CurveError::integration(format!(
                        "step size underflow ({:e}) at t = {}",
                        h, t
                    )));
                }
            }
        }

        times.push(target);
        states.extend_from_slice(&state);
    }

    trace!(attempts, points = times.len(), "integration finished");

    Ok(Trajectory {
        dimension: dim,
        times,
        states,
    })
}

fn validate_eval_points(t0: f64, t1: f64, direction: f64, t_eval: &[f64]) -> CurveResult<()> {
    let slack = 1e-12 * t0.abs().max(t1.abs()).max(1.0);
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    let mut previous = t0;
    for &t in t_eval {
        if !t.is_finite() || t < lo - slack || t > hi + slack {
            return Err(CurveError::invalid(format!(
                "Evaluation time {} lies outside the span [{}, {}].",
                t, lo, hi
            )));
        }
        if (t - previous) * direction < 0.0 {
            return Err(CurveError::invalid(
                "Evaluation times must be monotone in the direction of integration.",
            ));
        }
        previous = t;
    }
    Ok(())
}

/// One full step against two half steps. Returns the two-half-step result and
/// the weighted RMS norm of the estimated local error (accept when <= 1).
fn doubled_step(
    stepper: &mut InternalStepper,
    system: &impl DynamicalSystem<f64>,
    t: f64,
    state: &[f64],
    dt: f64,
    settings: &IntegratorSettings,
) -> CurveResult<(Vec<f64>, f64)> {
    let mut full = state.to_vec();
    let mut t_full = t;
    stepper.step(system, &mut t_full, &mut full, dt)?;

    let mut halves = state.to_vec();
    let mut t_half = t;
    stepper.step(system, &mut t_half, &mut halves, dt * 0.5)?;
    stepper.step(system, &mut t_half, &mut halves, dt * 0.5)?;

    if !full.iter().chain(halves.iter()).all(|v| v.is_finite()) {
        return Ok((halves, f64::INFINITY));
    }

    let denom = 2f64.powi(stepper.order()) - 1.0;
    let mut sum = 0.0;
    for i in 0..state.len() {
        let err = (halves[i] - full[i]) / denom;
        let scale = settings.atol + settings.rtol * state[i].abs().max(halves[i].abs());
        let ratio = if scale > 0.0 { err / scale } else { f64::INFINITY };
        sum += ratio * ratio;
    }
    let norm = if state.is_empty() {
        0.0
    } else {
        (sum / state.len() as f64).sqrt()
    };
    Ok((halves, norm))
}

fn step_factor(error: f64, order: i32) -> f64 {
    if error == 0.0 {
        return 5.0;
    }
    if !error.is_finite() {
        return 0.2;
    }
    (0.9 * error.powf(-1.0 / f64::from(order + 1))).clamp(0.2, 5.0)
}
