//! Dynamical-system families and their right-hand sides.

use crate::binding::{ParameterBinding, ParameterMap};
use crate::error::{CurveError, CurveResult};
use crate::traits::DynamicalSystem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OdeFamily {
    /// State `(x, v)`: dx/dt = v, dv/dt = −k²·x
    Oscillator,
    /// State `(S, I, R)`
    Sir,
    /// State `(x, y)`: prey and predator
    LotkaVolterra,
    /// State `(x, y, z)`
    Lorenz,
    /// State `(x, y, vx, vy)` of the relative coordinate
    TwoBodyGravity,
}

impl OdeFamily {
    pub fn display_name(self) -> &'static str {
        match self {
            OdeFamily::Oscillator => "Oscillator",
            OdeFamily::Sir => "SIR epidemic model",
            OdeFamily::LotkaVolterra => "Lotka–Volterra equations",
            OdeFamily::Lorenz => "Lorenz attractor",
            OdeFamily::TwoBodyGravity => "Two-body gravity",
        }
    }

    pub fn equation_count(self) -> usize {
        match self {
            OdeFamily::Oscillator | OdeFamily::LotkaVolterra => 2,
            OdeFamily::Sir | OdeFamily::Lorenz => 3,
            OdeFamily::TwoBodyGravity => 4,
        }
    }

    pub fn parameter_map(self) -> ParameterMap {
        use ParameterBinding as B;
        let bindings = match self {
            OdeFamily::Oscillator => vec![
                B::time(),
                B::coefficient("k", 0),
                B::initial("x0", 0),
                B::initial("v0", 1),
            ],
            OdeFamily::Sir => vec![
                B::time(),
                B::coefficient("β", 0),
                B::coefficient("γ", 1),
                B::initial("S0", 0),
                B::initial("I0", 1),
                B::initial("R0", 2),
            ],
            OdeFamily::LotkaVolterra => vec![
                B::time(),
                B::coefficient("α", 0),
                B::coefficient("β", 1),
                B::coefficient("γ", 2),
                B::coefficient("δ", 3),
                B::initial("x0", 0),
                B::initial("y0", 1),
            ],
            OdeFamily::Lorenz => vec![
                B::time(),
                B::coefficient("σ", 0),
                B::coefficient("ρ", 1),
                B::coefficient("β", 2),
                B::initial("x0", 0),
                B::initial("y0", 1),
                B::initial("z0", 2),
            ],
            OdeFamily::TwoBodyGravity => vec![
                B::time(),
                B::coefficient("m1", 0),
                B::coefficient("m2", 1),
                B::coefficient("G", 2).or(1.0),
                B::initial("x0", 0),
                B::initial("y0", 1),
                B::initial("vx0", 2),
                B::initial("vy0", 3),
            ],
        };
        ParameterMap::new(bindings)
    }

    /// Writes dState/dt for `state` into `out`.
    pub fn rhs(self, c: &[f64], state: &[f64], out: &mut [f64]) -> CurveResult<()> {
        match self {
            OdeFamily::Oscillator => {
                let k = c[0];
                out[0] = state[1];
                out[1] = -k * k * state[0];
            }
            OdeFamily::Sir => {
                let (beta, gamma) = (c[0], c[1]);
                let (s, i) = (state[0], state[1]);
                let infection = beta * i * s;
                let recovery = gamma * i;
                out[0] = -infection;
                out[1] = infection - recovery;
                out[2] = recovery;
            }
            OdeFamily::LotkaVolterra => {
                let (alpha, beta, gamma, delta) = (c[0], c[1], c[2], c[3]);
                let (x, y) = (state[0], state[1]);
                out[0] = alpha * x - beta * x * y;
                out[1] = -gamma * y + delta * x * y;
            }
            OdeFamily::Lorenz => {
                let (sigma, rho, beta) = (c[0], c[1], c[2]);
                let (x, y, z) = (state[0], state[1], state[2]);
                out[0] = sigma * (y - x);
                out[1] = x * (rho - z) - y;
                out[2] = x * y - beta * z;
            }
            OdeFamily::TwoBodyGravity => {
                let (m1, m2, g) = (c[0], c[1], c[2]);
                let (x, y) = (state[0], state[1]);
                let r = x.hypot(y);
                if r == 0.0 {
                    return Err(CurveError::domain(
                        "two-body separation is zero; gravitational force is singular",
                    ));
                }
                let pull = g * (m1 + m2) / (r * r * r);
                out[0] = state[2];
                out[1] = state[3];
                out[2] = -pull * x;
                out[3] = -pull * y;
            }
        }
        Ok(())
    }

    /// Borrows `coefficients` as an integrable system.
    pub fn system(self, coefficients: &[f64]) -> OdeSystem<'_> {
        OdeSystem {
            family: self,
            coefficients,
        }
    }
}

/// An ODE family bound to concrete coefficients.
pub struct OdeSystem<'a> {
    family: OdeFamily,
    coefficients: &'a [f64],
}

impl DynamicalSystem<f64> for OdeSystem<'_> {
    fn dimension(&self) -> usize {
        self.family.equation_count()
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) -> CurveResult<()> {
        self.family.rhs(self.coefficients, x, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(family: OdeFamily, c: &[f64], state: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; family.equation_count()];
        family.rhs(c, state, &mut out).expect("rhs");
        out
    }

    #[test]
    fn oscillator_rhs() {
        assert_eq!(eval(OdeFamily::Oscillator, &[2.0], &[1.0, 3.0]), vec![3.0, -4.0]);
    }

    #[test]
    fn sir_derivatives_sum_to_zero() {
        let d = eval(OdeFamily::Sir, &[0.3, 0.1], &[0.9, 0.1, 0.0]);
        assert!((d[0] + d[1] + d[2]).abs() < 1e-15);
        assert!((d[0] + 0.027).abs() < 1e-12);
    }

    #[test]
    fn lotka_volterra_fixed_point_is_stationary() {
        let d = eval(OdeFamily::LotkaVolterra, &[1.0, 1.0, 1.0, 1.0], &[1.0, 1.0]);
        assert_eq!(d, vec![0.0, 0.0]);
    }

    #[test]
    fn lorenz_rhs() {
        let d = eval(OdeFamily::Lorenz, &[10.0, 28.0, 8.0 / 3.0], &[1.0, 1.0, 1.0]);
        assert_eq!(d[0], 0.0);
        assert_eq!(d[1], 26.0);
        assert!((d[2] - (1.0 - 8.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn two_body_pulls_towards_origin() {
        let d = eval(
            OdeFamily::TwoBodyGravity,
            &[1.0, 1.0, 1.0],
            &[2.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(d[0], 0.0);
        assert_eq!(d[1], 1.0);
        assert!((d[2] + 0.5).abs() < 1e-12);
        assert_eq!(d[3], 0.0);
    }

    #[test]
    fn two_body_zero_separation_is_domain_error() {
        let mut out = [0.0; 4];
        let err = OdeFamily::TwoBodyGravity
            .rhs(&[1.0, 1.0, 1.0], &[0.0, 0.0, 1.0, 0.0], &mut out)
            .expect_err("singular");
        assert!(matches!(err, CurveError::Domain { .. }));
    }

    #[test]
    fn parameter_maps_cover_every_equation() {
        for family in [
            OdeFamily::Oscillator,
            OdeFamily::Sir,
            OdeFamily::LotkaVolterra,
            OdeFamily::Lorenz,
            OdeFamily::TwoBodyGravity,
        ] {
            let map = family.parameter_map();
            let initial = map
                .bindings()
                .iter()
                .filter(|b| matches!(b.slot, crate::binding::Slot::Initial(_)))
                .count();
            assert_eq!(initial, family.equation_count(), "{:?}", family);
        }
    }
}
