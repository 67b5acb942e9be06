//! Closed-form curve families: pure functions of `t` and their coefficients.

use crate::binding::{ParameterBinding, ParameterMap};
use crate::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    /// `(a·cos t, b·sin t)`
    Ellipse,
    /// `(a·cosh t·cos θ, a·sinh t·sin θ)`
    Hyperbola,
    /// `y = y0 + k·t`
    Linear,
    /// `y = y0 + a·(t − x0)²`
    Parabola,
    /// `y = A·sin(ω·t + α)`
    Sinusoid,
    /// `y = A·e^{k·t}`
    Exponential,
    /// Normal density with mean µ and deviation σ.
    Gaussian,
    /// `r = A·sin(n·t)`, `(r·cos t, r·sin t)`
    Rose,
}

impl Formula {
    pub fn display_name(self) -> &'static str {
        match self {
            Formula::Ellipse => "Ellipse",
            Formula::Hyperbola => "Hyperbola",
            Formula::Linear => "Linear",
            Formula::Parabola => "Parabola",
            Formula::Sinusoid => "Sine",
            Formula::Exponential => "Exponential",
            Formula::Gaussian => "Gaussian",
            Formula::Rose => "Rose",
        }
    }

    pub fn parameter_map(self) -> ParameterMap {
        use ParameterBinding as B;
        let bindings = match self {
            Formula::Ellipse => vec![B::time(), B::coefficient("a", 0), B::coefficient("b", 1)],
            Formula::Hyperbola => vec![B::time(), B::coefficient("a", 0), B::coefficient("θ", 1)],
            Formula::Linear => vec![B::time(), B::coefficient("y0", 0), B::coefficient("k", 1)],
            Formula::Parabola => vec![
                B::time(),
                B::coefficient("y0", 0),
                B::coefficient("a", 1),
                B::coefficient("x0", 2),
            ],
            Formula::Sinusoid => vec![
                B::time(),
                B::coefficient("A", 0),
                B::coefficient("ω", 1),
                B::coefficient("α", 2),
            ],
            Formula::Exponential => vec![B::time(), B::coefficient("A", 0), B::coefficient("k", 1)],
            Formula::Gaussian => vec![B::time(), B::coefficient("σ", 0), B::coefficient("µ", 1)],
            Formula::Rose => vec![B::time(), B::coefficient("A", 0), B::coefficient("n", 1)],
        };
        ParameterMap::new(bindings)
    }

    /// Rejects coefficients for which the formula is undefined everywhere.
    pub fn check_domain(self, c: &[f64]) -> CurveResult<()> {
        if let Formula::Gaussian = self {
            if c[0] == 0.0 {
                return Err(CurveError::domain("Gaussian deviation σ must be non-zero."));
            }
        }
        Ok(())
    }

    /// Evaluates the formula at `t`.
    pub fn sample(self, c: &[f64], t: f64) -> [f64; 2] {
        match self {
            Formula::Ellipse => [c[0] * t.cos(), c[1] * t.sin()],
            Formula::Hyperbola => [c[0] * t.cosh() * c[1].cos(), c[0] * t.sinh() * c[1].sin()],
            Formula::Linear => [t, c[0] + c[1] * t],
            Formula::Parabola => [t, c[0] + c[1] * (t - c[2]).powi(2)],
            Formula::Sinusoid => [t, c[0] * (c[1] * t + c[2]).sin()],
            Formula::Exponential => [t, c[0] * (c[1] * t).exp()],
            Formula::Gaussian => {
                let (sigma, mu) = (c[0], c[1]);
                let density =
                    (-(t - mu).powi(2) / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt());
                [t, density]
            }
            Formula::Rose => {
                let r = c[0] * (c[1] * t).sin();
                [r * t.cos(), r * t.sin()]
            }
        }
    }

    /// Samples every time in `times` into a row-major buffer.
    pub fn evaluate(self, c: &[f64], times: &[f64]) -> CurveResult<Vec<f64>> {
        self.check_domain(c)?;
        let mut out = Vec::with_capacity(times.len() * 2);
        for &t in times {
            let point = self.sample(c, t);
            if !point.iter().all(|v| v.is_finite()) {
                return Err(CurveError::domain(format!(
                    "{} is not finite at t = {}.",
                    self.display_name(),
                    t
                )));
            }
            out.extend_from_slice(&point);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-12 && (a[1] - b[1]).abs() < 1e-12
    }

    #[test]
    fn ellipse_hits_axes() {
        assert!(close(Formula::Ellipse.sample(&[3.0, 2.0], 0.0), [3.0, 0.0]));
        assert!(close(Formula::Ellipse.sample(&[3.0, 2.0], PI / 2.0), [0.0, 2.0]));
    }

    #[test]
    fn graph_formulas_use_t_as_abscissa() {
        assert!(close(Formula::Linear.sample(&[1.0, 2.0], 3.0), [3.0, 7.0]));
        assert!(close(Formula::Parabola.sample(&[1.0, 2.0, 1.0], 3.0), [3.0, 9.0]));
        assert!(close(Formula::Sinusoid.sample(&[2.0, 1.0, PI / 2.0], 0.0), [0.0, 2.0]));
        assert!(close(Formula::Exponential.sample(&[2.0, 0.0], 5.0), [5.0, 2.0]));
    }

    #[test]
    fn gaussian_peak_matches_normal_density() {
        let peak = Formula::Gaussian.sample(&[1.0, 0.0], 0.0);
        assert!((peak[1] - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn gaussian_zero_sigma_is_domain_error() {
        let err = Formula::Gaussian
            .evaluate(&[0.0, 0.0], &[0.0, 1.0])
            .expect_err("sigma zero");
        assert!(matches!(err, CurveError::Domain { .. }));
    }

    #[test]
    fn rose_passes_through_origin() {
        assert!(close(Formula::Rose.sample(&[1.0, 3.0], 0.0), [0.0, 0.0]));
    }

    #[test]
    fn hyperbola_vertex_on_axis() {
        let p = Formula::Hyperbola.sample(&[2.0, 0.0], 0.0);
        assert!(close(p, [2.0, 0.0]));
    }

    #[test]
    fn every_formula_binds_time() {
        for formula in [
            Formula::Ellipse,
            Formula::Hyperbola,
            Formula::Linear,
            Formula::Parabola,
            Formula::Sinusoid,
            Formula::Exponential,
            Formula::Gaussian,
            Formula::Rose,
        ] {
            assert!(formula.parameter_map().bind("t").is_some());
        }
    }
}
