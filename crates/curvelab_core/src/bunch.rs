//! Ordered collections of curves drawn together.

use crate::closed_form::Formula;
use crate::curve::{Curve, CurveId};
use crate::error::{CurveError, CurveResult};
use crate::parameters::{ParameterSet, ParameterSpec, TIME_PARAMETER};
use std::f64::consts::PI;

/// Samples per generated family member.
const GENERATED_POINTS: usize = 200;
/// Half-width of the `t` range swept by generated hyperbolas.
const HYPERBOLA_SPAN: f64 = 2.0;

/// An ordered sequence of curves with distinct identities.
#[derive(Debug, Clone, Default)]
pub struct Bunch {
    curves: Vec<Curve>,
}

impl Bunch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `curve`, rejecting a curve whose identity is already present.
    pub fn add(&mut self, curve: Curve) -> CurveResult<()> {
        if self.contains(curve.id()) {
            return Err(CurveError::DuplicateCurve {
                id: curve.id().get(),
            });
        }
        self.curves.push(curve);
        Ok(())
    }

    pub fn erase(&mut self) {
        self.curves.clear();
    }

    pub fn contains(&self, id: CurveId) -> bool {
        self.curves.iter().any(|c| c.id() == id)
    }

    /// A new bunch holding `self`'s curves followed by `other`'s.
    /// Neither operand is modified.
    pub fn union(&self, other: &Bunch) -> CurveResult<Bunch> {
        let mut combined = self.clone();
        for curve in &other.curves {
            combined.add(curve.clone())?;
        }
        Ok(combined)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Curve> {
        self.curves.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Curve> {
        self.curves.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Curve> {
        self.curves.iter_mut()
    }

    /// Runs `calculate(step)` on every member in order, stopping at the first failure.
    pub fn recalculate(&mut self, step: f64) -> CurveResult<()> {
        for curve in &mut self.curves {
            curve.calculate(step)?;
        }
        Ok(())
    }

    /// One segment per endpoint pair.
    pub fn segments(pairs: &[([f64; 2], [f64; 2])]) -> Self {
        Self {
            curves: pairs
                .iter()
                .map(|(from, to)| Curve::segment(*from, *to))
                .collect(),
        }
    }

    /// The coordinate axes as red, green and blue segments spanning
    /// `[-amplitude, amplitude]`.
    pub fn axes(amplitude: f64) -> CurveResult<Self> {
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(CurveError::invalid("Axis amplitude must be positive."));
        }

        let mut bunch = Self::new();
        for (axis, color) in ["red", "green", "blue"].into_iter().enumerate() {
            let mut from = [0.0; 3];
            let mut to = [0.0; 3];
            from[axis] = -amplitude;
            to[axis] = amplitude;
            bunch.add(Curve::segment3(from, to).with_style(color, 1.0))?;
        }
        Ok(bunch)
    }

    /// Ellipses sharing the focal distance `focal`:
    /// `a = focal + i·increment`, `b = √(a² − focal²)` for `i = 1..=count`.
    pub fn confocal_ellipses(focal: f64, count: usize, increment: f64) -> CurveResult<Self> {
        if !(focal.is_finite() && focal >= 0.0) {
            return Err(CurveError::invalid("Focal distance must be non-negative."));
        }
        if !(increment.is_finite() && increment > 0.0) {
            return Err(CurveError::invalid("Semi-axis increment must be positive."));
        }

        let mut bunch = Self::new();
        for i in 1..=count {
            let a = focal + i as f64 * increment;
            let b = (a * a - focal * focal).sqrt();
            let params = generated(0.0, 2.0 * PI, &[("a", a), ("b", b)])?;
            bunch.add(Curve::new(Formula::Ellipse.into(), params)?)?;
        }
        Ok(bunch)
    }

    /// Hyperbolas of scale `a` with angles `θ = i·π/(count + 1)` for `i = 1..=count`.
    pub fn hyperbolas(a: f64, count: usize) -> CurveResult<Self> {
        if !a.is_finite() {
            return Err(CurveError::invalid("Hyperbola scale must be finite."));
        }

        let step = PI / (count as f64 + 1.0);
        let mut bunch = Self::new();
        for i in 1..=count {
            let params = generated(
                -HYPERBOLA_SPAN,
                HYPERBOLA_SPAN,
                &[("a", a), ("θ", i as f64 * step)],
            )?;
            bunch.add(Curve::new(Formula::Hyperbola.into(), params)?)?;
        }
        Ok(bunch)
    }
}

impl<'a> IntoIterator for &'a Bunch {
    type Item = &'a Curve;
    type IntoIter = std::slice::Iter<'a, Curve>;

    fn into_iter(self) -> Self::IntoIter {
        self.curves.iter()
    }
}

fn generated(t_min: f64, t_max: f64, coefficients: &[(&str, f64)]) -> CurveResult<ParameterSet> {
    let time = ParameterSpec::new(t_min, t_max, t_min)
        .with_increment((t_max - t_min) / (GENERATED_POINTS - 1) as f64)
        .with_sample_count(GENERATED_POINTS);
    let mut params = ParameterSet::new().with(TIME_PARAMETER, time)?;
    for (name, value) in coefficients {
        params.insert(*name, ParameterSpec::fixed(*value))?;
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_concatenates_in_order_and_keeps_operands() {
        let left = Bunch::segments(&[([0.0, 0.0], [1.0, 0.0]), ([0.0, 0.0], [0.0, 1.0])]);
        let right = Bunch::hyperbolas(1.0, 3).expect("hyperbolas");

        let combined = left.union(&right).expect("union");
        assert_eq!(combined.len(), 5);
        let ids: Vec<CurveId> = combined.iter().map(Curve::id).collect();
        let expected: Vec<CurveId> = left.iter().chain(right.iter()).map(Curve::id).collect();
        assert_eq!(ids, expected);

        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 3);
    }

    #[test]
    fn union_rejects_shared_curves() {
        let bunch = Bunch::segments(&[([0.0, 0.0], [1.0, 1.0])]);
        let err = bunch.union(&bunch).expect_err("same curve twice");
        assert!(matches!(err, CurveError::DuplicateCurve { .. }));
    }

    #[test]
    fn add_rejects_a_clone_of_a_member() {
        let mut bunch = Bunch::new();
        let line = Curve::segment([0.0, 0.0], [1.0, 1.0]);
        bunch.add(line.clone()).expect("first");
        assert!(bunch.add(line).is_err());
        bunch.add(Curve::segment([0.0, 0.0], [1.0, 1.0])).expect("distinct");
        assert_eq!(bunch.len(), 2);
    }

    #[test]
    fn axes_span_each_coordinate() {
        let mut axes = Bunch::axes(1000.0).expect("axes");
        let colors: Vec<&str> = axes.iter().map(Curve::color).collect();
        assert_eq!(colors, vec!["red", "green", "blue"]);

        axes.recalculate(0.0).expect("noop");
        for (axis, curve) in axes.iter().enumerate() {
            assert_eq!(curve.buffer().dimension(), 3);
            assert_eq!(curve.buffer().row(0)[axis], -1000.0);
            assert_eq!(curve.buffer().row(1)[axis], 1000.0);
            assert_eq!(curve.samples().iter().filter(|v| **v != 0.0).count(), 2);
        }
        assert!(Bunch::axes(0.0).is_err());
    }

    #[test]
    fn confocal_ellipses_share_focal_distance() {
        let bunch = Bunch::confocal_ellipses(80.0, 9, 5.0).expect("ellipses");
        assert_eq!(bunch.len(), 9);
        for (i, curve) in bunch.iter().enumerate() {
            let a = curve.parameters().value("a").expect("a");
            let b = curve.parameters().value("b").expect("b");
            assert!((a - (80.0 + (i + 1) as f64 * 5.0)).abs() < 1e-12);
            assert!(((a * a - b * b).sqrt() - 80.0).abs() < 1e-9);
            assert_eq!(curve.current_index(), GENERATED_POINTS - 1);
        }
    }

    #[test]
    fn confocal_ellipses_reject_bad_increment() {
        assert!(Bunch::confocal_ellipses(1.0, 3, 0.0).is_err());
        assert!(Bunch::confocal_ellipses(-1.0, 3, 1.0).is_err());
    }

    #[test]
    fn hyperbola_angles_split_the_half_turn() {
        let bunch = Bunch::hyperbolas(80.0, 9).expect("hyperbolas");
        let angles: Vec<f64> = bunch
            .iter()
            .map(|c| c.parameters().value("θ").expect("θ"))
            .collect();
        assert_eq!(angles.len(), 9);
        for (i, angle) in angles.iter().enumerate() {
            assert!((angle - (i + 1) as f64 * PI / 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn erase_and_recalculate() {
        let mut bunch = Bunch::confocal_ellipses(1.0, 2, 1.0).expect("ellipses");
        bunch.recalculate(0.0).expect("recalculate");
        assert!(bunch.iter().all(|c| c.current_index() == GENERATED_POINTS - 1));

        bunch.erase();
        assert!(bunch.is_empty());
    }
}
