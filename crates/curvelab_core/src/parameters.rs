//! Externally configurable parameters and their bounds.

use crate::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Reserved parameter name configuring the time grid instead of a scalar.
pub const TIME_PARAMETER: &str = "t";

/// Bounds, current value and stepping of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub default_min: f64,
    pub default_max: f64,
    pub active_min: f64,
    pub active_max: f64,
    pub value: f64,
    pub increment: f64,
    pub sample_count: usize,
}

impl ParameterSpec {
    /// A parameter pinned to `value` with bounds `[min, max]`.
    pub fn new(min: f64, max: f64, value: f64) -> Self {
        Self {
            default_min: min,
            default_max: max,
            active_min: min,
            active_max: max,
            value,
            increment: 0.0,
            sample_count: 0,
        }
    }

    /// A parameter whose bounds collapse onto its value.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn validate(&self, name: &str) -> CurveResult<()> {
        let values = [
            self.default_min,
            self.default_max,
            self.active_min,
            self.active_max,
            self.value,
            self.increment,
        ];
        if !values.iter().all(|v| v.is_finite()) {
            return Err(CurveError::invalid(format!(
                "Parameter '{}' has non-finite bounds or value.",
                name
            )));
        }
        if self.active_min > self.active_max {
            return Err(CurveError::invalid(format!(
                "Parameter '{}' has active_min {} above active_max {}.",
                name, self.active_min, self.active_max
            )));
        }
        self.check_range(name, self.value)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.active_min <= value && value <= self.active_max
    }

    fn check_range(&self, name: &str, value: f64) -> CurveResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(CurveError::ParameterOutOfRange {
                name: name.to_string(),
                value,
                min: self.active_min,
                max: self.active_max,
            })
        }
    }
}

/// Sign convention of a stored parameter magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Default range `[-magnitude, magnitude]`.
    Symmetric,
    /// Default range `[0, magnitude]`.
    NonNegative,
}

/// A parameter row as stored alongside a curve definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    pub kind: ParameterKind,
    pub magnitude: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub default: f64,
    pub increment: f64,
    pub sample_count: usize,
}

impl ParameterRecord {
    /// Resolves the stored magnitude and scale factors into concrete bounds.
    /// The `t` magnitude is read in units of pi when `t_in_radians` is set.
    pub fn resolve(&self, t_in_radians: bool) -> CurveResult<ParameterSpec> {
        let mut magnitude = self.magnitude;
        if self.name == TIME_PARAMETER && t_in_radians {
            magnitude *= PI;
        }
        let default_min = match self.kind {
            ParameterKind::NonNegative => 0.0,
            ParameterKind::Symmetric => -magnitude,
        };
        let default_max = magnitude;
        let spec = ParameterSpec {
            default_min,
            default_max,
            active_min: default_min * self.min_scale,
            active_max: default_max * self.max_scale,
            value: self.default,
            increment: self.increment,
            sample_count: self.sample_count,
        };
        spec.validate(&self.name)?;
        Ok(spec)
    }
}

/// Ordered, validated mapping from parameter names to their specs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    entries: Vec<(String, ParameterSpec)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, spec: ParameterSpec) -> CurveResult<()> {
        let name = name.into();
        spec.validate(&name)?;
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((name, spec)),
        }
        Ok(())
    }

    /// Builder-style `insert`.
    pub fn with(mut self, name: impl Into<String>, spec: ParameterSpec) -> CurveResult<Self> {
        self.insert(name, spec)?;
        Ok(self)
    }

    pub fn from_records(records: &[ParameterRecord], t_in_radians: bool) -> CurveResult<Self> {
        let mut set = Self::new();
        for record in records {
            set.insert(record.name.clone(), record.resolve(t_in_radians)?)?;
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(|s| s.value)
    }

    /// Updates the current value, enforcing `active_min <= value <= active_max`.
    /// Names absent from the set are ignored and reported as `false`.
    pub fn set_value(&mut self, name: &str, value: f64) -> CurveResult<bool> {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, spec)) => {
                spec.check_range(name, value)?;
                spec.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: ParameterKind) -> ParameterRecord {
        ParameterRecord {
            name: name.to_string(),
            kind,
            magnitude: 2.0,
            min_scale: 0.5,
            max_scale: 1.0,
            default: 0.5,
            increment: 0.1,
            sample_count: 0,
        }
    }

    #[test]
    fn record_resolves_symmetric_bounds() {
        let spec = record("k", ParameterKind::Symmetric)
            .resolve(false)
            .expect("spec");
        assert_eq!(spec.default_min, -2.0);
        assert_eq!(spec.default_max, 2.0);
        assert_eq!(spec.active_min, -1.0);
        assert_eq!(spec.active_max, 2.0);
        assert_eq!(spec.value, 0.5);
    }

    #[test]
    fn record_resolves_non_negative_bounds() {
        let spec = record("k", ParameterKind::NonNegative)
            .resolve(false)
            .expect("spec");
        assert_eq!(spec.default_min, 0.0);
        assert_eq!(spec.active_min, 0.0);
    }

    #[test]
    fn time_magnitude_scales_by_pi_in_radians() {
        let spec = record(TIME_PARAMETER, ParameterKind::NonNegative)
            .resolve(true)
            .expect("spec");
        assert!((spec.default_max - 2.0 * PI).abs() < 1e-12);

        let other = record("a", ParameterKind::NonNegative)
            .resolve(true)
            .expect("spec");
        assert_eq!(other.default_max, 2.0);
    }

    #[test]
    fn record_with_default_outside_range_is_rejected() {
        let mut bad = record("k", ParameterKind::NonNegative);
        bad.default = -1.0;
        assert!(matches!(
            bad.resolve(false),
            Err(CurveError::ParameterOutOfRange { .. })
        ));
    }

    #[test]
    fn set_preserves_insertion_order_and_replaces() {
        let mut set = ParameterSet::new();
        set.insert("b", ParameterSpec::fixed(1.0)).expect("insert");
        set.insert("a", ParameterSpec::fixed(2.0)).expect("insert");
        set.insert("b", ParameterSpec::fixed(3.0)).expect("insert");

        let names: Vec<&str> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.value("b"), Some(3.0));
    }

    #[test]
    fn set_value_enforces_active_range() {
        let mut set = ParameterSet::new()
            .with("k", ParameterSpec::new(0.0, 2.0, 1.0))
            .expect("set");
        assert!(set.set_value("k", 1.5).expect("in range"));
        assert_eq!(set.value("k"), Some(1.5));

        let err = set.set_value("k", 3.0).expect_err("out of range");
        assert!(matches!(err, CurveError::ParameterOutOfRange { .. }));
        assert_eq!(set.value("k"), Some(1.5));

        assert!(!set.set_value("missing", 1.0).expect("ignored"));
    }

    #[test]
    fn insert_rejects_inverted_bounds() {
        let spec = ParameterSpec {
            active_min: 2.0,
            active_max: 1.0,
            ..ParameterSpec::fixed(1.5)
        };
        let err = ParameterSet::new().with("k", spec).expect_err("invalid");
        assert!(matches!(err, CurveError::InvalidParameter { .. }));
    }
}
