//! Serialized curve definitions and the factory building curves from them.

use crate::closed_form::Formula;
use crate::curve::{Curve, Family, ParametricKind};
use crate::error::CurveResult;
use crate::integrator::IntegratorSettings;
use crate::ode::OdeFamily;
use crate::parameters::{ParameterRecord, ParameterSet};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Family selector as stored in a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyName {
    Ellipse,
    Hyperbola,
    Linear,
    Parabola,
    #[serde(alias = "Sinus")]
    Sinusoid,
    Exponential,
    Gaussian,
    #[serde(alias = "RoseSin")]
    Rose,
    Oscillator,
    #[serde(rename = "SIR")]
    Sir,
    LotkaVolterra,
    Lorenz,
    TwoBodyGravity,
}

impl From<FamilyName> for Family {
    fn from(name: FamilyName) -> Self {
        match name {
            FamilyName::Ellipse => Formula::Ellipse.into(),
            FamilyName::Hyperbola => Formula::Hyperbola.into(),
            FamilyName::Linear => Formula::Linear.into(),
            FamilyName::Parabola => Formula::Parabola.into(),
            FamilyName::Sinusoid => Formula::Sinusoid.into(),
            FamilyName::Exponential => Formula::Exponential.into(),
            FamilyName::Gaussian => Formula::Gaussian.into(),
            FamilyName::Rose => Formula::Rose.into(),
            FamilyName::Oscillator => OdeFamily::Oscillator.into(),
            FamilyName::Sir => OdeFamily::Sir.into(),
            FamilyName::LotkaVolterra => OdeFamily::LotkaVolterra.into(),
            FamilyName::Lorenz => OdeFamily::Lorenz.into(),
            FamilyName::TwoBodyGravity => OdeFamily::TwoBodyGravity.into(),
        }
    }
}

fn default_color() -> String {
    "black".to_string()
}

fn default_thickness() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDefinition {
    pub family: FamilyName,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    /// Overrides the family's default parametric kind.
    #[serde(default)]
    pub parametric: Option<ParametricKind>,
    /// Reads the `t` magnitude in units of pi.
    #[serde(default)]
    pub t_in_radians: bool,
    #[serde(default)]
    pub params: Vec<ParameterRecord>,
    #[serde(default)]
    pub integrator: IntegratorSettings,
}

impl Curve {
    pub fn from_definition(definition: &CurveDefinition) -> CurveResult<Self> {
        let params = ParameterSet::from_records(&definition.params, definition.t_in_radians)?;
        let mut curve = Curve::new(definition.family.into(), params)?
            .with_style(definition.color.clone(), definition.thickness)
            .with_settings(definition.integrator);
        if let Some(name) = &definition.name {
            curve = curve.with_name(name.clone());
        }
        if let Some(kind) = definition.parametric {
            curve.set_kind(kind)?;
        }
        Ok(curve)
    }
}

/// Parses a single JSON curve definition.
pub fn parse_definition(json: &str) -> Result<CurveDefinition> {
    let definition: CurveDefinition =
        serde_json::from_str(json).context("Failed to parse curve definition")?;
    check_thickness(0, &definition)?;
    Ok(definition)
}

fn check_thickness(index: usize, definition: &CurveDefinition) -> Result<()> {
    if !(definition.thickness.is_finite() && definition.thickness > 0.0) {
        bail!(
            "Curve definition {} has non-positive thickness {}.",
            index,
            definition.thickness
        );
    }
    Ok(())
}

/// Parses a JSON array of curve definitions.
pub fn parse_definitions(json: &str) -> Result<Vec<CurveDefinition>> {
    let definitions: Vec<CurveDefinition> =
        serde_json::from_str(json).context("Failed to parse curve definitions")?;
    for (i, definition) in definitions.iter().enumerate() {
        check_thickness(i, definition)?;
    }
    Ok(definitions)
}

/// Parses and builds every curve in a JSON array of definitions.
pub fn load_curves(json: &str) -> Result<Vec<Curve>> {
    parse_definitions(json)?
        .iter()
        .enumerate()
        .map(|(i, definition)| {
            Curve::from_definition(definition)
                .with_context(|| format!("Failed to build curve definition {} ({:?})", i, definition.family))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::StepperKind;
    use std::f64::consts::PI;

    const OSCILLATOR: &str = r#"[
        {
            "family": "Oscillator",
            "name": "spring",
            "color": "red",
            "thickness": 2.0,
            "t_in_radians": true,
            "integrator": { "stepper": "rk4", "adaptive": false, "step_size": 0.001 },
            "params": [
                { "name": "t", "kind": "non_negative", "magnitude": 2.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 0.0, "increment": 0.1, "sample_count": 5 },
                { "name": "k", "kind": "symmetric", "magnitude": 5.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 },
                { "name": "x0", "kind": "symmetric", "magnitude": 5.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 },
                { "name": "v0", "kind": "symmetric", "magnitude": 5.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 0.0, "increment": 0.1, "sample_count": 0 }
            ]
        }
    ]"#;

    #[test]
    fn builds_oscillator_from_json() {
        let mut curves = load_curves(OSCILLATOR).expect("load");
        assert_eq!(curves.len(), 1);
        let curve = &mut curves[0];

        assert_eq!(curve.name(), "spring");
        assert_eq!(curve.color(), "red");
        assert_eq!(curve.settings().stepper, StepperKind::Rk4);
        assert!((curve.grid().t_max - 2.0 * PI).abs() < 1e-12);
        assert_eq!(curve.kind(), ParametricKind::Parametric2);

        curve.calculate(0.0).expect("batch");
        let x = curve.buffer().component(0);
        assert!((x[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn closed_form_alias_names_are_accepted() {
        let json = r#"[
            { "family": "Sinus", "params": [
                { "name": "A", "kind": "symmetric", "magnitude": 1.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 },
                { "name": "ω", "kind": "symmetric", "magnitude": 1.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 },
                { "name": "α", "kind": "symmetric", "magnitude": 1.0, "min_scale": 1.0,
                  "max_scale": 1.0, "default": 0.0, "increment": 0.1, "sample_count": 0 }
            ] }
        ]"#;
        let curves = load_curves(json).expect("load");
        assert_eq!(curves[0].name(), "Sine");
        assert_eq!(curves[0].current_index(), 1);
    }

    #[test]
    fn missing_coefficient_reports_definition_index() {
        let json = r#"[{ "family": "Ellipse" }]"#;
        let err = load_curves(json).expect_err("no a/b");
        let message = format!("{err:#}");
        assert!(message.contains("definition 0"), "{message}");
        assert!(message.contains("'a'"), "{message}");
    }

    #[test]
    fn unknown_family_fails_to_parse() {
        let err = parse_definitions(r#"[{ "family": "Newton2D" }]"#).expect_err("unknown");
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn single_definition_uses_defaults() {
        let definition = parse_definition(r#"{ "family": "SIR", "parametric": "parametric2" }"#)
            .expect("parse");
        assert_eq!(definition.family, FamilyName::Sir);
        assert_eq!(definition.color, "black");
        assert_eq!(definition.thickness, 1.0);
        assert_eq!(definition.parametric, Some(ParametricKind::Parametric2));
        assert_eq!(definition.integrator, IntegratorSettings::default());
        assert!(definition.params.is_empty());
    }

    #[test]
    fn non_positive_thickness_is_rejected() {
        let json = r#"[{ "family": "Lorenz", "thickness": 0.0 }]"#;
        assert!(parse_definitions(json).is_err());
    }
}
