//! WASM handle around a single curve.

use crate::js_error;
use curvelab_core::curve::{Curve, ParametricKind, Projection};
use curvelab_core::definition::{parse_definition, CurveDefinition};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmCurve {
    pub(crate) curve: Curve,
}

#[derive(Serialize)]
struct ParameterRow<'a> {
    name: &'a str,
    default_min: f64,
    default_max: f64,
    active_min: f64,
    active_max: f64,
    value: f64,
    increment: f64,
    sample_count: usize,
}

#[derive(Serialize)]
struct ProjectionRow<'a> {
    tag: &'static str,
    color: &'a str,
    thickness: f64,
    panel: Option<u32>,
}

pub(crate) fn parse_projection(tag: &str) -> Result<Projection, JsValue> {
    Projection::from_tag(tag)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown projection '{}'", tag)))
}

pub(crate) fn projection_points(curve: &Curve, tag: &str) -> Result<Vec<f64>, JsValue> {
    let projection = parse_projection(tag)?;
    let points = curve.projection_points(projection).ok_or_else(|| {
        JsValue::from_str(&format!(
            "Curve '{}' has no '{}' projection",
            curve.name(),
            tag
        ))
    })?;
    Ok(points.into_iter().flatten().collect())
}

#[wasm_bindgen]
impl WasmCurve {
    /// Builds a curve from a JSON-encoded definition.
    #[wasm_bindgen(constructor)]
    pub fn new(definition_json: &str) -> Result<WasmCurve, JsValue> {
        console_error_panic_hook::set_once();

        let definition = parse_definition(definition_json).map_err(|e| js_error(format!("{e:#}")))?;
        let curve = Curve::from_definition(&definition).map_err(js_error)?;
        Ok(WasmCurve { curve })
    }

    /// Builds a curve from a definition object.
    pub fn from_definition(definition: JsValue) -> Result<WasmCurve, JsValue> {
        console_error_panic_hook::set_once();

        let definition: CurveDefinition = from_value(definition)
            .map_err(|e| JsValue::from_str(&format!("Invalid curve definition: {}", e)))?;
        let curve = Curve::from_definition(&definition).map_err(js_error)?;
        Ok(WasmCurve { curve })
    }

    pub fn name(&self) -> String {
        self.curve.name().to_string()
    }

    pub fn color(&self) -> String {
        self.curve.color().to_string()
    }

    pub fn thickness(&self) -> f64 {
        self.curve.thickness()
    }

    /// `"plain"`, `"parametric2"` or `"parametric3"`.
    pub fn kind(&self) -> String {
        match self.curve.kind() {
            ParametricKind::Plain => "plain",
            ParametricKind::Parametric2 => "parametric2",
            ParametricKind::Parametric3 => "parametric3",
        }
        .to_string()
    }

    pub fn dimension(&self) -> usize {
        self.curve.buffer().dimension()
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.curve.set_parameter(name, value).map_err(js_error)
    }

    /// `step == 0` recomputes the whole grid; otherwise advances one step.
    pub fn calculate(&mut self, step: f64) -> Result<(), JsValue> {
        self.curve.calculate(step).map_err(js_error)
    }

    pub fn erase(&mut self) {
        self.curve.erase();
    }

    pub fn current_index(&self) -> usize {
        self.curve.current_index()
    }

    pub fn capacity(&self) -> usize {
        self.curve.buffer().capacity()
    }

    pub fn times(&self) -> Vec<f64> {
        self.curve.times().to_vec()
    }

    /// Valid samples, row-major with `dimension()` columns.
    pub fn samples(&self) -> Vec<f64> {
        self.curve.samples().to_vec()
    }

    /// Flattened `[u0, v0, u1, v1, ...]` points of the projection named by `tag`.
    pub fn projection(&self, tag: &str) -> Result<Vec<f64>, JsValue> {
        projection_points(&self.curve, tag)
    }

    /// Tags of the projections this curve exposes, in display order.
    pub fn projection_tags(&self) -> Vec<String> {
        self.curve
            .projections()
            .map(|(p, _)| p.tag().to_string())
            .collect()
    }

    /// Projection tags with their styling.
    pub fn projections(&self) -> Result<JsValue, JsValue> {
        let rows: Vec<ProjectionRow> = self
            .curve
            .projections()
            .map(|(p, style)| ProjectionRow {
                tag: p.tag(),
                color: &style.color,
                thickness: style.thickness,
                panel: style.panel,
            })
            .collect();
        to_value(&rows).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Assigns the projection named by `tag` to a display panel (or none).
    pub fn set_projection_panel(&mut self, tag: &str, panel: Option<u32>) -> Result<(), JsValue> {
        let projection = parse_projection(tag)?;
        let style = self.curve.projection_style_mut(projection).ok_or_else(|| {
            JsValue::from_str(&format!("Curve has no '{}' projection", tag))
        })?;
        style.panel = panel;
        Ok(())
    }

    pub fn projection_panel(&self, tag: &str) -> Option<u32> {
        let projection = Projection::from_tag(tag)?;
        self.curve
            .projections()
            .find(|(p, _)| *p == projection)
            .and_then(|(_, style)| style.panel)
    }

    /// The bound parameters with their bounds, in configuration order.
    pub fn parameters(&self) -> Result<JsValue, JsValue> {
        let rows: Vec<ParameterRow> = self
            .curve
            .parameters()
            .iter()
            .map(|(name, spec)| ParameterRow {
                name,
                default_min: spec.default_min,
                default_max: spec.default_max,
                active_min: spec.active_min,
                active_max: spec.active_max,
                value: spec.value,
                increment: spec.increment,
                sample_count: spec.sample_count,
            })
            .collect();
        to_value(&rows).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn parameter_value(&self, name: &str) -> Option<f64> {
        self.curve.parameters().value(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LORENZ: &str = r#"{
        "family": "Lorenz",
        "color": "green",
        "params": [
            { "name": "t", "kind": "non_negative", "magnitude": 1.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 0.0, "increment": 0.01, "sample_count": 4 },
            { "name": "σ", "kind": "symmetric", "magnitude": 50.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 10.0, "increment": 0.1, "sample_count": 0 },
            { "name": "ρ", "kind": "symmetric", "magnitude": 50.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 28.0, "increment": 0.1, "sample_count": 0 },
            { "name": "β", "kind": "symmetric", "magnitude": 50.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 2.6666666666666665, "increment": 0.1, "sample_count": 0 },
            { "name": "x0", "kind": "symmetric", "magnitude": 50.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 },
            { "name": "y0", "kind": "symmetric", "magnitude": 50.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 },
            { "name": "z0", "kind": "symmetric", "magnitude": 50.0, "min_scale": 1.0,
              "max_scale": 1.0, "default": 1.0, "increment": 0.1, "sample_count": 0 }
        ]
    }"#;

    #[test]
    fn wasm_curve_batch_fills_every_projection() {
        let mut curve = WasmCurve::new(LORENZ).expect("curve");
        assert_eq!(curve.color(), "green");
        assert_eq!(curve.kind(), "parametric3");
        assert_eq!(curve.projection_tags(), vec!["xy", "tx", "ty", "tz"]);

        curve.calculate(0.0).expect("batch");
        assert_eq!(curve.current_index(), 3);
        assert_eq!(curve.times(), vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
        assert_eq!(curve.samples().len(), 12);

        let tz = curve.projection("tz").expect("tz");
        assert_eq!(tz.len(), 8);
        assert_eq!(tz[0], 0.0);
        assert_eq!(tz[1], 1.0);
    }

    #[test]
    fn wasm_curve_steps_and_grows() {
        let mut curve = WasmCurve::new(LORENZ).expect("curve");
        for _ in 0..4 {
            curve.calculate(0.01).expect("step");
        }
        assert_eq!(curve.current_index(), 4);
        assert_eq!(curve.capacity(), 8);

        curve.set_parameter("ρ", 20.0).expect("edit");
        assert!(curve.times().is_empty());
        assert_eq!(curve.parameter_value("ρ"), Some(20.0));
    }

    #[test]
    fn wasm_curve_projection_panel_round_trip() {
        let mut curve = WasmCurve::new(LORENZ).expect("curve");
        curve.set_projection_panel("tx", Some(2)).expect("panel");
        assert_eq!(curve.projection_panel("tx"), Some(2));
        assert_eq!(curve.projection_panel("xy"), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::WasmCurve;
    use curvelab_core::definition::{CurveDefinition, FamilyName};
    use curvelab_core::integrator::IntegratorSettings;
    use curvelab_core::parameters::{ParameterKind, ParameterRecord};
    use serde_wasm_bindgen::to_value;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn record(name: &str, default: f64) -> ParameterRecord {
        ParameterRecord {
            name: name.to_string(),
            kind: ParameterKind::Symmetric,
            magnitude: 10.0,
            min_scale: 1.0,
            max_scale: 1.0,
            default,
            increment: 0.1,
            sample_count: 0,
        }
    }

    fn ellipse() -> WasmCurve {
        let definition = CurveDefinition {
            family: FamilyName::Ellipse,
            name: None,
            color: "blue".to_string(),
            thickness: 1.0,
            parametric: None,
            t_in_radians: false,
            params: vec![record("a", 2.0), record("b", 1.0)],
            integrator: IntegratorSettings::default(),
        };
        WasmCurve::from_definition(to_value(&definition).expect("definition")).expect("curve")
    }

    #[wasm_bindgen_test]
    fn from_definition_object_builds_curve() {
        let curve = ellipse();
        assert_eq!(curve.name(), "Ellipse");
        assert_eq!(curve.projection("xy").expect("xy").len(), 4);
        assert!(curve.parameters().is_ok());
    }

    #[wasm_bindgen_test]
    fn rejects_unknown_parameter_and_projection() {
        let mut curve = ellipse();
        let message = curve
            .set_parameter("k", 1.0)
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Unknown parameter 'k'"));
        assert!(curve.projection("uv").is_err());
        assert!(curve.projection("tx").is_err());
    }

    #[wasm_bindgen_test]
    fn rejects_malformed_definition() {
        assert!(WasmCurve::new("{").is_err());
    }
}
