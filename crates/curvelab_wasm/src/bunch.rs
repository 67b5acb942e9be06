//! WASM handle around a bunch of curves.

use crate::curve::{projection_points, WasmCurve};
use crate::js_error;
use curvelab_core::bunch::Bunch;
use curvelab_core::curve::Curve;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmBunch {
    bunch: Bunch,
}

impl WasmBunch {
    fn member(&self, index: usize) -> Result<&Curve, JsValue> {
        self.bunch.get(index).ok_or_else(|| {
            JsValue::from_str(&format!(
                "Bunch member {} out of range (len {})",
                index,
                self.bunch.len()
            ))
        })
    }
}

#[wasm_bindgen]
impl WasmBunch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmBunch {
        console_error_panic_hook::set_once();
        WasmBunch {
            bunch: Bunch::new(),
        }
    }

    /// Segments from a flat `[x1, y1, x2, y2, ...]` list of endpoint pairs.
    pub fn segments(coords: Vec<f64>) -> Result<WasmBunch, JsValue> {
        if coords.len() % 4 != 0 {
            return Err(JsValue::from_str(
                "Segment coordinates must come in groups of four.",
            ));
        }
        let pairs: Vec<([f64; 2], [f64; 2])> = coords
            .chunks_exact(4)
            .map(|c| ([c[0], c[1]], [c[2], c[3]]))
            .collect();
        Ok(WasmBunch {
            bunch: Bunch::segments(&pairs),
        })
    }

    /// Red, green and blue coordinate axes spanning `[-amplitude, amplitude]`.
    pub fn axes(amplitude: f64) -> Result<WasmBunch, JsValue> {
        let bunch = Bunch::axes(amplitude).map_err(js_error)?;
        Ok(WasmBunch { bunch })
    }

    pub fn confocal_ellipses(focal: f64, count: usize, increment: f64) -> Result<WasmBunch, JsValue> {
        let bunch = Bunch::confocal_ellipses(focal, count, increment).map_err(js_error)?;
        Ok(WasmBunch { bunch })
    }

    pub fn hyperbolas(a: f64, count: usize) -> Result<WasmBunch, JsValue> {
        let bunch = Bunch::hyperbolas(a, count).map_err(js_error)?;
        Ok(WasmBunch { bunch })
    }

    /// Adds a copy of `curve`; later edits to the handle do not reach the bunch.
    pub fn add_curve(&mut self, curve: &WasmCurve) -> Result<(), JsValue> {
        self.bunch.add(curve.curve.clone()).map_err(js_error)
    }

    /// A new bunch with this bunch's curves followed by `other`'s.
    pub fn union(&self, other: &WasmBunch) -> Result<WasmBunch, JsValue> {
        let bunch = self.bunch.union(&other.bunch).map_err(js_error)?;
        Ok(WasmBunch { bunch })
    }

    pub fn len(&self) -> usize {
        self.bunch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bunch.is_empty()
    }

    pub fn erase(&mut self) {
        self.bunch.erase();
    }

    pub fn recalculate(&mut self, step: f64) -> Result<(), JsValue> {
        self.bunch.recalculate(step).map_err(js_error)
    }

    pub fn curve_name(&self, index: usize) -> Result<String, JsValue> {
        Ok(self.member(index)?.name().to_string())
    }

    pub fn curve_color(&self, index: usize) -> Result<String, JsValue> {
        Ok(self.member(index)?.color().to_string())
    }

    /// Flattened points of member `index` in the projection named by `tag`.
    pub fn projection(&self, index: usize, tag: &str) -> Result<Vec<f64>, JsValue> {
        projection_points(self.member(index)?, tag)
    }
}

impl Default for WasmBunch {
    fn default() -> Self {
        Self::new()
    }
}
