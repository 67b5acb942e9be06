//! Browser bindings for the Curvelab engine.
//!
//! Curves and bunches are exposed as opaque handles; sample data crosses the
//! boundary as flat `f64` arrays and structured data through `serde_wasm_bindgen`.

mod bunch;
mod curve;

pub use bunch::WasmBunch;
pub use curve::WasmCurve;

use wasm_bindgen::JsValue;

pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
