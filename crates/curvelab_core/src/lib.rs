pub mod binding;
pub mod buffer;
pub mod bunch;
pub mod closed_form;
pub mod curve;
pub mod definition;
pub mod error;
pub mod integrator;
pub mod ode;
pub mod parameters;
pub mod solvers;
pub mod time_grid;
/// The `curvelab_core` crate is the simulation engine behind Curvelab's interactive plots.
/// It turns named, range-checked parameters into sampled curves, either from closed-form
/// formulas or by integrating small ODE systems.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem` (right-hand sides), `Steppable` (explicit steppers).
/// - **Integrator**: RK4/Tsit5 steppers driven by a step-doubling adaptive loop that lands on
///   requested evaluation times.
/// - **Curves**: parameter binding, time grids and growable sample buffers supporting both
///   full-grid recomputation and step-by-step animation.
/// - **Bunches**: ordered curve collections and the ellipse/hyperbola/segment/axis generators.
pub mod traits;

pub use bunch::Bunch;
pub use curve::{Curve, CurveId, Family, ParametricKind, Projection, ProjectionStyle};
pub use definition::{load_curves, parse_definition, parse_definitions, CurveDefinition, FamilyName};
pub use error::{CurveError, CurveResult};
pub use integrator::{integrate, IntegratorSettings, StepperKind, Trajectory};
pub use parameters::{ParameterKind, ParameterRecord, ParameterSet, ParameterSpec};
pub use time_grid::TimeGrid;
