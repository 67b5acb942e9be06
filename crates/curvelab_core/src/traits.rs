use crate::error::CurveResult;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in the integrators.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A first-order system of ordinary differential equations.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space (the equation count).
    fn dimension(&self) -> usize;

    /// Evaluates the right-hand side dx/dt = f(t, x).
    /// x: current state
    /// t: current time
    /// out: buffer to write dx/dt into
    ///
    /// Fails with `CurveError::Domain` when `x` lies where `f` is undefined.
    fn apply(&self, t: T, x: &[T], out: &mut [T]) -> CurveResult<()>;
}

/// A trait for explicit one-step methods.
pub trait Steppable<T: Scalar> {
    /// Classical order of the method, used by step-size control.
    fn order(&self) -> i32;

    /// Performs one step of size dt (negative dt steps backwards).
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    ///
    /// On error neither `t` nor `state` is modified.
    fn step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: &mut T,
        state: &mut [T],
        dt: T,
    ) -> CurveResult<()>;
}
