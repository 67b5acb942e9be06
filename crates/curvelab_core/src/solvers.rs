use crate::error::CurveResult;
use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Converts a literal coefficient into the scalar type.
/// A failed conversion yields NaN, which the integrator rejects as non-finite.
fn constant<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Classic Runge-Kutta 4th Order Solver
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            tmp: vec![z; dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn order(&self) -> i32 {
        4
    }

    fn step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: &mut T,
        state: &mut [T],
        dt: T,
    ) -> CurveResult<()> {
        let half = constant::<T>(0.5);
        let sixth = constant::<T>(1.0 / 6.0);
        let two = constant::<T>(2.0);

        let t0 = *t;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1)?;

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k2)?;

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k3)?;

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4)?;

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
        Ok(())
    }
}

/// Tsitouras 5/4 Solver (fifth-order solution, fixed step)
pub struct Tsit5<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    k5: Vec<T>,
    k6: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> Tsit5<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            k5: vec![z; dim],
            k6: vec![z; dim],
            tmp: vec![z; dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Tsit5<T> {
    fn order(&self) -> i32 {
        5
    }

    fn step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: &mut T,
        state: &mut [T],
        dt: T,
    ) -> CurveResult<()> {
        let t0 = *t;

        // Tsit5 Coefficients
        let c2 = constant::<T>(0.161);
        let c3 = constant::<T>(0.327);
        let c4 = constant::<T>(0.9);
        let c5 = constant::<T>(0.9800255409045097);
        let c6 = T::one();

        let a21 = constant::<T>(0.161);

        let a31 = constant::<T>(-0.008480655492356989);
        let a32 = constant::<T>(0.335480655492357);

        let a41 = constant::<T>(2.898);
        let a42 = constant::<T>(-6.359447987781783);
        let a43 = constant::<T>(4.361447987781783);

        let a51 = constant::<T>(5.325864858437957);
        let a52 = constant::<T>(-11.748883564062828);
        let a53 = constant::<T>(7.495539342889693);
        let a54 = constant::<T>(-0.09249506636030195);

        let a61 = constant::<T>(5.86145544294642);
        let a62 = constant::<T>(-12.92096931784711);
        let a63 = constant::<T>(8.159367898576159);
        let a64 = constant::<T>(-0.071584973281401);
        let a65 = constant::<T>(-0.02826857949054663);

        // b coefficients (5th order), equal to the seventh stage row
        let b1 = constant::<T>(0.09646076681806523);
        let b2 = constant::<T>(0.01);
        let b3 = constant::<T>(0.4798896504144996);
        let b4 = constant::<T>(1.379008574103742);
        let b5 = constant::<T>(-3.290069515436099);
        let b6 = constant::<T>(2.324710524099774);

        system.apply(t0, state, &mut self.k1)?;

        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * (a21 * self.k1[i]);
        }
        system.apply(t0 + c2 * dt, &self.tmp, &mut self.k2)?;

        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * (a31 * self.k1[i] + a32 * self.k2[i]);
        }
        system.apply(t0 + c3 * dt, &self.tmp, &mut self.k3)?;

        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * (a41 * self.k1[i] + a42 * self.k2[i] + a43 * self.k3[i]);
        }
        system.apply(t0 + c4 * dt, &self.tmp, &mut self.k4)?;

        for i in 0..state.len() {
            self.tmp[i] = state[i]
                + dt * (a51 * self.k1[i] + a52 * self.k2[i] + a53 * self.k3[i] + a54 * self.k4[i]);
        }
        system.apply(t0 + c5 * dt, &self.tmp, &mut self.k5)?;

        for i in 0..state.len() {
            self.tmp[i] = state[i]
                + dt * (a61 * self.k1[i]
                    + a62 * self.k2[i]
                    + a63 * self.k3[i]
                    + a64 * self.k4[i]
                    + a65 * self.k5[i]);
        }
        system.apply(t0 + c6 * dt, &self.tmp, &mut self.k6)?;

        // Update State
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * (b1 * self.k1[i]
                    + b2 * self.k2[i]
                    + b3 * self.k3[i]
                    + b4 * self.k4[i]
                    + b5 * self.k5[i]
                    + b6 * self.k6[i]);
        }

        *t = t0 + dt;
        Ok(())
    }
}
