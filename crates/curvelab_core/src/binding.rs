//! Declared correspondence between external parameter names and curve slots.

use crate::error::{CurveError, CurveResult};
use crate::parameters::{ParameterSet, TIME_PARAMETER};
use serde::Serialize;

/// Where a bound parameter is stored inside a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "slot", content = "index", rename_all = "snake_case")]
pub enum Slot {
    /// The time grid (only the reserved `t` name binds here).
    Time,
    /// A formula or right-hand-side coefficient.
    Coefficient(usize),
    /// Component of the initial state vector (0-indexed).
    Initial(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterBinding {
    pub name: &'static str,
    pub slot: Slot,
    /// Value used when the parameter set does not configure this name.
    pub fallback: Option<f64>,
}

impl ParameterBinding {
    pub const fn time() -> Self {
        Self {
            name: TIME_PARAMETER,
            slot: Slot::Time,
            fallback: None,
        }
    }

    pub const fn coefficient(name: &'static str, index: usize) -> Self {
        Self {
            name,
            slot: Slot::Coefficient(index),
            fallback: None,
        }
    }

    pub const fn initial(name: &'static str, index: usize) -> Self {
        Self {
            name,
            slot: Slot::Initial(index),
            fallback: None,
        }
    }

    pub const fn or(mut self, fallback: f64) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterMap {
    bindings: Vec<ParameterBinding>,
}

impl ParameterMap {
    pub fn new(bindings: Vec<ParameterBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    pub fn bind(&self, name: &str) -> Option<Slot> {
        self.bindings.iter().find(|b| b.name == name).map(|b| b.slot)
    }

    fn coefficient_count(&self) -> usize {
        self.bindings
            .iter()
            .filter_map(|b| match b.slot {
                Slot::Coefficient(i) => Some(i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn initial_count(&self) -> usize {
        self.bindings
            .iter()
            .filter_map(|b| match b.slot {
                Slot::Initial(i) => Some(i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Values currently held in a curve's coefficient and initial-condition slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotValues {
    pub coefficients: Vec<f64>,
    pub initial: Vec<Option<f64>>,
}

impl SlotValues {
    /// Fills every slot declared in `map` from `params`.
    ///
    /// Coefficients must be configured (or carry a fallback); initial-condition
    /// slots may stay unbound until `resolve_initial_state` is called.
    pub fn bind(curve: &str, map: &ParameterMap, params: &ParameterSet) -> CurveResult<Self> {
        let mut coefficients = vec![None; map.coefficient_count()];
        let mut initial = vec![None; map.initial_count()];

        for binding in map.bindings() {
            let value = params.value(binding.name).or(binding.fallback);
            match binding.slot {
                Slot::Time => {}
                Slot::Coefficient(i) => {
                    coefficients[i] = Some(value.ok_or_else(|| CurveError::MissingParameter {
                        curve: curve.to_string(),
                        name: binding.name.to_string(),
                    })?);
                }
                Slot::Initial(i) => {
                    if value.is_some() {
                        initial[i] = value;
                    }
                }
            }
        }

        let coefficients = coefficients
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| {
                    CurveError::invalid(format!(
                        "Curve '{}' declares no parameter for coefficient slot {}.",
                        curve, i
                    ))
                })
            })
            .collect::<CurveResult<Vec<f64>>>()?;

        Ok(Self {
            coefficients,
            initial,
        })
    }

    pub fn assign(&mut self, slot: Slot, value: f64) {
        match slot {
            Slot::Time => {}
            Slot::Coefficient(i) => self.coefficients[i] = value,
            Slot::Initial(i) => self.initial[i] = Some(value),
        }
    }

    /// Produces the ordered initial state.
    ///
    /// The initial-condition bindings of `map` must cover exactly
    /// `0..equation_count`, each index once, and every one must hold a value.
    pub fn resolve_initial_state(
        &self,
        curve: &str,
        map: &ParameterMap,
        equation_count: usize,
    ) -> CurveResult<Vec<f64>> {
        let unresolved = |reason: String| CurveError::UnresolvedInitialConditions {
            curve: curve.to_string(),
            reason,
        };

        let mut owners: Vec<Option<&str>> = vec![None; equation_count];
        for binding in map.bindings() {
            if let Slot::Initial(i) = binding.slot {
                if i >= equation_count {
                    return Err(unresolved(format!(
                        "'{}' binds slot {} but the system has {} equations",
                        binding.name, i, equation_count
                    )));
                }
                if let Some(previous) = owners[i] {
                    return Err(unresolved(format!(
                        "'{}' and '{}' both bind slot {}",
                        previous, binding.name, i
                    )));
                }
                owners[i] = Some(binding.name);
            }
        }

        let mut state = Vec::with_capacity(equation_count);
        for (i, owner) in owners.into_iter().enumerate() {
            let name = owner.ok_or_else(|| unresolved(format!("no parameter binds slot {}", i)))?;
            let value = self
                .initial
                .get(i)
                .copied()
                .flatten()
                .ok_or_else(|| unresolved(format!("'{}' (slot {}) has no value", name, i)))?;
            state.push(value);
        }
        Ok(state)
    }
}
