//! The curve entity shared by every family.
//!
//! A `Curve` owns its identity and styling, its bound parameters, the time grid
//! and the sample/time buffers the renderer reads. `calculate(0.0)` recomputes
//! the whole grid; `calculate(step)` on an ODE curve extends the trajectory by
//! one step, growing the buffers in chunks of `point_count` rows.

use crate::binding::{ParameterMap, Slot, SlotValues};
use crate::buffer::SampleBuffer;
use crate::closed_form::Formula;
use crate::error::{CurveError, CurveResult};
use crate::integrator::{integrate, IntegratorSettings};
use crate::ode::OdeFamily;
use crate::parameters::{ParameterSet, TIME_PARAMETER};
use crate::time_grid::TimeGrid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_CURVE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique curve identity. Clones of a curve share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CurveId(u64);

impl CurveId {
    fn next() -> Self {
        Self(NEXT_CURVE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 2-D slice of the sample buffer that can be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Projection {
    #[serde(rename = "xy")]
    Xy,
    #[serde(rename = "tx")]
    TimeX,
    #[serde(rename = "ty")]
    TimeY,
    #[serde(rename = "tz")]
    TimeZ,
}

impl Projection {
    pub fn tag(self) -> &'static str {
        match self {
            Projection::Xy => "xy",
            Projection::TimeX => "tx",
            Projection::TimeY => "ty",
            Projection::TimeZ => "tz",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "xy" => Some(Projection::Xy),
            "tx" => Some(Projection::TimeX),
            "ty" => Some(Projection::TimeY),
            "tz" => Some(Projection::TimeZ),
            _ => None,
        }
    }

    /// Highest sample component the projection reads.
    fn max_component(self) -> usize {
        match self {
            Projection::Xy | Projection::TimeY => 1,
            Projection::TimeX => 0,
            Projection::TimeZ => 2,
        }
    }
}

/// How many variables the curve relates, deciding which projections exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParametricKind {
    /// `y = f(x)`
    Plain,
    /// `x(t)`, `y(t)`
    Parametric2,
    /// `x(t)`, `y(t)`, `z(t)`
    Parametric3,
}

impl ParametricKind {
    pub fn projections(self) -> &'static [Projection] {
        match self {
            ParametricKind::Plain => &[Projection::Xy],
            ParametricKind::Parametric2 => &[Projection::Xy, Projection::TimeX, Projection::TimeY],
            ParametricKind::Parametric3 => &[
                Projection::Xy,
                Projection::TimeX,
                Projection::TimeY,
                Projection::TimeZ,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionStyle {
    pub color: String,
    pub thickness: f64,
    /// Display panel the projection is shown in, if any.
    pub panel: Option<u32>,
}

/// What produces a curve's samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Family {
    /// Two fixed endpoints, nothing to compute.
    Segment { from: [f64; 2], to: [f64; 2] },
    /// A fixed segment in space.
    Segment3 { from: [f64; 3], to: [f64; 3] },
    ClosedForm(Formula),
    Ode(OdeFamily),
}

impl Family {
    pub fn display_name(&self) -> &'static str {
        match self {
            Family::Segment { .. } | Family::Segment3 { .. } => "Line",
            Family::ClosedForm(formula) => formula.display_name(),
            Family::Ode(family) => family.display_name(),
        }
    }

    pub fn parameter_map(&self) -> ParameterMap {
        match self {
            Family::Segment { .. } | Family::Segment3 { .. } => ParameterMap::new(Vec::new()),
            Family::ClosedForm(formula) => formula.parameter_map(),
            Family::Ode(family) => family.parameter_map(),
        }
    }

    /// Width of a sample row.
    pub fn output_dimension(&self) -> usize {
        match self {
            Family::Segment { .. } | Family::ClosedForm(_) => 2,
            Family::Segment3 { .. } => 3,
            Family::Ode(family) => family.equation_count(),
        }
    }

    pub fn default_kind(&self) -> ParametricKind {
        match self {
            Family::Segment { .. } | Family::ClosedForm(_) => ParametricKind::Plain,
            Family::Segment3 { .. } => ParametricKind::Parametric3,
            Family::Ode(OdeFamily::Sir) | Family::Ode(OdeFamily::Lorenz) => {
                ParametricKind::Parametric3
            }
            Family::Ode(_) => ParametricKind::Parametric2,
        }
    }

    pub fn supports_incremental(&self) -> bool {
        matches!(self, Family::Ode(_))
    }

    /// The two rows of a segment, stamped at `t = 0` and `t = 1`.
    fn endpoint_buffer(&self) -> Option<SampleBuffer> {
        let (from, to): (&[f64], &[f64]) = match self {
            Family::Segment { from, to } => (&from[..], &to[..]),
            Family::Segment3 { from, to } => (&from[..], &to[..]),
            _ => return None,
        };
        let mut buffer = SampleBuffer::zeroed(from.len(), 2);
        buffer.write(0, 0.0, from);
        buffer.write(1, 1.0, to);
        Some(buffer)
    }
}

impl From<Formula> for Family {
    fn from(formula: Formula) -> Self {
        Family::ClosedForm(formula)
    }
}

impl From<OdeFamily> for Family {
    fn from(family: OdeFamily) -> Self {
        Family::Ode(family)
    }
}

#[derive(Debug, Clone)]
pub struct Curve {
    id: CurveId,
    name: String,
    color: String,
    thickness: f64,
    kind: ParametricKind,
    projections: BTreeMap<Projection, ProjectionStyle>,
    family: Family,
    map: ParameterMap,
    parameters: ParameterSet,
    grid: TimeGrid,
    slots: SlotValues,
    buffer: SampleBuffer,
    settings: IntegratorSettings,
}

impl Curve {
    /// Binds `parameters` to the family's slots.
    ///
    /// Closed-form curves are sampled immediately, so invalid coefficients fail
    /// here. ODE curves start with an empty buffer and may still have unresolved
    /// initial conditions.
    pub fn new(family: Family, parameters: ParameterSet) -> CurveResult<Self> {
        let name = family.display_name().to_string();
        let map = family.parameter_map();
        let slots = SlotValues::bind(&name, &map, &parameters)?;
        let grid = match parameters.get(TIME_PARAMETER) {
            Some(spec) => TimeGrid::from_spec(spec)?,
            None => TimeGrid::default(),
        };

        let mut curve = Self::assemble(family, name, map, parameters, grid, slots);
        if let Family::ClosedForm(formula) = family {
            curve.calculate_closed_form(formula)?;
        }
        Ok(curve)
    }

    /// A fixed line segment between two points.
    pub fn segment(from: [f64; 2], to: [f64; 2]) -> Self {
        Self::fixed(Family::Segment { from, to })
    }

    /// A fixed line segment between two points in space.
    pub fn segment3(from: [f64; 3], to: [f64; 3]) -> Self {
        Self::fixed(Family::Segment3 { from, to })
    }

    fn fixed(family: Family) -> Self {
        let slots = SlotValues {
            coefficients: Vec::new(),
            initial: Vec::new(),
        };
        Self::assemble(
            family,
            family.display_name().to_string(),
            family.parameter_map(),
            ParameterSet::new(),
            TimeGrid::default(),
            slots,
        )
    }

    fn assemble(
        family: Family,
        name: String,
        map: ParameterMap,
        parameters: ParameterSet,
        grid: TimeGrid,
        slots: SlotValues,
    ) -> Self {
        let color = "black".to_string();
        let thickness = 1.0;
        let kind = family.default_kind();
        let projections = kind
            .projections()
            .iter()
            .map(|p| {
                let style = ProjectionStyle {
                    color: color.clone(),
                    thickness,
                    panel: None,
                };
                (*p, style)
            })
            .collect();

        let buffer = family
            .endpoint_buffer()
            .unwrap_or_else(|| SampleBuffer::empty(family.output_dimension()));

        Self {
            id: CurveId::next(),
            name,
            color,
            thickness,
            kind,
            projections,
            family,
            map,
            parameters,
            grid,
            slots,
            buffer,
            settings: IntegratorSettings::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the curve color and thickness, restyling every projection.
    pub fn with_style(mut self, color: impl Into<String>, thickness: f64) -> Self {
        self.color = color.into();
        self.thickness = thickness;
        for style in self.projections.values_mut() {
            style.color = self.color.clone();
            style.thickness = thickness;
        }
        self
    }

    pub fn with_settings(mut self, settings: IntegratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_kind(mut self, kind: ParametricKind) -> CurveResult<Self> {
        self.set_kind(kind)?;
        Ok(self)
    }

    /// Changes the parametric kind; projections that remain keep their styling.
    pub fn set_kind(&mut self, kind: ParametricKind) -> CurveResult<()> {
        let dim = self.family.output_dimension();
        if let Some(p) = kind.projections().iter().find(|p| p.max_component() >= dim) {
            return Err(CurveError::invalid(format!(
                "Projection '{}' needs more than {} sample components.",
                p.tag(),
                dim
            )));
        }
        let mut projections = BTreeMap::new();
        for &p in kind.projections() {
            let style = self.projections.remove(&p).unwrap_or_else(|| ProjectionStyle {
                color: self.color.clone(),
                thickness: self.thickness,
                panel: None,
            });
            projections.insert(p, style);
        }
        self.kind = kind;
        self.projections = projections;
        Ok(())
    }

    pub fn id(&self) -> CurveId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn kind(&self) -> ParametricKind {
        self.kind
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    pub fn parameter_map(&self) -> &ParameterMap {
        &self.map
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn settings(&self) -> &IntegratorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: IntegratorSettings) {
        self.settings = settings;
    }

    pub fn projections(&self) -> impl Iterator<Item = (Projection, &ProjectionStyle)> {
        self.projections.iter().map(|(p, s)| (*p, s))
    }

    pub fn projection_style_mut(&mut self, projection: Projection) -> Option<&mut ProjectionStyle> {
        self.projections.get_mut(&projection)
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn current_index(&self) -> usize {
        self.buffer.current_index()
    }

    /// Valid samples `0..=current_index`, row-major with `output_dimension` columns.
    pub fn samples(&self) -> &[f64] {
        self.buffer.samples()
    }

    /// Valid times `0..=current_index`.
    pub fn times(&self) -> &[f64] {
        self.buffer.times()
    }

    /// The drawable points of `projection`, or `None` if the curve does not
    /// expose it.
    pub fn projection_points(&self, projection: Projection) -> Option<Vec<[f64; 2]>> {
        if !self.projections.contains_key(&projection) {
            return None;
        }
        let times = self.buffer.times();
        let points = (0..self.buffer.valid_len())
            .map(|i| {
                let row = self.buffer.row(i);
                match projection {
                    Projection::Xy => [row[0], row[1]],
                    Projection::TimeX => [times[i], row[0]],
                    Projection::TimeY => [times[i], row[1]],
                    Projection::TimeZ => [times[i], row[2]],
                }
            })
            .collect();
        Some(points)
    }

    /// Resets both buffers to `point_count` zero rows with `current_index = 0`.
    /// Segments have nothing to recompute and keep their endpoints.
    pub fn erase(&mut self) {
        match self.family.endpoint_buffer() {
            Some(endpoints) => self.buffer = endpoints,
            None => self.buffer.erase(self.grid.point_count),
        }
    }

    /// Erases, then fills the time buffer with the grid samples and marks the
    /// whole grid valid.
    pub fn init(&mut self) {
        if let Some(endpoints) = self.family.endpoint_buffer() {
            self.buffer = endpoints;
            return;
        }
        let times = self.grid.samples();
        let dim = self.family.output_dimension();
        let samples = vec![0.0; times.len() * dim];
        self.buffer = SampleBuffer::from_batch(dim, times, samples);
    }

    /// Assigns `value` to the slot bound to `name`.
    ///
    /// Editing an ODE coefficient or initial condition drops the trajectory so
    /// the next `calculate` starts over from the current initial state. Setting
    /// `t` only moves the grid start and keeps history.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> CurveResult<()> {
        let slot = self
            .map
            .bind(name)
            .ok_or_else(|| CurveError::UnknownParameter {
                curve: self.name.clone(),
                name: name.to_string(),
            })?;

        match slot {
            Slot::Time => {
                let mut grid = self.grid;
                grid.set_start(value)?;
                self.parameters.set_value(name, value)?;
                self.grid = grid;
            }
            Slot::Coefficient(_) | Slot::Initial(_) => {
                self.parameters.set_value(name, value)?;
                self.slots.assign(slot, value);
                if self.family.supports_incremental() {
                    debug!(curve = %self.name, parameter = name, "parameter edit invalidates trajectory");
                    self.buffer.invalidate();
                }
            }
        }
        Ok(())
    }

    /// The ordered initial state of an ODE curve.
    pub fn resolve_initial_state(&self) -> CurveResult<Vec<f64>> {
        match self.family {
            Family::Ode(family) => {
                self.slots
                    .resolve_initial_state(&self.name, &self.map, family.equation_count())
            }
            _ => Err(CurveError::invalid(format!(
                "Curve '{}' is not a dynamical system.",
                self.name
            ))),
        }
    }

    /// Recomputes the curve (`step == 0`) or, for ODE curves, extends the
    /// trajectory by one step of `step`. Closed-form curves always recompute.
    ///
    /// On error the buffers are exactly as before the call.
    pub fn calculate(&mut self, step: f64) -> CurveResult<()> {
        let result = match self.family {
            Family::Segment { .. } | Family::Segment3 { .. } => Ok(()),
            Family::ClosedForm(formula) => self.calculate_closed_form(formula),
            Family::Ode(family) if step != 0.0 => self.advance(family, step),
            Family::Ode(family) => self.calculate_batch(family),
        };
        if let Err(err) = &result {
            warn!(curve = %self.name, error = %err, "calculate failed; previous samples kept");
        }
        result
    }

    fn calculate_closed_form(&mut self, formula: Formula) -> CurveResult<()> {
        let times = self.grid.samples();
        let samples = formula.evaluate(&self.slots.coefficients, &times)?;
        self.buffer = SampleBuffer::from_batch(2, times, samples);
        Ok(())
    }

    fn calculate_batch(&mut self, family: OdeFamily) -> CurveResult<()> {
        let times = self.grid.samples();
        let y0 = self.resolve_initial_state()?;
        let span = (self.grid.t_min, self.grid.t_max);
        let system = family.system(&self.slots.coefficients);
        let trajectory = integrate(&system, span, &y0, &times, &self.settings)?;
        self.buffer = SampleBuffer::from_batch(
            family.equation_count(),
            trajectory.times,
            trajectory.states,
        );
        Ok(())
    }

    fn advance(&mut self, family: OdeFamily, step: f64) -> CurveResult<()> {
        let restart = self.buffer.is_empty();
        let (index, start_time, start_state) = if restart {
            (0, self.grid.t0, self.resolve_initial_state()?)
        } else {
            let index = self.buffer.current_index();
            (index, self.buffer.time(index), self.buffer.row(index).to_vec())
        };

        let target = start_time + step;
        let system = family.system(&self.slots.coefficients);
        let trajectory = integrate(
            &system,
            (start_time, target),
            &start_state,
            &[target],
            &self.settings,
        )?;

        let chunk = self.grid.point_count;
        if restart {
            debug!(curve = %self.name, t0 = start_time, "incremental run reinitialised");
            self.buffer.erase(chunk);
            self.buffer.write(0, start_time, &start_state);
        }
        let next = index + 1;
        if next >= self.buffer.capacity() {
            self.buffer.grow(chunk);
        }
        self.buffer.write(next, target, trajectory.state(0));
        Ok(())
    }
}
