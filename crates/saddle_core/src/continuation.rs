use crate::model::{FixedPoint, ModelConfig};
use crate::traits::{ContinuationEngine, CurveHandle};
use anyhow::{bail, Result};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Safety cap on the "query until absent" special-point loop. An engine that
/// never reports absence turns into a bounded-iteration failure instead of a
/// hang.
pub const MAX_SPECIAL_POINT_INDEX: usize = 1024;

/// Kinds of labeled points an engine can attach to a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    LimitPoint,
    BranchPoint,
    Hopf,
}

impl PointKind {
    /// The label string engines use for this kind ("LP1", "B2", ...).
    pub fn label(self) -> &'static str {
        match self {
            PointKind::LimitPoint => "LP",
            PointKind::BranchPoint => "B",
            PointKind::Hopf => "H",
        }
    }
}

/// Which bifurcation kinds the engine should actively locate while tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocateBifurcations {
    /// Every kind the engine supports.
    All,
    Kinds(Vec<PointKind>),
}

/// Class of curve being continued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveType {
    #[default]
    EquilibriumPointCurve,
    LimitPointCurve,
}

/// Predictor step-size bounds handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSizes {
    pub max: f64,
    pub min: f64,
    pub initial: f64,
}

impl Default for StepSizes {
    fn default() -> Self {
        Self {
            max: 10.0,
            min: 0.1,
            initial: 1.0,
        }
    }
}

/// Validated, immutable configuration for one continuation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationConfig {
    pub curve_name: String,
    pub free_parameter: String,
    pub max_num_points: usize,
    pub step_sizes: StepSizes,
    /// Point kinds at which tracing must stop.
    pub stop_at: Vec<PointKind>,
    /// `None` disables bifurcation detection entirely.
    pub locate: Option<LocateBifurcations>,
    pub save_eigenvalues: bool,
    pub curve_type: CurveType,
}

/// Builder for [`ContinuationConfig`].
///
/// Defaults: step sizes 10 / 0.1 / 1.0, stop at branch points, locate all
/// supported bifurcation kinds, no eigenvalue storage, equilibrium-point
/// curve.
#[derive(Debug, Clone)]
pub struct ContinuationConfigBuilder {
    curve_name: String,
    free_parameter: String,
    max_num_points: usize,
    step_sizes: StepSizes,
    stop_at: Vec<PointKind>,
    locate: Option<LocateBifurcations>,
    save_eigenvalues: bool,
    curve_type: CurveType,
}

impl ContinuationConfigBuilder {
    pub fn new(curve_name: &str, free_parameter: &str, max_num_points: usize) -> Self {
        Self {
            curve_name: curve_name.to_string(),
            free_parameter: free_parameter.to_string(),
            max_num_points,
            step_sizes: StepSizes::default(),
            stop_at: vec![PointKind::BranchPoint],
            locate: Some(LocateBifurcations::All),
            save_eigenvalues: false,
            curve_type: CurveType::default(),
        }
    }

    pub fn step_sizes(mut self, step_sizes: StepSizes) -> Self {
        self.step_sizes = step_sizes;
        self
    }

    pub fn stop_at(mut self, kinds: Vec<PointKind>) -> Self {
        self.stop_at = kinds;
        self
    }

    pub fn locate(mut self, locate: Option<LocateBifurcations>) -> Self {
        self.locate = locate;
        self
    }

    pub fn save_eigenvalues(mut self, save: bool) -> Self {
        self.save_eigenvalues = save;
        self
    }

    pub fn curve_type(mut self, curve_type: CurveType) -> Self {
        self.curve_type = curve_type;
        self
    }

    pub fn build(self) -> Result<ContinuationConfig> {
        if self.max_num_points == 0 {
            bail!("max_num_points must be greater than zero.");
        }
        let StepSizes { max, min, initial } = self.step_sizes;
        if !(min > 0.0 && initial > 0.0 && max > 0.0) {
            bail!("Step sizes must all be positive.");
        }
        if min > initial || initial > max {
            bail!("Step sizes must satisfy min <= initial <= max.");
        }

        Ok(ContinuationConfig {
            curve_name: self.curve_name,
            free_parameter: self.free_parameter,
            max_num_points: self.max_num_points,
            step_sizes: self.step_sizes,
            stop_at: self.stop_at,
            locate: self.locate,
            save_eigenvalues: self.save_eigenvalues,
            curve_type: self.curve_type,
        })
    }
}

/// A single point on a continuation curve.
///
/// `coordinates` holds every state variable plus the free parameter, keyed by
/// name. Eigenvalues are present only when the run requested them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurvePoint {
    pub coordinates: FixedPoint,
    pub stable: bool,
    #[serde(default)]
    pub eigenvalues: Vec<Complex<f64>>,
}

/// A labeled special point reported by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialPoint {
    pub kind: PointKind,
    /// 1-based, contiguous per kind.
    pub index: usize,
    pub coordinates: BTreeMap<String, f64>,
    /// Normal-form coefficients, when the engine computed them.
    #[serde(default)]
    pub normal_form: Option<Vec<f64>>,
}

/// A curve point projected onto a chosen axis pair for the plotting sink.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub stable: bool,
}

/// Drives one continuation run: instantiates a named curve, traces it
/// forward then backward from the model's initial conditions, and exposes
/// the results. Engine convergence failures pass through unmodified; there
/// is no retry.
#[derive(Debug)]
pub struct ContinuationRunner<C: CurveHandle> {
    name: String,
    handle: C,
}

impl<C: CurveHandle> ContinuationRunner<C> {
    pub fn trace<E>(
        engine: &E,
        config: &ModelConfig,
        settings: &ContinuationConfig,
    ) -> Result<Self>
    where
        E: ContinuationEngine<Curve = C>,
    {
        let mut handle = engine.new_curve(config, settings)?;
        handle.forward()?;
        handle.backward()?;
        Ok(Self {
            name: settings.curve_name.clone(),
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The traced curve, in trace order.
    pub fn points(&self) -> &[CurvePoint] {
        self.handle.points()
    }

    /// Selects the `(x_axis, y_axis)` projection of every curve point, for
    /// handing to a plotting sink.
    pub fn projection(&self, x_axis: &str, y_axis: &str) -> Result<Vec<ProjectedPoint>> {
        let mut projected = Vec::with_capacity(self.points().len());
        for point in self.points() {
            let Some(&x) = point.coordinates.get(x_axis) else {
                bail!("Curve point is missing coordinate: {x_axis}");
            };
            let Some(&y) = point.coordinates.get(y_axis) else {
                bail!("Curve point is missing coordinate: {y_axis}");
            };
            projected.push(ProjectedPoint {
                x,
                y,
                stable: point.stable,
            });
        }
        Ok(projected)
    }

    /// Collects every special point of `kind`, querying index 1, 2, 3, ...
    /// until the engine reports one absent. An engine that never does is cut
    /// off at [`MAX_SPECIAL_POINT_INDEX`] and reported as an error. Zero
    /// points is a normal empty result.
    pub fn special_points(&self, kind: PointKind) -> Result<Vec<SpecialPoint>> {
        let mut found = Vec::new();
        for index in 1..=MAX_SPECIAL_POINT_INDEX {
            match self.handle.special_point(kind, index) {
                Some(point) => found.push(point),
                None => return Ok(found),
            }
        }
        bail!(
            "Engine reported more than {} '{}' points without an end marker.",
            MAX_SPECIAL_POINT_INDEX,
            kind.label()
        );
    }
}
