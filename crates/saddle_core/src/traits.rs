use crate::continuation::{ContinuationConfig, CurvePoint, PointKind, SpecialPoint};
use crate::model::{FixedPoint, ModelConfig, Trajectory};
use anyhow::Result;

/// Numerical ODE integrator collaborator.
///
/// Given a model description, integrates from its initial conditions and
/// returns the sampled trajectory. Integration schemes are entirely the
/// collaborator's business; failures are propagated to callers unmodified.
pub trait Integrator {
    fn simulate(&self, config: &ModelConfig) -> Result<Trajectory>;
}

/// Nonlinear fixed-point solver collaborator.
pub trait FixedPointSolver {
    /// Searches for up to `max_candidates` fixed points of the model within
    /// `search_budget` solver iterations, to the given residual `tolerance`.
    /// The returned candidates may contain near-duplicates; callers are
    /// expected to pass them through `dedup::eliminate_redundant`.
    fn search(
        &self,
        config: &ModelConfig,
        max_candidates: usize,
        search_budget: usize,
        tolerance: f64,
    ) -> Result<Vec<FixedPoint>>;
}

/// Numerical continuation engine collaborator.
///
/// Instantiates one curve per call; the returned handle owns whatever
/// predictor-corrector state the engine needs.
pub trait ContinuationEngine {
    type Curve: CurveHandle;

    fn new_curve(&self, config: &ModelConfig, settings: &ContinuationConfig)
        -> Result<Self::Curve>;
}

/// One curve being traced by the continuation engine.
pub trait CurveHandle {
    /// Extends the curve in the direction of increasing arclength from the
    /// starting point. A convergence failure (e.g. step size collapsing
    /// below the configured minimum) is the engine's error and is surfaced
    /// as-is.
    fn forward(&mut self) -> Result<()>;

    /// Extends the curve in the opposite direction from the same start.
    fn backward(&mut self) -> Result<()>;

    /// All points traced so far, in trace order (not sorted by parameter).
    fn points(&self) -> &[CurvePoint];

    /// The labeled special point of the given kind at the 1-based `index`,
    /// or `None` once the index runs past the points the engine found.
    /// Indices per kind are contiguous starting at 1.
    fn special_point(&self, kind: PointKind, index: usize) -> Option<SpecialPoint>;
}
