//! The `saddle_core` crate orchestrates bifurcation and stability analysis of
//! parameterized ODE models on top of three external numerical collaborators:
//! an ODE integrator, a nonlinear fixed-point solver, and a continuation
//! engine. The crate never integrates or continues anything itself; it
//! configures those collaborators, post-processes their results, and keeps
//! the bookkeeping honest.
//!
//! Key components:
//! - **Traits**: collaborator seams (`Integrator`, `FixedPointSolver`,
//!   `ContinuationEngine`, `CurveHandle`).
//! - **Model**: `ModelConfig`, an immutable model description with pure
//!   derive operations instead of in-place reconfiguration.
//! - **Analysis**: fixed-point deduplication, perturb-and-resimulate
//!   stability labels, continuation runs with special-point extraction,
//!   nullcline tracing, parameter sensitivity, and phase-diagram assembly.

pub mod continuation;
pub mod dedup;
pub mod functions;
pub mod model;
pub mod nullcline;
pub mod phase_diagram;
pub mod sensitivity;
pub mod stability;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_fixtures;
