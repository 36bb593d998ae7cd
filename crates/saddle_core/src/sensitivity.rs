use crate::continuation::{
    ContinuationConfigBuilder, ContinuationRunner, ProjectedPoint, StepSizes,
};
use crate::dedup::eliminate_redundant;
use crate::model::ModelConfig;
use crate::traits::{ContinuationEngine, FixedPointSolver};
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

/// Perturbation schedule and solver budget for one sensitivity scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySettings {
    /// Relative perturbation applied as +delta and -delta around the base.
    pub delta: f64,
    pub max_candidates: usize,
    pub search_budget: usize,
    pub tolerance: f64,
    pub dedup_digits: u32,
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self {
            delta: 0.1,
            max_candidates: 4,
            search_budget: 10_000,
            tolerance: 1e-12,
            dedup_digits: 6,
        }
    }
}

/// Percentage change of the target variable for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub parameter: String,
    pub percent_at_plus: f64,
    pub percent_at_minus: f64,
}

impl SensitivityEntry {
    fn magnitude(&self) -> f64 {
        self.percent_at_plus.abs() + self.percent_at_minus.abs()
    }
}

/// Result of a sensitivity scan, entries in input parameter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub entries: Vec<SensitivityEntry>,
}

impl SensitivityResult {
    /// Entries sorted by descending summed absolute percentage change.
    /// Ties keep their original parameter order (stable sort).
    pub fn ranked(&self) -> Vec<&SensitivityEntry> {
        let mut ranked: Vec<&SensitivityEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            b.magnitude()
                .partial_cmp(&a.magnitude())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Measures how strongly each parameter moves the target variable's
/// equilibrium value.
///
/// For each parameter with a nonzero base value the model is re-solved with
/// the parameter scaled by 1, 1 + delta, and 1 - delta; the target variable
/// is read off the first deduplicated fixed point each time, and the
/// percentage change relative to the unperturbed baseline is recorded for
/// both perturbed runs. A parameter whose base value is exactly zero is
/// assigned (0, 0) without solving, since the relative perturbation would be
/// vacuous and the division undefined.
pub fn analyze<S: FixedPointSolver>(
    solver: &S,
    config: &ModelConfig,
    parameters: &[&str],
    target: &str,
    settings: &SensitivitySettings,
) -> Result<SensitivityResult> {
    let mut entries = Vec::with_capacity(parameters.len());

    for &name in parameters {
        let Some(base) = config.parameter(name) else {
            bail!("Unknown parameter: {name}");
        };
        if base == 0.0 {
            entries.push(SensitivityEntry {
                parameter: name.to_string(),
                percent_at_plus: 0.0,
                percent_at_minus: 0.0,
            });
            continue;
        }

        let mut responses = [0.0; 3];
        for (slot, factor) in [1.0, 1.0 + settings.delta, 1.0 - settings.delta]
            .into_iter()
            .enumerate()
        {
            let scaled = config.with_parameter(name, base * factor);
            let candidates = solver.search(
                &scaled,
                settings.max_candidates,
                settings.search_budget,
                settings.tolerance,
            )?;
            let deduplicated = eliminate_redundant(&candidates, settings.dedup_digits);
            let first = deduplicated
                .first()
                .ok_or_else(|| anyhow!("Fixed-point search found nothing for parameter {name}."))?;
            responses[slot] = *first
                .get(target)
                .ok_or_else(|| anyhow!("Fixed point has no coordinate: {target}"))?;
        }

        let baseline = responses[0];
        entries.push(SensitivityEntry {
            parameter: name.to_string(),
            percent_at_plus: 100.0 * (responses[1] - baseline) / baseline,
            percent_at_minus: 100.0 * (responses[2] - baseline) / baseline,
        });
    }

    Ok(SensitivityResult { entries })
}

/// Perturbation schedule and budgets for a perturbed bifurcation family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BifurcationFamilySettings {
    pub delta: f64,
    pub max_num_points: usize,
    pub step_sizes: StepSizes,
    pub max_candidates: usize,
    pub search_budget: usize,
    pub tolerance: f64,
    pub dedup_digits: u32,
}

impl Default for BifurcationFamilySettings {
    fn default() -> Self {
        Self {
            delta: 0.1,
            max_num_points: 200,
            step_sizes: StepSizes {
                max: 1e1,
                min: 1e-3,
                initial: 5e0,
            },
            max_candidates: 4,
            search_budget: 10_000,
            tolerance: 1e-10,
            dedup_digits: 6,
        }
    }
}

/// One bifurcation curve of a perturbed family: the diagram of `target`
/// against the free parameter with `parameter` scaled by `scale_factor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BifurcationFamilyMember {
    pub parameter: String,
    pub scale_factor: f64,
    pub curve: Vec<ProjectedPoint>,
}

/// Traces one bifurcation diagram per ±delta perturbation of each parameter.
///
/// For each parameter in turn, the model is re-derived with that parameter
/// scaled by 1, 1 + delta, and 1 - delta; each derived model is re-solved
/// for fixed points, deduplicated, seeded from the first surviving point,
/// and continued along `free_parameter` with eigenvalue storage on (so the
/// sink can tell stable from unstable segments). The result is the family of
/// `(free_parameter, target)` diagrams callers overlay to see how sensitive
/// the bifurcation structure itself is, complementing [`analyze`], which
/// only watches one equilibrium move.
pub fn bifurcation_family<S, E>(
    solver: &S,
    engine: &E,
    config: &ModelConfig,
    parameters: &[&str],
    free_parameter: &str,
    target: &str,
    curve_name: &str,
    settings: &BifurcationFamilySettings,
) -> Result<Vec<BifurcationFamilyMember>>
where
    S: FixedPointSolver,
    E: ContinuationEngine,
{
    let mut members = Vec::with_capacity(parameters.len() * 3);

    for &name in parameters {
        for factor in [1.0, 1.0 + settings.delta, 1.0 - settings.delta] {
            let scaled = config.with_scaled_parameter(name, factor)?;
            let candidates = solver.search(
                &scaled,
                settings.max_candidates,
                settings.search_budget,
                settings.tolerance,
            )?;
            let deduplicated = eliminate_redundant(&candidates, settings.dedup_digits);
            let seed = deduplicated
                .first()
                .ok_or_else(|| anyhow!("Fixed-point search found nothing for parameter {name}."))?;

            let continuation = ContinuationConfigBuilder::new(
                curve_name,
                free_parameter,
                settings.max_num_points,
            )
            .step_sizes(settings.step_sizes)
            .save_eigenvalues(true)
            .build()?;

            let runner = ContinuationRunner::trace(
                engine,
                &scaled.with_initial_conditions(seed),
                &continuation,
            )?;
            members.push(BifurcationFamilyMember {
                parameter: name.to_string(),
                scale_factor: factor,
                curve: runner.projection(free_parameter, target)?,
            });
        }
    }

    Ok(members)
}
