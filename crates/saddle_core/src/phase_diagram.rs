use crate::continuation::{ContinuationConfigBuilder, ContinuationRunner, PointKind, StepSizes};
use crate::dedup::eliminate_redundant;
use crate::model::ModelConfig;
use crate::traits::{ContinuationEngine, FixedPointSolver};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Budgets and tracked-point configuration for one phase-diagram sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiagramSettings {
    /// Special-point kind whose loci form the diagram's boundary curves.
    pub tracked_kind: PointKind,
    pub max_num_points: usize,
    pub step_sizes: StepSizes,
    pub save_eigenvalues: bool,
    pub max_candidates: usize,
    pub search_budget: usize,
    pub tolerance: f64,
    pub dedup_digits: u32,
    /// Display ranges forwarded to the plotting sink, not used numerically.
    pub free_limits: Option<[f64; 2]>,
    pub secondary_limits: Option<[f64; 2]>,
}

impl Default for PhaseDiagramSettings {
    fn default() -> Self {
        Self {
            tracked_kind: PointKind::LimitPoint,
            max_num_points: 10_000,
            step_sizes: StepSizes {
                max: 5e-1,
                min: 1e-2,
                initial: 1e-1,
            },
            save_eigenvalues: false,
            max_candidates: 2,
            search_budget: 1_000,
            tolerance: 1e-10,
            dedup_digits: 6,
            free_limits: None,
            secondary_limits: None,
        }
    }
}

/// One boundary sample: where along the free parameter a tracked special
/// point sits for a given secondary-parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDiagramPoint {
    pub secondary_value: f64,
    pub free_value: f64,
    /// Position of the special point in its sweep's extraction order;
    /// identifies which boundary curve the sample belongs to.
    pub branch: usize,
}

/// A two-parameter phase diagram assembled from repeated continuation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseDiagram {
    pub free_parameter: String,
    pub secondary_parameter: String,
    pub points: Vec<PhaseDiagramPoint>,
    pub free_limits: Option<[f64; 2]>,
    pub secondary_limits: Option<[f64; 2]>,
}

impl PhaseDiagram {
    /// Groups points by branch index into separate boundary curves; within
    /// each curve points keep sweep order. Branches with no points (possible
    /// when a later sweep value finds fewer special points) come out empty.
    pub fn branch_curves(&self) -> Vec<Vec<&PhaseDiagramPoint>> {
        let branch_count = self
            .points
            .iter()
            .map(|point| point.branch + 1)
            .max()
            .unwrap_or(0);
        let mut curves = vec![Vec::new(); branch_count];
        for point in &self.points {
            curves[point.branch].push(point);
        }
        curves
    }
}

/// Sweeps `secondary_parameter` over `sweep` and assembles the loci of the
/// tracked special-point kind along `free_parameter`.
///
/// For each sweep value the model is re-derived with the free parameter
/// pinned at `free_value` and the secondary parameter set, up to two fixed
/// points are solved and deduplicated, and a continuation seeded from the
/// first surviving point is traced along the free parameter. Every extracted
/// special point contributes one diagram point keyed by its extraction
/// position. A sweep value that yields no fixed points or no special points
/// contributes nothing; it is not an error.
pub fn build<S, E>(
    solver: &S,
    engine: &E,
    config: &ModelConfig,
    curve_name: &str,
    free_parameter: &str,
    free_value: f64,
    secondary_parameter: &str,
    sweep: &[f64],
    settings: &PhaseDiagramSettings,
) -> Result<PhaseDiagram>
where
    S: FixedPointSolver,
    E: ContinuationEngine,
{
    let mut points = Vec::new();

    for &secondary_value in sweep {
        let swept = config
            .with_parameter(free_parameter, free_value)
            .with_parameter(secondary_parameter, secondary_value);

        let candidates = solver.search(
            &swept,
            settings.max_candidates,
            settings.search_budget,
            settings.tolerance,
        )?;
        let deduplicated = eliminate_redundant(&candidates, settings.dedup_digits);
        let Some(seed) = deduplicated.first() else {
            continue;
        };

        let continuation = ContinuationConfigBuilder::new(
            curve_name,
            free_parameter,
            settings.max_num_points,
        )
        .step_sizes(settings.step_sizes)
        .save_eigenvalues(settings.save_eigenvalues)
        .build()?;

        let runner =
            ContinuationRunner::trace(engine, &swept.with_initial_conditions(seed), &continuation)?;
        for (branch, special) in runner
            .special_points(settings.tracked_kind)?
            .iter()
            .enumerate()
        {
            let free_at_point = *special.coordinates.get(free_parameter).ok_or_else(|| {
                anyhow!(
                    "Special point {}{} has no coordinate: {free_parameter}",
                    special.kind.label(),
                    special.index
                )
            })?;
            points.push(PhaseDiagramPoint {
                secondary_value,
                free_value: free_at_point,
                branch,
            });
        }
    }

    Ok(PhaseDiagram {
        free_parameter: free_parameter.to_string(),
        secondary_parameter: secondary_parameter.to_string(),
        points,
        free_limits: settings.free_limits,
        secondary_limits: settings.secondary_limits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FixedPoint, ModelConfig};
    use crate::test_fixtures::{point, special, ScriptedCurve, ScriptedEngine};
    use crate::traits::FixedPointSolver;
    use anyhow::Result;

    /// Fake solver that finds one equilibrium unless the secondary parameter
    /// exceeds `vanish_above`.
    struct ThresholdSolver {
        vanish_above: f64,
    }

    impl FixedPointSolver for ThresholdSolver {
        fn search(
            &self,
            config: &ModelConfig,
            _max_candidates: usize,
            _search_budget: usize,
            _tolerance: f64,
        ) -> Result<Vec<FixedPoint>> {
            if config.parameter("b").unwrap_or(0.0) > self.vanish_above {
                return Ok(vec![]);
            }
            Ok(vec![point(&[("x", 1.0)]), point(&[("x", 1.0 + 1e-9)])])
        }
    }

    fn swept_config() -> ModelConfig {
        let mut config = ModelConfig::default();
        config.equations.insert("x".to_string(), "f(x)".to_string());
        config.parameters.insert("a".to_string(), 0.0);
        config.parameters.insert("b".to_string(), 0.0);
        config.initial_conditions.insert("x".to_string(), 0.0);
        config
    }

    fn curve_with_limit_points(values: &[f64]) -> ScriptedCurve {
        ScriptedCurve {
            specials: values
                .iter()
                .enumerate()
                .map(|(i, &a)| special(PointKind::LimitPoint, i + 1, &[("a", a), ("x", 1.0)]))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn two_limit_points_per_sweep_value_form_two_branches() {
        let solver = ThresholdSolver { vanish_above: 1e9 };
        let engine = ScriptedEngine::with_curves(vec![
            curve_with_limit_points(&[0.2, 0.9]),
            curve_with_limit_points(&[0.3, 0.8]),
            curve_with_limit_points(&[0.4, 0.7]),
        ]);

        let diagram = build(
            &solver,
            &engine,
            &swept_config(),
            "cusp",
            "a",
            0.5,
            "b",
            &[1.0, 2.0, 3.0],
            &PhaseDiagramSettings::default(),
        )
        .expect("sweep should succeed");

        assert_eq!(diagram.points.len(), 6);
        assert!(diagram.points.iter().all(|p| p.branch < 2));

        let curves = diagram.branch_curves();
        assert_eq!(curves.len(), 2);
        for curve in &curves {
            assert_eq!(curve.len(), 3);
            let sweep_order: Vec<f64> = curve.iter().map(|p| p.secondary_value).collect();
            assert_eq!(sweep_order, vec![1.0, 2.0, 3.0]);
        }
        // Lower branch holds the first-extracted limit point of each run.
        assert_eq!(curves[0][0].free_value, 0.2);
        assert_eq!(curves[1][2].free_value, 0.7);
    }

    #[test]
    fn sweep_values_without_special_points_contribute_nothing() {
        let solver = ThresholdSolver { vanish_above: 1e9 };
        let engine = ScriptedEngine::with_curves(vec![
            curve_with_limit_points(&[0.2]),
            curve_with_limit_points(&[]),
            curve_with_limit_points(&[0.4]),
        ]);

        let diagram = build(
            &solver,
            &engine,
            &swept_config(),
            "cusp",
            "a",
            0.5,
            "b",
            &[1.0, 2.0, 3.0],
            &PhaseDiagramSettings::default(),
        )
        .unwrap();

        assert_eq!(diagram.points.len(), 2);
        let curves = diagram.branch_curves();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].len(), 2);
    }

    #[test]
    fn sweep_values_without_fixed_points_are_skipped() {
        let solver = ThresholdSolver { vanish_above: 1.5 };
        // Only the first sweep value finds an equilibrium, so only one curve
        // is ever requested from the engine.
        let engine = ScriptedEngine::with_curves(vec![curve_with_limit_points(&[0.2])]);

        let diagram = build(
            &solver,
            &engine,
            &swept_config(),
            "cusp",
            "a",
            0.5,
            "b",
            &[1.0, 2.0, 3.0],
            &PhaseDiagramSettings::default(),
        )
        .unwrap();

        assert_eq!(diagram.points.len(), 1);
        assert_eq!(diagram.points[0].secondary_value, 1.0);
        assert_eq!(engine.seen_configs().len(), 1);
    }

    #[test]
    fn continuation_is_seeded_from_the_first_deduplicated_point() {
        let solver = ThresholdSolver { vanish_above: 1e9 };
        let engine = ScriptedEngine::with_curves(vec![curve_with_limit_points(&[0.2])]);

        build(
            &solver,
            &engine,
            &swept_config(),
            "cusp",
            "a",
            0.5,
            "b",
            &[1.0],
            &PhaseDiagramSettings::default(),
        )
        .unwrap();

        let configs = engine.seen_configs();
        assert_eq!(configs[0].initial_conditions.get("x"), Some(&1.0));
        assert_eq!(configs[0].parameter("a"), Some(0.5));
        assert_eq!(configs[0].parameter("b"), Some(1.0));
    }

    #[test]
    fn empty_diagram_groups_into_no_curves() {
        let diagram = PhaseDiagram {
            free_parameter: "a".to_string(),
            secondary_parameter: "b".to_string(),
            points: vec![],
            free_limits: None,
            secondary_limits: None,
        };
        assert!(diagram.branch_curves().is_empty());
    }
}
