use crate::continuation::{
    ContinuationConfigBuilder, ContinuationRunner, ProjectedPoint, StepSizes,
};
use crate::model::{FixedPoint, ModelConfig};
use crate::stability::StabilityLabel;
use crate::traits::ContinuationEngine;
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Continuation budget for one nullcline trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullclineSettings {
    /// Point budget per axis, in axis-pair order.
    pub max_num_points: [usize; 2],
    pub step_sizes: StepSizes,
}

impl Default for NullclineSettings {
    fn default() -> Self {
        Self {
            max_num_points: [1000, 1000],
            step_sizes: StepSizes {
                max: 1e3,
                min: 1e-1,
                initial: 5e1,
            },
        }
    }
}

/// One traced nullcline, projected onto the requested axis pair.
///
/// Freezing `frozen_axis` and continuing the reduced subsystem along it
/// yields the locus where the remaining variables' rates of change vanish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullclineCurve {
    pub frozen_axis: String,
    pub points: Vec<ProjectedPoint>,
}

/// Overlay marker for one fixed point, colored by its stability label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedPointMarker {
    pub x: f64,
    pub y: f64,
    pub label: StabilityLabel,
}

/// Everything the plotting sink needs to draw a nullcline chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullclineChart {
    pub x_axis: String,
    pub y_axis: String,
    pub curves: Vec<NullclineCurve>,
    pub markers: Vec<FixedPointMarker>,
}

/// Traces the nullclines of a two-variable axis pair.
///
/// For each axis of `axes`, a reduced configuration is derived from `base`:
/// the axis variable loses its own dynamics and becomes a parameter frozen at
/// the reference fixed point's coordinate (optionally domain-restricted by
/// `ranges`), while every remaining variable keeps its equation and domain
/// and is seeded from the reference point. The reduced model is continued
/// along the frozen axis with bifurcation detection disabled.
///
/// `base` is a value and is never touched; every reduction is an independent
/// derived copy. `fixed_points` and `labels` must be positionally aligned;
/// the fixed point at `reference_index` anchors both reductions.
pub fn trace_nullclines<E: ContinuationEngine>(
    engine: &E,
    base: &ModelConfig,
    axes: (&str, &str),
    fixed_points: &[FixedPoint],
    labels: &[StabilityLabel],
    reference_index: usize,
    ranges: Option<&BTreeMap<String, [f64; 2]>>,
    settings: &NullclineSettings,
) -> Result<NullclineChart> {
    if labels.len() != fixed_points.len() {
        bail!(
            "Stability label count ({}) does not match fixed point count ({}).",
            labels.len(),
            fixed_points.len()
        );
    }
    let Some(reference) = fixed_points.get(reference_index) else {
        bail!("Reference fixed point index {reference_index} out of range.");
    };

    let mut curves = Vec::with_capacity(2);
    for (slot, axis) in [axes.0, axes.1].into_iter().enumerate() {
        let frozen_value = *reference
            .get(axis)
            .ok_or_else(|| anyhow!("Reference fixed point has no coordinate: {axis}"))?;
        let domain = ranges.and_then(|r| r.get(axis)).copied();

        let reduced = base
            .without_variable(axis, frozen_value, domain)?
            .with_initial_conditions(reference);
        let config = ContinuationConfigBuilder::new("nullclines", axis, settings.max_num_points[slot])
            .step_sizes(settings.step_sizes)
            .locate(None)
            .build()?;

        let runner = ContinuationRunner::trace(engine, &reduced, &config)?;
        curves.push(NullclineCurve {
            frozen_axis: axis.to_string(),
            points: runner.projection(axes.0, axes.1)?,
        });
    }

    let mut markers = Vec::with_capacity(fixed_points.len());
    for (point, &label) in fixed_points.iter().zip(labels) {
        let x = *point
            .get(axes.0)
            .ok_or_else(|| anyhow!("Fixed point has no coordinate: {}", axes.0))?;
        let y = *point
            .get(axes.1)
            .ok_or_else(|| anyhow!("Fixed point has no coordinate: {}", axes.1))?;
        markers.push(FixedPointMarker { x, y, label });
    }

    Ok(NullclineChart {
        x_axis: axes.0.to_string(),
        y_axis: axes.1.to_string(),
        curves,
        markers,
    })
}
