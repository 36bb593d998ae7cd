use crate::model::{FixedPoint, ModelConfig};
use crate::traits::Integrator;
use anyhow::{anyhow, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default relative tolerance for the perturb-and-resimulate test.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Outcome of the local stability test for one fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityLabel {
    Stable,
    Unstable,
}

impl StabilityLabel {
    pub fn is_stable(self) -> bool {
        matches!(self, StabilityLabel::Stable)
    }
}

/// Labels each fixed point Stable or Unstable by perturbing it and watching
/// where a re-simulation settles.
///
/// Every coordinate is multiplied by `(1 + eps * s)` with `s` drawn
/// independently from {-1, +1} out of the caller's `rng`, the model is
/// simulated from the perturbed state, and the trajectory's final sample is
/// compared coordinate-wise against the original point. The point is Stable
/// iff every deviation stays within `eps * |original|`.
///
/// This is a Monte-Carlo local test, not an eigenvalue computation; near
/// marginal stability repeated calls may disagree. Passing a seeded `rng`
/// makes a run reproducible. Note the tolerance scales with the coordinate
/// magnitude, so a zero-valued coordinate must return to exactly zero.
///
/// The returned labels are positionally aligned with `fixed_points`.
pub fn classify<I, R>(
    fixed_points: &[FixedPoint],
    integrator: &I,
    config: &ModelConfig,
    eps: f64,
    rng: &mut R,
) -> Result<Vec<StabilityLabel>>
where
    I: Integrator,
    R: Rng,
{
    let mut labels = Vec::with_capacity(fixed_points.len());

    for point in fixed_points {
        let mut perturbed = FixedPoint::new();
        for (name, &value) in point {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            perturbed.insert(name.clone(), value * (1.0 + eps * sign));
        }

        let trajectory = integrator.simulate(&config.with_initial_conditions(&perturbed))?;
        let settled = trajectory
            .sample_final()
            .ok_or_else(|| anyhow!("Integrator returned an empty trajectory."))?;

        let stable = point.iter().all(|(name, &value)| {
            let end = settled.get(name).copied().unwrap_or(f64::NAN);
            (end - value).abs() <= eps * value.abs()
        });

        labels.push(if stable {
            StabilityLabel::Stable
        } else {
            StabilityLabel::Unstable
        });
    }

    Ok(labels)
}
