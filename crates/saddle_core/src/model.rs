use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point in state space, keyed by variable name.
///
/// Produced by the fixed-point solver and treated as immutable afterwards;
/// the only place values are rewritten is the canonicalization performed by
/// [`crate::dedup::eliminate_redundant`].
pub type FixedPoint = BTreeMap<String, f64>;

/// Sampled output of one integrator run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub samples: Vec<FixedPoint>,
}

impl Trajectory {
    pub fn new(samples: Vec<FixedPoint>) -> Self {
        Self { samples }
    }

    /// The last sampled state, i.e. where the trajectory settled.
    pub fn sample_final(&self) -> Option<&FixedPoint> {
        self.samples.last()
    }
}

/// Immutable description of a parameterized ODE model.
///
/// Components never mutate a shared model instance. Every reconfiguration
/// (new parameter value, new initial conditions, frozen variable) derives a
/// fresh `ModelConfig` value and hands it to a collaborator, so independent
/// analysis runs cannot corrupt each other's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// Right-hand-side expression per state variable, to be interpreted by
    /// the integrator / continuation engine collaborators.
    pub equations: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, f64>,
    pub initial_conditions: BTreeMap<String, f64>,
    pub variable_domains: BTreeMap<String, [f64; 2]>,
    pub parameter_domains: BTreeMap<String, [f64; 2]>,
}

impl ModelConfig {
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Derives a config with one parameter set (or added).
    pub fn with_parameter(&self, name: &str, value: f64) -> Self {
        let mut derived = self.clone();
        derived.parameters.insert(name.to_string(), value);
        derived
    }

    /// Derives a config with one existing parameter multiplied by `factor`.
    pub fn with_scaled_parameter(&self, name: &str, factor: f64) -> Result<Self> {
        let Some(base) = self.parameter(name) else {
            bail!("Unknown parameter: {name}");
        };
        Ok(self.with_parameter(name, base * factor))
    }

    /// Derives a config whose initial conditions are overwritten from
    /// `point`. Coordinates of `point` that do not name a state variable of
    /// this config are ignored, so a fixed point of a larger system can seed
    /// a reduced one.
    pub fn with_initial_conditions(&self, point: &FixedPoint) -> Self {
        let mut derived = self.clone();
        for (name, &value) in point {
            if derived.equations.contains_key(name) {
                derived.initial_conditions.insert(name.clone(), value);
            }
        }
        derived
    }

    /// Derives a reduced config in which `variable` loses its own dynamics
    /// and becomes a parameter frozen at `frozen_value`. The variable's
    /// equation, initial condition, and domain are removed; every remaining
    /// variable keeps its equation and domain. An optional `domain` restricts
    /// the frozen parameter's range (used when the caller continues along it).
    pub fn without_variable(
        &self,
        variable: &str,
        frozen_value: f64,
        domain: Option<[f64; 2]>,
    ) -> Result<Self> {
        if !self.equations.contains_key(variable) {
            bail!("Unknown state variable: {variable}");
        }

        let mut derived = self.clone();
        derived.equations.remove(variable);
        derived.initial_conditions.remove(variable);
        derived.variable_domains.remove(variable);
        derived.parameters.insert(variable.to_string(), frozen_value);
        if let Some(range) = domain {
            derived
                .parameter_domains
                .insert(variable.to_string(), range);
        }
        Ok(derived)
    }
}
