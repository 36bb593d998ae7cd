//! Shared fake collaborators for module tests. The scripted engine hands out
//! pre-built curves in order and records every configuration it was given,
//! so tests can assert on what the orchestration layer actually requested.

use crate::continuation::{ContinuationConfig, CurvePoint, PointKind, SpecialPoint};
use crate::model::{FixedPoint, ModelConfig};
use crate::traits::{ContinuationEngine, CurveHandle};
use anyhow::{bail, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

pub fn point(coordinates: &[(&str, f64)]) -> FixedPoint {
    coordinates
        .iter()
        .map(|&(name, value)| (name.to_string(), value))
        .collect()
}

pub fn special(kind: PointKind, index: usize, coordinates: &[(&str, f64)]) -> SpecialPoint {
    SpecialPoint {
        kind,
        index,
        coordinates: coordinates
            .iter()
            .map(|&(name, value)| (name.to_string(), value))
            .collect::<BTreeMap<String, f64>>(),
        normal_form: None,
    }
}

/// A pre-scripted continuation curve.
#[derive(Debug, Default)]
pub struct ScriptedCurve {
    pub points: Vec<CurvePoint>,
    pub specials: Vec<SpecialPoint>,
    /// Reports a point at every index, simulating an engine that never
    /// signals absence.
    pub endless_specials: bool,
    pub fail_forward: Option<String>,
    /// Installed by the engine so trace order can be asserted.
    pub log: Option<Rc<RefCell<Vec<&'static str>>>>,
}

impl CurveHandle for ScriptedCurve {
    fn forward(&mut self) -> Result<()> {
        if let Some(log) = &self.log {
            log.borrow_mut().push("forward");
        }
        if let Some(message) = &self.fail_forward {
            bail!("{message}");
        }
        Ok(())
    }

    fn backward(&mut self) -> Result<()> {
        if let Some(log) = &self.log {
            log.borrow_mut().push("backward");
        }
        Ok(())
    }

    fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    fn special_point(&self, kind: PointKind, index: usize) -> Option<SpecialPoint> {
        if self.endless_specials {
            return Some(SpecialPoint {
                kind,
                index,
                coordinates: BTreeMap::new(),
                normal_form: None,
            });
        }
        self.specials
            .iter()
            .find(|special| special.kind == kind && special.index == index)
            .cloned()
    }
}

/// Engine fake that hands out scripted curves in order.
pub struct ScriptedEngine {
    curves: RefCell<VecDeque<ScriptedCurve>>,
    configs: RefCell<Vec<ModelConfig>>,
    settings: RefCell<Vec<ContinuationConfig>>,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl ScriptedEngine {
    pub fn with_curves(curves: Vec<ScriptedCurve>) -> Self {
        Self {
            curves: RefCell::new(curves.into()),
            configs: RefCell::new(Vec::new()),
            settings: RefCell::new(Vec::new()),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Model configurations received, one per `new_curve` call.
    pub fn seen_configs(&self) -> Vec<ModelConfig> {
        self.configs.borrow().clone()
    }

    pub fn seen_settings(&self) -> Vec<ContinuationConfig> {
        self.settings.borrow().clone()
    }

    /// Forward/backward calls across all handed-out curves, in order.
    pub fn trace_log(&self) -> Vec<&'static str> {
        self.log.borrow().clone()
    }
}

impl ContinuationEngine for ScriptedEngine {
    type Curve = ScriptedCurve;

    fn new_curve(
        &self,
        config: &ModelConfig,
        settings: &ContinuationConfig,
    ) -> Result<Self::Curve> {
        self.configs.borrow_mut().push(config.clone());
        self.settings.borrow_mut().push(settings.clone());
        let Some(mut curve) = self.curves.borrow_mut().pop_front() else {
            bail!("Scripted engine has no curve left for '{}'.", settings.curve_name);
        };
        curve.log = Some(Rc::clone(&self.log));
        Ok(curve)
    }
}
