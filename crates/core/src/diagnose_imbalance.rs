//! Imbalance diagnostic: how much wave energy the nonlinear dynamics
//! reinject into an initially balanced state.

use std::fmt;

use log::debug;

use crate::error::BalanceError;
use crate::model::{Model, TimeDirection};
use crate::projection::Projection;
use crate::state::State;

/// Composes a projector with the time-stepping model to yield the engine's
/// primary correctness metric: balance the input, evolve it for the
/// diagnosis period, balance the evolved state again, and report the norm of
/// the difference between the evolved-then-projected state and the evolved
/// state itself.
///
/// A perfect projector under perfectly balanced dynamics yields a value near
/// machine epsilon; an approximate projector yields a value proportional to
/// its approximation error.
pub struct DiagnoseImbalance<'a, M: Model> {
    model: &'a M,
    diag_per: f64,
    proj_ini: &'a dyn Projection,
    proj_fin: Option<&'a dyn Projection>,
}

impl<'a, M: Model> fmt::Debug for DiagnoseImbalance<'a, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnoseImbalance")
            .field("diag_per", &self.diag_per)
            .field("has_proj_fin", &self.proj_fin.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, M: Model> DiagnoseImbalance<'a, M> {
    pub fn new(
        model: &'a M,
        diag_per: f64,
        proj: &'a dyn Projection,
    ) -> Result<Self, BalanceError> {
        if !diag_per.is_finite() || diag_per <= 0.0 {
            return Err(BalanceError::config(format!(
                "diagnosis period must be positive and finite, got {diag_per}"
            )));
        }
        Ok(Self {
            model,
            diag_per,
            proj_ini: proj,
            proj_fin: None,
        })
    }

    /// Use a different projector after the evolution window (cross
    /// balancing).
    pub fn with_final_projection(mut self, proj: &'a dyn Projection) -> Self {
        self.proj_fin = Some(proj);
        self
    }

    pub fn diagnose(&self, z: &State) -> Result<f64, BalanceError> {
        let z_bal = self.proj_ini.project(z)?;

        let steps = ((self.diag_per / self.model.dt()).round() as usize).max(1);
        debug!("diagnosing imbalance over {} steps", steps);
        let z_evolved = self.model.advance(&z_bal, steps, TimeDirection::Forward)?;

        let proj_fin = self.proj_fin.unwrap_or(self.proj_ini);
        let z_rebalanced = proj_fin.project(&z_evolved)?;

        z_rebalanced.norm_of_diff(&z_evolved)
    }
}
