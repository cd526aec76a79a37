//! Nonlinear balancing using the optimal balance method.
//!
//! The state is carried backward along a ramp that fades the nonlinear terms
//! out, projected onto the linear balanced subspace there, and carried
//! forward along the same ramp to the full model, iterating until the update
//! falls below the stop criterion. The base-point coordinate of the original
//! state is restored after each cycle.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::error::BalanceError;
use crate::model::{RampedModel, TimeDirection};
use crate::projection::Projection;
use crate::state::State;

/// Shape of the nonlinearity ramp over one integration leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampType {
    Exp,
    Pow,
    Cos,
    Lin,
}

impl RampType {
    /// Ramp value at normalized time `theta` in [0, 1]; 0 at the linear end,
    /// 1 at the nonlinear end.
    pub fn value(self, theta: f64) -> f64 {
        match self {
            RampType::Exp => {
                let t1 = 1.0 / theta.max(1e-32);
                let t2 = 1.0 / (1.0 - theta).max(1e-32);
                (-t1).exp() / ((-t1).exp() + (-t2).exp())
            }
            RampType::Pow => {
                let a = theta.powi(3);
                let b = (1.0 - theta).powi(3);
                a / (a + b)
            }
            RampType::Cos => 0.5 * (1.0 - (std::f64::consts::PI * theta).cos()),
            RampType::Lin => theta,
        }
    }
}

impl FromStr for RampType {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exp" => Ok(RampType::Exp),
            "pow" => Ok(RampType::Pow),
            "cos" => Ok(RampType::Cos),
            "lin" => Ok(RampType::Lin),
            other => Err(BalanceError::config(format!(
                "invalid ramp type '{other}', choose from 'exp', 'pow', 'cos', 'lin'"
            ))),
        }
    }
}

/// Optimal-balance projector over a rampable nonlinear model.
pub struct OptimalBalance<'a, M: RampedModel> {
    model: &'a M,
    base_proj: &'a dyn Projection,
    ramp_steps: usize,
    ramp_type: RampType,
    max_it: usize,
    stop_criterion: f64,
    update_base_point: bool,
}

impl<'a, M: RampedModel> fmt::Debug for OptimalBalance<'a, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimalBalance")
            .field("ramp_steps", &self.ramp_steps)
            .field("ramp_type", &self.ramp_type)
            .field("max_it", &self.max_it)
            .field("stop_criterion", &self.stop_criterion)
            .field("update_base_point", &self.update_base_point)
            .finish_non_exhaustive()
    }
}

impl<'a, M: RampedModel> OptimalBalance<'a, M> {
    pub fn new(
        model: &'a M,
        base_proj: &'a dyn Projection,
        ramp_period: f64,
        ramp_type: RampType,
    ) -> Result<Self, BalanceError> {
        if !ramp_period.is_finite() || ramp_period <= 0.0 {
            return Err(BalanceError::config(format!(
                "ramp period must be positive and finite, got {ramp_period}"
            )));
        }
        let ramp_steps = ((ramp_period / model.dt()).ceil() as usize).max(1);
        Ok(Self {
            model,
            base_proj,
            ramp_steps,
            ramp_type,
            max_it: 3,
            stop_criterion: 1e-9,
            update_base_point: true,
        })
    }

    pub fn max_it(mut self, max_it: usize) -> Self {
        self.max_it = max_it;
        self
    }

    pub fn stop_criterion(mut self, stop_criterion: f64) -> Self {
        self.stop_criterion = stop_criterion;
        self
    }

    pub fn update_base_point(mut self, update: bool) -> Self {
        self.update_base_point = update;
        self
    }

    /// Ramp from the full nonlinear model down to the linear one, backward
    /// in time.
    fn backward_to_linear(&self, z: &State) -> Result<State, BalanceError> {
        let mut current = z.clone();
        for n in 0..self.ramp_steps {
            let theta = 1.0 - n as f64 / self.ramp_steps as f64;
            current =
                self.model
                    .step_scaled(&current, TimeDirection::Backward, self.ramp_type.value(theta))?;
            if let Some(component) = current.first_non_finite() {
                return Err(BalanceError::NumericalInstability {
                    component: component.to_string(),
                    step: n + 1,
                });
            }
        }
        Ok(current)
    }

    /// Ramp from the linear model up to the full nonlinear one, forward in
    /// time.
    fn forward_to_nonlinear(&self, z: &State) -> Result<State, BalanceError> {
        let mut current = z.clone();
        for n in 0..self.ramp_steps {
            let theta = n as f64 / self.ramp_steps as f64;
            current =
                self.model
                    .step_scaled(&current, TimeDirection::Forward, self.ramp_type.value(theta))?;
            if let Some(component) = current.first_non_finite() {
                return Err(BalanceError::NumericalInstability {
                    component: component.to_string(),
                    step: n + 1,
                });
            }
        }
        Ok(current)
    }
}

impl<M: RampedModel> Projection for OptimalBalance<'_, M> {
    fn project(&self, z: &State) -> Result<State, BalanceError> {
        let mut z_base = self.base_proj.project(z)?;
        let mut z_res = z.clone();
        let mut previous_error = f64::INFINITY;

        for it in 0..self.max_it {
            let z_lin = self.backward_to_linear(&z_res)?;
            let z_lin = self.base_proj.project(&z_lin)?;
            let z_bal = self.forward_to_nonlinear(&z_lin)?;
            // exchange the base-point coordinate for the original one
            let z_new = z_bal.sub(&self.base_proj.project(&z_bal)?)?.add(&z_base)?;

            let error = z_new.norm_of_diff(&z_res)?;
            debug!("optimal balance iteration {it}: difference {error:.2e}");
            z_res = z_new;

            if error < self.stop_criterion {
                debug!("optimal balance stop criterion reached");
                break;
            }
            if error > previous_error {
                warn!("optimal balance error is increasing, stopping iterations");
                break;
            }
            previous_error = error;

            if self.update_base_point && it + 1 < self.max_it {
                z_base = self.base_proj.project(&z_res)?;
            }
        }

        Ok(z_res)
    }
}
