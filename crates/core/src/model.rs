//! Time-stepping collaborator contract and the linear validation model.
//!
//! The engine never time-steps the full nonlinear equations itself; it drives
//! an injected [`Model`]. The one implementation shipped here is the exact
//! linear spectral propagator, which is the collaborator selected by
//! `enable_nonlinear = false` and the reference against which the projection
//! methods are validated.

use std::sync::Arc;

use num_complex::Complex64;

use crate::eigenspace::{Eigenspace, Mode};
use crate::error::BalanceError;
use crate::grid::Grid;
use crate::state::{State, StateLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeDirection {
    Forward,
    Backward,
}

impl TimeDirection {
    pub fn signum(self) -> f64 {
        match self {
            TimeDirection::Forward => 1.0,
            TimeDirection::Backward => -1.0,
        }
    }
}

/// External time-stepping collaborator.
///
/// `step` must be deterministic for identical inputs, accept a state in
/// either representation, and return the same representation it was given.
/// The only failure mode besides incompatible inputs is numerical
/// instability (non-finite values), which is fatal and never retried.
pub trait Model: Send + Sync {
    fn grid(&self) -> &Arc<Grid>;

    fn layout(&self) -> &Arc<StateLayout>;

    /// Length of one time step.
    fn dt(&self) -> f64;

    /// Advance `z` by a single step in the given direction.
    fn step(&self, z: &State, direction: TimeDirection) -> Result<State, BalanceError>;

    /// Advance `z` by `num_steps`, failing fast on non-finite values.
    fn advance(
        &self,
        z: &State,
        num_steps: usize,
        direction: TimeDirection,
    ) -> Result<State, BalanceError> {
        let mut current = z.clone();
        for step in 0..num_steps {
            current = self.step(&current, direction)?;
            if let Some(component) = current.first_non_finite() {
                return Err(BalanceError::NumericalInstability {
                    component: component.to_string(),
                    step: step + 1,
                });
            }
        }
        Ok(current)
    }
}

/// Models whose nonlinear terms can be scaled per step. Required by the
/// optimal-balance projector, which ramps the nonlinearity between the
/// linear and the full model over each integration leg.
pub trait RampedModel: Model {
    /// Like [`Model::step`], with the nonlinear terms multiplied by
    /// `nonlinearity` in [0, 1].
    fn step_scaled(
        &self,
        z: &State,
        direction: TimeDirection,
        nonlinearity: f64,
    ) -> Result<State, BalanceError>;
}

/// Exact propagator of the linearized dynamics.
///
/// Per wavenumber, the state is decomposed onto the eigenspace, the
/// geostrophic coefficient is held fixed and the wave coefficients rotate by
/// `exp(∓iωΔt)`. Any residual outside the modal span (a divergent component,
/// for the non-hydrostatic variant) is discarded, as a pressure projection
/// would discard it.
#[derive(Debug)]
pub struct LinearSpectralModel {
    eigenspace: Arc<Eigenspace>,
    dt: f64,
}

impl LinearSpectralModel {
    pub fn new(eigenspace: Arc<Eigenspace>, dt: f64) -> Result<Self, BalanceError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(BalanceError::config(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }
        Ok(Self { eigenspace, dt })
    }

    pub fn eigenspace(&self) -> &Arc<Eigenspace> {
        &self.eigenspace
    }
}

impl Model for LinearSpectralModel {
    fn grid(&self) -> &Arc<Grid> {
        self.eigenspace.grid()
    }

    fn layout(&self) -> &Arc<StateLayout> {
        self.eigenspace.layout()
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn step(&self, z: &State, direction: TimeDirection) -> Result<State, BalanceError> {
        let eig = &self.eigenspace;
        if !z.grid().same_grid(eig.grid()) {
            return Err(BalanceError::mismatch(format!(
                "state grid {:?} does not match model grid {:?}",
                z.grid(),
                eig.grid()
            )));
        }
        if z.layout().keys() != eig.layout().keys() {
            return Err(BalanceError::mismatch(format!(
                "state components {:?} do not match model components {:?}",
                z.layout().keys(),
                eig.layout().keys()
            )));
        }

        let was_spectral = z.is_spectral();
        let zs = if was_spectral { z.clone() } else { z.fft() };
        let ncomp = zs.layout().len();
        let n = zs.grid().len();
        let dt = self.dt * direction.signum();

        let mut out = zs.clone();
        for field in out.fields_mut() {
            field.fill(Complex64::ZERO);
        }
        for mode in Mode::ALL {
            for idx in 0..n {
                let mut coeff = Complex64::ZERO;
                for comp in 0..ncomp {
                    coeff +=
                        eig.dual(mode, comp)[idx].conj() * zs.fields()[comp].as_slice()[idx];
                }
                let phase = Complex64::from_polar(1.0, -mode.frequency(eig.omega()[idx]) * dt);
                let rotated = coeff * phase;
                for comp in 0..ncomp {
                    out.fields_mut()[comp].as_mut_slice()[idx] +=
                        rotated * eig.eigenvector(mode, comp)[idx];
                }
            }
        }

        Ok(if was_spectral { out } else { out.fft() })
    }
}

impl RampedModel for LinearSpectralModel {
    fn step_scaled(
        &self,
        z: &State,
        direction: TimeDirection,
        _nonlinearity: f64,
    ) -> Result<State, BalanceError> {
        // no nonlinear terms to scale
        self.step(z, direction)
    }
}
