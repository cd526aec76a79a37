//! Engine configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::SpectralBackend;
use crate::eigenspace::{Eigenspace, ModeBasis};
use crate::eigenvectors::{BoussinesqModes, ShallowWaterModes};
use crate::error::BalanceError;
use crate::grid::Grid;
use crate::model::LinearSpectralModel;

/// Configuration consumed by the engine. Deserializable from the host's
/// config format; validated as a whole before any numerical object exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Grid points per axis.
    pub resolution: Vec<usize>,
    /// Domain length per axis.
    pub domain_length: Vec<f64>,
    pub physical_parameters: PhysicalParameters,
    /// With nonlinear terms disabled the collaborator model is the exact
    /// linear propagator and the spectral projection becomes provably exact
    /// (the validation mode).
    #[serde(default)]
    pub enable_nonlinear: bool,
    /// Model time step.
    #[serde(default = "default_dt")]
    pub dt: f64,
}

/// Physical parameters, tagged by model variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum PhysicalParameters {
    /// Rotating shallow water: Coriolis parameter and squared phase speed.
    ShallowWater { f0: f64, csqr: f64 },
    /// Non-hydrostatic Boussinesq: Coriolis parameter, squared buoyancy
    /// frequency, squared aspect ratio.
    Boussinesq { f0: f64, n2: f64, dsqr: f64 },
}

impl PhysicalParameters {
    /// Number of spatial axes this variant requires.
    pub fn ndim(&self) -> usize {
        match self {
            PhysicalParameters::ShallowWater { .. } => 2,
            PhysicalParameters::Boussinesq { .. } => 3,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), BalanceError> {
        if self.resolution.len() != self.domain_length.len() {
            return Err(BalanceError::config(format!(
                "resolution has {} axes but domain length has {}",
                self.resolution.len(),
                self.domain_length.len()
            )));
        }
        let expected = self.physical_parameters.ndim();
        if self.resolution.len() != expected {
            return Err(BalanceError::config(format!(
                "variant needs {expected} axes but resolution has {}",
                self.resolution.len()
            )));
        }
        for (axis, &n) in self.resolution.iter().enumerate() {
            if n == 0 {
                return Err(BalanceError::config(format!(
                    "resolution must be positive on axis {axis}"
                )));
            }
        }
        for (axis, &length) in self.domain_length.iter().enumerate() {
            if !length.is_finite() || length <= 0.0 {
                return Err(BalanceError::config(format!(
                    "domain length must be positive and finite on axis {axis}, got {length}"
                )));
            }
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(BalanceError::config(format!(
                "time step must be positive and finite, got {}",
                self.dt
            )));
        }
        // parameter ranges are enforced by the mode-basis constructors
        self.mode_basis().map(|_| ())
    }

    /// The injected linear-operator definition for this variant.
    pub fn mode_basis(&self) -> Result<Box<dyn ModeBasis>, BalanceError> {
        match self.physical_parameters {
            PhysicalParameters::ShallowWater { f0, csqr } => {
                Ok(Box::new(ShallowWaterModes::new(f0, csqr)?))
            }
            PhysicalParameters::Boussinesq { f0, n2, dsqr } => {
                Ok(Box::new(BoussinesqModes::new(f0, n2, dsqr)?))
            }
        }
    }

    /// Build the grid and eigenspace this configuration describes, with the
    /// given backend threaded through the grid.
    pub fn build_eigenspace(
        &self,
        backend: Arc<dyn SpectralBackend>,
    ) -> Result<Arc<Eigenspace>, BalanceError> {
        self.validate()?;
        let grid = Grid::new(&self.resolution, &self.domain_length, backend)?;
        let basis = self.mode_basis()?;
        Eigenspace::build(grid, basis.as_ref())
    }

    /// Build the linear validation model for this configuration.
    ///
    /// Fails when `enable_nonlinear` is set: the nonlinear model is an
    /// external collaborator and cannot be derived from the configuration
    /// alone.
    pub fn build_linear_model(
        &self,
        backend: Arc<dyn SpectralBackend>,
    ) -> Result<LinearSpectralModel, BalanceError> {
        if self.enable_nonlinear {
            return Err(BalanceError::config(
                "enable_nonlinear is set; inject the nonlinear model instead of building the linear one",
            ));
        }
        let eigenspace = self.build_eigenspace(backend)?;
        LinearSpectralModel::new(eigenspace, self.dt)
    }
}

fn default_dt() -> f64 {
    0.01
}
