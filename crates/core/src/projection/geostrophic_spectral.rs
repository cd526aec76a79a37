//! Linear projection onto the geostrophic eigenspace.

use std::sync::Arc;

use crate::eigenspace::{Eigenspace, Mode};
use crate::error::BalanceError;
use crate::projection::{spectral_mode_projection, Projection};
use crate::state::State;

/// Projects a state onto the zero-frequency (geostrophic) mode at every
/// wavenumber. Exact under purely linear dynamics; the residual imbalance
/// reinjected by nonlinear interactions is what the imbalance diagnostic
/// measures.
pub struct GeostrophicSpectral {
    eigenspace: Arc<Eigenspace>,
}

impl GeostrophicSpectral {
    pub fn new(eigenspace: Arc<Eigenspace>) -> Self {
        Self { eigenspace }
    }

    pub fn eigenspace(&self) -> &Arc<Eigenspace> {
        &self.eigenspace
    }
}

impl Projection for GeostrophicSpectral {
    fn project(&self, z: &State) -> Result<State, BalanceError> {
        spectral_mode_projection(&self.eigenspace, z, &[Mode::Geostrophic])
    }
}
