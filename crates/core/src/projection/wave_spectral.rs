//! Linear projection onto the inertia-gravity wave modes.

use std::sync::Arc;

use crate::eigenspace::{Eigenspace, Mode};
use crate::error::BalanceError;
use crate::projection::{spectral_mode_projection, Projection};
use crate::state::State;

/// Projects a state onto the ±ω wave pair at every wavenumber; the
/// complement of [`crate::projection::GeostrophicSpectral`] within the
/// modal span.
pub struct WaveSpectral {
    eigenspace: Arc<Eigenspace>,
}

impl WaveSpectral {
    pub fn new(eigenspace: Arc<Eigenspace>) -> Self {
        Self { eigenspace }
    }
}

impl Projection for WaveSpectral {
    fn project(&self, z: &State) -> Result<State, BalanceError> {
        spectral_mode_projection(&self.eigenspace, z, &[Mode::WavePlus, Mode::WaveMinus])
    }
}
