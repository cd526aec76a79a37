//! Flow-decomposition projections.
//!
//! Linear projections act per wavenumber on the eigenspace; nonlinear ones
//! drive an injected time-stepping model. All of them are pure maps from
//! state to state and idempotent on their target subspace.

use num_complex::Complex64;

use crate::eigenspace::{Eigenspace, Mode};
use crate::error::BalanceError;
use crate::state::State;

pub mod geostrophic_spectral;
pub mod geostrophic_time_average;
pub mod optimal_balance;
pub mod wave_spectral;

pub use geostrophic_spectral::GeostrophicSpectral;
pub use geostrophic_time_average::GeostrophicTimeAverage;
pub use optimal_balance::{OptimalBalance, RampType};
pub use wave_spectral::WaveSpectral;

/// A pure map from a state to one of its flow components.
///
/// Contract: `project(project(z))` equals `project(z)` up to numerical
/// tolerance, and the result comes back in the representation of the input.
pub trait Projection {
    fn project(&self, z: &State) -> Result<State, BalanceError>;
}

/// Oblique projection onto the span of the given modes, per wavenumber:
/// coefficient `⟨p_s, ẑ⟩` against the dual vector, reconstruction along the
/// eigenvector. Shared by the linear projections.
pub(crate) fn spectral_mode_projection(
    eigenspace: &Eigenspace,
    z: &State,
    modes: &[Mode],
) -> Result<State, BalanceError> {
    if !z.grid().same_grid(eigenspace.grid()) {
        return Err(BalanceError::mismatch(format!(
            "state grid {:?} does not match eigenspace grid {:?}",
            z.grid(),
            eigenspace.grid()
        )));
    }
    if z.layout().keys() != eigenspace.layout().keys() {
        return Err(BalanceError::mismatch(format!(
            "state components {:?} do not match eigenspace components {:?}",
            z.layout().keys(),
            eigenspace.layout().keys()
        )));
    }

    let was_spectral = z.is_spectral();
    let zs = if was_spectral { z.clone() } else { z.fft() };
    let ncomp = zs.layout().len();
    let n = zs.grid().len();

    let mut out = zs.clone();
    for field in out.fields_mut() {
        field.fill(Complex64::ZERO);
    }
    for &mode in modes {
        for idx in 0..n {
            let mut coeff = Complex64::ZERO;
            for comp in 0..ncomp {
                coeff += eigenspace.dual(mode, comp)[idx].conj()
                    * zs.fields()[comp].as_slice()[idx];
            }
            for comp in 0..ncomp {
                out.fields_mut()[comp].as_mut_slice()[idx] +=
                    coeff * eigenspace.eigenvector(mode, comp)[idx];
            }
        }
    }

    Ok(if was_spectral { out } else { out.fft() })
}
