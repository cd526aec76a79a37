//! Analytic state constructors used by demos and tests.

use num_complex::Complex64;

use crate::eigenspace::{Eigenspace, Mode};
use crate::error::BalanceError;
use crate::field::Representation;
use crate::projection::spectral_mode_projection;
use crate::state::State;

/// A polarized single-eigenmode state together with its wave frequency.
pub struct SingleWave {
    pub state: State,
    pub omega: f64,
    /// Wave period; `None` for the geostrophic mode.
    pub period: Option<f64>,
}

/// Build a real physical-space state carrying exactly one eigenmode at the
/// integer wavenumbers `wave_numbers` (cycles per domain, negatives allowed),
/// with the given phase. The spectral coefficient and its Hermitian partner
/// are set together so the physical fields are real up to round-off.
pub fn single_wave(
    eigenspace: &Eigenspace,
    wave_numbers: &[i64],
    mode: Mode,
    phase: f64,
) -> Result<SingleWave, BalanceError> {
    let grid = eigenspace.grid();
    if wave_numbers.len() != grid.ndim() {
        return Err(BalanceError::mismatch(format!(
            "{} wavenumbers given for a {}-axis grid",
            wave_numbers.len(),
            grid.ndim()
        )));
    }
    let coords: Vec<usize> = wave_numbers
        .iter()
        .zip(grid.shape())
        .map(|(&m, &n)| m.rem_euclid(n as i64) as usize)
        .collect();
    let idx = grid.index_of(&coords);
    let conj_coords: Vec<usize> = coords
        .iter()
        .zip(grid.shape())
        .map(|(&c, &n)| (n - c) % n)
        .collect();
    let conj_idx = grid.index_of(&conj_coords);

    let layout = eigenspace.layout();
    let ncomp = layout.len();
    let weights = layout.energy_weights();
    let column: Vec<Complex64> = (0..ncomp)
        .map(|comp| eigenspace.eigenvector(mode, comp)[idx])
        .collect();
    let energy_norm: f64 = column
        .iter()
        .zip(weights)
        .map(|(value, &w)| w * value.norm_sqr())
        .sum::<f64>()
        .sqrt();

    // amplitude chosen so the physical wave has O(1) magnitude after the
    // inverse transform's 1/N normalization
    let amplitude = grid.len() as f64 / if idx == conj_idx { 1.0 } else { 2.0 };
    let rotation = Complex64::from_polar(amplitude / energy_norm, phase);

    let mut z = State::zeros(grid, layout.clone(), Representation::Spectral);
    for (comp, value) in column.into_iter().enumerate() {
        let coefficient = value * rotation;
        let slice = z.fields_mut()[comp].as_mut_slice();
        if idx == conj_idx {
            // self-conjugate bin: only the real part yields a real field
            slice[idx] = Complex64::new(coefficient.re, 0.0);
        } else {
            slice[idx] = coefficient;
            slice[conj_idx] = coefficient.conj();
        }
    }

    let omega = match mode {
        Mode::Geostrophic => 0.0,
        _ => eigenspace.omega()[idx],
    };
    let period = (omega > 0.0).then(|| 2.0 * std::f64::consts::PI / omega);
    Ok(SingleWave {
        state: z.fft(),
        omega,
        period,
    })
}

/// Balanced double-jet state: two opposing gaussian zonal jets at one quarter
/// and three quarters of the meridional extent, projected onto the
/// geostrophic subspace so the companion fields are in balance.
pub fn jet(eigenspace: &Eigenspace, amplitude: f64, width: f64) -> Result<State, BalanceError> {
    if !width.is_finite() || width <= 0.0 {
        return Err(BalanceError::config(format!(
            "jet width must be positive and finite, got {width}"
        )));
    }
    let grid = eigenspace.grid();
    let ly = grid.lengths()[1];
    let mesh_y = grid.mesh(1);

    let mut z = State::zeros(grid, eigenspace.layout().clone(), Representation::Physical);
    let u = z
        .field_mut("u")
        .ok_or_else(|| BalanceError::config("variant has no zonal velocity component 'u'"))?;
    for (value, &y) in u.as_mut_slice().iter_mut().zip(mesh_y.iter()) {
        let southern = (-((y - 0.25 * ly) / width).powi(2)).exp();
        let northern = (-((y - 0.75 * ly) / width).powi(2)).exp();
        *value = Complex64::new(amplitude * (southern - northern), 0.0);
    }

    spectral_mode_projection(eigenspace, &z, &[Mode::Geostrophic])
}
