//! Per-wavenumber eigen-decomposition of the linearized dynamics.
//!
//! For every spectral index the linearization about a state of rest yields a
//! small operator whose eigenpairs are known analytically: one zero-frequency
//! geostrophic mode and a ±ω pair of inertia-gravity wave modes. The
//! `Eigenspace` evaluates the injected [`ModeBasis`] once per grid, derives
//! the dual (projection) vectors, and is read-only afterwards — safe to share
//! across projectors and models without locking.

use std::sync::Arc;

use num_complex::Complex64;

use crate::error::BalanceError;
use crate::grid::Grid;
use crate::state::StateLayout;

/// Below this energy norm an eigenvector column counts as degenerate-zero;
/// normalizing its dual would divide by a vanishing projection norm.
const NORM_FLOOR: f64 = 1e-10;

/// Relative tolerance for the bi-orthonormality check run after construction.
const BIORTHO_TOL: f64 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Geostrophic,
    WavePlus,
    WaveMinus,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Geostrophic, Mode::WavePlus, Mode::WaveMinus];

    pub fn index(self) -> usize {
        match self {
            Mode::Geostrophic => 0,
            Mode::WavePlus => 1,
            Mode::WaveMinus => 2,
        }
    }

    /// Signed mode number: 0 for geostrophic, ±1 for the wave pair.
    pub fn sign(self) -> i32 {
        match self {
            Mode::Geostrophic => 0,
            Mode::WavePlus => 1,
            Mode::WaveMinus => -1,
        }
    }

    /// Frequency of this mode given the intrinsic wave frequency ω ≥ 0.
    pub fn frequency(self, omega: f64) -> f64 {
        self.sign() as f64 * omega
    }
}

/// Analytic definition of the linearized operator's mode structure for one
/// model variant: a pure function from wavenumber and physical parameters to
/// eigenpairs, with no hidden state.
///
/// The operator is not self-adjoint in the plain inner product, but it is
/// skew-adjoint under the variant's quadratic-energy weighting; the weights
/// returned by [`ModeBasis::energy_weights`] are that diagonal and are used
/// to form the dual vectors of the oblique projection.
pub trait ModeBasis: Send + Sync {
    /// Component layout of the states this basis acts on.
    fn layout(&self) -> StateLayout;

    /// Diagonal of the energy weighting, one entry per component.
    fn energy_weights(&self) -> Vec<f64>;

    /// Intrinsic wave frequency at wavenumber `k` (non-negative).
    fn frequency(&self, k: &[f64]) -> f64;

    /// Eigenvector column for `mode` at `k`, one entry per component.
    /// Scale is arbitrary; the eigenspace normalizes the duals.
    fn eigenvector(&self, mode: Mode, k: &[f64]) -> Vec<Complex64>;
}

/// One mode's eigenvector (or dual) columns, one array per component.
#[derive(Debug)]
struct ModeColumns {
    columns: Vec<Vec<Complex64>>,
}

/// Eagerly built, immutable cache of eigenpairs over a whole grid.
#[derive(Debug)]
pub struct Eigenspace {
    grid: Arc<Grid>,
    layout: Arc<StateLayout>,
    omega: Vec<f64>,
    q: Vec<ModeColumns>,
    p: Vec<ModeColumns>,
}

impl Eigenspace {
    /// Evaluate `basis` at every wavenumber of `grid` and derive the dual
    /// vectors `p = W q / ⟨q, W q⟩`, so that `⟨p, q⟩ = 1` per wavenumber.
    ///
    /// Fails with a singular-eigenspace error, naming the wavenumber, if a
    /// frequency is non-finite, an eigenvector column has (numerically) zero
    /// energy norm where it must not, or the resulting mode set is not
    /// bi-orthonormal.
    pub fn build(grid: Arc<Grid>, basis: &dyn ModeBasis) -> Result<Arc<Self>, BalanceError> {
        let layout = Arc::new(basis.layout());
        let ncomp = layout.len();
        let weights = basis.energy_weights();
        if weights.len() != ncomp {
            return Err(BalanceError::config(format!(
                "mode basis returns {} energy weights for {} components",
                weights.len(),
                ncomp
            )));
        }

        let n = grid.len();
        let mut omega = Vec::with_capacity(n);
        let mut q: Vec<ModeColumns> = (0..Mode::ALL.len())
            .map(|_| ModeColumns {
                columns: vec![vec![Complex64::ZERO; n]; ncomp],
            })
            .collect();
        let mut p: Vec<ModeColumns> = (0..Mode::ALL.len())
            .map(|_| ModeColumns {
                columns: vec![vec![Complex64::ZERO; n]; ncomp],
            })
            .collect();

        for idx in 0..n {
            let k = grid.wavenumber_at(idx);
            let freq = basis.frequency(&k);
            if !freq.is_finite() || freq < 0.0 {
                return Err(BalanceError::SingularEigenspace {
                    wavenumber: k,
                    reason: format!("invalid wave frequency {freq}"),
                });
            }
            omega.push(freq);

            for mode in Mode::ALL {
                let column = basis.eigenvector(mode, &k);
                if column.len() != ncomp {
                    return Err(BalanceError::SingularEigenspace {
                        wavenumber: k,
                        reason: format!(
                            "mode {mode:?} eigenvector has {} components, expected {ncomp}",
                            column.len()
                        ),
                    });
                }
                let energy_norm: f64 = column
                    .iter()
                    .zip(weights.iter())
                    .map(|(value, &w)| w * value.norm_sqr())
                    .sum();
                if !energy_norm.is_finite() {
                    return Err(BalanceError::SingularEigenspace {
                        wavenumber: k,
                        reason: format!("mode {mode:?} eigenvector is non-finite"),
                    });
                }
                if energy_norm <= NORM_FLOOR {
                    return Err(BalanceError::SingularEigenspace {
                        wavenumber: k,
                        reason: format!("mode {mode:?} eigenvector has zero energy norm"),
                    });
                }
                let m = mode.index();
                for (comp, value) in column.into_iter().enumerate() {
                    q[m].columns[comp][idx] = value;
                    p[m].columns[comp][idx] = value * (weights[comp] / energy_norm);
                }
            }
        }

        let eigenspace = Self {
            grid,
            layout,
            omega,
            q,
            p,
        };
        eigenspace.check_biorthonormality()?;
        Ok(Arc::new(eigenspace))
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn layout(&self) -> &Arc<StateLayout> {
        &self.layout
    }

    /// Intrinsic wave frequencies, one per spectral index.
    pub fn omega(&self) -> &[f64] {
        &self.omega
    }

    /// Eigenvector column array for `(mode, component)`.
    pub fn eigenvector(&self, mode: Mode, comp: usize) -> &[Complex64] {
        &self.q[mode.index()].columns[comp]
    }

    /// Dual (projection) column array for `(mode, component)`.
    pub fn dual(&self, mode: Mode, comp: usize) -> &[Complex64] {
        &self.p[mode.index()].columns[comp]
    }

    /// Longest wave period present, `2π / min ω` over wavenumbers with ω > 0.
    /// This sets the first averaging window of the time-average projector.
    pub fn max_wave_period(&self) -> Result<f64, BalanceError> {
        let omega_min = self
            .omega
            .iter()
            .copied()
            .filter(|&w| w > 0.0)
            .fold(f64::INFINITY, f64::min);
        if !omega_min.is_finite() {
            return Err(BalanceError::config(
                "eigenspace has no wave mode with positive frequency",
            ));
        }
        Ok(2.0 * std::f64::consts::PI / omega_min)
    }

    /// Verify `⟨p_s, q_s'⟩ = δ_ss'` at every wavenumber.
    fn check_biorthonormality(&self) -> Result<(), BalanceError> {
        let ncomp = self.layout.len();
        for idx in 0..self.grid.len() {
            for row in Mode::ALL {
                for col in Mode::ALL {
                    let mut inner = Complex64::ZERO;
                    for comp in 0..ncomp {
                        let p = self.p[row.index()].columns[comp][idx];
                        let q = self.q[col.index()].columns[comp][idx];
                        inner += p.conj() * q;
                    }
                    let expected = if row == col { 1.0 } else { 0.0 };
                    if (inner - expected).norm() > BIORTHO_TOL {
                        return Err(BalanceError::SingularEigenspace {
                            wavenumber: self.grid.wavenumber_at(idx),
                            reason: format!(
                                "⟨p_{row:?}, q_{col:?}⟩ = {inner} (expected {expected})"
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
