//! Analytic eigenvector sets for the shipped model variants.
//!
//! Each variant linearizes its governing equations about a state of rest and
//! writes the per-wavenumber eigenpairs in closed form. Sign conventions
//! follow the reference model family: for a wave mode with signed number `s`
//! the formulas use `om = -s * ω`, and time dependence is `exp(-i s ω t)`.

use num_complex::Complex64;

use crate::eigenspace::{Mode, ModeBasis};
use crate::error::BalanceError;
use crate::state::StateLayout;

// ============================================================================
// Rotating shallow water (u, v, h)
// ============================================================================

/// Single-layer rotating shallow water on a doubly periodic grid.
///
/// Dispersion relation `ω² = f0² + c²·|kh|²`. The horizontal-wavenumber-zero
/// column is the degenerate inertial case: no pressure gradient, so the
/// geostrophic mode is pure layer thickness and the wave pair are inertial
/// oscillations at ω = f0.
#[derive(Clone, Copy, Debug)]
pub struct ShallowWaterModes {
    pub f0: f64,
    pub csqr: f64,
}

impl ShallowWaterModes {
    pub fn new(f0: f64, csqr: f64) -> Result<Self, BalanceError> {
        if !f0.is_finite() || f0 == 0.0 {
            return Err(BalanceError::config(format!(
                "Coriolis parameter must be finite and nonzero, got {f0}"
            )));
        }
        if !csqr.is_finite() || csqr <= 0.0 {
            return Err(BalanceError::config(format!(
                "squared phase speed must be positive, got {csqr}"
            )));
        }
        Ok(Self { f0, csqr })
    }
}

impl ModeBasis for ShallowWaterModes {
    fn layout(&self) -> StateLayout {
        StateLayout::new(
            vec!["u", "v", "h"],
            vec![true, true, false],
            self.energy_weights(),
        )
        .expect("shallow-water layout is statically valid")
    }

    fn energy_weights(&self) -> Vec<f64> {
        vec![1.0, 1.0, 1.0 / self.csqr]
    }

    fn frequency(&self, k: &[f64]) -> f64 {
        let kh2 = k[0] * k[0] + k[1] * k[1];
        (self.f0 * self.f0 + self.csqr * kh2).sqrt()
    }

    fn eigenvector(&self, mode: Mode, k: &[f64]) -> Vec<Complex64> {
        let (kx, ky) = (k[0], k[1]);
        let kh2 = kx * kx + ky * ky;
        let s = mode.sign() as f64;
        if kh2 == 0.0 {
            // inertial column: geostrophic = mean thickness, waves rotate
            return vec![
                Complex64::new(0.0, -s),
                Complex64::new(s * s, 0.0),
                Complex64::new(1.0 - s * s, 0.0),
            ];
        }
        let f0 = self.f0;
        let om = -s * self.frequency(k);
        vec![
            Complex64::new(om * kx, -f0 * ky),
            Complex64::new(om * ky, f0 * kx),
            Complex64::new(f0 * f0 - s * s * om * om, 0.0),
        ]
    }
}

// ============================================================================
// Non-hydrostatic Boussinesq (u, v, w, b)
// ============================================================================

/// Triply periodic non-hydrostatic Boussinesq variant with aspect-ratio
/// parameter `dsqr` and squared buoyancy frequency `n2`.
///
/// Dispersion relation `ω² = (n2·|kh|² + f0²·kz²) / (dsqr·|kh|² + kz²)`.
/// Wave columns are scaled by kz so the kz = 0 limit (pure internal
/// oscillation of w and b) stays finite; the horizontal-wavenumber-zero
/// columns are the inertial special case with the geostrophic mode a pure
/// buoyancy anomaly.
///
/// Pressure is eliminated through the incompressibility constraint, so the
/// three modes span the divergence-free subspace at each wavenumber.
#[derive(Clone, Copy, Debug)]
pub struct BoussinesqModes {
    pub f0: f64,
    pub n2: f64,
    pub dsqr: f64,
}

impl BoussinesqModes {
    pub fn new(f0: f64, n2: f64, dsqr: f64) -> Result<Self, BalanceError> {
        if !f0.is_finite() || f0 == 0.0 {
            return Err(BalanceError::config(format!(
                "Coriolis parameter must be finite and nonzero, got {f0}"
            )));
        }
        if !n2.is_finite() || n2 <= 0.0 {
            return Err(BalanceError::config(format!(
                "squared buoyancy frequency must be positive, got {n2}"
            )));
        }
        if !dsqr.is_finite() || dsqr <= 0.0 {
            return Err(BalanceError::config(format!(
                "squared aspect ratio must be positive, got {dsqr}"
            )));
        }
        Ok(Self { f0, n2, dsqr })
    }
}

impl ModeBasis for BoussinesqModes {
    fn layout(&self) -> StateLayout {
        StateLayout::new(
            vec!["u", "v", "w", "b"],
            vec![true, true, true, false],
            self.energy_weights(),
        )
        .expect("Boussinesq layout is statically valid")
    }

    fn energy_weights(&self) -> Vec<f64> {
        vec![1.0, 1.0, self.dsqr, 1.0 / self.n2]
    }

    fn frequency(&self, k: &[f64]) -> f64 {
        let kh2 = k[0] * k[0] + k[1] * k[1];
        let kz2 = k[2] * k[2];
        if kh2 + kz2 == 0.0 {
            return self.f0.abs();
        }
        ((self.n2 * kh2 + self.f0 * self.f0 * kz2) / (self.dsqr * kh2 + kz2)).sqrt()
    }

    fn eigenvector(&self, mode: Mode, k: &[f64]) -> Vec<Complex64> {
        let (kx, ky, kz) = (k[0], k[1], k[2]);
        let kh2 = kx * kx + ky * ky;
        let s = mode.sign() as f64;
        if kh2 == 0.0 {
            // inertial column: horizontal flow rotates at f0, the geostrophic
            // mode is a buoyancy anomaly with no motion
            return vec![
                Complex64::new(0.0, -s),
                Complex64::new(s * s, 0.0),
                Complex64::ZERO,
                Complex64::new(1.0 - s * s, 0.0),
            ];
        }
        let f0 = self.f0;
        if mode == Mode::Geostrophic {
            // thermal-wind column for pressure p = f0²
            return vec![
                Complex64::new(0.0, -f0 * ky),
                Complex64::new(0.0, f0 * kx),
                Complex64::ZERO,
                Complex64::new(0.0, f0 * f0 * kz),
            ];
        }
        let om = -s * self.frequency(k);
        vec![
            Complex64::new(om * kx * kz, -f0 * ky * kz),
            Complex64::new(om * ky * kz, f0 * kx * kz),
            Complex64::new(-om * kh2, 0.0),
            Complex64::new(0.0, -self.n2 * kh2),
        ]
    }
}
