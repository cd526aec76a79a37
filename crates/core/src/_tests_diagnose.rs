#![cfg(test)]

use std::sync::Arc;

use num_complex::Complex64;

use crate::_tests_support::{sample_state, sw_eigenspace};
use crate::diagnose_imbalance::DiagnoseImbalance;
use crate::error::BalanceError;
use crate::grid::Grid;
use crate::model::{LinearSpectralModel, Model, TimeDirection};
use crate::projection::{GeostrophicSpectral, GeostrophicTimeAverage};
use crate::state::{State, StateLayout};

#[test]
fn nonpositive_diagnosis_period_is_rejected() {
    let eig = sw_eigenspace(5, 5);
    let model = LinearSpectralModel::new(eig.clone(), 0.1).unwrap();
    let proj = GeostrophicSpectral::new(eig);
    let err = DiagnoseImbalance::new(&model, -1.0, &proj).unwrap_err();
    assert!(matches!(err, BalanceError::Config(_)), "got {err}");
}

#[test]
fn spectral_projector_is_exact_under_linear_dynamics() {
    // the validation mode: with nonlinear terms disabled the collaborator is
    // the exact propagator and the measured imbalance sits at round-off
    let eig = sw_eigenspace(9, 9);
    let model = LinearSpectralModel::new(eig.clone(), 0.05).unwrap();
    let proj = GeostrophicSpectral::new(eig.clone());
    let diagnose = DiagnoseImbalance::new(&model, 1.0, &proj).unwrap();

    let imbalance = diagnose.diagnose(&sample_state(&eig)).unwrap();
    assert!(
        imbalance < 1e-10,
        "linear exactness violated: imbalance {imbalance:.3e}"
    );
}

#[test]
fn time_average_projector_diagnoses_small_imbalance_under_linear_dynamics() {
    let eig = sw_eigenspace(9, 9);
    let period = eig.max_wave_period().unwrap();
    let model = LinearSpectralModel::new(eig.clone(), period / 48.0).unwrap();
    let proj = GeostrophicTimeAverage::new(&model, &eig, 3, true).unwrap();
    let diagnose = DiagnoseImbalance::new(&model, period / 2.0, &proj).unwrap();

    let z = sample_state(&eig);
    let imbalance = diagnose.diagnose(&z).unwrap();
    assert!(
        imbalance < 1e-2 * z.norm_l2(),
        "time-average imbalance too large: {imbalance:.3e}"
    );
}

#[test]
fn cross_balancing_uses_the_second_projector_after_evolution() {
    let eig = sw_eigenspace(9, 9);
    let model = LinearSpectralModel::new(eig.clone(), 0.05).unwrap();
    let spectral = GeostrophicSpectral::new(eig.clone());
    let time_average = GeostrophicTimeAverage::new(&model, &eig, 2, true).unwrap();

    let diagnose = DiagnoseImbalance::new(&model, 1.0, &time_average)
        .unwrap()
        .with_final_projection(&spectral);
    let z = sample_state(&eig);
    let imbalance = diagnose.diagnose(&z).unwrap();
    // the final spectral projection removes the wave part exactly, so the
    // cross-balanced diagnostic sees the time-average residual only
    assert!(
        imbalance < 1e-1 * z.norm_l2(),
        "cross-balanced imbalance too large: {imbalance:.3e}"
    );
}

// ============================================================================
// Instability propagation
// ============================================================================

struct UnstableModel {
    grid: Arc<Grid>,
    layout: Arc<StateLayout>,
}

impl Model for UnstableModel {
    fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    fn layout(&self) -> &Arc<StateLayout> {
        &self.layout
    }

    fn dt(&self) -> f64 {
        0.1
    }

    fn step(&self, z: &State, _direction: TimeDirection) -> Result<State, BalanceError> {
        let mut out = z.clone();
        out.fields_mut()[2].as_mut_slice()[1] = Complex64::new(f64::NAN, f64::NAN);
        Ok(out)
    }
}

#[test]
fn diagnose_propagates_numerical_instability() {
    let eig = sw_eigenspace(5, 5);
    let model = UnstableModel {
        grid: eig.grid().clone(),
        layout: eig.layout().clone(),
    };
    let proj = GeostrophicSpectral::new(eig.clone());
    let diagnose = DiagnoseImbalance::new(&model, 1.0, &proj).unwrap();

    let err = diagnose.diagnose(&sample_state(&eig)).unwrap_err();
    assert!(
        matches!(
            err,
            BalanceError::NumericalInstability { ref component, step: 1 } if component == "h"
        ),
        "expected instability in 'h' at step 1, got {err}"
    );
}
