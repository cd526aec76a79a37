#![cfg(test)]

//! Validation-mode tests for the time-average projector: with the linear
//! spectral model as collaborator the spectral projection is exact, so the
//! time average must reproduce it.

use crate::_tests_support::{assert_states_close, sw_eigenspace};
use crate::eigenspace::Mode;
use crate::error::BalanceError;
use crate::initial_conditions::single_wave;
use crate::model::LinearSpectralModel;
use crate::projection::{GeostrophicSpectral, GeostrophicTimeAverage, Projection};

#[test]
fn zero_passes_is_a_configuration_error() {
    let eig = sw_eigenspace(5, 5);
    let model = LinearSpectralModel::new(eig.clone(), 0.1).unwrap();
    let err = GeostrophicTimeAverage::new(&model, &eig, 0, false).unwrap_err();
    assert!(matches!(err, BalanceError::Config(_)), "got {err}");
}

#[test]
fn geostrophic_state_survives_averaging_unchanged() {
    let eig = sw_eigenspace(9, 9);
    let geo = single_wave(&eig, &[2, 1], Mode::Geostrophic, 0.0).unwrap().state;
    let model = LinearSpectralModel::new(eig.clone(), 0.05).unwrap();
    let proj = GeostrophicTimeAverage::new(&model, &eig, 3, true).unwrap();

    let averaged = proj.project(&geo).unwrap();
    assert_states_close(&averaged, &geo, 1e-12, "balanced state is a fixed point");
}

#[test]
fn inertial_wave_cancels_exactly_over_a_full_period_window() {
    // at k = 0 the wave is an inertial oscillation with the longest period in
    // the eigenspace, so the first window matches it exactly and the
    // trapezoid average cancels it to round-off
    let eig = sw_eigenspace(9, 9);
    let wave = single_wave(&eig, &[0, 0], Mode::WavePlus, 0.2).unwrap();
    let period = wave.period.unwrap();

    let model = LinearSpectralModel::new(eig.clone(), period / 32.0).unwrap();
    let proj = GeostrophicTimeAverage::new(&model, &eig, 1, false).unwrap();

    let averaged = proj.project(&wave.state).unwrap();
    assert!(
        averaged.norm_l2() < 1e-12 * wave.state.norm_l2(),
        "inertial wave should average to zero, left {:.3e}",
        averaged.norm_l2()
    );
}

#[test]
fn averaging_approaches_the_spectral_projection() {
    let eig = sw_eigenspace(9, 9);
    let geo = single_wave(&eig, &[1, 1], Mode::Geostrophic, 0.0).unwrap().state;
    let wave = single_wave(&eig, &[2, 1], Mode::WavePlus, 0.0).unwrap().state;
    let z = geo.add(&wave.scale(0.2)).unwrap();

    let spectral = GeostrophicSpectral::new(eig.clone());
    let reference = spectral.project(&z).unwrap();

    let period = eig.max_wave_period().unwrap();
    let model = LinearSpectralModel::new(eig.clone(), period / 64.0).unwrap();
    let averaged = GeostrophicTimeAverage::new(&model, &eig, 4, true)
        .unwrap()
        .project(&z)
        .unwrap();

    let diff = averaged.norm_of_diff(&reference).unwrap() / z.norm_l2();
    assert!(
        diff < 1e-4,
        "backward-forward average should match the spectral projection, off by {diff:.3e}"
    );
}

#[test]
fn backward_forward_beats_forward_only() {
    // the backward pass multiplies each window's transfer function by its
    // complex conjugate, cancelling the asymmetric phase error a forward-only
    // average retains
    let eig = sw_eigenspace(9, 9);
    let geo = single_wave(&eig, &[1, 1], Mode::Geostrophic, 0.0).unwrap().state;
    let wave = single_wave(&eig, &[2, 1], Mode::WavePlus, 0.0).unwrap().state;
    let z = geo.add(&wave.scale(0.2)).unwrap();

    let spectral = GeostrophicSpectral::new(eig.clone());
    let reference = spectral.project(&z).unwrap();

    let period = eig.max_wave_period().unwrap();
    let model = LinearSpectralModel::new(eig.clone(), period / 64.0).unwrap();

    let forward_only = GeostrophicTimeAverage::new(&model, &eig, 2, false)
        .unwrap()
        .project(&z)
        .unwrap();
    let both_ways = GeostrophicTimeAverage::new(&model, &eig, 2, true)
        .unwrap()
        .project(&z)
        .unwrap();

    let err_forward = forward_only.norm_of_diff(&reference).unwrap();
    let err_both = both_ways.norm_of_diff(&reference).unwrap();
    assert!(
        err_both < 0.1 * err_forward,
        "backward-forward ({err_both:.3e}) should clearly beat forward-only ({err_forward:.3e})"
    );
    assert!(
        err_forward < 0.05 * z.norm_l2(),
        "forward-only should still converge coarsely, off by {err_forward:.3e}"
    );
}

#[test]
fn residual_wave_content_does_not_grow_with_more_passes() {
    let eig = sw_eigenspace(9, 9);
    let geo = single_wave(&eig, &[1, 1], Mode::Geostrophic, 0.0).unwrap().state;
    let wave = single_wave(&eig, &[2, 1], Mode::WavePlus, 0.1).unwrap().state;
    let z = geo.add(&wave.scale(0.3)).unwrap();

    let spectral = GeostrophicSpectral::new(eig.clone());
    let reference = spectral.project(&z).unwrap();

    let period = eig.max_wave_period().unwrap();
    let model = LinearSpectralModel::new(eig.clone(), period / 48.0).unwrap();

    let mut previous = f64::INFINITY;
    for n_ave in 1..=4 {
        let averaged = GeostrophicTimeAverage::new(&model, &eig, n_ave, true)
            .unwrap()
            .project(&z)
            .unwrap();
        let residual = averaged.norm_of_diff(&reference).unwrap();
        assert!(
            residual <= previous + 1e-14,
            "residual grew from {previous:.3e} to {residual:.3e} at n_ave = {n_ave}"
        );
        previous = residual;
    }
}

#[test]
fn projector_is_approximately_idempotent() {
    let eig = sw_eigenspace(9, 9);
    let geo = single_wave(&eig, &[1, 1], Mode::Geostrophic, 0.0).unwrap().state;
    let wave = single_wave(&eig, &[2, 1], Mode::WavePlus, 0.0).unwrap().state;
    let z = geo.add(&wave.scale(0.2)).unwrap();

    let period = eig.max_wave_period().unwrap();
    let model = LinearSpectralModel::new(eig.clone(), period / 64.0).unwrap();
    let proj = GeostrophicTimeAverage::new(&model, &eig, 3, true).unwrap();

    let once = proj.project(&z).unwrap();
    let twice = proj.project(&once).unwrap();
    assert_states_close(&twice, &once, 1e-3, "P(P(z)) ~= P(z)");
}
