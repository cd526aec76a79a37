#![cfg(test)]

use std::sync::Arc;

use num_complex::Complex64;

use crate::_tests_support::{is_mismatch_error, make_grid};
use crate::field::{Field, Representation};

#[test]
fn zeros_initializes_all_entries_to_zero() {
    let grid = make_grid(&[2, 3], &[1.0, 1.0]);
    let field = Field::zeros(grid.clone(), Representation::Physical);
    assert_eq!(field.len(), grid.len());
    assert!(field.as_slice().iter().all(|v| *v == Complex64::ZERO));
}

#[test]
fn from_values_rejects_mismatched_lengths() {
    let grid = make_grid(&[2, 2], &[1.0, 1.0]);
    let data = vec![Complex64::ZERO; grid.len() - 1];
    let err = Field::from_values(grid, Representation::Physical, data).unwrap_err();
    assert!(is_mismatch_error(&err), "expected mismatch error, got {err}");
}

#[test]
fn get_and_get_mut_operate_on_correct_cell() {
    let grid = make_grid(&[3, 2], &[1.0, 1.0]);
    let mut field = Field::zeros(grid, Representation::Physical);
    *field.get_mut(&[2, 1]) = Complex64::new(2.0, 1.0);
    assert_eq!(field.get(&[2, 1]), Complex64::new(2.0, 1.0));
    assert_eq!(field.get(&[0, 0]), Complex64::ZERO);
}

#[test]
fn fill_region_mutates_only_the_addressed_box() {
    let grid = make_grid(&[4, 5], &[1.0, 1.0]);
    let mut field = Field::zeros(grid.clone(), Representation::Physical);
    field.fill(Complex64::new(1.0, 0.0));
    field
        .fill_region(&[1..3, 2..4], Complex64::new(7.0, 0.0))
        .expect("region in bounds");

    for ix in 0..4 {
        for iy in 0..5 {
            let inside = (1..3).contains(&ix) && (2..4).contains(&iy);
            let expected = if inside { 7.0 } else { 1.0 };
            let got = field.get(&[ix, iy]).re;
            assert!(
                (got - expected).abs() < 1e-15,
                "cell ({ix},{iy}) should be {expected}, got {got}"
            );
        }
    }
}

#[test]
fn fill_region_rejects_out_of_bounds_boxes() {
    let grid = make_grid(&[4, 4], &[1.0, 1.0]);
    let mut field = Field::zeros(grid, Representation::Physical);
    let err = field
        .fill_region(&[0..5, 0..2], Complex64::ZERO)
        .unwrap_err();
    assert!(is_mismatch_error(&err), "expected mismatch error, got {err}");
}

#[test]
fn fill_region_with_empty_range_is_a_no_op() {
    let grid = make_grid(&[3, 3], &[1.0, 1.0]);
    let mut field = Field::zeros(grid, Representation::Physical);
    field.fill(Complex64::new(1.0, 0.0));
    field
        .fill_region(&[1..1, 0..3], Complex64::new(9.0, 0.0))
        .expect("empty region is valid");
    assert!(field.as_slice().iter().all(|v| v.re == 1.0));
}

#[test]
fn arithmetic_between_different_grids_is_an_error() {
    let a = Field::zeros(make_grid(&[4, 4], &[1.0, 1.0]), Representation::Physical);
    let mut b = Field::zeros(make_grid(&[4, 5], &[1.0, 1.0]), Representation::Physical);
    let err = b.add_assign_field(&a).unwrap_err();
    assert!(is_mismatch_error(&err), "expected mismatch error, got {err}");
}

#[test]
fn arithmetic_between_representations_is_an_error() {
    let grid = make_grid(&[4, 4], &[1.0, 1.0]);
    let a = Field::zeros(grid.clone(), Representation::Spectral);
    let mut b = Field::zeros(grid, Representation::Physical);
    let err = b.add_assign_field(&a).unwrap_err();
    assert!(is_mismatch_error(&err), "expected mismatch error, got {err}");
}

#[test]
fn add_scaled_is_axpy() {
    let grid = make_grid(&[2, 2], &[1.0, 1.0]);
    let mut x = Field::zeros(grid.clone(), Representation::Physical);
    let mut y = Field::zeros(grid, Representation::Physical);
    for (i, value) in x.as_mut_slice().iter_mut().enumerate() {
        *value = Complex64::new(i as f64 + 1.0, 0.0);
    }
    for (i, value) in y.as_mut_slice().iter_mut().enumerate() {
        *value = Complex64::new(0.0, i as f64);
    }
    y.add_scaled(&x, 2.0).expect("compatible fields");
    for (i, &value) in y.as_slice().iter().enumerate() {
        let expected = Complex64::new(2.0 * (i as f64 + 1.0), i as f64);
        assert!(
            (value - expected).norm() < 1e-12,
            "index {i}: expected {expected}, got {value}"
        );
    }
}

#[test]
fn fft_toggles_representation_and_round_trips() {
    let grid = make_grid(&[6, 5], &[1.0, 1.0]);
    let mut field = Field::zeros(grid, Representation::Physical);
    for (i, value) in field.as_mut_slice().iter_mut().enumerate() {
        *value = Complex64::new((i as f64).sin(), 0.0);
    }
    let spectral = field.fft();
    assert_eq!(spectral.representation(), Representation::Spectral);
    let back = spectral.fft();
    assert_eq!(back.representation(), Representation::Physical);
    for (rec, expect) in back.as_slice().iter().zip(field.as_slice()) {
        assert!(
            (*rec - *expect).norm() < 1e-10,
            "round trip diverged: {rec} vs {expect}"
        );
    }
}

#[test]
fn norm_integral_agrees_across_representations() {
    let grid = make_grid(&[5, 4], &[2.0, 3.0]);
    let mut field = Field::zeros(grid, Representation::Physical);
    for (i, value) in field.as_mut_slice().iter_mut().enumerate() {
        *value = Complex64::new((0.7 * i as f64).cos(), 0.0);
    }
    let physical = field.norm_sqr_integral();
    let spectral = field.fft().norm_sqr_integral();
    assert!(
        (physical - spectral).abs() / physical < 1e-10,
        "Parseval violated: {physical} vs {spectral}"
    );
}

#[test]
fn is_finite_detects_nan_entries() {
    let grid = make_grid(&[2, 2], &[1.0, 1.0]);
    let mut field = Field::zeros(Arc::clone(&grid), Representation::Physical);
    assert!(field.is_finite());
    *field.get_mut(&[1, 0]) = Complex64::new(f64::NAN, 0.0);
    assert!(!field.is_finite());
}
