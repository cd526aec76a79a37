//! CPU spectral backend built on rustfft.
//!
//! Transforms every axis of an N-axis row-major buffer with cached 1D plans.
//! The forward transform is unnormalized and the inverse divides by the total
//! number of points, matching the convention the core documents on
//! [`SpectralBackend`].

use std::sync::{Arc, Mutex};

use geobal_core::backend::SpectralBackend;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};


pub struct CpuBackend {
    planner: Mutex<FftPlanner<f64>>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }

    fn plan(&self, n: usize, forward: bool) -> Arc<dyn Fft<f64>> {
        let mut planner = self.planner.lock().expect("fft planner poisoned");
        if forward {
            planner.plan_fft_forward(n)
        } else {
            planner.plan_fft_inverse(n)
        }
    }

    fn transform_axis(&self, shape: &[usize], data: &mut [Complex64], axis: usize, forward: bool) {
        let n = shape[axis];
        if n == 1 {
            return;
        }
        let plan = self.plan(n, forward);
        let stride: usize = shape[axis + 1..].iter().product();
        let mut line = vec![Complex64::ZERO; n];
        for base in 0..data.len() {
            if (base / stride) % n != 0 {
                continue;
            }
            for (j, value) in line.iter_mut().enumerate() {
                *value = data[base + j * stride];
            }
            plan.process(&mut line);
            for (j, value) in line.iter().enumerate() {
                data[base + j * stride] = *value;
            }
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralBackend for CpuBackend {
    fn forward(&self, shape: &[usize], data: &mut [Complex64]) {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        for axis in 0..shape.len() {
            self.transform_axis(shape, data, axis, true);
        }
    }

    fn inverse(&self, shape: &[usize], data: &mut [Complex64]) {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        for axis in 0..shape.len() {
            self.transform_axis(shape, data, axis, false);
        }
        let norm = 1.0 / data.len() as f64;
        for value in data.iter_mut() {
            *value *= norm;
        }
    }
}
