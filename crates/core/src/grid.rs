//! Periodic uniform grid with spectral bookkeeping.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::backend::SpectralBackend;
use crate::error::BalanceError;

/// Doubly or triply periodic uniform grid.
///
/// Immutable after construction. Holds the per-axis wavenumber arrays in FFT
/// ordering and the spectral backend every field on this grid transforms
/// through. Shared read-only (via `Arc`) by states, eigenspaces, and models.
pub struct Grid {
    shape: Vec<usize>,
    lengths: Vec<f64>,
    strides: Vec<usize>,
    wavenumbers: Vec<Vec<f64>>,
    backend: Arc<dyn SpectralBackend>,
}

impl Grid {
    /// Build a grid from a resolution tuple and matching domain lengths.
    ///
    /// Fails with a configuration error if any resolution entry is zero, any
    /// length is non-positive, or the axis counts disagree.
    pub fn new(
        shape: &[usize],
        lengths: &[f64],
        backend: Arc<dyn SpectralBackend>,
    ) -> Result<Arc<Self>, BalanceError> {
        if shape.is_empty() {
            return Err(BalanceError::config("resolution must have at least one axis"));
        }
        if shape.len() != lengths.len() {
            return Err(BalanceError::config(format!(
                "resolution has {} axes but domain length has {}",
                shape.len(),
                lengths.len()
            )));
        }
        for (axis, &n) in shape.iter().enumerate() {
            if n == 0 {
                return Err(BalanceError::config(format!(
                    "resolution must be positive on axis {axis}"
                )));
            }
        }
        for (axis, &length) in lengths.iter().enumerate() {
            if !length.is_finite() || length <= 0.0 {
                return Err(BalanceError::config(format!(
                    "domain length must be positive and finite on axis {axis}, got {length}"
                )));
            }
        }
        let wavenumbers = shape
            .iter()
            .zip(lengths.iter())
            .map(|(&n, &length)| build_k_vector(n, length))
            .collect();
        Ok(Arc::new(Self {
            shape: shape.to_vec(),
            lengths: lengths.to_vec(),
            strides: row_major_strides(shape),
            wavenumbers,
            backend,
        }))
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Total number of grid points (and spectral coefficients).
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid spacing along `axis`.
    pub fn spacing(&self, axis: usize) -> f64 {
        self.lengths[axis] / self.shape[axis] as f64
    }

    /// Volume of one grid cell.
    pub fn cell_volume(&self) -> f64 {
        self.lengths.iter().product::<f64>() / self.len() as f64
    }

    /// Wavenumber array for one axis, FFT ordered (Nyquist at the positive end).
    pub fn wavenumbers(&self, axis: usize) -> &[f64] {
        &self.wavenumbers[axis]
    }

    /// Wavenumber vector at a flat spectral index.
    pub fn wavenumber_at(&self, idx: usize) -> Vec<f64> {
        self.coords_of(idx)
            .iter()
            .enumerate()
            .map(|(axis, &i)| self.wavenumbers[axis][i])
            .collect()
    }

    /// Flat row-major index of a coordinate tuple.
    pub fn index_of(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.ndim());
        coords
            .iter()
            .zip(self.strides.iter())
            .map(|(&c, &s)| c * s)
            .sum()
    }

    /// Coordinate tuple of a flat index.
    pub fn coords_of(&self, idx: usize) -> Vec<usize> {
        self.strides
            .iter()
            .zip(self.shape.iter())
            .map(|(&stride, &n)| (idx / stride) % n)
            .collect()
    }

    /// Physical coordinate of grid point `i` along `axis`.
    pub fn coordinate(&self, axis: usize, i: usize) -> f64 {
        i as f64 * self.spacing(axis)
    }

    /// Coordinate mesh along `axis`, in the same flat layout as field data.
    /// External use only (initial conditions, plotting); the projection
    /// algorithms never touch physical coordinates.
    pub fn mesh(&self, axis: usize) -> Vec<f64> {
        let n = self.shape[axis];
        let stride = self.strides[axis];
        let spacing = self.spacing(axis);
        (0..self.len())
            .map(|idx| ((idx / stride) % n) as f64 * spacing)
            .collect()
    }

    pub fn backend(&self) -> &dyn SpectralBackend {
        self.backend.as_ref()
    }

    /// Whether two grids describe the same discretization.
    pub fn same_grid(&self, other: &Grid) -> bool {
        self.shape == other.shape && self.lengths == other.lengths
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("shape", &self.shape)
            .field("lengths", &self.lengths)
            .finish()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.same_grid(other)
    }
}

fn build_k_vector(n: usize, length: f64) -> Vec<f64> {
    let two_pi = 2.0 * PI;
    (0..n)
        .map(|i| {
            let centered = if i <= n / 2 {
                i as isize
            } else {
                i as isize - n as isize
            };
            two_pi * centered as f64 / length
        })
        .collect()
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}
