//! Backend trait for spectral transforms.
//!
//! The projection algorithms never choose an execution backend themselves:
//! a backend is selected once, at grid construction, and threaded through
//! every field that lives on that grid. Independent projections on separate
//! states therefore never share mutable transform state.

use num_complex::Complex64;

/// Discrete Fourier transform provider for flat row-major complex buffers.
///
/// Conventions follow the model family this engine serves: `forward` is
/// unnormalized, `inverse` divides by the total number of points, so
/// `inverse(forward(x))` reproduces `x` up to round-off. Implementations must
/// transform every axis of `shape` with the standard FFT frequency ordering
/// (index `i <= n/2` maps to wavenumber `+i`, the Nyquist bin included at the
/// positive end).
pub trait SpectralBackend: Send + Sync {
    /// In-place forward transform of `data`, laid out row-major over `shape`.
    fn forward(&self, shape: &[usize], data: &mut [Complex64]);

    /// In-place inverse transform, normalized by `1 / shape.iter().product()`.
    fn inverse(&self, shape: &[usize], data: &mut [Complex64]);
}
