//! Representation-tagged dense field storage on a periodic grid.

use std::ops::Range;
use std::sync::Arc;

use num_complex::Complex64;

use crate::error::BalanceError;
use crate::grid::Grid;

/// Whether field values live on grid points or on spectral coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Representation {
    Physical,
    Spectral,
}

/// A dense complex scalar field tagged with its representation.
///
/// Physical-space fields carry real data in the real parts; storage is
/// complex throughout so the spectral transform is a representation toggle
/// rather than a type change.
#[derive(Clone, Debug)]
pub struct Field {
    grid: Arc<Grid>,
    representation: Representation,
    data: Vec<Complex64>,
}

impl Field {
    pub fn zeros(grid: Arc<Grid>, representation: Representation) -> Self {
        let len = grid.len();
        Self {
            grid,
            representation,
            data: vec![Complex64::ZERO; len],
        }
    }

    pub fn from_values(
        grid: Arc<Grid>,
        representation: Representation,
        data: Vec<Complex64>,
    ) -> Result<Self, BalanceError> {
        if data.len() != grid.len() {
            return Err(BalanceError::mismatch(format!(
                "field data has {} entries but grid {:?} has {}",
                data.len(),
                grid,
                grid.len()
            )));
        }
        Ok(Self {
            grid,
            representation,
            data,
        })
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    pub fn get(&self, coords: &[usize]) -> Complex64 {
        self.data[self.grid.index_of(coords)]
    }

    pub fn get_mut(&mut self, coords: &[usize]) -> &mut Complex64 {
        let idx = self.grid.index_of(coords);
        &mut self.data[idx]
    }

    pub fn fill(&mut self, value: Complex64) {
        self.data.fill(value);
    }

    /// Assign `value` to the axis-aligned box spanned by `ranges`, leaving
    /// every other entry untouched.
    pub fn fill_region(
        &mut self,
        ranges: &[Range<usize>],
        value: Complex64,
    ) -> Result<(), BalanceError> {
        let shape = self.grid.shape();
        if ranges.len() != shape.len() {
            return Err(BalanceError::mismatch(format!(
                "region has {} axes but grid has {}",
                ranges.len(),
                shape.len()
            )));
        }
        for (axis, (range, &n)) in ranges.iter().zip(shape.iter()).enumerate() {
            if range.end > n || range.start > range.end {
                return Err(BalanceError::mismatch(format!(
                    "region {:?} out of bounds on axis {axis} (size {n})",
                    range
                )));
            }
        }
        let mut coords: Vec<usize> = ranges.iter().map(|r| r.start).collect();
        if coords.iter().zip(ranges).any(|(_, r)| r.is_empty()) {
            return Ok(());
        }
        loop {
            let idx = self.grid.index_of(&coords);
            self.data[idx] = value;
            // odometer over the box, last axis fastest
            let mut axis = coords.len();
            loop {
                if axis == 0 {
                    return Ok(());
                }
                axis -= 1;
                coords[axis] += 1;
                if coords[axis] < ranges[axis].end {
                    break;
                }
                coords[axis] = ranges[axis].start;
            }
        }
    }

    fn check_compatible(&self, other: &Field) -> Result<(), BalanceError> {
        if !self.grid.same_grid(&other.grid) {
            return Err(BalanceError::mismatch(format!(
                "fields live on different grids: {:?} vs {:?}",
                self.grid, other.grid
            )));
        }
        if self.representation != other.representation {
            return Err(BalanceError::mismatch(format!(
                "fields have different representations: {:?} vs {:?}",
                self.representation, other.representation
            )));
        }
        Ok(())
    }

    pub fn add_assign_field(&mut self, other: &Field) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst += src;
        }
        Ok(self)
    }

    pub fn sub_assign_field(&mut self, other: &Field) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst -= src;
        }
        Ok(self)
    }

    pub fn mul_assign_field(&mut self, other: &Field) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst *= src;
        }
        Ok(self)
    }

    pub fn div_assign_field(&mut self, other: &Field) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst /= src;
        }
        Ok(self)
    }

    /// Multiply every entry by a real scalar.
    pub fn scale(&mut self, factor: f64) -> &mut Self {
        for value in &mut self.data {
            *value *= factor;
        }
        self
    }

    /// Add a real scalar to every entry.
    pub fn shift(&mut self, offset: f64) -> &mut Self {
        for value in &mut self.data {
            *value += offset;
        }
        self
    }

    /// `self += factor * other` (axpy).
    pub fn add_scaled(&mut self, other: &Field, factor: f64) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst += factor * src;
        }
        Ok(self)
    }

    /// Transform to the opposite representation, returning a new field.
    pub fn fft(&self) -> Field {
        let mut data = self.data.clone();
        let representation = match self.representation {
            Representation::Physical => {
                self.grid.backend().forward(self.grid.shape(), &mut data);
                Representation::Spectral
            }
            Representation::Spectral => {
                self.grid.backend().inverse(self.grid.shape(), &mut data);
                Representation::Physical
            }
        };
        Field {
            grid: Arc::clone(&self.grid),
            representation,
            data,
        }
    }

    /// Domain integral of |f|², consistent across representations
    /// (Parseval factor 1/N in spectral space).
    pub fn norm_sqr_integral(&self) -> f64 {
        let sum: f64 = self.data.iter().map(|v| v.norm_sqr()).sum();
        sum * self.measure()
    }

    /// Domain integral of `self * conj(other)`.
    pub fn dot(&self, other: &Field) -> Result<Complex64, BalanceError> {
        self.check_compatible(other)?;
        let sum: Complex64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b.conj())
            .sum();
        Ok(sum * self.measure())
    }

    /// Domain mean value.
    pub fn mean(&self) -> Complex64 {
        let sum: Complex64 = self.data.iter().sum();
        sum / self.data.len() as f64
    }

    pub fn max_abs(&self) -> f64 {
        self.data.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }

    pub fn is_finite(&self) -> bool {
        self.data
            .iter()
            .all(|v| v.re.is_finite() && v.im.is_finite())
    }

    fn measure(&self) -> f64 {
        match self.representation {
            Representation::Physical => self.grid.cell_volume(),
            Representation::Spectral => self.grid.cell_volume() / self.grid.len() as f64,
        }
    }
}
