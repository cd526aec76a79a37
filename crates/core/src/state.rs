//! Named state container with elementwise algebra and diagnostics.
//!
//! One generic `State` serves every model variant: the variant contributes a
//! `StateLayout` (component keys plus energy weighting) instead of a
//! subclass, and the linearized dynamics are injected separately through the
//! eigenspace builder.

use std::sync::Arc;

use num_complex::Complex64;

use crate::error::BalanceError;
use crate::field::{Field, Representation};
use crate::grid::Grid;

/// Component-key list and quadratic-energy bookkeeping for one model variant.
#[derive(Clone, Debug)]
pub struct StateLayout {
    keys: Vec<&'static str>,
    kinetic: Vec<bool>,
    energy_weights: Vec<f64>,
}

impl StateLayout {
    /// `kinetic` marks the velocity components (they feed the kinetic energy,
    /// every other component feeds the potential energy); `energy_weights` is
    /// the diagonal of the quadratic-energy norm.
    pub fn new(
        keys: Vec<&'static str>,
        kinetic: Vec<bool>,
        energy_weights: Vec<f64>,
    ) -> Result<Self, BalanceError> {
        if keys.is_empty() {
            return Err(BalanceError::config("state layout needs at least one component"));
        }
        if keys.len() != kinetic.len() || keys.len() != energy_weights.len() {
            return Err(BalanceError::config(format!(
                "state layout size disagreement: {} keys, {} kinetic flags, {} weights",
                keys.len(),
                kinetic.len(),
                energy_weights.len()
            )));
        }
        if energy_weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(BalanceError::config("energy weights must be positive and finite"));
        }
        Ok(Self {
            keys,
            kinetic,
            energy_weights,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    pub fn is_kinetic(&self, comp: usize) -> bool {
        self.kinetic[comp]
    }

    pub fn energy_weights(&self) -> &[f64] {
        &self.energy_weights
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }
}

/// Named mapping from component key to field.
///
/// Invariant: all fields share the same grid and representation. Binary
/// operations require matching grids and component keys and fail with a
/// dimension-mismatch error otherwise. In-place variants return the receiver
/// for chaining.
#[derive(Clone, Debug)]
pub struct State {
    layout: Arc<StateLayout>,
    fields: Vec<Field>,
}

impl State {
    pub fn zeros(
        grid: &Arc<Grid>,
        layout: Arc<StateLayout>,
        representation: Representation,
    ) -> Self {
        let fields = (0..layout.len())
            .map(|_| Field::zeros(Arc::clone(grid), representation))
            .collect();
        Self { layout, fields }
    }

    pub fn from_fields(
        layout: Arc<StateLayout>,
        fields: Vec<Field>,
    ) -> Result<Self, BalanceError> {
        if fields.len() != layout.len() {
            return Err(BalanceError::mismatch(format!(
                "layout has {} components but {} fields were given",
                layout.len(),
                fields.len()
            )));
        }
        let first = &fields[0];
        for (comp, field) in fields.iter().enumerate().skip(1) {
            if !field.grid().same_grid(first.grid()) {
                return Err(BalanceError::mismatch(format!(
                    "component '{}' lives on a different grid",
                    layout.keys()[comp]
                )));
            }
            if field.representation() != first.representation() {
                return Err(BalanceError::mismatch(format!(
                    "component '{}' has a different representation",
                    layout.keys()[comp]
                )));
            }
        }
        Ok(Self { layout, fields })
    }

    pub fn grid(&self) -> &Arc<Grid> {
        self.fields[0].grid()
    }

    pub fn layout(&self) -> &Arc<StateLayout> {
        &self.layout
    }

    pub fn representation(&self) -> Representation {
        self.fields[0].representation()
    }

    pub fn is_spectral(&self) -> bool {
        self.representation() == Representation::Spectral
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.layout.index_of(key).map(|i| &self.fields[i])
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.layout.index_of(key).map(move |i| &mut self.fields[i])
    }

    fn check_compatible(&self, other: &State) -> Result<(), BalanceError> {
        if self.layout.keys() != other.layout.keys() {
            return Err(BalanceError::mismatch(format!(
                "component keys differ: {:?} vs {:?}",
                self.layout.keys(),
                other.layout.keys()
            )));
        }
        if !self.grid().same_grid(other.grid()) {
            return Err(BalanceError::mismatch(format!(
                "states live on different grids: {:?} vs {:?}",
                self.grid(),
                other.grid()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Elementwise algebra
    // ========================================================================

    pub fn add(&self, other: &State) -> Result<State, BalanceError> {
        let mut out = self.clone();
        out.add_assign(other)?;
        Ok(out)
    }

    pub fn sub(&self, other: &State) -> Result<State, BalanceError> {
        let mut out = self.clone();
        out.sub_assign(other)?;
        Ok(out)
    }

    pub fn mul(&self, other: &State) -> Result<State, BalanceError> {
        let mut out = self.clone();
        out.mul_assign(other)?;
        Ok(out)
    }

    pub fn div(&self, other: &State) -> Result<State, BalanceError> {
        let mut out = self.clone();
        out.div_assign(other)?;
        Ok(out)
    }

    pub fn add_assign(&mut self, other: &State) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.fields.iter_mut().zip(other.fields.iter()) {
            dst.add_assign_field(src)?;
        }
        Ok(self)
    }

    pub fn sub_assign(&mut self, other: &State) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.fields.iter_mut().zip(other.fields.iter()) {
            dst.sub_assign_field(src)?;
        }
        Ok(self)
    }

    pub fn mul_assign(&mut self, other: &State) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.fields.iter_mut().zip(other.fields.iter()) {
            dst.mul_assign_field(src)?;
        }
        Ok(self)
    }

    pub fn div_assign(&mut self, other: &State) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.fields.iter_mut().zip(other.fields.iter()) {
            dst.div_assign_field(src)?;
        }
        Ok(self)
    }

    /// Broadcast a real scalar factor to every component.
    pub fn scale(&self, factor: f64) -> State {
        let mut out = self.clone();
        out.scale_assign(factor);
        out
    }

    pub fn scale_assign(&mut self, factor: f64) -> &mut Self {
        for field in &mut self.fields {
            field.scale(factor);
        }
        self
    }

    /// Broadcast a real scalar offset to every component.
    pub fn shift(&self, offset: f64) -> State {
        let mut out = self.clone();
        for field in &mut out.fields {
            field.shift(offset);
        }
        out
    }

    /// `self += factor * other` (axpy).
    pub fn add_scaled(&mut self, other: &State, factor: f64) -> Result<&mut Self, BalanceError> {
        self.check_compatible(other)?;
        for (dst, src) in self.fields.iter_mut().zip(other.fields.iter()) {
            dst.add_scaled(src, factor)?;
        }
        Ok(self)
    }

    // ========================================================================
    // Transforms, norms, inner products
    // ========================================================================

    /// Transform every component to the opposite representation.
    /// Applying twice reproduces the original up to round-off.
    pub fn fft(&self) -> State {
        State {
            layout: Arc::clone(&self.layout),
            fields: self.fields.iter().map(Field::fft).collect(),
        }
    }

    /// Domain-integrated inner product, conjugating the second operand.
    pub fn dot(&self, other: &State) -> Result<Complex64, BalanceError> {
        self.check_compatible(other)?;
        let mut sum = Complex64::ZERO;
        for (a, b) in self.fields.iter().zip(other.fields.iter()) {
            sum += a.dot(b)?;
        }
        Ok(sum)
    }

    /// Square root of the domain-integrated sum of squared component moduli.
    pub fn norm_l2(&self) -> f64 {
        self.fields
            .iter()
            .map(Field::norm_sqr_integral)
            .sum::<f64>()
            .sqrt()
    }

    /// L2 norm of `self - other`.
    pub fn norm_of_diff(&self, other: &State) -> Result<f64, BalanceError> {
        Ok(self.sub(other)?.norm_l2())
    }

    /// Key of the first component containing a non-finite value, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .zip(self.layout.keys())
            .find(|(field, _)| !field.is_finite())
            .map(|(_, &key)| key)
    }

    // ========================================================================
    // Energy diagnostics (quadratic, i.e. the linear-dynamics energy)
    // ========================================================================

    /// Kinetic energy density, `0.5 * sum over velocity components of w_c f²`.
    pub fn ekin(&self) -> Result<Field, BalanceError> {
        self.energy_density(true)
    }

    /// Potential energy density over the non-velocity components.
    pub fn epot(&self) -> Result<Field, BalanceError> {
        self.energy_density(false)
    }

    /// Total energy density.
    pub fn etot(&self) -> Result<Field, BalanceError> {
        let mut total = self.ekin()?;
        total.add_assign_field(&self.epot()?)?;
        Ok(total)
    }

    pub fn mean_ekin(&self) -> Result<f64, BalanceError> {
        Ok(self.ekin()?.mean().re)
    }

    pub fn mean_epot(&self) -> Result<f64, BalanceError> {
        Ok(self.epot()?.mean().re)
    }

    pub fn mean_etot(&self) -> Result<f64, BalanceError> {
        Ok(self.etot()?.mean().re)
    }

    fn energy_density(&self, kinetic: bool) -> Result<Field, BalanceError> {
        // energies are defined on grid points
        let z = if self.is_spectral() {
            self.fft()
        } else {
            self.clone()
        };
        let mut density = Field::zeros(Arc::clone(z.grid()), Representation::Physical);
        for (comp, field) in z.fields.iter().enumerate() {
            if self.layout.is_kinetic(comp) != kinetic {
                continue;
            }
            let weight = 0.5 * self.layout.energy_weights()[comp];
            for (dst, src) in density.as_mut_slice().iter_mut().zip(field.as_slice()) {
                *dst += weight * src.norm_sqr();
            }
        }
        Ok(density)
    }
}
