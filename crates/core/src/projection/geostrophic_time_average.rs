//! Nonlinear balance estimate by time averaging.
//!
//! Classical nonlinear normal-mode initialization: averaging the model
//! trajectory over a wave period cancels the oscillatory component while the
//! slow balanced component survives largely intact. Successive passes use
//! shrinking windows, `T_max / pass`, starting from the longest wave period
//! in the eigenspace, so residual contamination from the faster frequencies
//! is removed as well.

use log::debug;

use crate::eigenspace::Eigenspace;
use crate::error::BalanceError;
use crate::model::{Model, TimeDirection};
use crate::projection::Projection;
use crate::state::State;

/// Time-average projector over an injected nonlinear model.
///
/// `n_ave` is the number of window passes; more passes approach the true
/// balance more closely at the cost of more model evaluations. With
/// `backward_forward` each window is averaged both forward and backward in
/// time, which cancels the leading-order asymmetric error a forward-only
/// average retains — the two variants are not interchangeable in accuracy.
#[derive(Debug)]
pub struct GeostrophicTimeAverage<'a, M: Model> {
    model: &'a M,
    n_ave: usize,
    backward_forward: bool,
    max_period: f64,
}

impl<'a, M: Model> GeostrophicTimeAverage<'a, M> {
    /// Derive the first averaging window from the longest wave period of
    /// `eigenspace`.
    pub fn new(
        model: &'a M,
        eigenspace: &Eigenspace,
        n_ave: usize,
        backward_forward: bool,
    ) -> Result<Self, BalanceError> {
        Self::with_max_period(model, eigenspace.max_wave_period()?, n_ave, backward_forward)
    }

    /// Use an explicit first-window length instead of the eigenspace default.
    pub fn with_max_period(
        model: &'a M,
        max_period: f64,
        n_ave: usize,
        backward_forward: bool,
    ) -> Result<Self, BalanceError> {
        if n_ave == 0 {
            return Err(BalanceError::config("n_ave must be at least 1"));
        }
        if !max_period.is_finite() || max_period <= 0.0 {
            return Err(BalanceError::config(format!(
                "averaging period must be positive and finite, got {max_period}"
            )));
        }
        Ok(Self {
            model,
            n_ave,
            backward_forward,
            max_period,
        })
    }

    /// Trapezoid-weighted running mean of the trajectory over one window:
    /// half weight on both endpoints, so a wave whose period divides the
    /// window cancels to round-off in discrete time.
    fn window_average(
        &self,
        z: &State,
        steps: usize,
        direction: TimeDirection,
    ) -> Result<State, BalanceError> {
        let mut average = z.scale(0.5);
        let mut current = z.clone();
        for step in 1..=steps {
            current = self.model.step(&current, direction)?;
            if let Some(component) = current.first_non_finite() {
                return Err(BalanceError::NumericalInstability {
                    component: component.to_string(),
                    step,
                });
            }
            let weight = if step == steps { 0.5 } else { 1.0 };
            average.add_scaled(&current, weight)?;
        }
        average.scale_assign(1.0 / steps as f64);
        Ok(average)
    }
}

impl<M: Model> Projection for GeostrophicTimeAverage<'_, M> {
    fn project(&self, z: &State) -> Result<State, BalanceError> {
        let was_spectral = z.is_spectral();
        // averaging commutes with the transform; staying spectral spares the
        // model one round trip per step when it also works spectrally
        let mut z_ave = if was_spectral { z.clone() } else { z.fft() };
        let dt = self.model.dt();

        for pass in 1..=self.n_ave {
            let period = self.max_period / pass as f64;
            let steps = ((period / dt).round() as usize).max(1);
            debug!(
                "time-average pass {pass}/{}: window {period:.4} ({steps} steps)",
                self.n_ave
            );
            z_ave = self.window_average(&z_ave, steps, TimeDirection::Forward)?;
            if self.backward_forward {
                z_ave = self.window_average(&z_ave, steps, TimeDirection::Backward)?;
            }
        }

        Ok(if was_spectral { z_ave } else { z_ave.fft() })
    }
}
