//! Spectral balance decomposition for periodic rotating-fluid models.
//!
//! Splits a fluid state on a doubly/triply periodic grid into a balanced
//! (geostrophic) component and a wave residual, via a linear per-wavenumber
//! eigenprojection or a nonlinear time-averaging procedure, and measures how
//! well a projection isolates the balanced manifold. The time-stepping model
//! itself is an injected collaborator; only its linear spectral reference
//! implementation ships here.

pub mod backend;
pub mod diagnose_imbalance;
pub mod eigenspace;
pub mod eigenvectors;
pub mod error;
pub mod field;
pub mod grid;
pub mod initial_conditions;
pub mod model;
pub mod projection;
pub mod settings;
pub mod state;


#[cfg(test)]
mod _tests_diagnose;
#[cfg(test)]
mod _tests_field;
#[cfg(test)]
mod _tests_time_average;
