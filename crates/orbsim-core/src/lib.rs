//! # OrbSim Core Library
//!
//! Numerical core for exploring atomic and molecular orbitals: hydrogen-like orbital fields
//! sampled on 3-D grids, phase-to-color mapping for volume rendering, and a small molecule
//! model with a simplified geometry minimizer.
//!
//! ## Architecture
//!
//! The library is split into three layers.
//!
//! - **[`core`]: The Foundation.** Stateless data and mathematics: the element table,
//!   molecules and presets, quantum numbers and electron configurations, radial and angular
//!   functions, colormaps and the pair potential.
//!
//! - **[`engine`]: The Logic Core.** Stateful orchestration: configuration, grid evaluation
//!   with progress and cancellation, the steppable energy minimizer, and the editable
//!   [`MoleculeModel`](engine::model::MoleculeModel) with its field cache.
//!
//! - **[`workflows`]: The Public API.** One function per complete request, such as
//!   [`evaluate_field`](workflows::field::evaluate_field) or
//!   [`minimize_energy`](workflows::minimize::minimize_energy).

pub mod core;
pub mod engine;
pub mod workflows;
