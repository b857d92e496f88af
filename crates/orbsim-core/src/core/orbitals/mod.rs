//! # Orbitals Module
//!
//! Hydrogen-like atomic orbitals and the data they are sampled into.
//!
//! An orbital is the product of a radial function `R_nl(r)`, scaled by an effective nuclear
//! charge from Slater's screening rules, and a spherical harmonic in either the complex or
//! the real basis. Everything in this module is pure; grid-wide evaluation with progress
//! and cancellation lives in the engine.
//!
//! - [`quantum`] - Quantum-number validation and [`quantum::OrbitalSpec`]
//! - [`aufbau`] - Ground-state electron configurations and effective nuclear charge
//! - [`radial`] / [`angular`] - The two factors of the wavefunction
//! - [`grid`] - The sample lattice
//! - [`field`] - Point evaluation and sampled fields
//! - [`scene`] - Several orbitals combined into one molecular field
//! - [`isosurface`] - Enclosed-probability density thresholds

pub mod angular;
pub mod aufbau;
pub mod field;
pub mod grid;
pub mod isosurface;
pub mod quantum;
pub mod radial;
pub mod scene;
