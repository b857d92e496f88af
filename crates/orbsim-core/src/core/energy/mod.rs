//! # Energy Module
//!
//! The simplified pairwise energy used by the geometry minimizer.
//!
//! - [`potentials`] - Lennard-Jones 12-6 and Coulomb pair potentials with their derivatives
//! - [`term`] - Per-contribution energy bookkeeping
//! - [`functional`] - Whole-molecule energy and analytic gradient

pub mod functional;
pub mod potentials;
pub mod term;
