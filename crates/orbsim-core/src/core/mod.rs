//! # Core Module
//!
//! Stateless data and mathematics: everything here is a pure function of its inputs.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, molecules and inferred bonds
//! - **Orbitals** ([`orbitals`]) - Quantum numbers, electron configurations and
//!   hydrogen-like wavefunctions
//! - **Coloring** ([`colormap`]) - Phase-to-hue and magnitude-to-opacity mapping
//! - **Energy** ([`energy`]) - The pairwise energy functional minimized by the engine
//!
//! ## Scientific Foundation
//!
//! - **Hydrogen-like orbitals** with an effective nuclear charge from Slater's screening rules
//! - **Aufbau filling** with the known transition-metal exceptions
//! - **Lennard-Jones and Coulomb** pair potentials for the geometry model

pub mod colormap;
pub mod energy;
pub mod models;
pub mod orbitals;
