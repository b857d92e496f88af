//! # Engine Module
//!
//! The stateful layer between the pure mathematics in [`crate::core`] and the entry points in
//! [`crate::workflows`].
//!
//! ## Overview
//!
//! Anything that runs long enough to need progress or cancellation lives here: sampling an
//! orbital over a grid slab by slab, and stepping the energy minimizer. The engine also owns
//! the interactive [`model::MoleculeModel`], which validates edits, tracks a revision counter
//! and keeps an LRU cache of evaluated fields.
//!
//! - **Configuration** ([`config`]) - Field, colormap, geometry and minimizer settings with builders
//! - **Evaluation** ([`evaluator`]) - Grid sampling of orbitals and scenes
//! - **Minimization** ([`minimizer`]) - The steppable gradient-descent state machine
//! - **Model** ([`model`]) - Editable molecule, snapshots and stale-result rejection
//! - **Cancellation** ([`cancel`]) and **Progress** ([`progress`])
//! - **Error Handling** ([`error`]) - [`error::EngineError`], into which every lower-level error converts

pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod minimizer;
pub mod model;
pub mod progress;
