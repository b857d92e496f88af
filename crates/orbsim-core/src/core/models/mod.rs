//! # Core Models Module
//!
//! Data structures describing what is being simulated: the static element table, individual
//! atoms with their ionization state, and the molecule that groups them.
//!
//! ## Key Components
//!
//! - [`element`] - Per-element reference data (symbol, electronegativity, covalent radius)
//! - [`atom`] - A positioned atom of one species with a validated ionization
//! - [`molecule`] - Ordered atom storage with separation checks and bond inference
//! - [`topology`] - Bonds inferred from geometry and their qualitative character
//! - [`presets`] - Named example molecules with a default orbital per atom
//! - [`formula`] - Chemical formula parsing (`Mg(OH)2`) and a starting layout for its atoms
//! - [`ids`] - Stable identifiers for atoms
//!
//! ## Usage
//!
//! ```ignore
//! use orbsim::core::models::{atom::Atom, molecule::Molecule};
//!
//! let mut molecule = Molecule::new();
//! let o = molecule.add_atom(Atom::new(8, Point3::origin())?, 0.4)?;
//! let h = molecule.add_atom(Atom::new(1, Point3::new(0.96, 0.0, 0.0))?, 0.4)?;
//! let bonds = molecule.bonds(DEFAULT_BOND_TOLERANCE);
//! ```

pub mod atom;
pub mod element;
pub mod formula;
pub mod ids;
pub mod molecule;
pub mod presets;
pub mod topology;
