use super::potentials::{coulomb, coulomb_derivative, lennard_jones_12_6, lennard_jones_12_6_derivative};
use super::term::EnergyTerm;
use crate::core::models::molecule::Molecule;
use nalgebra::{Point3, Vector3};

/// Parameters of the simplified pair potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialParams {
    /// Depth of every Lennard-Jones well, kcal/mol.
    pub well_depth: f64,
    /// Multiplier on the summed covalent radii giving each pair's equilibrium distance.
    pub radius_scale: f64,
    /// Relative permittivity for the Coulomb term between ionized atoms.
    pub dielectric: f64,
}

impl Default for PotentialParams {
    fn default() -> Self {
        Self {
            well_depth: 1.0,
            radius_scale: 1.0,
            dielectric: 1.0,
        }
    }
}

/// Energy, its decomposition, and the gradient with respect to every atom position.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyState {
    pub energy: f64,
    pub terms: EnergyTerm,
    /// dE/dx for each atom, in molecule order (kcal/mol/Å).
    pub gradient: Vec<Vector3<f64>>,
}

impl EnergyState {
    /// Largest per-atom gradient norm; 0 for an empty or single-atom molecule.
    pub fn max_gradient_norm(&self) -> f64 {
        self.gradient.iter().map(|g| g.norm()).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PairSpecies {
    covalent_radius: f64,
    charge: f64,
}

/// A pairwise energy function over a fixed set of species.
///
/// Every pair interacts through a 12-6 Lennard-Jones term whose minimum sits at the scaled
/// sum of covalent radii; pairs of ionized atoms additionally feel a Coulomb term with the
/// ionization as the point charge.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyFunctional {
    species: Vec<PairSpecies>,
    params: PotentialParams,
}

impl EnergyFunctional {
    pub fn new(molecule: &Molecule, params: PotentialParams) -> Self {
        let species = molecule
            .atoms_iter()
            .map(|(_, atom)| PairSpecies {
                covalent_radius: atom.element().covalent_radius,
                charge: atom.ionization() as f64,
            })
            .collect();
        Self { species, params }
    }

    pub fn atom_count(&self) -> usize {
        self.species.len()
    }

    pub fn params(&self) -> &PotentialParams {
        &self.params
    }

    fn pair(&self, i: usize, j: usize, dist: f64) -> (EnergyTerm, f64) {
        let a = self.species[i];
        let b = self.species[j];
        let r_min = (a.covalent_radius + b.covalent_radius) * self.params.radius_scale;
        let mut term = EnergyTerm::new(lennard_jones_12_6(dist, r_min, self.params.well_depth), 0.0);
        let mut de_dr = lennard_jones_12_6_derivative(dist, r_min, self.params.well_depth);
        if a.charge != 0.0 && b.charge != 0.0 {
            term.coulomb = coulomb(dist, a.charge, b.charge, self.params.dielectric);
            de_dr += coulomb_derivative(dist, a.charge, b.charge, self.params.dielectric);
        }
        (term, de_dr)
    }

    /// Energy only, for probing trial geometries.
    pub fn energy(&self, positions: &[Point3<f64>]) -> f64 {
        let n = self.species.len().min(positions.len());
        let mut terms = EnergyTerm::default();
        for i in 0..n {
            for j in (i + 1)..n {
                let dist = (positions[i] - positions[j]).norm();
                terms += self.pair(i, j, dist).0;
            }
        }
        terms.total()
    }

    /// Energy, terms and analytic gradient at `positions`.
    pub fn evaluate(&self, positions: &[Point3<f64>]) -> EnergyState {
        let n = self.species.len().min(positions.len());
        let mut terms = EnergyTerm::default();
        let mut gradient = vec![Vector3::zeros(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let dist = delta.norm();
                let (term, de_dr) = self.pair(i, j, dist);
                terms += term;
                if dist > 0.0 {
                    let force = delta * (de_dr / dist);
                    gradient[i] += force;
                    gradient[j] -= force;
                }
            }
        }
        EnergyState {
            energy: terms.total(),
            terms,
            gradient,
        }
    }
}
