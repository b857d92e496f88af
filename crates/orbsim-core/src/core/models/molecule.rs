use super::atom::{Atom, AtomError};
use super::ids::AtomId;
use super::topology::{Bond, BondCharacter};
use nalgebra::{Point3, Vector3};
use slotmap::SlotMap;
use thiserror::Error;

/// Multiplier applied to the summed covalent radii when inferring bonds.
pub const DEFAULT_BOND_TOLERANCE: f64 = 1.25;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error(
        "Atoms would be {distance:.3} Å apart, closer than the minimum separation of {min_separation:.3} Å"
    )]
    TooClose {
        existing: AtomId,
        distance: f64,
        min_separation: f64,
    },
    #[error("Atom {0:?} does not exist in the molecule")]
    AtomNotFound(AtomId),
    #[error("Position has a non-finite coordinate")]
    NonFinitePosition,
    #[error("Expected {expected} positions, got {found}")]
    PositionCountMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Atom(#[from] AtomError),
}

/// An ordered collection of atoms.
///
/// Atoms are stored in a slot map so that their ids stay stable across removals, while a
/// separate list preserves insertion order for iteration and for position vectors.
/// Bonds are not stored; [`Molecule::bonds`] derives them from the current geometry.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    atoms: SlotMap<AtomId, Atom>,
    order: Vec<AtomId>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Atom ids in insertion order.
    pub fn atom_ids(&self) -> &[AtomId] {
        &self.order
    }

    /// Iterates atoms in insertion order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.order
            .iter()
            .filter_map(|&id| self.atoms.get(id).map(|atom| (id, atom)))
    }

    /// Positions of every atom in insertion order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms_iter().map(|(_, atom)| atom.position).collect()
    }

    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        let sum = self
            .atoms_iter()
            .fold(Vector3::zeros(), |acc, (_, atom)| acc + atom.position.coords);
        Some(Point3::from(sum / self.len() as f64))
    }

    /// Adds an atom, rejecting it if it would sit closer than `min_separation` to any
    /// existing atom. The molecule is unchanged on error.
    pub fn add_atom(&mut self, atom: Atom, min_separation: f64) -> Result<AtomId, GeometryError> {
        check_finite(&atom.position)?;
        self.check_clearance(&atom.position, None, min_separation)?;
        let id = self.atoms.insert(atom);
        self.order.push(id);
        Ok(id)
    }

    /// Removes an atom and returns it. Bonds referencing it disappear with it, since bonds
    /// are always derived from the atoms that remain.
    pub fn remove_atom(&mut self, id: AtomId) -> Result<Atom, GeometryError> {
        let atom = self.atoms.remove(id).ok_or(GeometryError::AtomNotFound(id))?;
        self.order.retain(|&other| other != id);
        Ok(atom)
    }

    pub fn set_position(
        &mut self,
        id: AtomId,
        position: Point3<f64>,
        min_separation: f64,
    ) -> Result<(), GeometryError> {
        if !self.atoms.contains_key(id) {
            return Err(GeometryError::AtomNotFound(id));
        }
        check_finite(&position)?;
        self.check_clearance(&position, Some(id), min_separation)?;
        if let Some(atom) = self.atoms.get_mut(id) {
            atom.position = position;
        }
        Ok(())
    }

    pub fn set_ionization(&mut self, id: AtomId, ionization: i32) -> Result<(), GeometryError> {
        let atom = self
            .atoms
            .get_mut(id)
            .ok_or(GeometryError::AtomNotFound(id))?;
        atom.set_ionization(ionization)?;
        Ok(())
    }

    /// Replaces every position at once, in insertion order. No separation check is made;
    /// callers that move atoms in bulk validate the proposal beforehand.
    pub fn set_positions(&mut self, positions: &[Point3<f64>]) -> Result<(), GeometryError> {
        if positions.len() != self.order.len() {
            return Err(GeometryError::PositionCountMismatch {
                expected: self.order.len(),
                found: positions.len(),
            });
        }
        for position in positions {
            check_finite(position)?;
        }
        for (id, position) in self.order.iter().zip(positions) {
            if let Some(atom) = self.atoms.get_mut(*id) {
                atom.position = *position;
            }
        }
        Ok(())
    }

    /// The closest pair of atoms and their distance, if there are at least two atoms.
    pub fn closest_pair(&self) -> Option<(AtomId, AtomId, f64)> {
        let atoms: Vec<_> = self.atoms_iter().collect();
        let mut best: Option<(AtomId, AtomId, f64)> = None;
        for (i, (id_a, a)) in atoms.iter().enumerate() {
            for (id_b, b) in &atoms[i + 1..] {
                let d = (a.position - b.position).norm();
                if best.is_none_or(|(_, _, current)| d < current) {
                    best = Some((*id_a, *id_b, d));
                }
            }
        }
        best
    }

    /// Checks that the whole geometry respects `min_separation`.
    pub fn check_separation(&self, min_separation: f64) -> Result<(), GeometryError> {
        match self.closest_pair() {
            Some((id, _, distance)) if distance < min_separation => Err(GeometryError::TooClose {
                existing: id,
                distance,
                min_separation,
            }),
            _ => Ok(()),
        }
    }

    /// Infers bonds from inter-atomic distances.
    ///
    /// Two atoms are bonded when their distance does not exceed the sum of their covalent
    /// radii multiplied by `tolerance`. Bonds come out in insertion order of their first atom.
    pub fn bonds(&self, tolerance: f64) -> Vec<Bond> {
        let atoms: Vec<_> = self.atoms_iter().collect();
        let mut bonds = Vec::new();
        for (i, (id_a, a)) in atoms.iter().enumerate() {
            let element_a = a.element();
            for (id_b, b) in &atoms[i + 1..] {
                let element_b = b.element();
                let length = (a.position - b.position).norm();
                let cutoff = (element_a.covalent_radius + element_b.covalent_radius) * tolerance;
                if length <= cutoff {
                    bonds.push(Bond::new(
                        *id_a,
                        *id_b,
                        length,
                        BondCharacter::between(element_a, element_b),
                    ));
                }
            }
        }
        bonds
    }

    /// Ids of atoms bonded to `id` under the given tolerance.
    pub fn neighbors(&self, id: AtomId, tolerance: f64) -> Vec<AtomId> {
        self.bonds(tolerance)
            .iter()
            .filter_map(|bond| bond.other(id))
            .collect()
    }

    fn check_clearance(
        &self,
        position: &Point3<f64>,
        skip: Option<AtomId>,
        min_separation: f64,
    ) -> Result<(), GeometryError> {
        for (id, atom) in self.atoms_iter() {
            if Some(id) == skip {
                continue;
            }
            let distance = (atom.position - position).norm();
            if distance < min_separation {
                return Err(GeometryError::TooClose {
                    existing: id,
                    distance,
                    min_separation,
                });
            }
        }
        Ok(())
    }
}

fn check_finite(position: &Point3<f64>) -> Result<(), GeometryError> {
    if position.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::NonFinitePosition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_SEP: f64 = 0.5;

    fn atom(z: u8, x: f64, y: f64, z_coord: f64) -> Atom {
        Atom::new(z, Point3::new(x, y, z_coord)).unwrap()
    }

    fn water() -> (Molecule, AtomId, AtomId, AtomId) {
        let mut mol = Molecule::new();
        let o = mol.add_atom(atom(8, 0.0, 0.0, 0.0), MIN_SEP).unwrap();
        let h1 = mol.add_atom(atom(1, 0.757, 0.586, 0.0), MIN_SEP).unwrap();
        let h2 = mol.add_atom(atom(1, -0.757, 0.586, 0.0), MIN_SEP).unwrap();
        (mol, o, h1, h2)
    }

    #[test]
    fn add_atom_preserves_insertion_order() {
        let (mol, o, h1, h2) = water();
        assert_eq!(mol.len(), 3);
        assert_eq!(mol.atom_ids(), &[o, h1, h2]);
        let symbols: Vec<_> = mol.atoms_iter().map(|(_, a)| a.element().symbol).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);
    }

    #[test]
    fn add_atom_at_half_min_separation_is_rejected_and_molecule_unchanged() {
        let (mut mol, o, _, _) = water();
        let before = mol.positions();
        let err = mol
            .add_atom(atom(6, 0.0, 0.0, 0.5 * MIN_SEP), MIN_SEP)
            .unwrap_err();
        match err {
            GeometryError::TooClose {
                existing, distance, ..
            } => {
                assert_eq!(existing, o);
                assert!((distance - 0.25).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mol.len(), 3);
        assert_eq!(mol.positions(), before);
    }

    #[test]
    fn add_atom_rejects_non_finite_position() {
        let mut mol = Molecule::new();
        let mut bad = atom(1, 0.0, 0.0, 0.0);
        bad.position.x = f64::NAN;
        assert_eq!(
            mol.add_atom(bad, MIN_SEP),
            Err(GeometryError::NonFinitePosition)
        );
        assert!(mol.is_empty());
    }

    #[test]
    fn remove_atom_drops_its_bonds() {
        let (mut mol, o, h1, h2) = water();
        assert_eq!(mol.bonds(DEFAULT_BOND_TOLERANCE).len(), 2);
        mol.remove_atom(o).unwrap();
        assert_eq!(mol.atom_ids(), &[h1, h2]);
        assert!(mol.bonds(DEFAULT_BOND_TOLERANCE).is_empty());
        assert_eq!(mol.remove_atom(o), Err(GeometryError::AtomNotFound(o)));
    }

    #[test]
    fn set_position_checks_clearance_against_other_atoms_only() {
        let (mut mol, o, h1, _) = water();
        mol.set_position(o, Point3::new(0.0, 0.1, 0.0), MIN_SEP)
            .unwrap();
        let err = mol
            .set_position(h1, Point3::new(0.1, 0.1, 0.0), MIN_SEP)
            .unwrap_err();
        assert!(matches!(err, GeometryError::TooClose { existing, .. } if existing == o));
        assert_eq!(mol.atom(h1).unwrap().position, Point3::new(0.757, 0.586, 0.0));
    }

    #[test]
    fn set_ionization_propagates_atom_errors() {
        let (mut mol, _, h1, _) = water();
        mol.set_ionization(h1, 1).unwrap();
        assert_eq!(mol.atom(h1).unwrap().electron_count(), 0);
        assert!(matches!(
            mol.set_ionization(h1, 2),
            Err(GeometryError::Atom(AtomError::InvalidIonization { .. }))
        ));
        assert_eq!(mol.atom(h1).unwrap().ionization(), 1);
    }

    #[test]
    fn bonds_are_inferred_with_character() {
        let (mol, o, h1, h2) = water();
        let bonds = mol.bonds(DEFAULT_BOND_TOLERANCE);
        assert_eq!(bonds.len(), 2);
        assert!(bonds.iter().all(|b| b.contains(o)));
        assert!(bonds.iter().all(|b| b.character == BondCharacter::PolarCovalent));
        let mut neighbors = mol.neighbors(o, DEFAULT_BOND_TOLERANCE);
        neighbors.sort();
        let mut expected = vec![h1, h2];
        expected.sort();
        assert_eq!(neighbors, expected);
    }

    #[test]
    fn set_positions_requires_matching_length() {
        let (mut mol, ..) = water();
        let err = mol.set_positions(&[Point3::origin()]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::PositionCountMismatch {
                expected: 3,
                found: 1
            }
        );
        let shifted: Vec<_> = mol
            .positions()
            .iter()
            .map(|p| p + Vector3::new(1.0, 0.0, 0.0))
            .collect();
        mol.set_positions(&shifted).unwrap();
        assert_eq!(mol.positions(), shifted);
    }

    #[test]
    fn closest_pair_and_centroid() {
        let (mol, ..) = water();
        let (_, _, d) = mol.closest_pair().unwrap();
        assert!((d - (0.757f64.powi(2) + 0.586f64.powi(2)).sqrt()).abs() < 1e-12);
        let c = mol.centroid().unwrap();
        assert!(c.x.abs() < 1e-12);
        assert!(mol.check_separation(MIN_SEP).is_ok());
        assert!(mol.check_separation(1.0).is_err());
        assert!(Molecule::new().centroid().is_none());
    }
}
