use super::element::{Element, ElementCategory};
use super::ids::AtomId;
use std::fmt;

const POLAR_THRESHOLD: f64 = 0.4;
const IONIC_THRESHOLD: f64 = 1.7;

/// Qualitative character of a bond, derived from the electronegativity difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondCharacter {
    Covalent,
    PolarCovalent,
    Ionic,
}

impl BondCharacter {
    /// Classifies a bond between two elements.
    ///
    /// A metal paired with a nonmetal is always ionic; otherwise the Pauling
    /// electronegativity difference decides. Pairs involving an element without an
    /// electronegativity value are treated as covalent.
    pub fn between(a: &Element, b: &Element) -> Self {
        let metal_nonmetal = matches!(
            (a.category, b.category),
            (ElementCategory::Metal, ElementCategory::Nonmetal)
                | (ElementCategory::Nonmetal, ElementCategory::Metal)
        );
        if metal_nonmetal {
            return BondCharacter::Ionic;
        }
        match (a.electronegativity, b.electronegativity) {
            (Some(en_a), Some(en_b)) => {
                let delta = (en_a - en_b).abs();
                if delta >= IONIC_THRESHOLD {
                    BondCharacter::Ionic
                } else if delta >= POLAR_THRESHOLD {
                    BondCharacter::PolarCovalent
                } else {
                    BondCharacter::Covalent
                }
            }
            _ => BondCharacter::Covalent,
        }
    }
}

impl fmt::Display for BondCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Covalent => "covalent",
                Self::PolarCovalent => "polar covalent",
                Self::Ionic => "ionic",
            }
        )
    }
}

/// A bond inferred from the current geometry. Bonds are never stored; they are recomputed
/// from inter-atomic distances whenever requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    /// Inter-atomic distance in Ångström at the time of inference.
    pub length: f64,
    pub character: BondCharacter,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, length: f64, character: BondCharacter) -> Self {
        Self {
            atom1_id,
            atom2_id,
            length,
            character,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// Returns the partner of `atom_id` in this bond, if `atom_id` participates at all.
    pub fn other(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn el(symbol: &str) -> &'static Element {
        Element::from_symbol(symbol).unwrap()
    }

    #[test]
    fn identical_elements_bond_covalently() {
        assert_eq!(BondCharacter::between(el("H"), el("H")), BondCharacter::Covalent);
        assert_eq!(BondCharacter::between(el("C"), el("C")), BondCharacter::Covalent);
    }

    #[test]
    fn electronegativity_difference_sets_polarity() {
        assert_eq!(
            BondCharacter::between(el("H"), el("F")),
            BondCharacter::Ionic
        );
        assert_eq!(
            BondCharacter::between(el("H"), el("O")),
            BondCharacter::PolarCovalent
        );
    }

    #[test]
    fn metal_nonmetal_pair_is_ionic() {
        assert_eq!(BondCharacter::between(el("Na"), el("Cl")), BondCharacter::Ionic);
        assert_eq!(BondCharacter::between(el("Cl"), el("Na")), BondCharacter::Ionic);
    }

    #[test]
    fn missing_electronegativity_falls_back_to_covalent() {
        assert_eq!(BondCharacter::between(el("He"), el("H")), BondCharacter::Covalent);
    }

    #[test]
    fn bond_contains_and_other_work() {
        let a = dummy_atom_id(1);
        let b = dummy_atom_id(2);
        let c = dummy_atom_id(3);
        let bond = Bond::new(a, b, 1.0, BondCharacter::Covalent);
        assert!(bond.contains(a));
        assert!(bond.contains(b));
        assert!(!bond.contains(c));
        assert_eq!(bond.other(a), Some(b));
        assert_eq!(bond.other(b), Some(a));
        assert_eq!(bond.other(c), None);
    }

    #[test]
    fn bond_character_display_outputs_expected_strings() {
        assert_eq!(BondCharacter::Covalent.to_string(), "covalent");
        assert_eq!(BondCharacter::PolarCovalent.to_string(), "polar covalent");
        assert_eq!(BondCharacter::Ionic.to_string(), "ionic");
    }
}
