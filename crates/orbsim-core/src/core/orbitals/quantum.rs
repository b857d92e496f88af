use crate::core::models::element::{Element, element_for};
use std::fmt;
use thiserror::Error;

/// Largest principal quantum number supported by the evaluator.
pub const MAX_PRINCIPAL: u8 = 7;

const SUBSHELL_LETTERS: [char; 7] = ['s', 'p', 'd', 'f', 'g', 'h', 'i'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantumNumberError {
    #[error("No element data for atomic number {0}")]
    UnknownElement(u8),
    #[error("Principal quantum number n={n} is outside 1..={MAX_PRINCIPAL}")]
    PrincipalOutOfRange { n: u8 },
    #[error("Angular quantum number l={l} must be smaller than n={n}")]
    AngularOutOfRange { n: u8, l: u8 },
    #[error("Magnetic quantum number m={m} must satisfy |m| <= l={l}")]
    MagneticOutOfRange { l: u8, m: i8 },
}

/// Static lookup of the valid orbital quantum-number combinations.
///
/// Every element in the element table admits the same hydrogen-like combinations, so the
/// table is keyed by the principal quantum number alone once the element is known.
pub struct QuantumNumberTable;

impl QuantumNumberTable {
    /// Returns whether `(n, l, m)` names a valid orbital for the element.
    pub fn validate(atomic_number: u8, n: u8, l: u8, m: i8) -> bool {
        Self::check(atomic_number, n, l, m).is_ok()
    }

    /// Same as [`validate`](Self::validate), reporting which rule failed.
    pub fn check(atomic_number: u8, n: u8, l: u8, m: i8) -> Result<(), QuantumNumberError> {
        if element_for(atomic_number).is_err() {
            return Err(QuantumNumberError::UnknownElement(atomic_number));
        }
        if n == 0 || n > MAX_PRINCIPAL {
            return Err(QuantumNumberError::PrincipalOutOfRange { n });
        }
        if l >= n {
            return Err(QuantumNumberError::AngularOutOfRange { n, l });
        }
        if m.unsigned_abs() > l {
            return Err(QuantumNumberError::MagneticOutOfRange { l, m });
        }
        Ok(())
    }

    /// Lists every valid `(l, m)` for shell `n`, ordered by `l` then `m`.
    ///
    /// An unknown element or an out-of-range `n` yields an empty list.
    pub fn enumerate_valid(atomic_number: u8, n: u8) -> Vec<(u8, i8)> {
        if element_for(atomic_number).is_err() || n == 0 || n > MAX_PRINCIPAL {
            return Vec::new();
        }
        (0..n)
            .flat_map(|l| {
                let li = l as i8;
                (-li..=li).map(move |m| (l, m))
            })
            .collect()
    }

    /// Clamps arbitrary integers into the nearest valid combination.
    pub fn normalize(n: i32, l: i32, m: i32) -> (u8, u8, i8) {
        let n = n.clamp(1, MAX_PRINCIPAL as i32);
        let l = l.clamp(0, n - 1);
        let m = m.clamp(-l, l);
        (n as u8, l as u8, m as i8)
    }
}

/// A validated orbital selection: element plus `(n, l, m)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalSpec {
    element: &'static Element,
    n: u8,
    l: u8,
    m: i8,
}

impl OrbitalSpec {
    pub fn new(atomic_number: u8, n: u8, l: u8, m: i8) -> Result<Self, QuantumNumberError> {
        QuantumNumberTable::check(atomic_number, n, l, m)?;
        let element = element_for(atomic_number)
            .map_err(|_| QuantumNumberError::UnknownElement(atomic_number))?;
        Ok(Self { element, n, l, m })
    }

    pub fn element(&self) -> &'static Element {
        self.element
    }

    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number
    }

    pub fn n(&self) -> u8 {
        self.n
    }

    pub fn l(&self) -> u8 {
        self.l
    }

    pub fn m(&self) -> i8 {
        self.m
    }

    /// Subshell label such as `"2p"`.
    pub fn subshell_label(&self) -> String {
        format!("{}{}", self.n, subshell_letter(self.l))
    }
}

impl fmt::Display for OrbitalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (m={})", self.element.symbol, self.subshell_label(), self.m)
    }
}

pub fn subshell_letter(l: u8) -> char {
    SUBSHELL_LETTERS.get(l as usize).copied().unwrap_or('?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_hydrogen_ground_state() {
        assert!(QuantumNumberTable::validate(1, 1, 0, 0));
        assert!(QuantumNumberTable::validate(36, 7, 6, -6));
    }

    #[test]
    fn check_reports_each_rule() {
        assert_eq!(
            QuantumNumberTable::check(1, 0, 0, 0),
            Err(QuantumNumberError::PrincipalOutOfRange { n: 0 })
        );
        assert_eq!(
            QuantumNumberTable::check(1, 8, 0, 0),
            Err(QuantumNumberError::PrincipalOutOfRange { n: 8 })
        );
        assert_eq!(
            QuantumNumberTable::check(1, 2, 2, 0),
            Err(QuantumNumberError::AngularOutOfRange { n: 2, l: 2 })
        );
        assert_eq!(
            QuantumNumberTable::check(1, 3, 1, -2),
            Err(QuantumNumberError::MagneticOutOfRange { l: 1, m: -2 })
        );
        assert_eq!(
            QuantumNumberTable::check(99, 1, 0, 0),
            Err(QuantumNumberError::UnknownElement(99))
        );
    }

    #[test]
    fn enumerate_valid_lists_n_squared_orbitals() {
        for n in 1..=MAX_PRINCIPAL {
            let combos = QuantumNumberTable::enumerate_valid(6, n);
            assert_eq!(combos.len(), (n as usize).pow(2));
            for (l, m) in combos {
                assert!(QuantumNumberTable::validate(6, n, l, m));
            }
        }
        assert_eq!(
            QuantumNumberTable::enumerate_valid(1, 2),
            vec![(0, 0), (1, -1), (1, 0), (1, 1)]
        );
    }

    #[test]
    fn enumerate_valid_is_empty_for_invalid_input() {
        assert!(QuantumNumberTable::enumerate_valid(1, 0).is_empty());
        assert!(QuantumNumberTable::enumerate_valid(1, 8).is_empty());
        assert!(QuantumNumberTable::enumerate_valid(0, 1).is_empty());
    }

    #[test]
    fn normalize_clamps_into_valid_range() {
        assert_eq!(QuantumNumberTable::normalize(0, 5, 5), (1, 0, 0));
        assert_eq!(QuantumNumberTable::normalize(9, 9, -9), (7, 6, -6));
        assert_eq!(QuantumNumberTable::normalize(3, 1, -4), (3, 1, -1));
        let (n, l, m) = QuantumNumberTable::normalize(2, 1, 0);
        assert!(QuantumNumberTable::validate(1, n, l, m));
    }

    #[test]
    fn orbital_spec_formats_label() {
        let spec = OrbitalSpec::new(8, 2, 1, -1).unwrap();
        assert_eq!(spec.subshell_label(), "2p");
        assert_eq!(spec.to_string(), "O 2p (m=-1)");
        assert!(OrbitalSpec::new(8, 2, 2, 0).is_err());
    }
}
