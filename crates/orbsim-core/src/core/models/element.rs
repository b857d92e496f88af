use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Broad chemical family of an element, used for display grouping and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    Metal,
    Metalloid,
    Nonmetal,
    NobleGas,
}

/// Static per-element reference data.
///
/// Covalent radii follow the single-bond values of Cordero et al. (2008) in Ångström and are
/// used both for bond inference and as the equilibrium length of the simplified pair
/// potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    /// The element symbol, e.g. `"Na"`.
    pub symbol: &'static str,
    /// The English element name.
    pub name: &'static str,
    /// Number of protons in the nucleus.
    pub atomic_number: u8,
    /// Pauling electronegativity, absent for most noble gases.
    pub electronegativity: Option<f64>,
    /// Chemical family.
    pub category: ElementCategory,
    /// Single-bond covalent radius in Ångström.
    pub covalent_radius: f64,
}

const fn element(
    symbol: &'static str,
    name: &'static str,
    atomic_number: u8,
    electronegativity: Option<f64>,
    category: ElementCategory,
    covalent_radius: f64,
) -> Element {
    Element {
        symbol,
        name,
        atomic_number,
        electronegativity,
        category,
        covalent_radius,
    }
}

use ElementCategory::{Metal, Metalloid, NobleGas, Nonmetal};

static ELEMENTS: [Element; 36] = [
    element("H", "Hydrogen", 1, Some(2.20), Nonmetal, 0.31),
    element("He", "Helium", 2, None, NobleGas, 0.28),
    element("Li", "Lithium", 3, Some(0.98), Metal, 1.28),
    element("Be", "Beryllium", 4, Some(1.57), Metal, 0.96),
    element("B", "Boron", 5, Some(2.04), Metalloid, 0.84),
    element("C", "Carbon", 6, Some(2.55), Nonmetal, 0.76),
    element("N", "Nitrogen", 7, Some(3.04), Nonmetal, 0.71),
    element("O", "Oxygen", 8, Some(3.44), Nonmetal, 0.66),
    element("F", "Fluorine", 9, Some(3.98), Nonmetal, 0.57),
    element("Ne", "Neon", 10, None, NobleGas, 0.58),
    element("Na", "Sodium", 11, Some(0.93), Metal, 1.66),
    element("Mg", "Magnesium", 12, Some(1.31), Metal, 1.41),
    element("Al", "Aluminum", 13, Some(1.61), Metal, 1.21),
    element("Si", "Silicon", 14, Some(1.90), Metalloid, 1.11),
    element("P", "Phosphorus", 15, Some(2.19), Nonmetal, 1.07),
    element("S", "Sulfur", 16, Some(2.58), Nonmetal, 1.05),
    element("Cl", "Chlorine", 17, Some(3.16), Nonmetal, 1.02),
    element("Ar", "Argon", 18, None, NobleGas, 1.06),
    element("K", "Potassium", 19, Some(0.82), Metal, 2.03),
    element("Ca", "Calcium", 20, Some(1.00), Metal, 1.76),
    element("Sc", "Scandium", 21, Some(1.36), Metal, 1.70),
    element("Ti", "Titanium", 22, Some(1.54), Metal, 1.60),
    element("V", "Vanadium", 23, Some(1.63), Metal, 1.53),
    element("Cr", "Chromium", 24, Some(1.66), Metal, 1.39),
    element("Mn", "Manganese", 25, Some(1.55), Metal, 1.39),
    element("Fe", "Iron", 26, Some(1.83), Metal, 1.32),
    element("Co", "Cobalt", 27, Some(1.88), Metal, 1.26),
    element("Ni", "Nickel", 28, Some(1.91), Metal, 1.24),
    element("Cu", "Copper", 29, Some(1.90), Metal, 1.32),
    element("Zn", "Zinc", 30, Some(1.65), Metal, 1.22),
    element("Ga", "Gallium", 31, Some(1.81), Metal, 1.22),
    element("Ge", "Germanium", 32, Some(2.01), Metalloid, 1.20),
    element("As", "Arsenic", 33, Some(2.18), Metalloid, 1.19),
    element("Se", "Selenium", 34, Some(2.55), Nonmetal, 1.20),
    element("Br", "Bromine", 35, Some(2.96), Nonmetal, 1.20),
    element("Kr", "Krypton", 36, Some(3.00), NobleGas, 1.16),
];

static SYMBOL_TO_ATOMIC_NUMBER: Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15,
    "S" => 16, "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22,
    "V" => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29,
    "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
};

/// Largest atomic number present in the element table.
pub const MAX_ATOMIC_NUMBER: u8 = 36;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("Unknown element symbol '{0}'")]
    UnknownSymbol(String),
    #[error("No element data for atomic number {0}")]
    UnknownAtomicNumber(u8),
}

impl Element {
    /// Looks up an element by atomic number.
    pub fn from_atomic_number(atomic_number: u8) -> Option<&'static Element> {
        if atomic_number == 0 {
            return None;
        }
        ELEMENTS.get(atomic_number as usize - 1)
    }

    /// Looks up an element by symbol, accepting any letter case (`"na"`, `"NA"`, `"Na"`).
    pub fn from_symbol(symbol: &str) -> Option<&'static Element> {
        let normalized = normalize_symbol(symbol);
        SYMBOL_TO_ATOMIC_NUMBER
            .get(normalized.as_str())
            .and_then(|&z| Self::from_atomic_number(z))
    }

    /// Returns every element in atomic-number order.
    pub fn all() -> &'static [Element] {
        &ELEMENTS
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl FromStr for &'static Element {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::from_symbol(s).ok_or_else(|| ElementError::UnknownSymbol(s.trim().to_string()))
    }
}

/// Resolves an atomic number into its element entry, reporting unknown numbers as errors.
pub fn element_for(atomic_number: u8) -> Result<&'static Element, ElementError> {
    Element::from_atomic_number(atomic_number)
        .ok_or(ElementError::UnknownAtomicNumber(atomic_number))
}

fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_atomic_number() {
        for (idx, element) in Element::all().iter().enumerate() {
            assert_eq!(element.atomic_number as usize, idx + 1);
        }
        assert_eq!(Element::all().len(), MAX_ATOMIC_NUMBER as usize);
    }

    #[test]
    fn symbol_map_agrees_with_table() {
        for element in Element::all() {
            let found = Element::from_symbol(element.symbol).unwrap();
            assert_eq!(found.atomic_number, element.atomic_number);
        }
    }

    #[test]
    fn from_symbol_is_case_insensitive() {
        assert_eq!(Element::from_symbol("na").unwrap().atomic_number, 11);
        assert_eq!(Element::from_symbol("CL").unwrap().atomic_number, 17);
        assert_eq!(Element::from_symbol(" fe ").unwrap().atomic_number, 26);
    }

    #[test]
    fn unknown_lookups_return_none() {
        assert!(Element::from_symbol("Xx").is_none());
        assert!(Element::from_symbol("").is_none());
        assert!(Element::from_atomic_number(0).is_none());
        assert!(Element::from_atomic_number(37).is_none());
    }

    #[test]
    fn from_str_reports_unknown_symbol() {
        let parsed: Result<&'static Element, _> = "Qq".parse();
        assert_eq!(parsed, Err(ElementError::UnknownSymbol("Qq".to_string())));
        let parsed: &'static Element = "o".parse().unwrap();
        assert_eq!(parsed.name, "Oxygen");
    }

    #[test]
    fn element_for_reports_unknown_atomic_number() {
        assert_eq!(element_for(99), Err(ElementError::UnknownAtomicNumber(99)));
        assert_eq!(element_for(1).unwrap().symbol, "H");
    }

    #[test]
    fn noble_gases_have_no_electronegativity_except_krypton() {
        assert!(Element::from_symbol("He").unwrap().electronegativity.is_none());
        assert!(Element::from_symbol("Kr").unwrap().electronegativity.is_some());
    }
}
