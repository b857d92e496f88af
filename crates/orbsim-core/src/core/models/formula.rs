use super::atom::Atom;
use super::element::Element;
use super::molecule::{GeometryError, Molecule};
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::iter::Peekable;
use std::str::FromStr;
use std::vec::IntoIter;
use thiserror::Error;

/// Largest number of atoms a formula may expand to.
pub const MAX_FORMULA_ATOMS: usize = 64;

/// Extra room on top of `min_separation` between neighbouring lattice sites.
const LATTICE_CLEARANCE: f64 = 1.1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Formula is empty")]
    Empty,
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Unknown element symbol '{0}'")]
    UnknownSymbol(String),
    #[error("Number '{0}' does not follow an element or a closing parenthesis")]
    UnexpectedNumber(String),
    #[error("Invalid count '{0}': counts must be positive integers")]
    InvalidCount(String),
    #[error("Unmatched opening parenthesis")]
    UnmatchedOpen,
    #[error("Unmatched closing parenthesis")]
    UnmatchedClose,
    #[error("Formula expands to {count} atoms, more than the limit of {max}")]
    TooManyAtoms { count: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Symbol(&'a str),
    Count(&'a str),
    Open,
    Close,
}

/// A parsed chemical formula such as `H2O` or `Mg(OH)2`.
///
/// Element counts are kept in order of first appearance, with parenthesized groups merged
/// into the enclosing level after multiplication.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    counts: Vec<(&'static Element, usize)>,
}

impl Formula {
    /// Parses `formula`. Whitespace is ignored; anything other than element symbols,
    /// counts and parentheses is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`FormulaError`] naming the first problem found.
    pub fn parse(formula: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(formula)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut stack: Vec<Vec<(&'static Element, usize)>> = vec![Vec::new()];
        let mut tokens = tokens.into_iter().peekable();
        while let Some(token) = tokens.next() {
            match token {
                Token::Open => stack.push(Vec::new()),
                Token::Close => {
                    if stack.len() == 1 {
                        return Err(FormulaError::UnmatchedClose);
                    }
                    let group = stack.pop().unwrap_or_default();
                    let multiplier = take_count(&mut tokens)?;
                    if let Some(level) = stack.last_mut() {
                        for (element, count) in group {
                            accumulate(level, element, count.saturating_mul(multiplier));
                        }
                    }
                }
                Token::Count(digits) => {
                    return Err(FormulaError::UnexpectedNumber(digits.to_string()));
                }
                Token::Symbol(symbol) => {
                    let element = Element::from_symbol(symbol)
                        .ok_or_else(|| FormulaError::UnknownSymbol(symbol.to_string()))?;
                    let count = take_count(&mut tokens)?;
                    if let Some(level) = stack.last_mut() {
                        accumulate(level, element, count);
                    }
                }
            }
        }

        if stack.len() != 1 {
            return Err(FormulaError::UnmatchedOpen);
        }
        let formula = Self {
            counts: stack.pop().unwrap_or_default(),
        };
        let count = formula.atom_count();
        if count > MAX_FORMULA_ATOMS {
            return Err(FormulaError::TooManyAtoms {
                count,
                max: MAX_FORMULA_ATOMS,
            });
        }
        Ok(formula)
    }

    pub fn counts(&self) -> &[(&'static Element, usize)] {
        &self.counts
    }

    pub fn count_of(&self, symbol: &str) -> usize {
        self.counts
            .iter()
            .find(|(element, _)| element.symbol.eq_ignore_ascii_case(symbol))
            .map_or(0, |&(_, count)| count)
    }

    pub fn atom_count(&self) -> usize {
        self.counts
            .iter()
            .fold(0usize, |total, &(_, count)| total.saturating_add(count))
    }

    /// One atomic number per atom, grouped by element in order of first appearance.
    pub fn atomic_numbers(&self) -> Vec<u8> {
        self.counts
            .iter()
            .flat_map(|&(element, count)| std::iter::repeat_n(element.atomic_number, count))
            .collect()
    }

    /// Places the neutral atoms on a cubic lattice centered at the origin. Sites are spaced
    /// by the largest covalent diameter, and never closer than `min_separation`, so the
    /// result is a valid starting point for minimization rather than a chemical geometry.
    pub fn to_molecule(&self, min_separation: f64) -> Result<Molecule, GeometryError> {
        let atomic_numbers = self.atomic_numbers();
        let diameter = self
            .counts
            .iter()
            .map(|(element, _)| 2.0 * element.covalent_radius)
            .fold(0.0, f64::max);
        let spacing = diameter.max(min_separation * LATTICE_CLEARANCE);

        let mut side = 1;
        while side * side * side < atomic_numbers.len() {
            side += 1;
        }
        let offset = Vector3::repeat((side - 1) as f64 * spacing / 2.0);

        let mut molecule = Molecule::new();
        for (index, &atomic_number) in atomic_numbers.iter().enumerate() {
            let site = Vector3::new(
                (index % side) as f64,
                ((index / side) % side) as f64,
                (index / (side * side)) as f64,
            );
            let position = Point3::from(site * spacing - offset);
            molecule.add_atom(Atom::new(atomic_number, position)?, min_separation)?;
        }
        Ok(molecule)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(element, count) in &self.counts {
            write!(f, "{}", element.symbol)?;
            if count > 1 {
                write!(f, "{}", count)?;
            }
        }
        Ok(())
    }
}

fn tokenize(formula: &str) -> Result<Vec<Token<'_>>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = formula.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_whitespace() => {}
            c if c.is_ascii_uppercase() => {
                let end = match chars.next_if(|&(_, next)| next.is_ascii_lowercase()) {
                    Some((i, _)) => i + 1,
                    None => start + 1,
                };
                tokens.push(Token::Symbol(&formula[start..end]));
            }
            c if c.is_ascii_digit() => {
                let mut end = start + 1;
                while let Some((i, _)) = chars.next_if(|&(_, next)| next.is_ascii_digit()) {
                    end = i + 1;
                }
                tokens.push(Token::Count(&formula[start..end]));
            }
            character => {
                return Err(FormulaError::UnexpectedCharacter {
                    character,
                    position: start,
                });
            }
        }
    }
    Ok(tokens)
}

/// Consumes an optional count following a symbol or group. A missing count means one.
fn take_count(tokens: &mut Peekable<IntoIter<Token<'_>>>) -> Result<usize, FormulaError> {
    match tokens.next_if(|token| matches!(token, Token::Count(_))) {
        Some(Token::Count(digits)) => match digits.parse::<usize>() {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(FormulaError::InvalidCount(digits.to_string())),
        },
        _ => Ok(1),
    }
}

fn accumulate(level: &mut Vec<(&'static Element, usize)>, element: &'static Element, count: usize) {
    match level
        .iter_mut()
        .find(|(existing, _)| existing.atomic_number == element.atomic_number)
    {
        Some((_, total)) => *total = total.saturating_add(count),
        None => level.push((element, count)),
    }
}
