use super::element::{Element, ElementError, element_for};
use nalgebra::Point3;
use thiserror::Error;

/// The largest number of extra electrons an anion may carry (e.g. C⁴⁻).
pub const MAX_ANION_CHARGE: i32 = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AtomError {
    #[error(transparent)]
    Element(#[from] ElementError),
    #[error(
        "Ionization {ionization} is invalid for {symbol}: it would leave {electrons} electrons (allowed 0..={max})"
    )]
    InvalidIonization {
        symbol: &'static str,
        ionization: i32,
        electrons: i32,
        max: i32,
    },
}

/// An atom placed in the molecule builder.
///
/// The ionization is a charge offset: `+1` removes one electron, `-1` adds one. The
/// electron count implied by it is always kept within `0..=Z + MAX_ANION_CHARGE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    element: &'static Element,
    /// The 3D coordinates of the atom in Ångström.
    pub position: Point3<f64>,
    ionization: i32,
}

impl Atom {
    /// Creates a neutral atom of the given species.
    ///
    /// # Errors
    ///
    /// Returns [`AtomError::Element`] if the atomic number is not in the element table.
    pub fn new(atomic_number: u8, position: Point3<f64>) -> Result<Self, AtomError> {
        let element = element_for(atomic_number)?;
        Ok(Self {
            element,
            position,
            ionization: 0,
        })
    }

    /// Creates an atom with an explicit ionization.
    pub fn with_ionization(
        atomic_number: u8,
        position: Point3<f64>,
        ionization: i32,
    ) -> Result<Self, AtomError> {
        let mut atom = Self::new(atomic_number, position)?;
        atom.set_ionization(ionization)?;
        Ok(atom)
    }

    pub fn element(&self) -> &'static Element {
        self.element
    }

    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number
    }

    pub fn ionization(&self) -> i32 {
        self.ionization
    }

    /// Number of electrons carried by this atom after ionization.
    pub fn electron_count(&self) -> u32 {
        (self.atomic_number() as i32 - self.ionization).max(0) as u32
    }

    /// Sets the ionization, leaving the atom unchanged if it would be invalid.
    pub fn set_ionization(&mut self, ionization: i32) -> Result<(), AtomError> {
        validate_ionization(self.atomic_number(), ionization)?;
        self.ionization = ionization;
        Ok(())
    }
}

/// Checks that `ionization` leaves a physically meaningful electron count for the species.
pub fn validate_ionization(atomic_number: u8, ionization: i32) -> Result<(), AtomError> {
    let element = element_for(atomic_number)?;
    let z = atomic_number as i32;
    let max = z + MAX_ANION_CHARGE;
    match z.checked_sub(ionization) {
        Some(electrons) if (0..=max).contains(&electrons) => Ok(()),
        electrons => Err(AtomError::InvalidIonization {
            symbol: element.symbol,
            ionization,
            electrons: electrons.unwrap_or(i32::MAX),
            max,
        }),
    }
}
