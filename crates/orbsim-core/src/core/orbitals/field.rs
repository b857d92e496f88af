use super::angular::{AngularBasis, spherical_harmonic};
use super::aufbau::{ElectronConfiguration, effective_nuclear_charge};
use super::grid::Grid;
use super::quantum::OrbitalSpec;
use super::radial::radial_wavefunction;
use nalgebra::Point3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Largest amplitude kept in a sample; larger values are scaled down with their phase intact.
pub const MAX_AMPLITUDE: f64 = 1e100;

/// Padding added around an orbital's nominal reach when no extent is requested.
pub const EXTENT_PADDING: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldMode {
    /// Complex amplitude ψ.
    #[default]
    Wavefunction,
    /// Probability density |ψ|².
    Density,
}

/// Sample values, complex for wavefunctions and non-negative reals for densities.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    Wavefunction(Vec<Complex64>),
    Density(Vec<f64>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Wavefunction(v) => v.len(),
            FieldValues::Density(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> FieldMode {
        match self {
            FieldValues::Wavefunction(_) => FieldMode::Wavefunction,
            FieldValues::Density(_) => FieldMode::Density,
        }
    }
}

/// A field sampled over a [`Grid`]. Samples are laid out with [`Grid::index`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSample {
    grid: Grid,
    values: FieldValues,
}

impl FieldSample {
    /// Pairs a grid with its values. Returns `None` when the value count does not match the
    /// grid.
    pub fn new(grid: Grid, values: FieldValues) -> Option<Self> {
        (grid.len() == values.len()).then_some(Self { grid, values })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn mode(&self) -> FieldMode {
        self.values.mode()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.grid.resolution()
    }

    /// Probability density at every sample.
    pub fn density(&self) -> Vec<f64> {
        match &self.values {
            FieldValues::Wavefunction(v) => v.iter().map(|c| c.norm_sqr()).collect(),
            FieldValues::Density(v) => v.clone(),
        }
    }

    /// Magnitude (|ψ| or the density value) and phase (0 for densities) of one sample.
    pub fn magnitude_phase(&self, index: usize) -> Option<(f64, f64)> {
        match &self.values {
            FieldValues::Wavefunction(v) => v.get(index).map(|c| (c.norm(), c.arg())),
            FieldValues::Density(v) => v.get(index).map(|&d| (d, 0.0)),
        }
    }

    pub fn max_magnitude(&self) -> f64 {
        (0..self.len())
            .filter_map(|i| self.magnitude_phase(i))
            .map(|(magnitude, _)| magnitude)
            .fold(0.0, f64::max)
    }

    /// Converts a wavefunction sample into its density; densities pass through.
    pub fn into_density(self) -> Self {
        match self.values {
            FieldValues::Density(_) => self,
            FieldValues::Wavefunction(v) => Self {
                grid: self.grid,
                values: FieldValues::Density(v.iter().map(|c| c.norm_sqr()).collect()),
            },
        }
    }
}

/// Replaces non-finite values by zero and caps the amplitude at [`MAX_AMPLITUDE`].
pub fn sanitize(value: Complex64) -> Complex64 {
    if !value.re.is_finite() || !value.im.is_finite() {
        return Complex64::new(0.0, 0.0);
    }
    let norm = value.norm();
    if norm > MAX_AMPLITUDE {
        value * (MAX_AMPLITUDE / norm)
    } else {
        value
    }
}

/// An orbital placed in space, ready to be evaluated point by point.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbital {
    spec: OrbitalSpec,
    center: Point3<f64>,
    z_eff: f64,
    basis: AngularBasis,
}

impl Orbital {
    /// Places `spec` at `center` for an atom carrying `electron_count` electrons. The effective
    /// nuclear charge follows from the ground-state configuration of that atom or ion.
    pub fn new(
        spec: OrbitalSpec,
        center: Point3<f64>,
        electron_count: u32,
        basis: AngularBasis,
    ) -> Self {
        let configuration = ElectronConfiguration::ground_state(electron_count);
        let z_eff =
            effective_nuclear_charge(spec.atomic_number(), &configuration, spec.n(), spec.l());
        Self {
            spec,
            center,
            z_eff,
            basis,
        }
    }

    /// A neutral atom's orbital.
    pub fn neutral(spec: OrbitalSpec, center: Point3<f64>, basis: AngularBasis) -> Self {
        Self::new(spec, center, spec.atomic_number() as u32, basis)
    }

    pub fn spec(&self) -> &OrbitalSpec {
        &self.spec
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    pub fn effective_charge(&self) -> f64 {
        self.z_eff
    }

    /// Nominal reach of the orbital in Ångström: `3·n`.
    pub fn reach(&self) -> f64 {
        3.0 * self.spec.n() as f64
    }

    /// Default grid half-width when the caller does not choose one.
    pub fn default_extent(&self) -> f64 {
        self.reach() + EXTENT_PADDING
    }

    /// ψ at `point`.
    pub fn amplitude(&self, point: &Point3<f64>) -> Complex64 {
        let d = point - self.center;
        let r = d.norm();
        let theta = (d.z / (r + 1e-6)).clamp(-1.0, 1.0).acos();
        let phi = d.y.atan2(d.x);
        let radial = radial_wavefunction(self.spec.n(), self.spec.l(), self.z_eff, r);
        let angular = spherical_harmonic(self.spec.l(), self.spec.m(), theta, phi, self.basis);
        sanitize(angular * radial)
    }
}
