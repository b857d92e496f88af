use super::field::{EXTENT_PADDING, Orbital};
use nalgebra::{Point3, Vector3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Half-width of the sampling box around the origin when a scene holds no orbitals.
const EMPTY_SCENE_SPAN: f64 = 4.0;

/// How the orbitals of a scene are combined into one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Combination {
    /// Root-sum-square of the individual amplitudes; phase information is dropped.
    #[default]
    Atomic,
    /// In-phase sum of every orbital.
    Bonding,
    /// Sum with alternating signs in scene order.
    Antibonding,
}

/// Several positioned orbitals composed into a single molecular field.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    orbitals: Vec<Orbital>,
    combination: Combination,
    hybrid_mix: f64,
}

impl Scene {
    /// `hybrid_mix` blends from the atomic field (0) to the chosen combination (1) and is
    /// clamped into that range.
    pub fn new(orbitals: Vec<Orbital>, combination: Combination, hybrid_mix: f64) -> Self {
        let hybrid_mix = if hybrid_mix.is_finite() {
            hybrid_mix.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            orbitals,
            combination,
            hybrid_mix,
        }
    }

    pub fn orbitals(&self) -> &[Orbital] {
        &self.orbitals
    }

    pub fn combination(&self) -> Combination {
        self.combination
    }

    pub fn hybrid_mix(&self) -> f64 {
        self.hybrid_mix
    }

    /// Combined amplitude at `point`.
    pub fn amplitude(&self, point: &Point3<f64>) -> Complex64 {
        let mut sum_sq = 0.0;
        let mut bonding = Complex64::new(0.0, 0.0);
        let mut antibonding = Complex64::new(0.0, 0.0);
        for (i, orbital) in self.orbitals.iter().enumerate() {
            let psi = orbital.amplitude(point);
            sum_sq += psi.norm_sqr();
            bonding += psi;
            if i % 2 == 0 {
                antibonding += psi;
            } else {
                antibonding -= psi;
            }
        }
        let atomic = Complex64::new(sum_sq.sqrt(), 0.0);
        let hybrid = match self.combination {
            Combination::Atomic => return atomic,
            Combination::Bonding => bonding,
            Combination::Antibonding => antibonding,
        };
        atomic * (1.0 - self.hybrid_mix) + hybrid * self.hybrid_mix
    }

    /// Axis-aligned box covering every orbital's reach plus padding.
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.orbitals.is_empty() {
            let span = Vector3::repeat(EMPTY_SCENE_SPAN);
            return (Point3::from(-span), Point3::from(span));
        }
        let mut min = Vector3::repeat(f64::INFINITY);
        let mut max = Vector3::repeat(f64::NEG_INFINITY);
        for orbital in &self.orbitals {
            let reach = Vector3::repeat(orbital.reach());
            let c = orbital.center().coords;
            min = min.inf(&(c - reach));
            max = max.sup(&(c + reach));
        }
        let pad = Vector3::repeat(EXTENT_PADDING);
        (Point3::from(min - pad), Point3::from(max + pad))
    }
}
