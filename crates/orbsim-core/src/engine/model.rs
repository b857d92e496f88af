use super::cache::{FieldCache, FieldKey, FieldTarget};
use super::cancel::CancellationToken;
use super::config::{FieldConfig, GeometryConstraints, MinimizationConfig};
use super::error::EngineError;
use super::evaluator::OrbitalFieldEvaluator;
use super::minimizer::{EnergyMinimizer, MinimizationReport};
use super::progress::ProgressReporter;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::{GeometryError, Molecule};
use crate::core::models::presets::Preset;
use crate::core::models::topology::Bond;
use crate::core::orbitals::angular::AngularBasis;
use crate::core::orbitals::aufbau::ElectronConfiguration;
use crate::core::orbitals::field::{FieldSample, Orbital};
use crate::core::orbitals::quantum::OrbitalSpec;
use crate::core::orbitals::scene::{Combination, Scene};
use nalgebra::Point3;
use slotmap::SecondaryMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A copy of the model taken for work that runs outside the model's borrow.
///
/// The token is cancelled as soon as the model changes, and [`MoleculeModel::commit_geometry`]
/// rejects results whose revision no longer matches.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    pub molecule: Molecule,
    pub revision: u64,
    pub cancel: CancellationToken,
}

/// The editable molecule behind an interactive session.
///
/// Every successful edit bumps the revision, clears the field cache and cancels work started
/// from an earlier snapshot. Failed edits leave the model untouched.
#[derive(Debug)]
pub struct MoleculeModel {
    molecule: Molecule,
    constraints: GeometryConstraints,
    orbitals: SecondaryMap<AtomId, (u8, u8, i8)>,
    revision: u64,
    cache: FieldCache,
    in_flight: CancellationToken,
}

impl Default for MoleculeModel {
    fn default() -> Self {
        Self::new(GeometryConstraints::default())
    }
}

impl MoleculeModel {
    pub fn new(constraints: GeometryConstraints) -> Self {
        Self {
            molecule: Molecule::new(),
            constraints,
            orbitals: SecondaryMap::new(),
            revision: 0,
            cache: FieldCache::new(),
            in_flight: CancellationToken::new(),
        }
    }

    /// Wraps an existing molecule, which must already satisfy `constraints`.
    pub fn from_molecule(molecule: Molecule, constraints: GeometryConstraints) -> Result<Self, EngineError> {
        constraints.validate()?;
        molecule.check_separation(constraints.min_separation)?;
        Ok(Self {
            molecule,
            ..Self::new(constraints)
        })
    }

    /// Builds a preset molecule with each atom showing the preset's orbital.
    pub fn from_preset(preset: &Preset, constraints: GeometryConstraints) -> Result<Self, EngineError> {
        let molecule = preset.to_molecule(constraints.min_separation)?;
        let mut model = Self::from_molecule(molecule, constraints)?;
        let ids = model.molecule.atom_ids().to_vec();
        for (id, preset_atom) in ids.into_iter().zip(preset.atoms) {
            let atom = model.atom(id)?;
            if OrbitalSpec::new(atom.atomic_number(), preset_atom.n, preset_atom.l, preset_atom.m).is_ok() {
                model.orbitals.insert(id, (preset_atom.n, preset_atom.l, preset_atom.m));
            }
        }
        info!(preset = preset.key, atoms = model.len(), "Loaded preset molecule.");
        Ok(model)
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    pub fn constraints(&self) -> &GeometryConstraints {
        &self.constraints
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.molecule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecule.is_empty()
    }

    pub fn atom(&self, id: AtomId) -> Result<&Atom, EngineError> {
        self.molecule
            .atom(id)
            .ok_or(EngineError::InvalidGeometry(GeometryError::AtomNotFound(id)))
    }

    pub fn cached_fields(&self) -> usize {
        self.cache.len()
    }

    fn invalidate(&mut self) {
        self.revision += 1;
        self.cache.clear();
        self.in_flight.cancel();
        self.in_flight = CancellationToken::new();
        debug!(revision = self.revision, "Model changed.");
    }

    pub fn add_atom(
        &mut self,
        atomic_number: u8,
        position: Point3<f64>,
        ionization: i32,
    ) -> Result<AtomId, EngineError> {
        let atom = Atom::with_ionization(atomic_number, position, ionization)?;
        let id = self.molecule.add_atom(atom, self.constraints.min_separation)?;
        self.invalidate();
        Ok(id)
    }

    /// Removes the atom together with its orbital choice. Bonds are derived from geometry, so
    /// none can reference the removed atom afterwards.
    pub fn remove_atom(&mut self, id: AtomId) -> Result<Atom, EngineError> {
        let atom = self.molecule.remove_atom(id)?;
        self.orbitals.remove(id);
        self.invalidate();
        Ok(atom)
    }

    pub fn set_position(&mut self, id: AtomId, position: Point3<f64>) -> Result<(), EngineError> {
        self.molecule
            .set_position(id, position, self.constraints.min_separation)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_ionization(&mut self, id: AtomId, ionization: i32) -> Result<(), EngineError> {
        self.molecule.set_ionization(id, ionization)?;
        self.invalidate();
        Ok(())
    }

    /// Chooses which orbital is shown for an atom.
    pub fn set_orbital(&mut self, id: AtomId, n: u8, l: u8, m: i8) -> Result<(), EngineError> {
        let atom = self.atom(id)?;
        OrbitalSpec::new(atom.atomic_number(), n, l, m)?;
        self.orbitals.insert(id, (n, l, m));
        self.invalidate();
        Ok(())
    }

    /// The chosen orbital, or the highest occupied one of the atom's ground state. A bare
    /// nucleus falls back to 1s.
    pub fn orbital_spec(&self, id: AtomId) -> Result<OrbitalSpec, EngineError> {
        let atom = self.atom(id)?;
        let (n, l, m) = match self.orbitals.get(id) {
            Some(&choice) => choice,
            None => ElectronConfiguration::ground_state(atom.electron_count())
                .default_orbital()
                .unwrap_or((1, 0, 0)),
        };
        Ok(OrbitalSpec::new(atom.atomic_number(), n, l, m)?)
    }

    /// The chosen orbital of `id`, placed on the atom and sized for its ionization.
    pub fn orbital(&self, id: AtomId, basis: AngularBasis) -> Result<Orbital, EngineError> {
        let spec = self.orbital_spec(id)?;
        let atom = self.atom(id)?;
        Ok(Orbital::new(spec, atom.position, atom.electron_count(), basis))
    }

    pub fn bonds(&self) -> Vec<Bond> {
        self.molecule.bonds(self.constraints.bond_tolerance)
    }

    /// Every atom's orbital combined into one scene, in atom order.
    pub fn scene(&self, combination: Combination, hybrid_mix: f64, basis: AngularBasis) -> Result<Scene, EngineError> {
        let orbitals = self
            .molecule
            .atom_ids()
            .iter()
            .map(|&id| self.orbital(id, basis))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Scene::new(orbitals, combination, hybrid_mix))
    }

    fn evaluator(&self, config: &FieldConfig) -> OrbitalFieldEvaluator<'static> {
        OrbitalFieldEvaluator::new()
            .with_basis(config.basis)
            .with_cancellation(self.in_flight.clone())
    }

    /// Samples one atom's orbital, reusing a cached field for identical requests.
    pub fn orbital_field(&mut self, id: AtomId, config: &FieldConfig) -> Result<Arc<FieldSample>, EngineError> {
        config.validate()?;
        let spec = self.orbital_spec(id)?;
        let key = FieldKey {
            revision: self.revision,
            target: FieldTarget::Orbital {
                atom: id,
                n: spec.n(),
                l: spec.l(),
                m: spec.m(),
            },
            mode: config.mode,
            basis: config.basis,
            resolution: config.resolution,
            extent_bits: config.extent.map(f64::to_bits),
        };
        if let Some(sample) = self.cache.get(&key) {
            debug!(orbital = %spec, "Field cache hit.");
            return Ok(sample);
        }
        let orbital = self.orbital(id, config.basis)?;
        let extent = config.extent.unwrap_or_else(|| orbital.default_extent());
        let sample = Arc::new(self.evaluator(config).evaluate_orbital(
            &orbital,
            extent,
            config.resolution,
            config.mode,
        )?);
        self.cache.insert(key, Arc::clone(&sample));
        Ok(sample)
    }

    /// Samples the combined scene of all atoms. `config.extent` is ignored; the scene sizes
    /// its own box.
    pub fn scene_field(
        &mut self,
        combination: Combination,
        hybrid_mix: f64,
        config: &FieldConfig,
    ) -> Result<Arc<FieldSample>, EngineError> {
        config.validate()?;
        let scene = self.scene(combination, hybrid_mix, config.basis)?;
        let key = FieldKey {
            revision: self.revision,
            target: FieldTarget::Scene {
                combination,
                mix_bits: scene.hybrid_mix().to_bits(),
            },
            mode: config.mode,
            basis: config.basis,
            resolution: config.resolution,
            extent_bits: None,
        };
        if let Some(sample) = self.cache.get(&key) {
            debug!(?combination, "Field cache hit.");
            return Ok(sample);
        }
        let sample = Arc::new(
            self.evaluator(config)
                .evaluate_scene(&scene, config.resolution, config.mode)?,
        );
        self.cache.insert(key, Arc::clone(&sample));
        Ok(sample)
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            molecule: self.molecule.clone(),
            revision: self.revision,
            cancel: self.in_flight.clone(),
        }
    }

    /// Applies geometry computed from a snapshot. Fails with `StaleRevision` if the model has
    /// changed since, and with `InvalidGeometry` if the new positions break the constraints.
    pub fn commit_geometry(&mut self, revision: u64, positions: &[Point3<f64>]) -> Result<(), EngineError> {
        if revision != self.revision {
            return Err(EngineError::StaleRevision {
                expected: revision,
                current: self.revision,
            });
        }
        let mut updated = self.molecule.clone();
        updated.set_positions(positions)?;
        updated.check_separation(self.constraints.min_separation)?;
        self.molecule = updated;
        self.invalidate();
        Ok(())
    }

    /// Relaxes the geometry in place. The run uses the stricter of the two minimum
    /// separations, and the model only changes if it finishes having moved an atom.
    pub fn minimize(
        &mut self,
        config: &MinimizationConfig,
        reporter: &ProgressReporter,
    ) -> Result<MinimizationReport, EngineError> {
        let config = MinimizationConfig {
            min_separation: config.min_separation.max(self.constraints.min_separation),
            ..config.clone()
        };
        let mut minimizer = EnergyMinimizer::new(&self.molecule, config)?;
        let report = minimizer.run(&self.in_flight, reporter)?;
        if self.molecule.positions().as_slice() != minimizer.positions() {
            let revision = self.revision;
            self.commit_geometry(revision, minimizer.positions())?;
        }
        Ok(report)
    }
}
