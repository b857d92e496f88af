use crate::cli::MoleculeSource;
use crate::error::{CliError, Result};
use orbsim::core::models::element::Element;
use orbsim::core::models::formula::Formula;
use orbsim::core::models::molecule::Molecule;
use orbsim::core::models::presets::Preset;
use orbsim::engine::config::GeometryConstraints;
use orbsim::engine::error::EngineError;
use orbsim::engine::model::MoleculeModel;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// On-disk molecule description.
///
/// ```toml
/// [[atoms]]
/// element = "O"
/// position = [0.0, 0.0, 0.0]
/// orbital = [2, 1, 0]
///
/// [[atoms]]
/// element = "H"
/// position = [0.756, 0.587, 0.0]
/// ionization = 0
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MoleculeFile {
    #[serde(default)]
    pub atoms: Vec<AtomEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtomEntry {
    pub element: String,
    pub position: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ionization: Option<i32>,
    /// Orbital shown for this atom as `[n, l, m]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbital: Option<[i32; 3]>,
}

impl MoleculeFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_molecule(molecule: &Molecule) -> Self {
        let atoms = molecule
            .atoms_iter()
            .map(|(_, atom)| AtomEntry {
                element: atom.element().symbol.to_string(),
                position: [atom.position.x, atom.position.y, atom.position.z],
                ionization: (atom.ionization() != 0).then_some(atom.ionization()),
                orbital: None,
            })
            .collect();
        Self { atoms }
    }

    /// Builds the model atom by atom so each placement is checked against `constraints`.
    pub fn into_model(self, constraints: GeometryConstraints) -> Result<MoleculeModel> {
        let mut model = MoleculeModel::new(constraints);
        for (index, entry) in self.atoms.into_iter().enumerate() {
            let element = Element::from_symbol(&entry.element).ok_or_else(|| {
                CliError::Argument(format!(
                    "Atom {} has unknown element '{}'",
                    index + 1,
                    entry.element
                ))
            })?;
            let [x, y, z] = entry.position;
            let id = model.add_atom(
                element.atomic_number,
                Point3::new(x, y, z),
                entry.ionization.unwrap_or(0),
            )?;
            if let Some([n, l, m]) = entry.orbital {
                let n = u8::try_from(n).map_err(|_| invalid_orbital(index, entry.orbital))?;
                let l = u8::try_from(l).map_err(|_| invalid_orbital(index, entry.orbital))?;
                let m = i8::try_from(m).map_err(|_| invalid_orbital(index, entry.orbital))?;
                model.set_orbital(id, n, l, m)?;
            }
        }
        Ok(model)
    }
}

fn invalid_orbital(index: usize, orbital: Option<[i32; 3]>) -> CliError {
    CliError::Argument(format!(
        "Atom {} has out-of-range orbital {:?}",
        index + 1,
        orbital.unwrap_or_default()
    ))
}

/// Loads the molecule named by `source`, or `None` when no source was given.
pub fn load_model(source: &MoleculeSource, constraints: GeometryConstraints) -> Result<Option<MoleculeModel>> {
    if let Some(path) = &source.input {
        info!("Reading molecule from {:?}", path);
        let model = MoleculeFile::read(path)?.into_model(constraints)?;
        debug!(atoms = model.len(), "Molecule loaded.");
        return Ok(Some(model));
    }
    if let Some(key) = &source.preset {
        let preset = Preset::find(key).ok_or_else(|| {
            let known: Vec<_> = Preset::all().iter().map(|p| p.key).collect();
            CliError::Argument(format!(
                "Unknown preset '{}'. Available presets: {}",
                key,
                known.join(", ")
            ))
        })?;
        return Ok(Some(MoleculeModel::from_preset(preset, constraints)?));
    }
    if let Some(text) = &source.formula {
        let formula = Formula::parse(text).map_err(EngineError::from)?;
        info!(%formula, atoms = formula.atom_count(), "Building molecule from formula.");
        let molecule = formula
            .to_molecule(constraints.min_separation)
            .map_err(EngineError::from)?;
        return Ok(Some(MoleculeModel::from_molecule(molecule, constraints)?));
    }
    Ok(None)
}

pub fn write_molecule(path: &Path, molecule: &Molecule) -> Result<()> {
    let content = toml::to_string(&MoleculeFile::from_molecule(molecule))
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to serialize molecule: {}", e)))?;
    std::fs::write(path, content)?;
    info!("Wrote {} atoms to {:?}", molecule.len(), path);
    Ok(())
}
