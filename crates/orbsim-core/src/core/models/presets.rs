use super::atom::Atom;
use super::element::Element;
use super::molecule::{GeometryError, Molecule};
use nalgebra::Point3;
use phf::{Map, phf_map};

/// One atom of an example molecule together with the orbital shown for it by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetAtom {
    pub symbol: &'static str,
    pub n: u8,
    pub l: u8,
    pub m: i8,
    pub position: [f64; 3],
    /// Charge offset the atom is built with (`+1` for Na⁺).
    pub ionization: i32,
}

/// A named example molecule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub key: &'static str,
    pub label: &'static str,
    pub atoms: &'static [PresetAtom],
}

const fn pa(symbol: &'static str, n: u8, l: u8, m: i8, position: [f64; 3]) -> PresetAtom {
    PresetAtom {
        symbol,
        n,
        l,
        m,
        position,
        ionization: 0,
    }
}

impl PresetAtom {
    const fn charged(self, ionization: i32) -> Self {
        PresetAtom { ionization, ..self }
    }
}

static H2: Preset = Preset {
    key: "h2",
    label: "H2 (covalent)",
    atoms: &[
        pa("H", 1, 0, 0, [-0.37, 0.0, 0.0]),
        pa("H", 1, 0, 0, [0.37, 0.0, 0.0]),
    ],
};

static H2O: Preset = Preset {
    key: "h2o",
    label: "H2O (covalent)",
    atoms: &[
        pa("O", 2, 1, 0, [0.0, 0.0, 0.0]),
        pa("H", 1, 0, 0, [0.756, 0.587, 0.0]),
        pa("H", 1, 0, 0, [-0.756, 0.587, 0.0]),
    ],
};

static CH4: Preset = Preset {
    key: "ch4",
    label: "CH4 (covalent)",
    atoms: &[
        pa("C", 2, 1, 0, [0.0, 0.0, 0.0]),
        pa("H", 1, 0, 0, [0.629, 0.629, 0.629]),
        pa("H", 1, 0, 0, [0.629, -0.629, -0.629]),
        pa("H", 1, 0, 0, [-0.629, 0.629, -0.629]),
        pa("H", 1, 0, 0, [-0.629, -0.629, 0.629]),
    ],
};

static CO2: Preset = Preset {
    key: "co2",
    label: "CO2 (covalent)",
    atoms: &[
        pa("O", 2, 1, 0, [0.0, 0.0, -1.16]),
        pa("C", 2, 1, 0, [0.0, 0.0, 0.0]),
        pa("O", 2, 1, 0, [0.0, 0.0, 1.16]),
    ],
};

static NACL: Preset = Preset {
    key: "nacl",
    label: "NaCl (ionic)",
    atoms: &[
        pa("Na", 3, 0, 0, [-1.18, 0.0, 0.0]).charged(1),
        pa("Cl", 3, 1, 0, [1.18, 0.0, 0.0]).charged(-1),
    ],
};

static HF: Preset = Preset {
    key: "hf",
    label: "HF (polar covalent)",
    atoms: &[
        pa("H", 1, 0, 0, [-0.462, 0.0, 0.0]),
        pa("F", 2, 1, 0, [0.0, 0.0, 0.0]),
    ],
};

static C2H4: Preset = Preset {
    key: "c2h4",
    label: "Ethene C2H4 (pi bond)",
    atoms: &[
        pa("C", 2, 1, 0, [-0.67, 0.0, 0.0]),
        pa("C", 2, 1, 0, [0.67, 0.0, 0.0]),
        pa("H", 1, 0, 0, [-1.23, 0.93, 0.0]),
        pa("H", 1, 0, 0, [-1.23, -0.93, 0.0]),
        pa("H", 1, 0, 0, [1.23, 0.93, 0.0]),
        pa("H", 1, 0, 0, [1.23, -0.93, 0.0]),
    ],
};

static C2H2: Preset = Preset {
    key: "c2h2",
    label: "Acetylene C2H2 (pi bond)",
    atoms: &[
        pa("C", 2, 1, 0, [-0.6, 0.0, 0.0]),
        pa("C", 2, 1, 0, [0.6, 0.0, 0.0]),
        pa("H", 1, 0, 0, [-1.68, 0.0, 0.0]),
        pa("H", 1, 0, 0, [1.68, 0.0, 0.0]),
    ],
};

static C6H6: Preset = Preset {
    key: "c6h6",
    label: "Benzene C6H6 (delocalized pi)",
    atoms: &[
        pa("C", 2, 1, 0, [1.40, 0.0, 0.0]),
        pa("C", 2, 1, 0, [0.70, 1.21, 0.0]),
        pa("C", 2, 1, 0, [-0.70, 1.21, 0.0]),
        pa("C", 2, 1, 0, [-1.40, 0.0, 0.0]),
        pa("C", 2, 1, 0, [-0.70, -1.21, 0.0]),
        pa("C", 2, 1, 0, [0.70, -1.21, 0.0]),
        pa("H", 1, 0, 0, [2.48, 0.0, 0.0]),
        pa("H", 1, 0, 0, [1.24, 2.15, 0.0]),
        pa("H", 1, 0, 0, [-1.24, 2.15, 0.0]),
        pa("H", 1, 0, 0, [-2.48, 0.0, 0.0]),
        pa("H", 1, 0, 0, [-1.24, -2.15, 0.0]),
        pa("H", 1, 0, 0, [1.24, -2.15, 0.0]),
    ],
};

static CO: Preset = Preset {
    key: "co",
    label: "CO (polar sigma)",
    atoms: &[
        pa("C", 2, 1, 0, [-0.55, 0.0, 0.0]),
        pa("O", 2, 1, 0, [0.55, 0.0, 0.0]),
    ],
};

static PRESETS: [&Preset; 10] = [&H2, &H2O, &CH4, &CO2, &NACL, &HF, &C2H4, &C2H2, &C6H6, &CO];

static PRESETS_BY_KEY: Map<&'static str, &'static Preset> = phf_map! {
    "h2" => &H2,
    "h2o" => &H2O,
    "ch4" => &CH4,
    "co2" => &CO2,
    "nacl" => &NACL,
    "hf" => &HF,
    "c2h4" => &C2H4,
    "c2h2" => &C2H2,
    "c6h6" => &C6H6,
    "co" => &CO,
};

impl Preset {
    /// Looks up a preset by key, ignoring case (`"H2O"` and `"h2o"` both match).
    pub fn find(key: &str) -> Option<&'static Preset> {
        PRESETS_BY_KEY
            .get(key.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn all() -> &'static [&'static Preset] {
        &PRESETS
    }

    /// Builds the preset, including the ionization of each atom.
    pub fn to_molecule(&self, min_separation: f64) -> Result<Molecule, GeometryError> {
        let mut molecule = Molecule::new();
        for preset_atom in self.atoms {
            let atomic_number = Element::from_symbol(preset_atom.symbol)
                .map(|e| e.atomic_number)
                .unwrap_or(0);
            let [x, y, z] = preset_atom.position;
            let atom =
                Atom::with_ionization(atomic_number, Point3::new(x, y, z), preset_atom.ionization)?;
            molecule.add_atom(atom, min_separation)?;
        }
        Ok(molecule)
    }
}
