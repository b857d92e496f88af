use clap::{Args, Parser, Subcommand, ValueEnum};
use orbsim::core::orbitals::angular::AngularBasis;
use orbsim::core::orbitals::field::FieldMode;
use orbsim::core::orbitals::scene::Combination;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "OrbSim Developers",
    version,
    about = "OrbSim CLI - Sample atomic and molecular orbitals, color them by phase, and relax small molecules.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an orbital (or a molecular scene), colorize it, and print a summary.
    Field(FieldArgs),
    /// Relax a molecule's geometry under the simplified pair potential.
    Minimize(MinimizeArgs),
    /// Show the electron configuration and valid orbitals of an element.
    Element(ElementArgs),
}

/// Where a molecule comes from: a TOML file, one of the built-in presets, or a formula.
#[derive(Args, Debug, Clone, Default)]
#[group(required = false, multiple = false)]
pub struct MoleculeSource {
    /// Path to a molecule file in TOML format ([[atoms]] with element and position).
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Use a built-in example molecule (h2, h2o, ch4, co2, nacl, hf, c2h4, c2h2, c6h6, co).
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Build a molecule from a chemical formula (e.g. 'H2O', 'Mg(OH)2'). Atoms start on a
    /// spread-out lattice.
    #[arg(short, long, value_name = "FORMULA")]
    pub formula: Option<String>,
}

impl MoleculeSource {
    pub fn is_given(&self) -> bool {
        self.input.is_some() || self.preset.is_some() || self.formula.is_some()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Wavefunction,
    Density,
}

impl From<ModeArg> for FieldMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Wavefunction => FieldMode::Wavefunction,
            ModeArg::Density => FieldMode::Density,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisArg {
    Complex,
    Real,
}

impl From<BasisArg> for AngularBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Complex => AngularBasis::Complex,
            BasisArg::Real => AngularBasis::Real,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationArg {
    Atomic,
    Bonding,
    Antibonding,
}

impl From<CombinationArg> for Combination {
    fn from(arg: CombinationArg) -> Self {
        match arg {
            CombinationArg::Atomic => Combination::Atomic,
            CombinationArg::Bonding => Combination::Bonding,
            CombinationArg::Antibonding => Combination::Antibonding,
        }
    }
}

/// Arguments for the `field` subcommand.
#[derive(Args, Debug)]
pub struct FieldArgs {
    // --- Target ---
    #[command(flatten)]
    pub source: MoleculeSource,

    /// Element whose orbital is sampled (symbol, e.g. 'O').
    #[arg(short, long, value_name = "SYMBOL")]
    pub element: Option<String>,

    /// Principal quantum number. Defaults to the element's highest occupied orbital.
    #[arg(short, long, value_name = "INT", requires = "element")]
    pub n: Option<u8>,

    /// Angular quantum number.
    #[arg(short, long, value_name = "INT", requires = "n")]
    pub l: Option<u8>,

    /// Magnetic quantum number.
    #[arg(short, long, value_name = "INT", requires = "l", allow_hyphen_values = true)]
    pub m: Option<i8>,

    /// Clamp out-of-range quantum numbers to the nearest valid combination instead of failing.
    #[arg(long)]
    pub clamp: bool,

    /// Sample every atom of the molecule combined into one field instead of a single orbital.
    #[arg(long, value_enum, value_name = "KIND", conflicts_with = "element")]
    pub scene: Option<CombinationArg>,

    /// Hybrid mix fraction for scenes (0 = atomic, 1 = full combination).
    #[arg(long, value_name = "FLOAT", requires = "scene")]
    pub mix: Option<f64>,

    // --- Configuration ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the number of samples per axis.
    #[arg(short, long, value_name = "INT")]
    pub resolution: Option<usize>,

    /// Override the grid half-width in Ångström.
    #[arg(long, value_name = "FLOAT")]
    pub extent: Option<f64>,

    /// Override the sampled quantity.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Override the angular basis.
    #[arg(long, value_enum)]
    pub basis: Option<BasisArg>,

    /// Override the colormap: a built-in name or a path to a colormap TOML file.
    #[arg(long, value_name = "NAME_OR_PATH")]
    pub colormap: Option<String>,

    /// Override the number of enclosed-probability iso-levels to report.
    #[arg(long, value_name = "INT")]
    pub iso_levels: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S field.resolution=32
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `minimize` subcommand.
#[derive(Args, Debug)]
pub struct MinimizeArgs {
    #[command(flatten)]
    pub source: MoleculeSource,

    /// Write the relaxed molecule to this TOML file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the maximum number of iterations.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override the gradient-norm convergence tolerance (kcal/mol/Å).
    #[arg(short, long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Override the minimum allowed inter-atomic distance (Å).
    #[arg(long, value_name = "FLOAT")]
    pub min_separation: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S minimization.max-step=0.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `element` subcommand.
#[derive(Args, Debug)]
pub struct ElementArgs {
    /// Element symbol (e.g. 'Fe') or atomic number.
    #[arg(required = true)]
    pub element: String,

    /// Charge of the ion (positive removes electrons).
    #[arg(long, value_name = "INT", default_value_t = 0, allow_hyphen_values = true)]
    pub ionization: i32,

    /// List valid orbitals only for this principal quantum number.
    #[arg(short, long, value_name = "INT")]
    pub n: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_command_parses_orbital_and_overrides() {
        let cli = Cli::try_parse_from([
            "orbsim", "field", "-e", "O", "-n", "2", "-l", "1", "-m", "-1", "--mode", "density",
            "-r", "16", "-S", "field.extent=4.0",
        ])
        .unwrap();
        let Commands::Field(args) = cli.command else {
            panic!("expected field command");
        };
        assert_eq!(args.element.as_deref(), Some("O"));
        assert_eq!((args.n, args.l, args.m), (Some(2), Some(1), Some(-1)));
        assert_eq!(args.mode, Some(ModeArg::Density));
        assert_eq!(args.resolution, Some(16));
        assert_eq!(args.set_values, vec!["field.extent=4.0".to_string()]);
    }

    #[test]
    fn input_and_preset_are_mutually_exclusive() {
        let result = Cli::try_parse_from(["orbsim", "minimize", "-i", "water.toml", "-p", "h2o"]);
        assert!(result.is_err());
    }

    #[test]
    fn formula_is_a_third_molecule_source() {
        let cli = Cli::try_parse_from(["orbsim", "minimize", "-f", "Mg(OH)2"]).unwrap();
        let Commands::Minimize(args) = cli.command else {
            panic!("expected minimize command");
        };
        assert_eq!(args.source.formula.as_deref(), Some("Mg(OH)2"));
        assert!(args.source.is_given());

        let result = Cli::try_parse_from(["orbsim", "minimize", "-f", "H2O", "-p", "h2o"]);
        assert!(result.is_err());
    }

    #[test]
    fn scene_conflicts_with_element() {
        let result = Cli::try_parse_from([
            "orbsim", "field", "-p", "h2", "--scene", "bonding", "-e", "H",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn element_accepts_negative_ionization() {
        let cli = Cli::try_parse_from(["orbsim", "element", "Cl", "--ionization", "-1"]).unwrap();
        let Commands::Element(args) = cli.command else {
            panic!("expected element command");
        };
        assert_eq!(args.ionization, -1);
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["orbsim", "element", "Fe", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }
}
