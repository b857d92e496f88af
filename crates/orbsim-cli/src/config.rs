use crate::cli::{FieldArgs, MinimizeArgs};
use crate::error::{CliError, Result};
use orbsim::core::colormap::cyclic::{CyclicColormap, DEFAULT_COLORMAP};
use orbsim::core::colormap::opacity::OpacityCurve;
use orbsim::core::energy::functional::PotentialParams;
use orbsim::core::orbitals::angular::AngularBasis;
use orbsim::core::orbitals::field::FieldMode;
use orbsim::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_ISO_LEVELS: usize = 3;
pub const DEFAULT_ISO_FRACTION: f64 = 0.9;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialFieldConfig {
    resolution: Option<usize>,
    extent: Option<f64>,
    mode: Option<FieldMode>,
    basis: Option<AngularBasis>,
    iso_levels: Option<usize>,
    iso_fraction: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialColormapConfig {
    /// Built-in colormap name or path to a colormap TOML file.
    name: Option<String>,
    opacity: Option<OpacityCurve>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialMinimizationConfig {
    max_iterations: Option<usize>,
    convergence_tolerance: Option<f64>,
    min_separation: Option<f64>,
    initial_step: Option<f64>,
    max_step: Option<f64>,
    max_displacement: Option<f64>,
    well_depth: Option<f64>,
    radius_scale: Option<f64>,
    dielectric: Option<f64>,
}

/// Configuration file contents before CLI overrides are applied. Every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialConfig {
    field: Option<PartialFieldConfig>,
    colormap: Option<PartialColormapConfig>,
    minimization: Option<PartialMinimizationConfig>,
}

/// Everything the `field` command needs after merging.
#[derive(Debug, Clone)]
pub struct FieldSettings {
    pub field: core_config::FieldConfig,
    pub colormap: core_config::ColormapConfig,
    pub iso_levels: usize,
    pub iso_fraction: f64,
    /// Placement rules for a molecule loaded alongside the field.
    pub constraints: core_config::GeometryConstraints,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` if given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_field_args(mut self, args: &FieldArgs) -> Result<FieldSettings> {
        self.apply_set_values(&args.set_values)?;
        let constraints = self.geometry_constraints()?;
        let file_field = self.field.take().unwrap_or_default();
        let file_colormap = self.colormap.take().unwrap_or_default();

        let resolution = args
            .resolution
            .or(file_field.resolution)
            .unwrap_or(core_config::DEFAULT_RESOLUTION);
        let mut builder = core_config::FieldConfigBuilder::new().uniform_resolution(resolution);
        if let Some(extent) = args.extent.or(file_field.extent) {
            builder = builder.extent(extent);
        }
        if let Some(mode) = args.mode.map(FieldMode::from).or(file_field.mode) {
            builder = builder.mode(mode);
        }
        if let Some(basis) = args.basis.map(AngularBasis::from).or(file_field.basis) {
            builder = builder.basis(basis);
        }
        let field = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

        let colormap_name = args
            .colormap
            .clone()
            .or(file_colormap.name)
            .unwrap_or_else(|| DEFAULT_COLORMAP.to_string());
        let colormap = resolve_colormap(&colormap_name)?;
        let colormap = core_config::ColormapConfigBuilder::new()
            .colormap(colormap)
            .opacity_curve(file_colormap.opacity.unwrap_or_default())
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let iso_fraction = file_field.iso_fraction.unwrap_or(DEFAULT_ISO_FRACTION);
        if !(iso_fraction > 0.0 && iso_fraction < 1.0) {
            return Err(CliError::Config(format!(
                "`field.iso-fraction` must lie strictly between 0 and 1, got {iso_fraction}"
            )));
        }

        Ok(FieldSettings {
            field,
            colormap,
            iso_levels: args
                .iso_levels
                .or(file_field.iso_levels)
                .unwrap_or(DEFAULT_ISO_LEVELS),
            iso_fraction,
            constraints,
        })
    }

    /// Molecule placement rules taken from `[minimization] min-separation`, so every command
    /// accepts the same molecules.
    fn geometry_constraints(&self) -> Result<core_config::GeometryConstraints> {
        let mut constraints = core_config::GeometryConstraints::default();
        if let Some(min_separation) = self.minimization.as_ref().and_then(|m| m.min_separation) {
            constraints.min_separation = min_separation;
        }
        constraints
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(constraints)
    }

    pub fn merge_minimize_args(mut self, args: &MinimizeArgs) -> Result<core_config::MinimizationConfig> {
        self.apply_set_values(&args.set_values)?;
        let file = self.minimization.take().unwrap_or_default();
        let defaults = core_config::MinimizationConfig::default();

        let potential = PotentialParams {
            well_depth: file.well_depth.unwrap_or(defaults.potential.well_depth),
            radius_scale: file.radius_scale.unwrap_or(defaults.potential.radius_scale),
            dielectric: file.dielectric.unwrap_or(defaults.potential.dielectric),
        };

        core_config::MinimizationConfigBuilder::new()
            .max_iterations(
                args.max_iterations
                    .or(file.max_iterations)
                    .unwrap_or(defaults.max_iterations),
            )
            .convergence_tolerance(
                args.tolerance
                    .or(file.convergence_tolerance)
                    .unwrap_or(defaults.convergence_tolerance),
            )
            .min_separation(
                args.min_separation
                    .or(file.min_separation)
                    .unwrap_or(defaults.min_separation),
            )
            .initial_step(file.initial_step.unwrap_or(defaults.initial_step))
            .max_step(file.max_step.unwrap_or(defaults.max_step))
            .max_displacement(file.max_displacement.unwrap_or(defaults.max_displacement))
            .potential(potential)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value_str) = (key.trim(), value_str.trim());

            match key {
                "field.resolution" => {
                    self.field.get_or_insert_with(Default::default).resolution = Some(parse_value(key, value_str)?)
                }
                "field.extent" => self.field.get_or_insert_with(Default::default).extent = Some(parse_value(key, value_str)?),
                "field.mode" => {
                    self.field.get_or_insert_with(Default::default).mode = Some(match value_str {
                        "wavefunction" => FieldMode::Wavefunction,
                        "density" => FieldMode::Density,
                        _ => return Err(invalid_value(key, value_str, "'wavefunction' or 'density'")),
                    })
                }
                "field.basis" => {
                    self.field.get_or_insert_with(Default::default).basis = Some(match value_str {
                        "complex" => AngularBasis::Complex,
                        "real" => AngularBasis::Real,
                        _ => return Err(invalid_value(key, value_str, "'complex' or 'real'")),
                    })
                }
                "field.iso-levels" => {
                    self.field.get_or_insert_with(Default::default).iso_levels = Some(parse_value(key, value_str)?)
                }
                "field.iso-fraction" => {
                    self.field.get_or_insert_with(Default::default).iso_fraction = Some(parse_value(key, value_str)?)
                }
                "colormap.name" => {
                    self.colormap.get_or_insert_with(Default::default).name = Some(value_str.to_string())
                }
                "minimization.max-iterations" => {
                    self.minimization.get_or_insert_with(Default::default).max_iterations =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.convergence-tolerance" => {
                    self.minimization.get_or_insert_with(Default::default).convergence_tolerance =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.min-separation" => {
                    self.minimization.get_or_insert_with(Default::default).min_separation =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.initial-step" => {
                    self.minimization.get_or_insert_with(Default::default).initial_step =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.max-step" => {
                    self.minimization.get_or_insert_with(Default::default).max_step = Some(parse_value(key, value_str)?)
                }
                "minimization.max-displacement" => {
                    self.minimization.get_or_insert_with(Default::default).max_displacement =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.well-depth" => {
                    self.minimization.get_or_insert_with(Default::default).well_depth =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.radius-scale" => {
                    self.minimization.get_or_insert_with(Default::default).radius_scale =
                        Some(parse_value(key, value_str)?)
                }
                "minimization.dielectric" => {
                    self.minimization.get_or_insert_with(Default::default).dielectric =
                        Some(parse_value(key, value_str)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid_value(key, value, std::any::type_name::<T>()))
}

fn invalid_value(key: &str, value: &str, expected: &str) -> CliError {
    CliError::Config(format!("Invalid value for {key}: '{value}' (expected {expected})"))
}

/// A built-in colormap name, or a path to a colormap file when the value looks like one.
fn resolve_colormap(name_or_path: &str) -> Result<CyclicColormap> {
    let path = Path::new(name_or_path);
    if name_or_path.ends_with(".toml") || name_or_path.contains(['/', '\\']) {
        return Ok(CyclicColormap::load(path).map_err(orbsim::engine::error::EngineError::from)?);
    }
    CyclicColormap::builtin(name_or_path).map_err(|_| {
        CliError::Config(format!(
            "Unknown colormap '{}'. Built-in colormaps: {}",
            name_or_path,
            CyclicColormap::builtin_names().join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn field_args(args: &[&str]) -> FieldArgs {
        let mut full = vec!["orbsim", "field"];
        full.extend_from_slice(args);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Field(args) => args,
            _ => unreachable!(),
        }
    }

    fn minimize_args(args: &[&str]) -> MinimizeArgs {
        let mut full = vec!["orbsim", "minimize"];
        full.extend_from_slice(args);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Minimize(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_config_yields_defaults() {
        let settings = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H"]))
            .unwrap();
        assert_eq!(settings.field, core_config::FieldConfig::default());
        assert_eq!(settings.colormap.colormap.name(), DEFAULT_COLORMAP);
        assert_eq!(settings.iso_levels, DEFAULT_ISO_LEVELS);

        let minimization = PartialConfig::default()
            .merge_minimize_args(&minimize_args(&["-p", "h2o"]))
            .unwrap();
        assert_eq!(minimization, core_config::MinimizationConfig::default());
    }

    #[test]
    fn file_values_are_loaded_and_cli_overrides_them() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "orbsim.toml",
            r#"
[field]
resolution = 20
extent = 6.5
mode = "density"
basis = "real"
iso-levels = 5

[colormap]
name = "hsv"
opacity = { kind = "power", gamma = 2.0 }

[minimization]
max-iterations = 50
convergence-tolerance = 0.05
dielectric = 4.0
"#,
        );
        let settings = PartialConfig::from_file(&path)
            .unwrap()
            .merge_field_args(&field_args(&["-e", "O", "-r", "12", "--basis", "complex"]))
            .unwrap();
        assert_eq!(settings.field.resolution, [12; 3]);
        assert_eq!(settings.field.extent, Some(6.5));
        assert_eq!(settings.field.mode, FieldMode::Density);
        assert_eq!(settings.field.basis, AngularBasis::Complex);
        assert_eq!(settings.iso_levels, 5);
        assert_eq!(settings.colormap.colormap.name(), "hsv");
        assert_eq!(settings.colormap.opacity_curve, OpacityCurve::Power { gamma: 2.0 });

        let minimization = PartialConfig::from_file(&path)
            .unwrap()
            .merge_minimize_args(&minimize_args(&["-p", "h2o", "--max-iterations", "7"]))
            .unwrap();
        assert_eq!(minimization.max_iterations, 7);
        assert_eq!(minimization.convergence_tolerance, 0.05);
        assert_eq!(minimization.potential.dielectric, 4.0);
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "c.toml", "[minimization]\nmax-iterations = 50\n");
        let config = PartialConfig::from_file(&path)
            .unwrap()
            .merge_minimize_args(&minimize_args(&[
                "-p",
                "h2",
                "-S",
                "minimization.max-iterations=9",
                "-S",
                "minimization.max-step=0.5",
            ]))
            .unwrap();
        assert_eq!(config.max_iterations, 9);
        assert_eq!(config.max_step, 0.5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "bad.toml", "[field]\nresolutoin = 3\n");
        assert!(matches!(
            PartialConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let err = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H", "-S", "field.colour=red"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["field.resolution", "field.resolution=many", "field.mode=sideways"] {
            let err = PartialConfig::default()
                .merge_field_args(&field_args(&["-e", "H", "-S", bad]))
                .unwrap_err();
            assert!(matches!(err, CliError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let err = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H", "-r", "0"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("resolution")));

        let err = PartialConfig::default()
            .merge_minimize_args(&minimize_args(&["-p", "h2", "-S", "minimization.convergence-tolerance=-1"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("convergence_tolerance")));
    }

    #[test]
    fn min_separation_applies_to_field_placement() {
        let settings = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H"]))
            .unwrap();
        assert_eq!(
            settings.constraints,
            core_config::GeometryConstraints::default()
        );

        let settings = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H", "-S", "minimization.min-separation=0.2"]))
            .unwrap();
        assert_eq!(settings.constraints.min_separation, 0.2);

        let err = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H", "-S", "minimization.min-separation=0"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("min_separation")));
    }

    #[test]
    fn colormap_may_be_loaded_from_a_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            "bands.toml",
            "name = \"bands\"\nstops = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]\n",
        );
        let path_str = path.to_string_lossy().to_string();
        let settings = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H", "--colormap", &path_str]))
            .unwrap();
        assert_eq!(settings.colormap.colormap.name(), "bands");

        let err = PartialConfig::default()
            .merge_field_args(&field_args(&["-e", "H", "--colormap", "viridis"]))
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
