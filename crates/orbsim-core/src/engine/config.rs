use crate::core::colormap::cyclic::CyclicColormap;
use crate::core::colormap::opacity::OpacityCurve;
use crate::core::energy::functional::PotentialParams;
use crate::core::models::molecule::DEFAULT_BOND_TOLERANCE;
use crate::core::orbitals::angular::AngularBasis;
use crate::core::orbitals::field::FieldMode;
use thiserror::Error;

pub const DEFAULT_RESOLUTION: usize = 48;
pub const DEFAULT_MIN_SEPARATION: f64 = 0.4;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn require_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a finite number greater than 0, got {value}"),
        })
    }
}

/// How an orbital or scene is sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Samples per axis, each at least 1.
    pub resolution: [usize; 3],
    /// Grid half-width in Ångström. `None` picks the orbital's own reach.
    pub extent: Option<f64>,
    pub mode: FieldMode,
    pub basis: AngularBasis,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            resolution: [DEFAULT_RESOLUTION; 3],
            extent: None,
            mode: FieldMode::default(),
            basis: AngularBasis::default(),
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.contains(&0) {
            return Err(ConfigError::InvalidParameter {
                name: "resolution",
                reason: format!("every axis needs at least 1 sample, got {:?}", self.resolution),
            });
        }
        if let Some(extent) = self.extent {
            require_positive("extent", extent)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FieldConfigBuilder {
    resolution: Option<[usize; 3]>,
    extent: Option<f64>,
    mode: Option<FieldMode>,
    basis: Option<AngularBasis>,
}

impl FieldConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution(mut self, resolution: [usize; 3]) -> Self {
        self.resolution = Some(resolution);
        self
    }
    pub fn uniform_resolution(mut self, samples: usize) -> Self {
        self.resolution = Some([samples; 3]);
        self
    }
    pub fn extent(mut self, extent: f64) -> Self {
        self.extent = Some(extent);
        self
    }
    pub fn mode(mut self, mode: FieldMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn basis(mut self, basis: AngularBasis) -> Self {
        self.basis = Some(basis);
        self
    }

    pub fn build(self) -> Result<FieldConfig, ConfigError> {
        let config = FieldConfig {
            resolution: self
                .resolution
                .ok_or(ConfigError::MissingParameter("resolution"))?,
            extent: self.extent,
            mode: self.mode.unwrap_or_default(),
            basis: self.basis.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Colormap and opacity curve used to turn a field into colors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColormapConfig {
    pub colormap: CyclicColormap,
    pub opacity_curve: OpacityCurve,
}

#[derive(Default)]
pub struct ColormapConfigBuilder {
    colormap_name: Option<String>,
    colormap: Option<CyclicColormap>,
    opacity_curve: Option<OpacityCurve>,
}

impl ColormapConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a built-in colormap. Ignored if a loaded colormap is also supplied.
    pub fn colormap_name(mut self, name: impl Into<String>) -> Self {
        self.colormap_name = Some(name.into());
        self
    }
    pub fn colormap(mut self, colormap: CyclicColormap) -> Self {
        self.colormap = Some(colormap);
        self
    }
    pub fn opacity_curve(mut self, curve: OpacityCurve) -> Self {
        self.opacity_curve = Some(curve);
        self
    }

    pub fn build(self) -> Result<ColormapConfig, ConfigError> {
        let colormap = match (self.colormap, self.colormap_name) {
            (Some(colormap), _) => colormap,
            (None, Some(name)) => {
                CyclicColormap::builtin(&name).map_err(|e| ConfigError::InvalidParameter {
                    name: "colormap",
                    reason: e.to_string(),
                })?
            }
            (None, None) => return Err(ConfigError::MissingParameter("colormap")),
        };
        let opacity_curve = self.opacity_curve.unwrap_or_default();
        opacity_curve
            .validate()
            .map_err(|e| ConfigError::InvalidParameter {
                name: "opacity_curve",
                reason: e.to_string(),
            })?;
        Ok(ColormapConfig {
            colormap,
            opacity_curve,
        })
    }
}

/// Geometric rules a molecule model enforces on every edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConstraints {
    /// Smallest allowed distance between two atoms, Å.
    pub min_separation: f64,
    /// Multiplier on summed covalent radii below which two atoms count as bonded.
    pub bond_tolerance: f64,
}

impl Default for GeometryConstraints {
    fn default() -> Self {
        Self {
            min_separation: DEFAULT_MIN_SEPARATION,
            bond_tolerance: DEFAULT_BOND_TOLERANCE,
        }
    }
}

impl GeometryConstraints {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("min_separation", self.min_separation)?;
        require_positive("bond_tolerance", self.bond_tolerance)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationConfig {
    pub max_iterations: usize,
    /// Converged once the largest per-atom gradient norm drops below this (kcal/mol/Å).
    pub convergence_tolerance: f64,
    pub min_separation: f64,
    /// Starting gradient-descent step, Å²·mol/kcal.
    pub initial_step: f64,
    pub max_step: f64,
    /// Cap on how far one atom may move in a single iteration, Å.
    pub max_displacement: f64,
    pub potential: PotentialParams,
}

impl Default for MinimizationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            convergence_tolerance: 0.01,
            min_separation: DEFAULT_MIN_SEPARATION,
            initial_step: 0.01,
            max_step: 1.0,
            max_displacement: 0.2,
            potential: PotentialParams::default(),
        }
    }
}

impl MinimizationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("convergence_tolerance", self.convergence_tolerance)?;
        require_positive("min_separation", self.min_separation)?;
        require_positive("initial_step", self.initial_step)?;
        require_positive("max_step", self.max_step)?;
        require_positive("max_displacement", self.max_displacement)?;
        require_positive("well_depth", self.potential.well_depth)?;
        require_positive("radius_scale", self.potential.radius_scale)?;
        require_positive("dielectric", self.potential.dielectric)?;
        if self.initial_step > self.max_step {
            return Err(ConfigError::InvalidParameter {
                name: "initial_step",
                reason: format!(
                    "{} exceeds max_step {}",
                    self.initial_step, self.max_step
                ),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MinimizationConfigBuilder {
    max_iterations: Option<usize>,
    convergence_tolerance: Option<f64>,
    min_separation: Option<f64>,
    initial_step: Option<f64>,
    max_step: Option<f64>,
    max_displacement: Option<f64>,
    potential: Option<PotentialParams>,
}

impl MinimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = Some(tolerance);
        self
    }
    pub fn min_separation(mut self, distance: f64) -> Self {
        self.min_separation = Some(distance);
        self
    }
    pub fn initial_step(mut self, step: f64) -> Self {
        self.initial_step = Some(step);
        self
    }
    pub fn max_step(mut self, step: f64) -> Self {
        self.max_step = Some(step);
        self
    }
    pub fn max_displacement(mut self, distance: f64) -> Self {
        self.max_displacement = Some(distance);
        self
    }
    pub fn potential(mut self, params: PotentialParams) -> Self {
        self.potential = Some(params);
        self
    }

    pub fn build(self) -> Result<MinimizationConfig, ConfigError> {
        let defaults = MinimizationConfig::default();
        let config = MinimizationConfig {
            max_iterations: self
                .max_iterations
                .ok_or(ConfigError::MissingParameter("max_iterations"))?,
            convergence_tolerance: self
                .convergence_tolerance
                .ok_or(ConfigError::MissingParameter("convergence_tolerance"))?,
            min_separation: self.min_separation.unwrap_or(defaults.min_separation),
            initial_step: self.initial_step.unwrap_or(defaults.initial_step),
            max_step: self.max_step.unwrap_or(defaults.max_step),
            max_displacement: self.max_displacement.unwrap_or(defaults.max_displacement),
            potential: self.potential.unwrap_or(defaults.potential),
        };
        config.validate()?;
        Ok(config)
    }
}
