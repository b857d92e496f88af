use super::cancel::CancellationToken;
use super::config::ConfigError;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::orbitals::angular::AngularBasis;
use crate::core::orbitals::field::{FieldMode, FieldSample, FieldValues, Orbital, sanitize};
use crate::core::orbitals::grid::Grid;
use crate::core::orbitals::quantum::OrbitalSpec;
use crate::core::orbitals::scene::Scene;
use nalgebra::Point3;
use num_complex::Complex64;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Samples orbitals and scenes over a grid, one z-slab at a time.
///
/// Cancellation is checked before every slab; a cancelled run returns
/// [`EngineError::Cancelled`] and discards whatever was already computed. With the
/// `parallel` feature, slabs are distributed across the rayon pool and reassembled in order,
/// so the result is identical to the sequential one.
pub struct OrbitalFieldEvaluator<'a> {
    basis: AngularBasis,
    cancel: CancellationToken,
    reporter: Option<&'a ProgressReporter<'a>>,
}

impl Default for OrbitalFieldEvaluator<'_> {
    fn default() -> Self {
        Self {
            basis: AngularBasis::default(),
            cancel: CancellationToken::new(),
            reporter: None,
        }
    }
}

impl<'a> OrbitalFieldEvaluator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basis(mut self, basis: AngularBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_reporter(mut self, reporter: &'a ProgressReporter<'a>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn basis(&self) -> AngularBasis {
        self.basis
    }

    /// Samples the neutral-atom orbital `spec` on a cube of half-width `extent` around `center`.
    pub fn evaluate(
        &self,
        spec: &OrbitalSpec,
        center: Point3<f64>,
        extent: f64,
        resolution: [usize; 3],
        mode: FieldMode,
    ) -> Result<FieldSample, EngineError> {
        let orbital = Orbital::neutral(*spec, center, self.basis);
        self.evaluate_orbital(&orbital, extent, resolution, mode)
    }

    /// Samples an already placed orbital, keeping its effective charge.
    pub fn evaluate_orbital(
        &self,
        orbital: &Orbital,
        extent: f64,
        resolution: [usize; 3],
        mode: FieldMode,
    ) -> Result<FieldSample, EngineError> {
        if !(extent.is_finite() && extent > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "extent",
                reason: format!("must be a finite number greater than 0, got {extent}"),
            }
            .into());
        }
        validate_resolution(resolution)?;
        debug!(orbital = %orbital.spec(), z_eff = orbital.effective_charge(), extent, "Sampling orbital.");
        let grid = Grid::cube(orbital.center(), extent, resolution);
        self.sample(grid, mode, |p| orbital.amplitude(p))
    }

    /// Samples a combined scene on the box returned by [`Scene::bounds`].
    pub fn evaluate_scene(
        &self,
        scene: &Scene,
        resolution: [usize; 3],
        mode: FieldMode,
    ) -> Result<FieldSample, EngineError> {
        validate_resolution(resolution)?;
        let (min, max) = scene.bounds();
        debug!(
            orbitals = scene.orbitals().len(),
            combination = ?scene.combination(),
            mix = scene.hybrid_mix(),
            "Sampling scene."
        );
        let grid = Grid::from_bounds(min, max, resolution);
        self.sample(grid, mode, |p| scene.amplitude(p))
    }

    /// Evaluates `amplitude` at every grid point.
    #[instrument(level = "debug", skip_all, fields(resolution = ?grid.resolution(), mode = ?mode))]
    pub fn sample<F>(&self, grid: Grid, mode: FieldMode, amplitude: F) -> Result<FieldSample, EngineError>
    where
        F: Fn(&Point3<f64>) -> Complex64 + Sync,
    {
        let [_, _, nz] = grid.resolution();
        self.report(Progress::PhaseStart { name: "Field Sampling" });
        self.report(Progress::TaskStart {
            total_steps: nz as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let slabs = 0..nz;

        #[cfg(feature = "parallel")]
        let slabs = (0..nz).into_par_iter();

        let slabs: Result<Vec<Vec<Complex64>>, EngineError> = slabs
            .map(|iz| {
                self.cancel.check()?;
                let slab = sample_slab(&grid, iz, &amplitude);
                self.report(Progress::TaskIncrement);
                Ok(slab)
            })
            .collect();

        self.report(Progress::TaskFinish);
        let slabs = match slabs {
            Ok(slabs) => slabs,
            Err(err) => {
                debug!("Field sampling cancelled.");
                self.report(Progress::PhaseFinish);
                return Err(err);
            }
        };

        let amplitudes = slabs.into_iter().flatten();
        let values = match mode {
            FieldMode::Wavefunction => FieldValues::Wavefunction(amplitudes.collect()),
            FieldMode::Density => FieldValues::Density(amplitudes.map(|a| a.norm_sqr()).collect()),
        };
        let points = grid.len();
        let sample = FieldSample::new(grid, values).ok_or_else(|| {
            EngineError::Internal(format!("sampled value count does not match {points} grid points"))
        })?;
        self.report(Progress::PhaseFinish);
        Ok(sample)
    }

    fn report(&self, event: Progress) {
        if let Some(reporter) = self.reporter {
            reporter.report(event);
        }
    }
}

fn validate_resolution(resolution: [usize; 3]) -> Result<(), ConfigError> {
    if resolution.contains(&0) {
        return Err(ConfigError::InvalidParameter {
            name: "resolution",
            reason: format!("every axis needs at least 1 sample, got {resolution:?}"),
        });
    }
    Ok(())
}

fn sample_slab<F>(grid: &Grid, iz: usize, amplitude: &F) -> Vec<Complex64>
where
    F: Fn(&Point3<f64>) -> Complex64,
{
    let [nx, ny, _] = grid.resolution();
    let mut slab = Vec::with_capacity(nx * ny);
    for iy in 0..ny {
        for ix in 0..nx {
            slab.push(sanitize(amplitude(&grid.point(ix, iy, iz))));
        }
    }
    slab
}
