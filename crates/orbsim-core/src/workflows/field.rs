use crate::core::colormap::mapper::{ColorField, PhaseColormapper};
use crate::core::models::molecule::Molecule;
use crate::core::orbitals::field::{FieldSample, Orbital};
use crate::core::orbitals::isosurface::{IsoLevel, enclosed_probability_levels};
use crate::core::orbitals::quantum::OrbitalSpec;
use crate::core::orbitals::scene::Combination;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::{ColormapConfig, FieldConfig};
use crate::engine::error::EngineError;
use crate::engine::evaluator::OrbitalFieldEvaluator;
use crate::engine::model::MoleculeModel;
use crate::engine::progress::ProgressReporter;
use nalgebra::Point3;
use tracing::{info, instrument};

/// Samples `spec` around its atom in `molecule`.
///
/// The orbital sits on the first atom of its element and is sized for that atom's
/// ionization. Without such an atom it is placed, neutral, at the molecule's centroid (the
/// origin for an empty molecule).
#[instrument(skip_all, name = "evaluate_field", fields(orbital = %spec))]
pub fn evaluate_field(
    spec: &OrbitalSpec,
    molecule: &Molecule,
    config: &FieldConfig,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> Result<FieldSample, EngineError> {
    config.validate()?;
    let host = molecule
        .atoms_iter()
        .find(|(_, atom)| atom.atomic_number() == spec.atomic_number());
    let orbital = match host {
        Some((_, atom)) => Orbital::new(*spec, atom.position, atom.electron_count(), config.basis),
        None => {
            let center = molecule.centroid().unwrap_or_else(Point3::origin);
            Orbital::neutral(*spec, center, config.basis)
        }
    };
    let extent = config.extent.unwrap_or_else(|| orbital.default_extent());
    info!(
        z_eff = orbital.effective_charge(),
        extent,
        resolution = ?config.resolution,
        "Evaluating orbital field."
    );
    OrbitalFieldEvaluator::new()
        .with_basis(config.basis)
        .with_cancellation(cancel.clone())
        .with_reporter(reporter)
        .evaluate_orbital(&orbital, extent, config.resolution, config.mode)
}

/// Samples every atom's orbital of `model` combined into one field.
#[instrument(skip_all, name = "evaluate_scene", fields(combination = ?combination))]
pub fn evaluate_scene(
    model: &MoleculeModel,
    combination: Combination,
    hybrid_mix: f64,
    config: &FieldConfig,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> Result<FieldSample, EngineError> {
    config.validate()?;
    let scene = model.scene(combination, hybrid_mix, config.basis)?;
    info!(orbitals = scene.orbitals().len(), mix = scene.hybrid_mix(), "Evaluating scene field.");
    OrbitalFieldEvaluator::new()
        .with_basis(config.basis)
        .with_cancellation(cancel.clone())
        .with_reporter(reporter)
        .evaluate_scene(&scene, config.resolution, config.mode)
}

/// Colors a sampled field with the configured colormap and opacity curve.
pub fn colorize(sample: &FieldSample, config: &ColormapConfig) -> Result<ColorField, EngineError> {
    config.opacity_curve.validate()?;
    let mapper = PhaseColormapper::new(config.colormap.clone(), config.opacity_curve.clone());
    Ok(mapper.colorize(sample))
}

/// Headline numbers of a sampled field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub dimensions: [usize; 3],
    pub max_magnitude: f64,
    /// Sum of the density samples times the voxel volume; approaches 1 for a grid that
    /// covers the whole orbital.
    pub integrated_density: f64,
    pub iso_levels: Vec<IsoLevel>,
}

pub fn summarize(sample: &FieldSample, max_fraction: f64, iso_count: usize) -> FieldSummary {
    let voxel: f64 = sample
        .grid()
        .spacing()
        .iter()
        .map(|&s| if s > 0.0 { s } else { 1.0 })
        .product();
    let integrated_density = sample.density().iter().sum::<f64>() * voxel;
    FieldSummary {
        dimensions: sample.dimensions(),
        max_magnitude: sample.max_magnitude(),
        integrated_density,
        iso_levels: enclosed_probability_levels(sample, max_fraction, iso_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colormap::opacity::OpacityCurve;
    use crate::core::models::atom::Atom;
    use crate::core::orbitals::field::FieldMode;
    use crate::engine::config::{ColormapConfigBuilder, FieldConfigBuilder, GeometryConstraints};

    fn density_config(samples: usize) -> FieldConfig {
        FieldConfigBuilder::new()
            .uniform_resolution(samples)
            .mode(FieldMode::Density)
            .build()
            .unwrap()
    }

    #[test]
    fn field_is_centered_on_the_matching_atom() {
        let mut molecule = Molecule::new();
        molecule
            .add_atom(Atom::new(1, Point3::new(2.0, 0.0, 0.0)).unwrap(), 0.4)
            .unwrap();
        molecule
            .add_atom(Atom::new(8, Point3::new(-1.0, 1.0, 0.0)).unwrap(), 0.4)
            .unwrap();
        let spec = OrbitalSpec::new(8, 2, 1, 0).unwrap();
        let sample = evaluate_field(
            &spec,
            &molecule,
            &density_config(5),
            &CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(sample.grid().center(), Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(sample.dimensions(), [5, 5, 5]);
    }

    #[test]
    fn unmatched_orbital_sits_at_the_origin_of_an_empty_molecule() {
        let spec = OrbitalSpec::new(1, 1, 0, 0).unwrap();
        let sample = evaluate_field(
            &spec,
            &Molecule::new(),
            &density_config(3),
            &CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(sample.grid().center(), Point3::origin());
    }

    #[test]
    fn hydrogen_density_integrates_close_to_one() {
        let spec = OrbitalSpec::new(1, 1, 0, 0).unwrap();
        let config = FieldConfigBuilder::new()
            .uniform_resolution(61)
            .extent(5.0)
            .mode(FieldMode::Density)
            .build()
            .unwrap();
        let sample = evaluate_field(
            &spec,
            &Molecule::new(),
            &config,
            &CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let summary = summarize(&sample, 0.9, 3);
        assert!((summary.integrated_density - 1.0).abs() < 0.05, "{}", summary.integrated_density);
        assert_eq!(summary.iso_levels.len(), 3);
    }

    #[test]
    fn colorize_produces_one_color_per_sample() {
        let spec = OrbitalSpec::new(6, 2, 1, 1).unwrap();
        let config = FieldConfigBuilder::new()
            .uniform_resolution(6)
            .build()
            .unwrap();
        let sample = evaluate_field(
            &spec,
            &Molecule::new(),
            &config,
            &CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let colors = colorize(
            &sample,
            &ColormapConfigBuilder::new()
                .colormap_name("hsv")
                .opacity_curve(OpacityCurve::Power { gamma: 2.0 })
                .build()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(colors.len(), sample.len());
        assert!(colors.samples().iter().all(|c| (0.0..=1.0).contains(&c.opacity)));
    }

    #[test]
    fn colorize_rejects_an_invalid_curve() {
        let sample = evaluate_field(
            &OrbitalSpec::new(1, 1, 0, 0).unwrap(),
            &Molecule::new(),
            &density_config(2),
            &CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let config = ColormapConfig {
            opacity_curve: OpacityCurve::Power { gamma: -1.0 },
            ..ColormapConfig::default()
        };
        assert!(matches!(colorize(&sample, &config), Err(EngineError::OpacityCurve(_))));
    }

    #[test]
    fn scene_of_preset_is_sampled_on_shared_grid() {
        let model = MoleculeModel::from_preset(
            crate::core::models::presets::Preset::find("h2").unwrap(),
            GeometryConstraints::default(),
        )
        .unwrap();
        let sample = evaluate_scene(
            &model,
            Combination::Antibonding,
            1.0,
            &density_config(7),
            &CancellationToken::new(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(sample.dimensions(), [7, 7, 7]);
        // The nodal plane of the antibonding pair passes through the center sample.
        let grid = sample.grid();
        let center = grid.index(3, 3, 3);
        assert!(sample.density()[center] < 1e-12);
    }
}
