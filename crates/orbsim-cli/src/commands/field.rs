use super::{parse_element, run_cancellable};
use crate::cli::FieldArgs;
use crate::config::{FieldSettings, PartialConfig};
use crate::error::{CliError, Result};
use crate::input::load_model;
use crate::utils::progress::CliProgressHandler;
use orbsim::core::models::molecule::Molecule;
use orbsim::core::orbitals::aufbau::ElectronConfiguration;
use orbsim::core::orbitals::field::FieldSample;
use orbsim::core::orbitals::quantum::{OrbitalSpec, QuantumNumberTable};
use orbsim::core::orbitals::scene::Combination;
use orbsim::engine::progress::ProgressReporter;
use orbsim::workflows::field::{self, FieldSummary};
use tracing::{info, warn};

const DEFAULT_SCENE_MIX: f64 = 1.0;

pub async fn run(args: FieldArgs, quiet: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let settings = PartialConfig::load(args.config.as_deref())?.merge_field_args(&args)?;
    let model = load_model(&args.source, settings.constraints)?;

    let progress = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let callback = progress.get_callback();
    let field_config = settings.field.clone();

    let (label, sample) = match args.scene {
        Some(kind) => {
            let model = model.ok_or_else(|| {
                CliError::Argument("--scene needs a molecule from --input, --preset or --formula".to_string())
            })?;
            let combination = Combination::from(kind);
            let mix = args.mix.unwrap_or(DEFAULT_SCENE_MIX);
            let label = format!("{:?} scene of {} atoms", combination, model.len());
            let sample = run_cancellable(move |cancel| {
                let reporter = ProgressReporter::with_callback(callback);
                field::evaluate_scene(&model, combination, mix, &field_config, &cancel, &reporter)
            })
            .await;
            (label, sample)
        }
        None => {
            let spec = resolve_spec(&args)?;
            let molecule = model
                .map(|m| m.molecule().clone())
                .unwrap_or_else(Molecule::new);
            let sample = run_cancellable(move |cancel| {
                let reporter = ProgressReporter::with_callback(callback);
                field::evaluate_field(&spec, &molecule, &field_config, &cancel, &reporter)
            })
            .await;
            (spec.to_string(), sample)
        }
    };
    let sample = match sample {
        Ok(sample) => sample,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };

    let colors = field::colorize(&sample, &settings.colormap)?;
    let summary = field::summarize(&sample, settings.iso_fraction, settings.iso_levels);
    print_summary(&label, &sample, &settings, colors.visible_count(), &summary);
    Ok(())
}

/// The orbital named on the command line. Missing quantum numbers fall back to the element's
/// highest occupied orbital (or to `l = 0`, `m = 0` once `n` is given).
fn resolve_spec(args: &FieldArgs) -> Result<OrbitalSpec> {
    let symbol = args.element.as_deref().ok_or_else(|| {
        CliError::Argument("Specify an orbital with --element or a combined field with --scene".to_string())
    })?;
    let element = parse_element(symbol)?;
    let (n, l, m) = match args.n {
        Some(n) => (n, args.l.unwrap_or(0), args.m.unwrap_or(0)),
        None => ElectronConfiguration::ground_state(element.atomic_number as u32)
            .default_orbital()
            .unwrap_or((1, 0, 0)),
    };
    let (n, l, m) = if args.clamp {
        let clamped = QuantumNumberTable::normalize(n as i32, l as i32, m as i32);
        if clamped != (n, l, m) {
            warn!(
                "Clamped (n={}, l={}, m={}) to (n={}, l={}, m={})",
                n, l, m, clamped.0, clamped.1, clamped.2
            );
        }
        clamped
    } else {
        (n, l, m)
    };
    Ok(OrbitalSpec::new(element.atomic_number, n, l, m).map_err(orbsim::engine::error::EngineError::from)?)
}

fn print_summary(
    label: &str,
    sample: &FieldSample,
    settings: &FieldSettings,
    visible: usize,
    summary: &FieldSummary,
) {
    let [nx, ny, nz] = summary.dimensions;
    println!("Field: {}", label);
    println!(
        "  Grid:               {} x {} x {} ({:?}, {:?} basis)",
        nx, ny, nz, settings.field.mode, settings.field.basis
    );
    println!("  Max |psi|:          {:.6e}", summary.max_magnitude);
    println!("  Integrated density: {:.4}", summary.integrated_density);
    println!(
        "  Colormap:           {} ({} of {} samples visible)",
        settings.colormap.colormap.name(),
        visible,
        sample.len()
    );
    if summary.iso_levels.is_empty() {
        return;
    }
    println!("  Iso-levels (enclosed probability -> density):");
    for level in &summary.iso_levels {
        println!("    {:>5.1}%  {:.6e}", level.fraction * 100.0, level.value);
    }
}
