use super::run_cancellable;
use crate::cli::MinimizeArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::input::{load_model, write_molecule};
use crate::utils::progress::CliProgressHandler;
use orbsim::engine::config::GeometryConstraints;
use orbsim::engine::progress::ProgressReporter;
use orbsim::workflows::minimize::{self, MinimizationResult};
use tracing::{info, warn};

pub async fn run(args: MinimizeArgs, quiet: bool) -> Result<()> {
    if !args.source.is_given() {
        return Err(CliError::Argument(
            "minimize needs a molecule from --input, --preset or --formula".to_string(),
        ));
    }

    info!("Merging configuration from file and CLI arguments...");
    let config = PartialConfig::load(args.config.as_deref())?.merge_minimize_args(&args)?;
    let constraints = GeometryConstraints {
        min_separation: config.min_separation,
        ..GeometryConstraints::default()
    };
    let model = load_model(&args.source, constraints)?
        .ok_or_else(|| CliError::Argument("No molecule was loaded".to_string()))?;
    let molecule = model.molecule().clone();

    let progress = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let callback = progress.get_callback();

    println!("Relaxing {} atoms...", molecule.len());
    let result = run_cancellable(move |cancel| {
        let reporter = ProgressReporter::with_callback(callback);
        minimize::minimize_energy(&molecule, &config, &cancel, &reporter)
    })
    .await;
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };

    print_result(&result);
    if !result.converged {
        warn!(
            "Minimization stopped after {} iterations without converging.",
            result.iterations_used
        );
    }
    if let Some(path) = &args.output {
        write_molecule(path, &result.molecule)?;
        println!("Relaxed geometry written to: {}", path.display());
    }
    Ok(())
}

fn print_result(result: &MinimizationResult) {
    let status = if result.converged {
        "converged"
    } else {
        "not converged"
    };
    let initial = result.energy_trace.first().copied().unwrap_or(result.final_energy);
    println!(
        "Minimization {} after {} iterations.",
        status, result.iterations_used
    );
    println!(
        "  Energy: {:.4} -> {:.4} kcal/mol ({} accepted steps)",
        initial,
        result.final_energy,
        result.energy_trace.len().saturating_sub(1)
    );
    for (_, atom) in result.molecule.atoms_iter() {
        println!(
            "  {:<2} {:>10.4} {:>10.4} {:>10.4}",
            atom.element().symbol,
            atom.position.x,
            atom.position.y,
            atom.position.z
        );
    }
}
