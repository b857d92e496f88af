use crate::core::models::molecule::Molecule;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::MinimizationConfig;
use crate::engine::error::EngineError;
use crate::engine::minimizer::EnergyMinimizer;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct MinimizationResult {
    /// The input molecule at the final positions. Best effort when not converged.
    pub molecule: Molecule,
    pub converged: bool,
    pub iterations_used: usize,
    pub final_energy: f64,
    pub energy_trace: Vec<f64>,
}

/// Relaxes `molecule` under the simplified pair potential.
///
/// Non-convergence is reported through [`MinimizationResult::converged`], not as an error.
/// A cancelled run returns [`EngineError::Cancelled`] and no geometry.
#[instrument(skip_all, name = "minimize_energy", fields(atoms = molecule.len()))]
pub fn minimize_energy(
    molecule: &Molecule,
    config: &MinimizationConfig,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
) -> Result<MinimizationResult, EngineError> {
    info!(
        max_iterations = config.max_iterations,
        tolerance = config.convergence_tolerance,
        "Starting energy minimization."
    );
    let mut minimizer = EnergyMinimizer::new(molecule, config.clone())?;
    let report = minimizer.run(cancel, reporter)?;
    Ok(MinimizationResult {
        molecule: minimizer.molecule()?,
        converged: report.converged,
        iterations_used: report.iterations_used,
        final_energy: report.final_energy,
        energy_trace: report.energy_trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::presets::Preset;
    use crate::engine::config::MinimizationConfigBuilder;
    use crate::engine::progress::Progress;
    use std::sync::Mutex;

    #[test]
    fn preset_water_relaxes_without_breaking_separation() {
        let molecule = Preset::find("h2o").unwrap().to_molecule(0.4).unwrap();
        let config = MinimizationConfigBuilder::new()
            .max_iterations(300)
            .convergence_tolerance(0.01)
            .build()
            .unwrap();
        let result = minimize_energy(&molecule, &config, &CancellationToken::new(), &ProgressReporter::new())
            .unwrap();
        assert!(result.iterations_used <= 300);
        assert!(result.final_energy <= result.energy_trace[0]);
        assert!(result.molecule.check_separation(config.min_separation).is_ok());
        assert_eq!(result.molecule.len(), molecule.len());
    }

    #[test]
    fn zero_iterations_return_the_input_geometry() {
        let molecule = Preset::find("co2").unwrap().to_molecule(0.4).unwrap();
        let config = MinimizationConfigBuilder::new()
            .max_iterations(0)
            .convergence_tolerance(1e-6)
            .build()
            .unwrap();
        let result = minimize_energy(&molecule, &config, &CancellationToken::new(), &ProgressReporter::new())
            .unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations_used, 0);
        assert_eq!(result.molecule.positions(), molecule.positions());
    }

    #[test]
    fn cancelled_run_yields_no_result() {
        let molecule = Preset::find("ch4").unwrap().to_molecule(0.4).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result = minimize_energy(&molecule, &MinimizationConfig::default(), &token, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }

    #[test]
    fn progress_phase_is_reported() {
        let molecule = Preset::find("hf").unwrap().to_molecule(0.4).unwrap();
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        minimize_energy(&molecule, &MinimizationConfig::default(), &CancellationToken::new(), &reporter)
            .unwrap();
        drop(reporter);
        assert_eq!(phases.into_inner().unwrap(), vec!["Energy Minimization"]);
    }
}
