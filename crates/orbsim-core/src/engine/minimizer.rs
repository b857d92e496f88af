use super::cancel::CancellationToken;
use super::config::MinimizationConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::energy::functional::{EnergyFunctional, EnergyState};
use crate::core::models::molecule::Molecule;
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, trace};

const STEP_GROWTH: f64 = 1.2;
const STEP_SHRINK: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimizerPhase {
    Initialized,
    Iterating,
    Paused,
    Converged,
    MaxIterationsReached,
    Cancelled,
}

impl MinimizerPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MinimizerPhase::Converged | MinimizerPhase::MaxIterationsReached | MinimizerPhase::Cancelled
        )
    }
}

/// What a finished (or paused) run looks like from the outside.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationReport {
    pub converged: bool,
    pub iterations_used: usize,
    pub final_energy: f64,
    /// Energy at the start followed by every accepted step.
    pub energy_trace: Vec<f64>,
}

/// Gradient descent on an [`EnergyFunctional`] with an adaptive step.
///
/// Each call to [`step`](Self::step) is one iteration. A proposal moves every atom against
/// its gradient, capped at `max_displacement`. Proposals that bring two atoms closer than
/// `min_separation`, or that fail to lower the energy, are rejected and halve the step;
/// accepted proposals grow it up to `max_step`. Rejections still count as iterations.
#[derive(Debug, Clone)]
pub struct EnergyMinimizer {
    functional: EnergyFunctional,
    config: MinimizationConfig,
    molecule: Molecule,
    positions: Vec<Point3<f64>>,
    state: EnergyState,
    step_size: f64,
    iteration: usize,
    phase: MinimizerPhase,
    energy_trace: Vec<f64>,
}

impl EnergyMinimizer {
    /// Fails with `InvalidGeometry` if the starting molecule already violates the minimum
    /// separation.
    pub fn new(molecule: &Molecule, config: MinimizationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        molecule.check_separation(config.min_separation)?;
        let functional = EnergyFunctional::new(molecule, config.potential);
        let positions = molecule.positions();
        let state = functional.evaluate(&positions);
        debug!(
            atoms = positions.len(),
            energy = state.energy,
            max_gradient = state.max_gradient_norm(),
            "Minimizer initialized."
        );
        Ok(Self {
            functional,
            step_size: config.initial_step,
            energy_trace: vec![state.energy],
            config,
            molecule: molecule.clone(),
            positions,
            state,
            iteration: 0,
            phase: MinimizerPhase::Initialized,
        })
    }

    pub fn phase(&self) -> MinimizerPhase {
        self.phase
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn energy(&self) -> f64 {
        self.state.energy
    }

    pub fn state(&self) -> &EnergyState {
        &self.state
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn energy_trace(&self) -> &[f64] {
        &self.energy_trace
    }

    pub fn config(&self) -> &MinimizationConfig {
        &self.config
    }

    /// The starting molecule moved to the current positions.
    pub fn molecule(&self) -> Result<Molecule, EngineError> {
        let mut molecule = self.molecule.clone();
        molecule.set_positions(&self.positions)?;
        Ok(molecule)
    }

    pub fn report(&self) -> MinimizationReport {
        MinimizationReport {
            converged: self.phase == MinimizerPhase::Converged,
            iterations_used: self.iteration,
            final_energy: self.state.energy,
            energy_trace: self.energy_trace.clone(),
        }
    }

    /// Suspends a running minimizer. No effect once terminal.
    pub fn pause(&mut self) {
        if matches!(self.phase, MinimizerPhase::Initialized | MinimizerPhase::Iterating) {
            self.phase = MinimizerPhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == MinimizerPhase::Paused {
            self.phase = if self.iteration == 0 {
                MinimizerPhase::Initialized
            } else {
                MinimizerPhase::Iterating
            };
        }
    }

    pub fn cancel(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = MinimizerPhase::Cancelled;
        }
    }

    /// Advances by one iteration and returns the new phase. Paused and terminal minimizers
    /// are left untouched.
    pub fn step(&mut self) -> MinimizerPhase {
        match self.phase {
            MinimizerPhase::Initialized | MinimizerPhase::Iterating => {}
            _ => return self.phase,
        }
        if self.iteration >= self.config.max_iterations {
            self.phase = MinimizerPhase::MaxIterationsReached;
            return self.phase;
        }
        if self.state.max_gradient_norm() < self.config.convergence_tolerance {
            self.phase = MinimizerPhase::Converged;
            return self.phase;
        }

        self.phase = MinimizerPhase::Iterating;
        self.iteration += 1;
        self.attempt();

        if self.state.max_gradient_norm() < self.config.convergence_tolerance {
            self.phase = MinimizerPhase::Converged;
        } else if self.iteration >= self.config.max_iterations {
            self.phase = MinimizerPhase::MaxIterationsReached;
        }
        self.phase
    }

    fn attempt(&mut self) {
        let trial: Vec<Point3<f64>> = self
            .positions
            .iter()
            .zip(&self.state.gradient)
            .map(|(p, g)| p + self.displacement(g))
            .collect();

        let closest = closest_distance(&trial);
        if closest.is_some_and(|d| d < self.config.min_separation) {
            trace!(iteration = self.iteration, distance = ?closest, "Step rejected: atoms too close.");
            self.step_size *= STEP_SHRINK;
            return;
        }

        let trial_state = self.functional.evaluate(&trial);
        if trial_state.energy < self.state.energy {
            trace!(
                iteration = self.iteration,
                energy = trial_state.energy,
                step = self.step_size,
                "Step accepted."
            );
            self.positions = trial;
            self.energy_trace.push(trial_state.energy);
            self.state = trial_state;
            self.step_size = (self.step_size * STEP_GROWTH).min(self.config.max_step);
        } else {
            trace!(
                iteration = self.iteration,
                trial_energy = trial_state.energy,
                "Step rejected: energy did not decrease."
            );
            self.step_size *= STEP_SHRINK;
        }
    }

    fn displacement(&self, gradient: &Vector3<f64>) -> Vector3<f64> {
        let delta = -gradient * self.step_size;
        let length = delta.norm();
        if length > self.config.max_displacement {
            delta * (self.config.max_displacement / length)
        } else {
            delta
        }
    }

    /// Steps until a terminal phase, checking `cancel` before every iteration. A paused
    /// minimizer is resumed first.
    pub fn run(
        &mut self,
        cancel: &CancellationToken,
        reporter: &ProgressReporter,
    ) -> Result<MinimizationReport, EngineError> {
        self.resume();
        reporter.report(Progress::PhaseStart {
            name: "Energy Minimization",
        });
        reporter.report(Progress::TaskStart {
            total_steps: self.config.max_iterations as u64,
        });

        while !self.phase.is_terminal() {
            if cancel.is_cancelled() {
                self.cancel();
                break;
            }
            self.step();
            reporter.report(Progress::TaskIncrement);
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        if self.phase == MinimizerPhase::Cancelled {
            info!(iterations = self.iteration, "Minimization cancelled.");
            return Err(EngineError::Cancelled);
        }
        let report = self.report();
        info!(
            converged = report.converged,
            iterations = report.iterations_used,
            energy = report.final_energy,
            "Minimization finished."
        );
        Ok(report)
    }
}

fn closest_distance(positions: &[Point3<f64>]) -> Option<f64> {
    let mut best: Option<f64> = None;
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            let d = (a - b).norm();
            if best.is_none_or(|current| d < current) {
                best = Some(d);
            }
        }
    }
    best
}
