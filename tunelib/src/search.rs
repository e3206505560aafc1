use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use crate::cache_spec::CacheSpec;
use crate::checkpoint::CheckpointStore;
use crate::config::DriverConfig;
use crate::error::SearchError;
use crate::evaluator::Evaluator;
use crate::generator::{CandidateGenerator, Strategy};
use crate::interrupt::Interrupt;

/// The best configuration found so far, and how long we've been looking
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SearchState {
    pub incumbent: CacheSpec,
    /// AAT of the incumbent
    pub score: f64,
    pub iterations: u64,
}

impl SearchState {
    pub fn new(incumbent: CacheSpec, score: f64) -> Self {
        Self { incumbent, score, iterations: 0 }
    }

    /// Replaces the incumbent if the candidate is strictly better. Ties keep the incumbent.
    pub fn offer(&mut self, candidate: CacheSpec, score: f64) -> bool {
        if score < self.score {
            self.incumbent = candidate;
            self.score = score;
            true
        } else {
            false
        }
    }
}

/// What happened in a single iteration
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Step {
    pub iteration: u64,
    pub strategy: Strategy,
    pub candidate: CacheSpec,
    pub score: f64,
    pub improved: bool,
}

/// Stochastic local search over cache configurations
///
/// Each iteration either permutes the incumbent or restarts from a random point, evaluates the
/// candidate, and keeps it if it beats the incumbent. The loop only ends when the interrupt is
/// raised, which is checked between iterations so a checkpoint never sees a half updated state.
pub struct Search<E: Evaluator, R: Rng> {
    generator: CandidateGenerator<R>,
    evaluator: E,
    store: CheckpointStore,
    interrupt: Interrupt,
    config: DriverConfig,
    state: SearchState,
}

impl<E: Evaluator, R: Rng> Search<E, R> {
    /// Sets up the starting incumbent
    ///
    /// The checkpoint is used if it holds a feasible spec, otherwise the configured default. Either
    /// way the incumbent is evaluated again, a stored score is never trusted.
    pub fn initialise(
        config: DriverConfig,
        generator: CandidateGenerator<R>,
        mut evaluator: E,
        store: CheckpointStore,
        interrupt: Interrupt,
    ) -> Self {
        let restored = store.load().and_then(|checkpoint| {
            match generator.feasibility().check(&checkpoint.spec) {
                Ok(_) => Some(checkpoint),
                Err(reason) => {
                    warn!(path = %store.path().display(), %reason, "Checkpointed spec is infeasible, starting from the default");
                    None
                }
            }
        });
        let incumbent = match restored {
            Some(checkpoint) => {
                info!(path = %store.path().display(), stale_score = ?checkpoint.score, "Restored checkpoint");
                checkpoint.spec
            }
            None => config.default_spec,
        };
        // An unmeasurable baseline still needs a score for candidates to beat
        let score = measure(&mut evaluator, &incumbent).unwrap_or(config.failure_score);
        info!(aat = score, "Baseline:\n{incumbent}");
        Self {
            generator,
            evaluator,
            store,
            interrupt,
            config,
            state: SearchState::new(incumbent, score),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Runs one iteration, checkpointing if it lands on the interval
    pub fn step(&mut self) -> Result<Step, SearchError> {
        let iteration = self.state.iterations;
        let strategy = self.generator.pick_strategy();
        info!(iteration, %strategy, "Generating candidate");
        let candidate = self.generator.generate(strategy, &self.state.incumbent)?;
        // A failed run is rejected outright, its sentinel is only reported
        let (aat, improved) = match measure(&mut self.evaluator, &candidate) {
            Some(aat) => (aat, self.state.offer(candidate, aat)),
            None => (self.config.failure_score, false),
        };
        if improved {
            info!(iteration, aat, "New best cache:\n{candidate}");
        }
        self.state.iterations += 1;
        if self.config.checkpoint_interval > 0 && self.state.iterations % self.config.checkpoint_interval == 0 {
            if let Err(e) = self.checkpoint() {
                warn!(error = %e, "Periodic checkpoint failed, continuing");
            }
        }
        Ok(Step { iteration, strategy, candidate, score: aat, improved })
    }

    /// Iterates until interrupted, then writes a final checkpoint
    ///
    /// If the generators give up, the incumbent is still checkpointed before the error is
    /// returned
    pub fn run(mut self) -> Result<SearchState, SearchError> {
        while !self.interrupt.is_raised() {
            if let Err(e) = self.step() {
                if let Err(save) = self.checkpoint() {
                    warn!(error = %save, "Final checkpoint failed");
                }
                return Err(e);
            }
        }
        info!(iterations = self.state.iterations, "Interrupted, saving the best configuration");
        self.checkpoint()?;
        Ok(self.state)
    }

    /// Writes the incumbent and its score to the store
    pub fn checkpoint(&self) -> Result<(), SearchError> {
        self.store
            .save(&self.state.incumbent, self.state.score)
            .map_err(|source| SearchError::Checkpoint { path: self.store.path().to_path_buf(), source })
    }
}

// Simulator failures never stop the search, they're logged and the caller decides what they cost
fn measure<E: Evaluator>(evaluator: &mut E, spec: &CacheSpec) -> Option<f64> {
    match evaluator.evaluate(spec) {
        Ok(aat) => Some(aat),
        Err(e) => {
            warn!(error = %e, "Evaluation failed for:\n{spec}");
            None
        }
    }
}
