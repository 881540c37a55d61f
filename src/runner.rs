//! Runs trials of a workload and aggregates their measurements.

use std::sync::atomic::{compiler_fence, fence, Ordering};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::config::RunnerConfig;
use crate::container::Container;
use crate::counting::{AllocDelta, AllocStats};
use crate::error::{BenchError, Result};
use crate::region::Region;
use crate::workload::{Strategy, Workload};

/// Synchronization point separating construction from release.
///
/// Memory is reclaimed by ownership rather than a collector, so there is no cycle to force; the
/// fences only keep the compiler and CPU from moving work across the timing boundary.
#[inline]
pub fn collection_barrier() {
    compiler_fence(Ordering::SeqCst);
    fence(Ordering::SeqCst);
}

/// Measurements of one repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialResult {
    /// Time spent in the barrier and the release of the container.
    pub elapsed: Duration,
    pub bytes: u64,
    pub allocations: u64,
}

/// Sum of every recorded trial of one workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialSummary {
    pub workload: Workload,
    pub strategy: Strategy,
    pub repetitions: u64,
    pub total_elapsed: Duration,
    pub total_bytes: u64,
    pub total_allocations: u64,
}

impl TrialSummary {
    pub fn new(workload: Workload, strategy: Strategy) -> Self {
        Self {
            workload,
            strategy,
            repetitions: 0,
            total_elapsed: Duration::ZERO,
            total_bytes: 0,
            total_allocations: 0,
        }
    }

    pub fn record(&mut self, trial: TrialResult) {
        self.repetitions += 1;
        self.total_elapsed += trial.elapsed;
        self.total_bytes += trial.bytes;
        self.total_allocations += trial.allocations;
    }

    pub fn ns_per_op(&self) -> u128 {
        match self.repetitions {
            0 => 0,
            n => self.total_elapsed.as_nanos() / u128::from(n),
        }
    }

    pub fn bytes_per_op(&self) -> u64 {
        self.total_bytes.checked_div(self.repetitions).unwrap_or(0)
    }

    pub fn allocs_per_op(&self) -> u64 {
        self.total_allocations.checked_div(self.repetitions).unwrap_or(0)
    }
}

pub struct Runner<'s> {
    config: RunnerConfig,
    stats: &'s dyn AllocStats,
}

impl<'s> Runner<'s> {
    pub fn new(config: RunnerConfig, stats: &'s dyn AllocStats) -> Self {
        Self { config, stats }
    }

    /// Run `repetitions` trials back to back and sum their results.
    ///
    /// Stops at the first failed trial; a partial summary is never returned.
    pub fn run(&self, workload: Workload, strategy: Strategy, repetitions: u64) -> Result<TrialSummary> {
        self.run_measured(workload, strategy, repetitions, || ())
    }

    /// Like [`Runner::run`], holding the guard returned by `span` for the whole of each trial.
    pub fn run_measured<G>(
        &self,
        workload: Workload,
        strategy: Strategy,
        repetitions: u64,
        mut span: impl FnMut() -> G,
    ) -> Result<TrialSummary> {
        if repetitions == 0 {
            return Err(BenchError::NoRepetitions);
        }

        let mut summary = TrialSummary::new(workload, strategy);
        for _ in 0..repetitions {
            let _span = span();
            summary.record(self.trial(workload, strategy)?);
        }

        debug!(
            "{} {}: {} reps, {} ns/op, {} B/op, {} allocs/op",
            strategy,
            workload,
            summary.repetitions,
            summary.ns_per_op(),
            summary.bytes_per_op(),
            summary.allocs_per_op()
        );
        Ok(summary)
    }

    /// One repetition: build the container untimed, then time the barrier and the release.
    pub fn trial(&self, workload: Workload, strategy: Strategy) -> Result<TrialResult> {
        let (elapsed, counted) = match strategy {
            Strategy::Heap => {
                let (container, counted) = Container::build(workload, None, self.stats)?;

                let start = Instant::now();
                collection_barrier();
                drop(container);
                (start.elapsed(), counted)
            }
            Strategy::Region => {
                let region = Region::with_block_size(self.config.block_size)?;
                let (container, counted) = Container::build(workload, Some(&region), self.stats)?;

                let start = Instant::now();
                collection_barrier();
                drop(container);
                let freed = region.free();
                let elapsed = start.elapsed();
                trace!("{} freed with {} blocks", workload, freed.blocks);
                (elapsed, counted)
            }
        };
        collection_barrier();

        Ok(trial_result(elapsed, counted))
    }
}

fn trial_result(elapsed: Duration, counted: AllocDelta) -> TrialResult {
    TrialResult { elapsed, bytes: counted.bytes, allocations: counted.allocations }
}
