use crate::region::DEFAULT_BLOCK_SIZE;

/// Knobs shared by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Repetitions per workload size.
    pub repetitions: u64,
    /// Size of each region block in bytes.
    pub block_size: usize,
    /// Largest size parameter to run, if any.
    pub max_size: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { repetitions: 10, block_size: DEFAULT_BLOCK_SIZE, max_size: None }
    }
}

impl RunnerConfig {
    pub fn with_repetitions(mut self, repetitions: u64) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size;
        self
    }
}
