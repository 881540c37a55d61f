use std::alloc::{Layout, LayoutError};

pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised while building or measuring a workload.
///
/// Running out of memory is the only failure expected at runtime. The others reject
/// bad parameters before any memory is touched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BenchError {
    #[error("out of memory allocating {size} bytes (align {align})")]
    OutOfMemory { size: usize, align: usize },

    #[error("requested capacity overflows the address space")]
    CapacityOverflow,

    #[error("region block size must be greater than 0")]
    InvalidBlockSize,

    #[error("a run needs at least one repetition")]
    NoRepetitions,
}

impl BenchError {
    pub fn out_of_memory(layout: Layout) -> Self {
        Self::OutOfMemory { size: layout.size(), align: layout.align() }
    }
}

impl From<LayoutError> for BenchError {
    fn from(_: LayoutError) -> Self {
        Self::CapacityOverflow
    }
}
