//! Heap versus region allocation benchmarks for two workload shapes: one very large slice, and
//! many individually allocated small values.

pub mod block;

mod block_list;

mod region;
pub use region::*;

mod region_box;
pub use region_box::*;

mod region_trait;
pub use region_trait::*;

pub mod config;
pub mod container;
pub mod counting;
pub mod error;
pub mod report;
pub mod runner;
pub mod suite;
pub mod workload;

pub use block::Block;
pub use error::{BenchError, Result};
pub use runner::{Runner, TrialResult, TrialSummary};
pub use workload::{Shape, Strategy, Workload};
