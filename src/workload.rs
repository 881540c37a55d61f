use std::fmt;
use std::mem::size_of;

use serde::Serialize;

use crate::error::{BenchError, Result};

/// Value stored by the many-small-objects shape.
pub type Value = u64;

/// One slot of the large container: an empty, pointer-sized reference.
pub type Slot<'r> = Option<&'r Value>;

pub const MIB: usize = 1 << 20;

/// Number of pointer-sized slots in one MiB: 2^17 on 64-bit targets.
pub const SLOTS_PER_MIB: usize = MIB / size_of::<Slot<'static>>();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// One contiguous slice of pointer-sized slots, `n` MiB long.
    LargeContainer,
    /// `n` independently allocated values.
    ManySmallObjects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every allocation comes from the global allocator and is freed by its own destructor.
    Heap,
    /// Allocations are carved from a region freed in one bulk operation.
    Region,
}

/// A benchmark case: a shape and its size parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Workload {
    pub shape: Shape,
    pub n: usize,
}

impl Workload {
    pub fn large_container(mib: usize) -> Self {
        Self { shape: Shape::LargeContainer, n: mib }
    }

    pub fn many_small_objects(items: usize) -> Self {
        Self { shape: Shape::ManySmallObjects, n: items }
    }

    /// Number of slots or objects the container holds.
    pub fn slot_count(&self) -> Result<usize> {
        match self.shape {
            Shape::LargeContainer => self.n.checked_mul(SLOTS_PER_MIB).ok_or(BenchError::CapacityOverflow),
            Shape::ManySmallObjects => Ok(self.n),
        }
    }

    /// Size with its unit, used to name benchmark cases: `100MiB`, `1000 items`.
    pub fn label(&self) -> String {
        match self.shape {
            Shape::LargeContainer => format!("{}MiB", self.n),
            Shape::ManySmallObjects => format!("{} items", self.n),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Heap => f.write_str("heap"),
            Strategy::Region => f.write_str("region"),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_pointer_sized() {
        assert_eq!(size_of::<Slot<'static>>(), size_of::<usize>());
        assert_eq!(size_of::<Option<Box<Value>>>(), size_of::<usize>());
        assert_eq!(SLOTS_PER_MIB * size_of::<usize>(), MIB);
    }

    #[test]
    fn large_container_is_n_mib() {
        let workload = Workload::large_container(10);
        assert_eq!(workload.slot_count().unwrap() * size_of::<usize>(), 10 * MIB);
        assert_eq!(workload.label(), "10MiB");
    }

    #[test]
    fn many_objects_len_is_item_count() {
        let workload = Workload::many_small_objects(1_000);
        assert_eq!(workload.slot_count(), Ok(1_000));
        assert_eq!(workload.to_string(), "1000 items");
    }

    #[test]
    fn oversized_workload_overflows() {
        let workload = Workload::large_container(usize::MAX);
        assert_eq!(workload.slot_count(), Err(BenchError::CapacityOverflow));
    }
}
