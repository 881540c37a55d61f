//! The data structure a trial builds, one variant per shape and strategy.

use std::alloc::Layout;
use std::hint::black_box;

use crate::counting::{AllocDelta, AllocStats};
use crate::error::{BenchError, Result};
use crate::region::Region;
use crate::workload::{Shape, Slot, Strategy, Value, Workload};
use crate::{RegionAllocator, RegionBox, RegionSlice};

pub enum Container<'r> {
    /// One slice of empty slots from the global allocator.
    HeapSlots(Vec<Option<Box<Value>>>),
    /// One slice of empty slots carved from a region.
    RegionSlots(RegionSlice<'r, Slot<'r>>),
    /// Independently boxed values.
    HeapObjects(Vec<Box<Value>>),
    /// Values carved one at a time from a region.
    RegionObjects(Vec<RegionBox<'r, Value>>),
}

impl<'r> Container<'r> {
    /// Build the container for `workload`, from `region` if one is given, else from the heap.
    ///
    /// Returns the allocations made for the payload: the slot slice, or the `n` values. The vector
    /// holding many small objects is reserved before counting starts.
    pub fn build(workload: Workload, region: Option<&'r Region>, stats: &dyn AllocStats) -> Result<(Self, AllocDelta)> {
        let len = workload.slot_count()?;

        match (workload.shape, region) {
            (Shape::LargeContainer, None) => {
                let before = stats.snapshot();
                let mut slots = reserve(len)?;
                slots.resize_with(len, || None);
                Ok((Self::HeapSlots(black_box(slots)), stats.snapshot().since(before)))
            }
            (Shape::LargeContainer, Some(region)) => {
                let before = stats.snapshot();
                let slots = region.alloc_slice_fill_with(len, |_| None)?;
                Ok((Self::RegionSlots(black_box(slots)), stats.snapshot().since(before)))
            }
            (Shape::ManySmallObjects, None) => {
                let mut objects = reserve(len)?;
                let before = stats.snapshot();
                for i in 0..len {
                    objects.push(black_box(Box::new(i as Value)));
                }
                Ok((Self::HeapObjects(objects), stats.snapshot().since(before)))
            }
            (Shape::ManySmallObjects, Some(region)) => {
                let mut objects = reserve(len)?;
                let before = stats.snapshot();
                for i in 0..len {
                    objects.push(black_box(region.alloc(i as Value)?));
                }
                Ok((Self::RegionObjects(objects), stats.snapshot().since(before)))
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::HeapSlots(_) | Self::HeapObjects(_) => Strategy::Heap,
            Self::RegionSlots(_) | Self::RegionObjects(_) => Strategy::Region,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Self::HeapSlots(_) | Self::RegionSlots(_) => Shape::LargeContainer,
            Self::HeapObjects(_) | Self::RegionObjects(_) => Shape::ManySmallObjects,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::HeapSlots(slots) => slots.len(),
            Self::RegionSlots(slots) => slots.len(),
            Self::HeapObjects(objects) => objects.len(),
            Self::RegionObjects(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order-sensitive digest of the contents. Empty slots count as 0.
    pub fn checksum(&self) -> u64 {
        let digest = |acc: u64, value: u64| acc.wrapping_mul(31).wrapping_add(value);
        match self {
            Self::HeapSlots(slots) => slots.iter().map(|s| s.as_deref().copied().unwrap_or(0)).fold(0, digest),
            Self::RegionSlots(slots) => slots.iter().map(|s| s.copied().unwrap_or(0)).fold(0, digest),
            Self::HeapObjects(objects) => objects.iter().map(|v| **v).fold(0, digest),
            Self::RegionObjects(objects) => objects.iter().map(|v| **v).fold(0, digest),
        }
    }

    /// Addresses of the individually allocated values; empty for the slot shapes.
    pub fn object_addresses(&self) -> Vec<*const Value> {
        match self {
            Self::HeapSlots(_) | Self::RegionSlots(_) => Vec::new(),
            Self::HeapObjects(objects) => objects.iter().map(|v| &**v as *const Value).collect(),
            Self::RegionObjects(objects) => objects.iter().map(RegionBox::as_ptr).collect(),
        }
    }
}

/// An empty vector with room for exactly `len` elements.
fn reserve<T>(len: usize) -> Result<Vec<T>> {
    let layout = Layout::array::<T>(len)?;
    let mut vec = Vec::new();
    vec.try_reserve_exact(len).map_err(|_| BenchError::out_of_memory(layout))?;
    Ok(vec)
}
