use std::alloc::Layout;
use std::mem::size_of;

use log::{debug, trace};

use crate::block::Block;
use crate::error::{BenchError, Result};

use super::block_list::BlockList;
use super::{BackingBlock, RegionAllocator, RegionBox, RegionSlice};

/// Size of a region block unless configured otherwise.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// A growable region made of backing blocks.
///
/// Values are bump-allocated from the newest block. When it cannot fit a request the region
/// pushes another block, sized to the request if that exceeds the block size. No block is
/// released until the whole region is, either by [`Region::free`] or on drop.
pub struct Region {
    block_size: usize,
    // values handed out hold a shared reference to their block, so blocks can only be appended
    pub(crate) blocks: BlockList<Block>,
}

/// Occupancy of a region, summed over its blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStats {
    pub blocks: usize,
    pub reserved_bytes: usize,
    pub used_bytes: usize,
    pub live_allocations: usize,
}

impl Region {
    /// Create a region with [`DEFAULT_BLOCK_SIZE`] blocks.
    pub fn new() -> Result<Self> {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Create a region and reserve its first block up front.
    pub fn with_block_size(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(BenchError::InvalidBlockSize);
        }

        let region = Self { block_size, blocks: BlockList::new() };
        region.blocks.push(Block::try_new(block_size)?);
        trace!("region created with {} byte blocks", block_size);
        Ok(region)
    }

    pub fn stats(&self) -> RegionStats {
        self.blocks.iter().fold(
            RegionStats { blocks: 0, reserved_bytes: 0, used_bytes: 0, live_allocations: 0 },
            |mut stats, block| {
                stats.blocks += 1;
                stats.reserved_bytes += block.size();
                stats.used_bytes += block.used();
                stats.live_allocations += block.live_allocations();
                stats
            },
        )
    }

    /// Release every block of the region in one operation.
    ///
    /// Consuming the region means nothing carved from it can still be in use:
    ///
    /// ```compile_fail
    /// use arena_bench::{Region, RegionAllocator};
    ///
    /// let region = Region::new().unwrap();
    /// let value = region.alloc(7_u64).unwrap();
    /// region.free();
    /// assert_eq!(*value, 7);
    /// ```
    pub fn free(self) -> RegionStats {
        let stats = self.stats();
        debug!(
            "freeing region: {} blocks, {} bytes reserved, {} bytes used",
            stats.blocks, stats.reserved_bytes, stats.used_bytes
        );
        drop(self);
        stats
    }

    fn new_block(&self, min_size: usize) -> Result<&Block> {
        let size = std::cmp::max(min_size, self.block_size);
        let block = Block::try_new(size)?;
        debug!("region grew by a {} byte block", size);
        Ok(self.blocks.push(block))
    }

    /// Find a block that fits `layout`, growing the region when the newest one is full.
    fn block_for(&self, layout: Layout) -> Result<(&Block, usize)> {
        if let Some(block) = self.blocks.last() {
            if let Some(offset) = block.fit(layout) {
                return Ok((block, offset));
            }
        }

        // padding by the alignment guarantees a fresh block fits whatever its start address
        let min_size = layout.size().checked_add(layout.align()).ok_or(BenchError::CapacityOverflow)?;
        let block = self.new_block(min_size)?;
        let offset = block.fit(layout).ok_or_else(|| BenchError::out_of_memory(layout))?;
        Ok((block, offset))
    }
}

impl RegionAllocator<Block> for Region {
    /// Allocate an object in the region.
    ///
    /// Zero sized objects never consume block memory.
    fn alloc<T>(&self, object: T) -> Result<RegionBox<'_, T, Block>> {
        if size_of::<T>() == 0 {
            return Ok(RegionBox::new_zero_sized(object));
        }

        let (block, offset) = self.block_for(Layout::new::<T>())?;
        // safety: `block_for` checked the capacity at this offset
        Ok(unsafe { block.write_to_memory(object, offset) })
    }

    fn alloc_slice_fill_with<T, F>(&self, len: usize, f: F) -> Result<RegionSlice<'_, T, Block>>
    where
        F: FnMut(usize) -> T,
    {
        let layout = Layout::array::<T>(len)?;
        if layout.size() == 0 {
            return Ok(RegionSlice::without_memory(len, f));
        }

        let (block, offset) = self.block_for(layout)?;
        // safety: `block_for` checked the capacity at this offset for the whole array layout
        Ok(unsafe { block.write_slice(layout, len, offset, f) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_values_use_no_blocks() {
        let region = Region::new().unwrap();

        for _i in 0..1_000 {
            let _ = region.alloc(()).unwrap();
        }
        let units = region.alloc_slice_fill_with(1_000, |_| ()).unwrap();

        // only the eagerly reserved block
        assert_eq!(units.len(), 1_000);
        assert_eq!(region.blocks.len(), 1);
        assert_eq!(region.stats().used_bytes, 0);
    }

    #[test]
    fn grows_by_whole_blocks() {
        let region = Region::new().unwrap();

        let values: Vec<_> = (0..(DEFAULT_BLOCK_SIZE * 3)).map(|_| region.alloc(255_u8).unwrap()).collect();

        assert_eq!(region.blocks.len(), 3);
        assert_eq!(region.blocks.last().unwrap().remaining_capacity(), 0);
        assert_eq!(region.stats().live_allocations, values.len());
        assert!(values.iter().all(|v| **v == 255));
    }

    #[test]
    fn oversized_slice_gets_a_dedicated_block() {
        let region = Region::with_block_size(64).unwrap();
        let slice = region.alloc_slice_fill_with(1_000, |i| i as u64).unwrap();

        assert_eq!(slice.len(), 1_000);
        assert_eq!(slice[999], 999);
        let stats = region.stats();
        assert_eq!(stats.blocks, 2);
        assert!(stats.reserved_bytes >= 64 + 8_000);
        assert_eq!(stats.live_allocations, 1);
    }

    #[test]
    fn empty_slice_is_valid() {
        let region = Region::new().unwrap();
        let slice = region.alloc_slice_fill_with(0, |_| 0_u64).unwrap();

        assert!(slice.is_empty());
        assert_eq!(region.stats().used_bytes, 0);
    }

    #[test]
    fn free_reports_final_occupancy() {
        let region = Region::with_block_size(16).unwrap();
        {
            let _a = region.alloc(1_u64).unwrap();
            let _b = region.alloc(2_u64).unwrap();
            let _c = region.alloc(3_u64).unwrap();
        }

        let stats = region.free();
        assert_eq!(stats.blocks, 2);
        assert_eq!(stats.used_bytes, 24);
        assert_eq!(stats.live_allocations, 0);
    }

    #[test]
    fn destructors_run_when_boxes_drop() {
        use std::rc::Rc;

        let region = Region::new().unwrap();
        let shared = Rc::new(());
        {
            let _held: Vec<_> = (0..10).map(|_| region.alloc(Rc::clone(&shared)).unwrap()).collect();
            assert_eq!(Rc::strong_count(&shared), 11);
        }
        assert_eq!(Rc::strong_count(&shared), 1);
        region.free();
    }

    #[test]
    fn zero_block_size_is_rejected() {
        assert_eq!(Region::with_block_size(0).err(), Some(BenchError::InvalidBlockSize));
    }
}
