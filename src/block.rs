use std::cell::Cell;
use std::ptr::NonNull;

use crate::error::Result;

use super::region_trait::BackingBlock;

/// A single fixed-size block of backing memory.
///
/// The block only allocates memory once, when it is created, and hands it out by bumping a free
/// pointer. Allocations fail once there is no capacity remaining; a region then adds a new block.
pub struct Block {
    size: usize,
    start_pointer: NonNull<u8>,
    free_pointer: Cell<*mut u8>,
    allocations: Cell<usize>,
}

impl BackingBlock for Block {
    unsafe fn new_unchecked(size: usize) -> Result<Self> {
        let start = Self::reserve_block(size)?;
        Ok(Self {
            size,
            start_pointer: start,
            free_pointer: Cell::new(start.as_ptr()),
            allocations: Cell::new(0),
        })
    }

    #[inline]
    fn get_start_pointer_mut(&self) -> *mut u8 {
        self.start_pointer.as_ptr()
    }

    #[inline]
    fn get_free_pointer_mut(&self) -> *mut u8 {
        self.free_pointer.get()
    }

    unsafe fn set_free_pointer(&self, ptr: *mut u8) {
        self.free_pointer.set(ptr)
    }

    fn remaining_capacity(&self) -> usize {
        (self.start_pointer.as_ptr() as usize + self.size) - self.free_pointer.get() as usize
    }

    fn adjust_allocation_count(&self, count: isize) {
        self.allocations.set(
            self.allocations
                .get()
                .checked_add_signed(count)
                .expect("allocation count out of range"),
        )
    }

    fn live_allocations(&self) -> usize {
        self.allocations.get()
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // a block is only dropped with its region, after every box borrowing it is gone
        unsafe { self.release_block() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    #[test]
    fn sequential_allocations_are_contiguous() {
        let block = Block::try_new(100).unwrap();
        let start_ptr = block.get_start_pointer_mut();
        let boxes: Vec<_> = (0..100_u8).map(|i| block.allocate(i).unwrap()).collect();

        let values = unsafe { std::slice::from_raw_parts(start_ptr.cast_const(), 100) };
        let expected: Vec<u8> = (0..100).collect();
        assert_eq!(values, expected.as_slice());
        assert_eq!(block.live_allocations(), 100);
        assert_eq!(block.remaining_capacity(), 0);

        drop(boxes);
        assert_eq!(block.live_allocations(), 0);
    }

    #[test]
    fn full_block_refuses_allocation() {
        let block = Block::try_new(8).unwrap();
        let _first = block.allocate(1_u32).unwrap();
        let _second = block.allocate(2_u32).unwrap();

        assert!(block.allocate(3_u32).is_none());
        assert_eq!(block.used(), 8);
    }

    #[test]
    fn alignment_padding_is_accounted() {
        let block = Block::try_new(32).unwrap();
        let byte = block.allocate(1_u8).unwrap();
        let word = block.allocate(2_u64).unwrap();

        assert_eq!((&*word as *const u64 as usize) % std::mem::align_of::<u64>(), 0);
        assert_eq!(block.used(), 16);
        assert_eq!((*byte, *word), (1, 2));
    }

    #[test]
    fn zero_sized_block_is_rejected() {
        assert_eq!(Block::try_new(0).err(), Some(BenchError::InvalidBlockSize));
    }
}
