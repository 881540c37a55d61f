use std::alloc::{self, Layout};
use std::mem::size_of;
use std::ptr::NonNull;

use crate::error::{BenchError, Result};

use super::{RegionBox, RegionSlice};

/// Alignment of every backing block. Values with a larger alignment are placed by padding.
pub const BLOCK_ALIGN: usize = 16;

/// A scoped region that values are carved from and that is released in one operation.
pub trait RegionAllocator<B: BackingBlock> {
    /// Move `object` into the region.
    ///
    /// Grows the region with a new block if the current one is full.
    fn alloc<T>(&self, object: T) -> Result<RegionBox<'_, T, B>>;

    /// Carve a contiguous slice of `len` values out of the region, initialising slot `i` with `f(i)`.
    fn alloc_slice_fill_with<T, F>(&self, len: usize, f: F) -> Result<RegionSlice<'_, T, B>>
    where
        F: FnMut(usize) -> T;
}

/// Objects implementing this trait can be used as a backing 'block' of a region.
pub trait BackingBlock: Sized {
    /// Create a new block without checking whether the size is valid
    ///
    /// UB if size is 0
    unsafe fn new_unchecked(size: usize) -> Result<Self>;

    /// Return a pointer to the start of the block's memory.
    fn get_start_pointer_mut(&self) -> *mut u8;

    /// Return a pointer to the next place to write an object in the block.
    fn get_free_pointer_mut(&self) -> *mut u8;

    /// Set the free pointer to a new pointer.
    ///
    /// UB if the pointer is set outside of the block, or overwrites allocated objects.
    unsafe fn set_free_pointer(&self, ptr: *mut u8);

    /// The remaining capacity of the block in bytes.
    fn remaining_capacity(&self) -> usize;

    /// Adjust a counter of the number of live allocations in the block.
    ///
    /// This is handled in the allocation methods and when allocations are dropped.
    fn adjust_allocation_count(&self, count: isize);

    fn live_allocations(&self) -> usize;

    fn size(&self) -> usize;

    fn used(&self) -> usize {
        self.size() - self.remaining_capacity()
    }

    /// Create a new block, checking that size is greater than 0
    fn try_new(size: usize) -> Result<Self> {
        if size == 0 {
            Err(BenchError::InvalidBlockSize)
        } else {
            unsafe { Self::new_unchecked(size) }
        }
    }

    /// Reserve the memory needed for a block.
    ///
    /// UB if size is 0.
    unsafe fn reserve_block(size: usize) -> Result<NonNull<u8>> {
        let layout = Layout::from_size_align(size, BLOCK_ALIGN)?;
        NonNull::new(alloc::alloc(layout)).ok_or_else(|| BenchError::out_of_memory(layout))
    }

    /// Give the block's memory back to the global allocator.
    ///
    /// UB if used after deallocated.
    /// Memory is deallocated when the block is dropped.
    unsafe fn release_block(&mut self) {
        // safety: size and align are the ones the block was reserved with
        let layout = Layout::from_size_align_unchecked(self.size(), BLOCK_ALIGN);
        alloc::dealloc(self.get_start_pointer_mut(), layout);
    }

    /// Padding needed in front of the free pointer to place `layout`, if it still fits.
    fn fit(&self, layout: Layout) -> Option<usize> {
        let offset = self.get_free_pointer_mut().align_offset(layout.align());
        let needed = layout.size().checked_add(offset)?;
        (needed <= self.remaining_capacity()).then_some(offset)
    }

    /// Allocate an object in the block.
    ///
    /// Return None if the block doesn't have the capacity for the object.
    fn allocate<T>(&self, object: T) -> Option<RegionBox<'_, T, Self>> {
        if size_of::<T>() == 0 {
            return Some(RegionBox::new_zero_sized(object));
        }

        let offset = self.fit(Layout::new::<T>())?;
        // safety: `fit` checked the remaining capacity including the alignment padding
        unsafe { Some(self.write_to_memory(object, offset)) }
    }

    /// Advance the free pointer past `layout`, starting `offset` bytes in.
    ///
    /// Caller must have checked the capacity with `fit`.
    unsafe fn bump(&self, layout: Layout, offset: usize) -> NonNull<u8> {
        let ptr = self.get_free_pointer_mut().add(offset);
        self.set_free_pointer(ptr.add(layout.size()));
        // safety: derived from the non-null block pointer
        NonNull::new_unchecked(ptr)
    }

    /// Write a given object to memory at the free pointer.
    ///
    /// Free pointer + offset should be an aligned address for the object
    unsafe fn write_to_memory<T>(&self, object: T, offset: usize) -> RegionBox<'_, T, Self> {
        let object_pointer = self.bump(Layout::new::<T>(), offset).cast::<T>();
        object_pointer.as_ptr().write(object);
        self.adjust_allocation_count(1);

        RegionBox::new(self, object_pointer)
    }

    /// Write `len` values produced by `f` to contiguous memory at the free pointer.
    ///
    /// `layout` must be the array layout of `len` values of `T`, checked with `fit`.
    unsafe fn write_slice<T, F>(&self, layout: Layout, len: usize, offset: usize, mut f: F) -> RegionSlice<'_, T, Self>
    where
        F: FnMut(usize) -> T,
    {
        let start = self.bump(layout, offset).cast::<T>();
        for i in 0..len {
            start.as_ptr().add(i).write(f(i));
        }
        self.adjust_allocation_count(1);

        RegionSlice::new(self, start, len)
    }
}
