use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};

use super::{BackingBlock, Block};

/// An owning pointer to a value carved out of a region.
///
/// Dropping it runs `T`'s destructor but leaves the memory to the region, which releases it in
/// bulk. The borrow of the block keeps the box from outliving its region.
pub struct RegionBox<'r, T, B: BackingBlock = Block> {
    inner: NonNull<T>,
    // None for zero sized values, which never touch a block
    block: Option<&'r B>,
    _owns: PhantomData<T>,
}

impl<'r, T, B: BackingBlock> RegionBox<'r, T, B> {
    /// Non-null pointer must be aligned, point to a valid T, and live inside `block`
    pub unsafe fn new(block: &'r B, object: NonNull<T>) -> Self {
        Self { inner: object, block: Some(block), _owns: PhantomData }
    }

    pub(crate) fn new_zero_sized(object: T) -> Self {
        debug_assert_eq!(std::mem::size_of::<T>(), 0);
        let inner: NonNull<T> = NonNull::dangling();
        // safety: writes of zero sized values through an aligned dangling pointer are valid
        unsafe { inner.as_ptr().write(object) };
        Self { inner, block: None, _owns: PhantomData }
    }

    pub fn as_ptr(&self) -> *const T {
        self.inner.as_ptr()
    }
}

impl<'r, T, B: BackingBlock> Deref for RegionBox<'r, T, B> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // safety: shared reference to self allows a shared reference to the inner T
        unsafe { self.inner.as_ref() }
    }
}

impl<'r, T, B: BackingBlock> DerefMut for RegionBox<'r, T, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // safety: unique reference to self allows a unique reference to the inner T
        unsafe { self.inner.as_mut() }
    }
}

impl<'r, T, B: BackingBlock> Drop for RegionBox<'r, T, B> {
    fn drop(&mut self) {
        if let Some(block) = self.block {
            block.adjust_allocation_count(-1);
        }
        // call T's destructor without deallocating the memory
        // safety: this is the only pointer to T, and it is valid and properly aligned
        unsafe { ptr::drop_in_place(self.inner.as_ptr()) }
    }
}

impl<'r, T: fmt::Debug, B: BackingBlock> fmt::Debug for RegionBox<'r, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// A contiguous run of values carved out of a region in one allocation.
pub struct RegionSlice<'r, T, B: BackingBlock = Block> {
    start: NonNull<T>,
    len: usize,
    block: Option<&'r B>,
    _owns: PhantomData<T>,
}

impl<'r, T, B: BackingBlock> RegionSlice<'r, T, B> {
    /// `start` must point to `len` initialised, aligned values of T inside `block`
    pub unsafe fn new(block: &'r B, start: NonNull<T>, len: usize) -> Self {
        Self { start, len, block: Some(block), _owns: PhantomData }
    }

    /// A slice that needs no memory: either empty, or made of zero sized values.
    pub(crate) fn without_memory<F>(len: usize, mut f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        debug_assert!(len == 0 || std::mem::size_of::<T>() == 0);
        let start: NonNull<T> = NonNull::dangling();
        for i in 0..len {
            // safety: writing a zero sized value through an aligned dangling pointer is valid
            unsafe { start.as_ptr().add(i).write(f(i)) };
        }
        Self { start, len, block: None, _owns: PhantomData }
    }
}

impl<'r, T, B: BackingBlock> Deref for RegionSlice<'r, T, B> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        // safety: start points to len initialised values owned by this slice
        unsafe { std::slice::from_raw_parts(self.start.as_ptr(), self.len) }
    }
}

impl<'r, T, B: BackingBlock> DerefMut for RegionSlice<'r, T, B> {
    fn deref_mut(&mut self) -> &mut [T] {
        // safety: as for deref, and the unique borrow of self is unique for the values
        unsafe { std::slice::from_raw_parts_mut(self.start.as_ptr(), self.len) }
    }
}

impl<'r, T, B: BackingBlock> Drop for RegionSlice<'r, T, B> {
    fn drop(&mut self) {
        if let Some(block) = self.block {
            block.adjust_allocation_count(-1);
        }
        // safety: the values are initialised and nothing else drops them
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start.as_ptr(), self.len)) }
    }
}

impl<'r, T: fmt::Debug, B: BackingBlock> fmt::Debug for RegionSlice<'r, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
