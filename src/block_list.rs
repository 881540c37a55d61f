use std::{cell::UnsafeCell, collections::LinkedList};

/// A list that hands out references to its elements and accepts pushes through a shared reference.
///
/// Elements of a linked list never move, and this list never removes or reorders them, so a
/// reference to an element stays valid for as long as the list itself.
///
/// Used by a region to keep its backing blocks alive while allocations borrow them.
pub(crate) struct BlockList<T> {
    inner: UnsafeCell<LinkedList<T>>,
}

impl<T> BlockList<T> {
    pub fn new() -> Self {
        Self { inner: UnsafeCell::new(LinkedList::new()) }
    }

    /// The most recently pushed element.
    pub fn last(&self) -> Option<&T> {
        // safety: unsafe cell has a valid and dereferenceable pointer,
        // and no mutable references are released to the linked list
        unsafe { (*self.inner.get()).back() }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        // safety: see `last`
        unsafe { (*self.inner.get()).len() }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        // safety: see `last`. pushing while iterating only appends nodes after the iterator's end
        unsafe { (*self.inner.get()).iter() }
    }

    /// Append an element and return a reference to it.
    pub fn push(&self, object: T) -> &T {
        // safety: the only outstanding references are to elements, which are not moved
        // by appending a new node
        let list = unsafe { &mut *self.inner.get() };
        list.push_back(object);
        match list.back() {
            Some(last) => last,
            None => unreachable!("list is non-empty after push"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_survive_pushes() {
        let list = BlockList::new();
        let first = list.push(1_u64);
        for i in 2..100 {
            list.push(i);
        }

        assert_eq!(*first, 1);
        assert_eq!(list.len(), 99);
        assert_eq!(list.last(), Some(&99));
        assert_eq!(list.iter().copied().sum::<u64>(), (1..100).sum::<u64>());
    }
}
