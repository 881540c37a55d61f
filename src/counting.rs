//! Allocation counting for the measured phases of a trial.
//!
//! [`CountingAlloc`] decorates an [`alloc_tracker::Allocator`], so `alloc_tracker` sessions keep
//! reporting mean bytes per operation, and adds exact counters a trial can read back. Counts are
//! kept per thread, so a trial only sees its own allocations even when other threads (test
//! harness, logging) allocate concurrently.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use alloc_tracker::Allocator;

thread_local! {
    static THREAD_ALLOCATIONS: Cell<u64> = const { Cell::new(0) };
    static THREAD_BYTES: Cell<u64> = const { Cell::new(0) };
}

/// Running totals at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    pub allocations: u64,
    pub bytes: u64,
}

/// Allocations made between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocDelta {
    pub allocations: u64,
    pub bytes: u64,
}

impl AllocSnapshot {
    pub fn since(self, earlier: AllocSnapshot) -> AllocDelta {
        AllocDelta {
            allocations: self.allocations.wrapping_sub(earlier.allocations),
            bytes: self.bytes.wrapping_sub(earlier.bytes),
        }
    }
}

/// Source of allocation counters for the calling thread.
pub trait AllocStats {
    /// Totals for the calling thread.
    ///
    /// For [`CountingAlloc`] the per-thread counters are shared by every instance: two
    /// allocators used from one thread report the same snapshot.
    fn snapshot(&self) -> AllocSnapshot;
}

/// Stats source for builds that do not install a counting allocator. Always reports zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStats;

impl AllocStats for NoopStats {
    fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot::default()
    }
}

/// A decorator allocator counting allocations, per thread and process-wide.
///
/// ```no_run
/// use alloc_tracker::Session;
/// use arena_bench::counting::CountingAlloc;
///
/// #[global_allocator]
/// static ALLOC: CountingAlloc = CountingAlloc::system();
///
/// fn main() {
///     let session = Session::new();
///     let op = session.operation("vec");
///     {
///         let _span = op.measure_thread();
///         drop(vec![0_u8; 64]);
///     }
///     session.print_to_stdout();
/// }
/// ```
pub struct CountingAlloc<A = Allocator<System>> {
    inner: A,
    total_allocations: AtomicU64,
    total_bytes: AtomicU64,
}

impl CountingAlloc<Allocator<System>> {
    /// Count on top of an `alloc_tracker` allocator backed by the system allocator.
    pub const fn system() -> Self {
        Self::new(Allocator::system())
    }
}

impl<A> CountingAlloc<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner, total_allocations: AtomicU64::new(0), total_bytes: AtomicU64::new(0) }
    }

    /// Totals across every thread since the allocator was installed.
    pub fn process_totals(&self) -> AllocSnapshot {
        AllocSnapshot {
            allocations: self.total_allocations.load(Ordering::Relaxed),
            bytes: self.total_bytes.load(Ordering::Relaxed),
        }
    }

    #[inline]
    fn record(&self, bytes: usize) {
        let bytes = bytes as u64;
        self.total_allocations.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        // try_with: thread locals may already be gone while a thread is torn down
        let _ = THREAD_ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
        let _ = THREAD_BYTES.try_with(|count| count.set(count.get() + bytes));
    }
}

impl<A> AllocStats for CountingAlloc<A> {
    fn snapshot(&self) -> AllocSnapshot {
        AllocSnapshot {
            allocations: THREAD_ALLOCATIONS.try_with(Cell::get).unwrap_or(0),
            bytes: THREAD_BYTES.try_with(Cell::get).unwrap_or(0),
        }
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAlloc<A> {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            self.record(layout.size());
        }
        ptr
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            self.record(layout.size());
        }
        ptr
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.inner.dealloc(ptr, layout)
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            self.record(new_size);
        }
        new_ptr
    }
}
