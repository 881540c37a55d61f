//! The named benchmark cases: one per shape and strategy, each over a ladder of sizes.

use crate::workload::{Shape, Strategy, Workload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suite {
    pub name: &'static str,
    pub shape: Shape,
    pub strategy: Strategy,
    /// Powers of ten covered, inclusive.
    exponents: (u32, u32),
}

/// 1 to 1000 MiB of slots from the global allocator.
pub const LARGE_SLICE_WITHOUT_ARENA: Suite = Suite {
    name: "large_slice_without_arena",
    shape: Shape::LargeContainer,
    strategy: Strategy::Heap,
    exponents: (0, 3),
};

/// 1 to 1000 MiB of slots carved from a region.
pub const LARGE_SLICE_WITH_ARENA: Suite = Suite {
    name: "large_slice_with_arena",
    shape: Shape::LargeContainer,
    strategy: Strategy::Region,
    exponents: (0, 3),
};

/// 10 to 1,000,000 boxed values.
pub const MANY_ITEMS_WITHOUT_ARENA: Suite = Suite {
    name: "many_items_without_arena",
    shape: Shape::ManySmallObjects,
    strategy: Strategy::Heap,
    exponents: (1, 6),
};

/// 10 to 1,000,000 values carved from a region.
pub const MANY_ITEMS_WITH_ARENA: Suite = Suite {
    name: "many_items_with_arena",
    shape: Shape::ManySmallObjects,
    strategy: Strategy::Region,
    exponents: (1, 6),
};

pub const ALL: [Suite; 4] = [
    LARGE_SLICE_WITHOUT_ARENA,
    LARGE_SLICE_WITH_ARENA,
    MANY_ITEMS_WITHOUT_ARENA,
    MANY_ITEMS_WITH_ARENA,
];

impl Suite {
    pub fn find(name: &str) -> Option<Suite> {
        ALL.into_iter().find(|suite| suite.name == name)
    }

    pub fn sizes(&self) -> Vec<usize> {
        (self.exponents.0..=self.exponents.1).map(|exp| 10_usize.pow(exp)).collect()
    }

    /// Sizes no larger than `cap`, or every size without a cap.
    pub fn sizes_up_to(&self, cap: Option<usize>) -> Vec<usize> {
        let mut sizes = self.sizes();
        if let Some(cap) = cap {
            sizes.retain(|&n| n <= cap);
        }
        sizes
    }

    pub fn workload(&self, n: usize) -> Workload {
        Workload { shape: self.shape, n }
    }

    /// Line printed once a size group completes: `--- 10MiB` for heap runs, `------- 10MiB`
    /// for region runs.
    pub fn group_footer(&self, workload: &Workload) -> String {
        let prefix = match self.strategy {
            Strategy::Heap => "---",
            Strategy::Region => "-------",
        };
        format!("{} {}", prefix, workload.label())
    }
}
