use arena_bench::config::RunnerConfig;
use arena_bench::container::Container;
use arena_bench::counting::{AllocStats, CountingAlloc};
use arena_bench::suite;
use arena_bench::workload::{Value, SLOTS_PER_MIB};
use arena_bench::{Region, RegionAllocator, Runner, Strategy, Workload};

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc::system();

fn runner() -> Runner<'static> {
    Runner::new(RunnerConfig::default(), &ALLOC)
}

#[test]
fn heap_objects_count_one_allocation_each() {
    let trial = runner().trial(Workload::many_small_objects(10), Strategy::Heap).unwrap();

    assert_eq!(trial.allocations, 10);
    assert_eq!(trial.bytes, 10 * std::mem::size_of::<Value>() as u64);
}

#[test]
fn region_objects_count_fewer_allocations_than_heap() {
    let heap = runner().trial(Workload::many_small_objects(10), Strategy::Heap).unwrap();
    let region = runner().trial(Workload::many_small_objects(10), Strategy::Region).unwrap();

    assert!(region.allocations <= 1);
    assert!(region.allocations < heap.allocations);
}

#[test]
fn large_heap_slice_is_one_allocation_of_n_mib() {
    let trial = runner().trial(Workload::large_container(1), Strategy::Heap).unwrap();

    assert_eq!(trial.allocations, 1);
    assert_eq!(trial.bytes, (SLOTS_PER_MIB * std::mem::size_of::<usize>()) as u64);
}

#[test]
fn large_region_slice_grows_the_region() {
    let trial = runner().trial(Workload::large_container(1), Strategy::Region).unwrap();

    // one dedicated block, plus the node linking it into the region
    assert!(trial.allocations >= 1);
    assert!(trial.bytes >= (1 << 20) as u64);
}

#[test]
fn empty_workloads_allocate_nothing() {
    let footers = ["--- 0MiB", "------- 0MiB", "--- 0 items", "------- 0 items"];

    for (suite, footer) in suite::ALL.into_iter().zip(footers) {
        let workload = suite.workload(0);
        let summary = runner().run(workload, suite.strategy, 3).unwrap();

        assert_eq!(summary.repetitions, 3);
        assert_eq!(summary.allocs_per_op(), 0);
        assert_eq!(suite.group_footer(&workload), footer, "{}", suite.name);
    }
}

#[test]
fn region_free_releases_in_one_step() {
    let region = Region::new().unwrap();
    let (container, _) = Container::build(Workload::many_small_objects(100_000), Some(&region), &ALLOC).unwrap();
    assert_eq!(container.len(), 100_000);
    drop(container);

    let before = ALLOC.snapshot();
    let stats = region.free();
    let after = ALLOC.snapshot();

    assert_eq!(stats.live_allocations, 0);
    assert!(stats.blocks > 1);
    // freeing never allocates
    assert_eq!(after.since(before).allocations, 0);
}

#[test]
fn region_values_are_not_counted_individually() {
    let region = Region::new().unwrap();
    let before = ALLOC.snapshot();
    let values: Vec<_> = {
        let mut values = Vec::with_capacity(100);
        let reserved = ALLOC.snapshot();
        for i in 0..100 {
            values.push(region.alloc(i as Value).unwrap());
        }
        assert_eq!(ALLOC.snapshot().since(reserved).allocations, 0);
        values
    };

    assert_eq!(ALLOC.snapshot().since(before).allocations, 1);
    assert_eq!(*values[99], 99);
}
