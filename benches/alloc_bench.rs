//! Heap vs region allocation benchmarks.
//!
//! Each iteration is one trial: only the barrier and the release of the container are timed.
//! After every size the go-style summary line and the group footer are printed, and after every
//! suite the `alloc_tracker` report of bytes allocated per trial.

use std::cell::RefCell;
use std::time::Duration;

use alloc_tracker::Session;
use arena_bench::config::RunnerConfig;
use arena_bench::counting::CountingAlloc;
use arena_bench::suite::{self, Suite};
use arena_bench::{report, Runner, TrialSummary};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc::system();

fn bench_suite(c: &mut Criterion, suite: Suite) {
    let allocs = Session::new();
    let runner = Runner::new(RunnerConfig::default(), &ALLOC);
    let mut group = c.benchmark_group(suite.name);

    for n in suite.sizes() {
        let workload = suite.workload(n);
        let stats = RefCell::new(TrialSummary::new(workload, suite.strategy));
        let trial_op = allocs.operation(report::case_name(&suite, &workload).as_str());

        group.bench_function(BenchmarkId::from_parameter(workload.label()), |b| {
            b.iter_custom(|iters| {
                let mut elapsed = Duration::ZERO;
                for _ in 0..iters {
                    let _span = trial_op.measure_thread();
                    let trial = runner
                        .trial(workload, suite.strategy)
                        .unwrap_or_else(|err| panic!("{}: {}", report::case_name(&suite, &workload), err));
                    elapsed += trial.elapsed;
                    stats.borrow_mut().record(trial);
                }
                elapsed.max(Duration::from_nanos(1))
            });
        });

        println!("{}", report::bench_line(&suite, &stats.borrow()));
        println!("{}\n", suite.group_footer(&workload));
    }

    group.finish();

    allocs.print_to_stdout();
}

fn large_slice_without_arena(c: &mut Criterion) {
    bench_suite(c, suite::LARGE_SLICE_WITHOUT_ARENA);
}

fn large_slice_with_arena(c: &mut Criterion) {
    bench_suite(c, suite::LARGE_SLICE_WITH_ARENA);
}

fn many_items_without_arena(c: &mut Criterion) {
    bench_suite(c, suite::MANY_ITEMS_WITHOUT_ARENA);
}

fn many_items_with_arena(c: &mut Criterion) {
    bench_suite(c, suite::MANY_ITEMS_WITH_ARENA);
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(5))
        .sample_size(10);
    targets = large_slice_without_arena, large_slice_with_arena, many_items_without_arena, many_items_with_arena
);
criterion_main!(benches);
