//! CLI entrypoint running the allocation suites outside of criterion.

use alloc_tracker::Session;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use arena_bench::config::RunnerConfig;
use arena_bench::counting::CountingAlloc;
use arena_bench::suite::{self, Suite};
use arena_bench::{report, Runner, DEFAULT_BLOCK_SIZE};

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc::system();

/// Compare heap and region allocation for large slices and many small objects.
#[derive(Debug, Parser)]
#[command(name = "arena-bench")]
struct Cli {
    /// Suite to run.
    #[arg(long, value_enum, default_value_t = SuiteArg::All)]
    suite: SuiteArg,
    /// Repetitions per size.
    #[arg(long, default_value_t = 10)]
    repetitions: u64,
    /// Skip sizes above this value (MiB for slice suites, items for the others).
    #[arg(long)]
    max_size: Option<usize>,
    /// Region block size in bytes.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,
    /// Print one JSON record per size instead of text lines.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SuiteArg {
    All,
    LargeSliceWithoutArena,
    LargeSliceWithArena,
    ManyItemsWithoutArena,
    ManyItemsWithArena,
}

impl SuiteArg {
    fn suites(self) -> Vec<Suite> {
        match self {
            SuiteArg::All => suite::ALL.to_vec(),
            SuiteArg::LargeSliceWithoutArena => vec![suite::LARGE_SLICE_WITHOUT_ARENA],
            SuiteArg::LargeSliceWithArena => vec![suite::LARGE_SLICE_WITH_ARENA],
            SuiteArg::ManyItemsWithoutArena => vec![suite::MANY_ITEMS_WITHOUT_ARENA],
            SuiteArg::ManyItemsWithArena => vec![suite::MANY_ITEMS_WITH_ARENA],
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = RunnerConfig::default()
        .with_repetitions(cli.repetitions)
        .with_block_size(cli.block_size)
        .with_max_size(cli.max_size);
    let runner = Runner::new(config, &ALLOC);
    let allocs = Session::new();

    for suite in cli.suite.suites() {
        info!("running {} ({} strategy)", suite.name, suite.strategy);

        for n in suite.sizes_up_to(config.max_size) {
            let workload = suite.workload(n);
            let case = report::case_name(&suite, &workload);
            let trial_op = allocs.operation(case.as_str());
            let summary = runner
                .run_measured(workload, suite.strategy, config.repetitions, || trial_op.measure_thread())
                .with_context(|| format!("{} failed", case))?;

            if cli.json {
                println!("{}", report::to_json(&suite, &summary)?);
            } else {
                println!("{}", report::bench_line(&suite, &summary));
                println!("{}\n", suite.group_footer(&workload));
            }
        }
    }

    if !cli.json {
        allocs.print_to_stdout();
    }
    Ok(())
}
