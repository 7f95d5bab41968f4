use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use coord_eval::args::Args;
use coord_eval::config::EvalConfig;
use coord_eval::dataset::Dataset;
use coord_eval::engine::Interpreter;
use coord_eval::evaluate::evaluate;
use coord_eval::inference::open_engine;
use coord_eval::output::Summary;

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = EvalConfig::load(args.config.as_deref())?.with_args(&args)?;
    debug!("{:?}", config);

    let mut stdout = io::stdout().lock();

    // 1. Dataset
    writeln!(stdout, "Generating images...")?;
    let dataset = Dataset::generate(config.block_radius);
    writeln!(stdout, "Done.")?;
    stdout.flush()?;

    // 2. Model -> Interpreter
    let engine = open_engine(&config.model_path, config.backend)?;
    let mut interpreter = Interpreter::new(engine)?;

    // 3. Evaluate
    let records = evaluate(&mut interpreter, &dataset, &mut stdout)?;

    let summary = Summary::from_records(&records);
    info!(
        "Evaluated {} samples: mean distance {}, max {}",
        summary.count, summary.mean, summary.max
    );
    if args.summary {
        writeln!(stdout, "{}", summary.format())?;
    }
    stdout.flush()?;

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
