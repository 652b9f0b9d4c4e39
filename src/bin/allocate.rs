//! Seats participants from three input files and writes the result as JSON.

use std::path::PathBuf;

use clap::Parser;
use seat_alloc::{io, AllocationConfig, DistrictLabels, StrategyKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Participants JSON: [{ id, district_id, type_of_test }]
    participants: PathBuf,

    /// District/school/room hierarchy JSON
    districts: PathBuf,

    /// District distance matrix CSV
    distances: PathBuf,

    /// Allocation strategy (optimal or greedy); overrides the config file
    #[arg(long, env = "SEAT_ALLOC_STRATEGY")]
    strategy: Option<StrategyKind>,

    /// JSON allocation config
    #[arg(long, env = "SEAT_ALLOC_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the assignment records
    #[arg(long, default_value = "allocation_result.json")]
    output: PathBuf,

    /// Leave unplaced participants out of the output
    #[arg(long)]
    drop_fallback: bool,

    /// Number districts by table position instead of by CSV labels
    #[arg(long)]
    positional_labels: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AllocationConfig::from_json_file(path)?,
        None => AllocationConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }

    let labels = if args.positional_labels {
        DistrictLabels::Positional
    } else {
        DistrictLabels::Header
    };
    let problem = io::load_problem(&args.participants, &args.districts, &args.distances, labels)?;
    info!(
        participants = problem.participants().len(),
        rooms = problem.rooms().len(),
        districts = problem.distances().len(),
        "inputs loaded"
    );

    let report = seat_alloc::allocate(&problem, &config)?;
    let records = report.into_records(!args.drop_fallback);
    io::write_records(&args.output, &records)?;
    info!(path = %args.output.display(), records = records.len(), "results written");

    Ok(())
}
