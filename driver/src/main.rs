use anyhow::{bail, Context};
use bridge::bridge::{bridge_bind_address, MatchBridge};
use bridge::model::ReportModel;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dataset::writer::{write_records, write_rows_to_path};
use generator::profile::{build_flight, FlightConfig};
use matchcore::matching::{CancellationFlag, MatchSummary};
use matchcore::prelude::{SearchStrategy, DEFAULT_WINDOW_MS};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod bridge;
mod dataset;
mod generator;
mod interrupt;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Truth/sensor track matching driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match a truth CSV against a sensor CSV and write the comparison table
    Match(MatchArgs),
    /// Write a synthetic truth/sensor CSV pair
    Generate(GenerateArgs),
    /// Host the HTTP matching bridge until Ctrl+C
    Serve(ServeArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Linear,
    Indexed,
}

impl From<StrategyArg> for SearchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Linear => SearchStrategy::Linear,
            StrategyArg::Indexed => SearchStrategy::Indexed,
        }
    }
}

#[derive(Args)]
struct TuningArgs {
    /// Load the matching workflow from YAML instead of the flags below
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Matching window in milliseconds (exclusive)
    #[arg(long, default_value_t = DEFAULT_WINDOW_MS, conflicts_with = "workflow")]
    window_ms: u64,
    /// Distance tolerance in metres
    #[arg(long, required_unless_present = "workflow", conflicts_with = "workflow")]
    tolerance: Option<f64>,
    #[arg(
        long,
        value_enum,
        default_value_t = StrategyArg::Linear,
        conflicts_with = "workflow"
    )]
    strategy: StrategyArg,
    /// Match truth samples on the rayon thread pool
    #[arg(long, default_value_t = false, conflicts_with = "workflow")]
    parallel: bool,
}

impl TuningArgs {
    fn workflow_config(&self) -> anyhow::Result<WorkflowConfig> {
        if let Some(path) = &self.workflow {
            return WorkflowConfig::load(path);
        }
        let tolerance = self
            .tolerance
            .context("--tolerance is required without --workflow")?;
        Ok(WorkflowConfig::from_args(
            self.window_ms,
            tolerance,
            self.strategy.into(),
            self.parallel,
        ))
    }
}

#[derive(Args)]
struct MatchArgs {
    /// Truth (flight log) CSV
    #[arg(long)]
    truth: PathBuf,
    /// Sensor (detection feed) CSV
    #[arg(long)]
    sensor: PathBuf,
    /// Output CSV path (`-` for stdout)
    #[arg(short, long, default_value = "comparison_results.csv")]
    output: PathBuf,
    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json_summary: bool,
    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Args)]
struct GenerateArgs {
    /// Directory receiving truth.csv and sensor.csv
    #[arg(long)]
    out_dir: PathBuf,
    /// Flight profile YAML
    #[arg(long)]
    profile: Option<PathBuf>,
    #[arg(long)]
    samples: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Emit the zero altitude sentinel on every detection
    #[arg(long, default_value_t = false)]
    no_sensor_altitude: bool,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value_t = 9000)]
    port: u16,
    /// Preload the report with a truth CSV (requires --sensor)
    #[arg(long, requires = "sensor")]
    truth: Option<PathBuf>,
    #[arg(long, requires = "truth")]
    sensor: Option<PathBuf>,
    #[command(flatten)]
    tuning: TuningArgs,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Match(args) => run_match(args),
        Command::Generate(args) => run_generate(args),
        Command::Serve(args) => run_serve(args),
    }
}

fn run_match(args: MatchArgs) -> anyhow::Result<()> {
    let runner = Runner::new(args.tuning.workflow_config()?);
    let cancel = CancellationFlag::new();
    interrupt::cancel_on_ctrl_c(cancel.clone())?;

    let result = runner.execute_files(&args.truth, &args.sensor, Some(&cancel))?;
    let summary = &result.outcome.summary;
    if let Err(err) = summary.ensure_inputs() {
        bail!("please supply both truth and sensor data: {}", err);
    }

    let to_stdout = args.output.as_os_str() == "-";
    let status = |line: String| {
        if to_stdout {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    };

    status(summary_line(summary));
    if result.rows.is_empty() {
        status("No matches found.".to_string());
    } else {
        write_rows_to_path(&result.rows, &args.output)?;
        status(format!(
            "Processed {} matches. Results written to {}",
            result.rows.len(),
            args.output.display()
        ));
    }
    if args.json_summary {
        status(serde_json::to_string_pretty(summary).context("encoding summary")?);
    }
    Ok(())
}

fn summary_line(summary: &MatchSummary) -> String {
    let mut line = format!(
        "Run -> truth {}, sensor {}, matched {} ({:.1}%), within tolerance {}, \
         no match {}, bad truth coords {}, bad truth times {}, bad sensor coords {}, \
         bad sensor times {}",
        summary.truth_total,
        summary.sensor_total,
        summary.matched,
        summary.match_rate() * 100.0,
        summary.within_tolerance,
        summary.no_match,
        summary.truth_invalid_coordinate,
        summary.truth_malformed_timestamp,
        summary.sensor_invalid_coordinate,
        summary.sensor_malformed_timestamp
    );
    if summary.cancelled {
        line.push_str(&format!(", cancelled with {} unprocessed", summary.unprocessed));
    }
    line
}

fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = match &args.profile {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading flight profile {}", path.display()))?;
            serde_yaml::from_str::<FlightConfig>(&contents)
                .with_context(|| format!("parsing flight profile {}", path.display()))?
        }
        None => FlightConfig::default(),
    };
    if let Some(samples) = args.samples {
        config.samples = samples;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_sensor_altitude {
        config.sensor_altitude = false;
    }

    let flight = build_flight(&config)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let truth_path = args.out_dir.join("truth.csv");
    let sensor_path = args.out_dir.join("sensor.csv");
    write_records(&flight.truth, &truth_path)?;
    write_records(&flight.sensor, &sensor_path)?;

    println!(
        "Generated {} truth rows and {} sensor rows{} -> {}, {}",
        flight.truth.len(),
        flight.sensor.len(),
        config
            .description
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default(),
        truth_path.display(),
        sensor_path.display()
    );
    Ok(())
}

fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let runner = Arc::new(Runner::new(args.tuning.workflow_config()?));
    let bridge = MatchBridge::new(runner.clone());

    if let (Some(truth), Some(sensor)) = (&args.truth, &args.sensor) {
        let result = runner.execute_files(truth, sensor, None)?;
        bridge.publish(&ReportModel {
            rows: result.rows,
            summary: result.outcome.summary,
        });
    }

    println!("HTTP bridge running on port {} (Ctrl+C to stop)...", args.port);
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for the HTTP bridge")?;
    runtime.block_on(bridge.serve(bridge_bind_address(args.port)));
    Ok(())
}
