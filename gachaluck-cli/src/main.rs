mod input;
mod reports;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use gachaluck_engine::{
    Direction, Engine, GameVariant, events_for_pool, group_by_pool, merge_pools, simulate,
};
use reports::{AnalysisReport, TableReport};

const DEFAULT_POOL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    WutheringWaves,
    GenshinImpact,
    StarRail,
}

impl From<VariantArg> for GameVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::WutheringWaves => Self::WutheringWaves,
            VariantArg::GenshinImpact => Self::GenshinImpact,
            VariantArg::StarRail => Self::StarRail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    /// Chronological, oldest draw first
    OldestFirst,
    /// Newest draw first, as record services return history
    NewestFirst,
}

impl From<OrderArg> for Direction {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::OldestFirst => Self::OldestFirst,
            OrderArg::NewestFirst => Self::NewestFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// JSON array of draw events
    Events,
    /// JSON array of raw record-service entries (always newest first)
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "gachaluck", version)]
#[command(about = "Rank gacha draw logs against every possible outcome of the pity system")]
struct Cli {
    /// Verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a draw log and report luck statistics
    Analyze(AnalyzeArgs),
    /// Generate a seeded synthetic log and analyze it
    Simulate(SimulateArgs),
    /// Print the per-draw probability table and expectations
    Table(TableArgs),
    /// List the luck tiers and their percentile bounds
    Tiers(OutputArgs),
    /// Print every pool of a raw history merged newest first
    History(HistoryArgs),
}

#[derive(Debug, Args)]
struct EngineArgs {
    /// Built-in game variant
    #[arg(long, value_enum, default_value_t = VariantArg::WutheringWaves)]
    variant: VariantArg,

    /// JSON variant profile to use instead of a built-in variant
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Draw log to analyze
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,

    /// Order of the records in an events file
    #[arg(long, value_enum, default_value_t = OrderArg::OldestFirst)]
    order: OrderArg,

    /// Shape of the input file
    #[arg(long, value_enum, default_value_t = InputFormat::Events)]
    format: InputFormat,

    /// Pool to analyze when reading raw records
    #[arg(long, default_value_t = DEFAULT_POOL)]
    pool: u32,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// Number of draws to generate
    #[arg(long, default_value_t = 1000)]
    pulls: u32,

    /// Seed for the deterministic generator
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    #[command(flatten)]
    engine: EngineArgs,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct TableArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct HistoryArgs {
    /// Raw record file covering one or more pools
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,

    /// Show at most this many draws
    #[arg(long)]
    limit: Option<usize>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Simulate(args) => run_simulate(&args),
        Command::Table(args) => run_table(&args),
        Command::Tiers(args) => run_tiers(&args),
        Command::History(args) => run_history(&args),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn build_engine(args: &EngineArgs) -> Result<Engine> {
    input::load_engine(args.variant.into(), args.profile.as_deref())
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let (events, direction) = match args.format {
        InputFormat::Events => (input::load_events(&args.input)?, args.order.into()),
        InputFormat::Raw => {
            if args.order == OrderArg::OldestFirst {
                log::debug!("raw records are read newest first; --order is ignored");
            }
            let raw = input::load_raw_records(&args.input)?;
            (
                events_for_pool(&raw, args.pool, &engine),
                Direction::NewestFirst,
            )
        }
    };
    log::info!(
        "analyzing {} draws from {}",
        events.len(),
        args.input.display()
    );
    let stats = engine
        .aggregate(&events, direction)
        .with_context(|| format!("failed to analyze {}", args.input.display()))?;
    let report = AnalysisReport::new(&engine, args.input.display().to_string(), &stats);
    write_analysis(args.report, args.output.output.clone(), &report)
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let events = simulate(&engine, args.pulls, args.seed);
    let stats = engine
        .aggregate(&events, Direction::OldestFirst)
        .context("failed to analyze the simulated log")?;
    let source = format!("simulation of {} pulls, seed {}", args.pulls, args.seed);
    let report = AnalysisReport::new(&engine, source, &stats);
    write_analysis(args.report, args.output.output.clone(), &report)
}

fn write_analysis(
    format: ReportFormat,
    output: Option<PathBuf>,
    report: &AnalysisReport<'_>,
) -> Result<()> {
    let mut output_target = OutputTarget::new(output)?;
    match format {
        ReportFormat::Console => reports::write_analysis_console(&mut output_target, report)?,
        ReportFormat::Json => reports::write_json(&mut output_target, report)?,
        ReportFormat::Markdown => reports::write_analysis_markdown(&mut output_target, report)?,
        ReportFormat::Csv => reports::write_analysis_csv(&mut output_target, report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn run_table(args: &TableArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let table = TableReport::new(&engine);
    let mut output_target = OutputTarget::new(args.output.output.clone())?;
    match args.report {
        ReportFormat::Console => reports::write_table_console(&mut output_target, &table)?,
        ReportFormat::Json => reports::write_json(&mut output_target, &table)?,
        ReportFormat::Markdown => reports::write_table_markdown(&mut output_target, &table)?,
        ReportFormat::Csv => reports::write_table_csv(&mut output_target, &table)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn run_tiers(args: &OutputArgs) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    reports::write_tiers(&mut output_target)?;
    output_target.flush_inner()?;
    Ok(())
}

fn run_history(args: &HistoryArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let raw = input::load_raw_records(&args.input)?;
    let pools = group_by_pool(&raw, DEFAULT_POOL);
    let mut draws = merge_pools(&pools, &engine)
        .with_context(|| format!("failed to annotate {}", args.input.display()))?;
    if let Some(limit) = args.limit {
        draws.truncate(limit);
    }
    let mut output_target = OutputTarget::new(args.output.output.clone())?;
    match args.report {
        ReportFormat::Console => reports::write_history_console(&mut output_target, &draws)?,
        ReportFormat::Json => reports::write_json(&mut output_target, &draws)?,
        ReportFormat::Markdown => reports::write_history_markdown(&mut output_target, &draws)?,
        ReportFormat::Csv => reports::write_history_csv(&mut output_target, &draws)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_defaults() {
        let cli = Cli::parse_from(["gachaluck", "analyze", "--input", "log.json"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.order, OrderArg::OldestFirst);
        assert_eq!(args.format, InputFormat::Events);
        assert_eq!(args.pool, DEFAULT_POOL);
        assert_eq!(args.report, ReportFormat::Console);
        assert_eq!(args.engine.variant, VariantArg::WutheringWaves);
        assert!(args.output.output.is_none());
    }

    #[test]
    fn value_enums_map_onto_engine_types() {
        let cli = Cli::parse_from([
            "gachaluck",
            "-v",
            "analyze",
            "--input",
            "raw.json",
            "--variant",
            "genshin-impact",
            "--order",
            "newest-first",
            "--format",
            "raw",
            "--pool",
            "2",
            "--report",
            "csv",
        ]);
        assert!(cli.verbose);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(
            GameVariant::from(args.engine.variant),
            GameVariant::GenshinImpact
        );
        assert_eq!(Direction::from(args.order), Direction::NewestFirst);
        assert_eq!(args.format, InputFormat::Raw);
        assert_eq!(args.pool, 2);
        assert_eq!(args.report, ReportFormat::Csv);
    }

    #[test]
    fn output_target_writes_files() {
        let path = std::env::temp_dir().join(format!(
            "gachaluck-output-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        drop(target);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }
}
