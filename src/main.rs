use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use growth_trend::feed::{self, FeedFormat};
use growth_trend::{frames, reference, report};
use growth_trend::{AggregationConfig, RegionTable, SamplingPolicy, WindowIndexing};

#[derive(Parser)]
#[command(name = "growth-trend")]
#[command(about = "Per-region growth-trend metrics and streaklines from a daily case feed", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the regions with the most new cases in the latest frame
    Summary {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Write animation frames, streaklines and doubling lines as JSON
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "frames.json")]
        out: PathBuf,
        /// Doubling periods in days for the reference lines
        #[arg(long = "doubling", value_delimiter = ',', default_values_t = reference::DEFAULT_DOUBLING_PERIODS)]
        doubling: Vec<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for FeedFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => FeedFormat::StatesDailyJson,
            FormatArg::Csv => FeedFormat::RecordsCsv,
        }
    }
}

#[derive(Args)]
struct InputArgs {
    /// Feed file (states_daily JSON or flat date,status,region,count CSV)
    #[arg(long)]
    feed: PathBuf,
    /// Feed format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Region table CSV with code,name columns; defaults to the built-in table
    #[arg(long)]
    regions: Option<PathBuf>,
    /// Region codes to drop before lookup
    #[arg(long = "exclude", value_delimiter = ',', default_value = "un")]
    exclude: Vec<String>,
    #[arg(long, default_value_t = 7)]
    rolling_window: usize,
    /// Measure the rolling window in calendar days instead of rows
    #[arg(long)]
    calendar_window: bool,
    /// Most recent dates always kept as frames
    #[arg(long, default_value_t = 21)]
    recent_days: usize,
    /// Keep every n-th date before the recent window
    #[arg(long, default_value_t = 7)]
    stride: usize,
    /// Keep every date
    #[arg(long)]
    no_sampling: bool,
    #[arg(long, default_value_t = 100)]
    min_total_cases: u64,
}

impl InputArgs {
    fn config(&self) -> AggregationConfig {
        let indexing = if self.calendar_window {
            WindowIndexing::CalendarDays
        } else {
            WindowIndexing::Rows
        };
        let sampling = (!self.no_sampling).then_some(SamplingPolicy {
            recent_window: self.recent_days,
            stride: self.stride,
        });

        AggregationConfig::new()
            .with_rolling_window(self.rolling_window)
            .with_window_indexing(indexing)
            .with_sampling(sampling)
            .with_excluded_regions(self.exclude.iter().cloned())
            .with_min_total_cases(self.min_total_cases)
    }

    fn load(&self) -> anyhow::Result<growth_trend::GrowthSnapshot> {
        let regions = match &self.regions {
            Some(path) => RegionTable::load_csv(path)?,
            None => RegionTable::india(),
        };
        let records = feed::load_feed(&self.feed, self.format.map(FeedFormat::from))
            .with_context(|| format!("failed to load feed {}", self.feed.display()))?;
        let config = self.config();

        growth_trend::run(&records, &regions, &config).context("failed to aggregate feed")
    }
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Summary { input, limit } => {
            let snapshot = input.load()?;
            let frames = frames::build_frames(&snapshot.trajectories);
            let standings = report::latest_standings(&frames);

            let Some(latest) = frames.last() else {
                println!("No plottable rows in this feed.");
                return Ok(());
            };

            println!("Most new cases in the week to {}:", latest.date);
            for standing in standings.iter().take(limit) {
                println!(
                    "- {}: {} new this week, {} total, {} active ({})",
                    standing.region,
                    standing.weekly_cases,
                    standing.total_cases,
                    standing.active_cases,
                    report::format_doubling(standing.doubling_days)
                );
            }
        }
        Commands::Report { input, out, limit } => {
            let snapshot = input.load()?;
            let frames = frames::build_frames(&snapshot.trajectories);
            let report = report::build_report(&frames, input.min_total_cases, limit);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            input,
            out,
            doubling,
        } => {
            let snapshot = input.load()?;
            let export = frames::build_export(&snapshot.trajectories, &doubling);
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            serde_json::to_writer_pretty(std::io::BufWriter::new(file), &export)?;
            println!(
                "Wrote {} frames to {}.",
                export.frames.len(),
                out.display()
            );
        }
    }

    Ok(())
}
