//! chainmetrics CLI: list, fetch, export and plot on-chain metrics.
//!
//! Commands:
//! - `metrics`: list the metric catalogue and the joined composites
//! - `fetch`: fetch one series, print it, optionally export CSV/Parquet
//! - `plot`: fetch one series and chart it in the terminal

use anyhow::{bail, Context, Result};
use chainmetrics_chart::{prepare_canvas, show, with_price_overlay, Figure, FigureSize};
use chainmetrics_core::config::API_KEY_ENV;
use chainmetrics_core::{
    Composite, HttpSource, Metric, MetricTable, MetricsClient, Resolution, Settings, TIME_COLUMN,
};
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const PRICE_COLUMN: &str = "price";

#[derive(Parser)]
#[command(
    name = "chainmetrics",
    version,
    about = "chainmetrics: on-chain metrics as daily or weekly tables"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config dir>/chainmetrics/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key; overrides the config file.
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Fixed UTC offset in hours for calendar dates. Defaults to local time.
    #[arg(long, global = true, allow_negative_numbers = true)]
    utc_offset: Option<i32>,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported metrics and composites.
    Metrics,
    /// Fetch a series and print it as a table.
    Fetch {
        /// Metric or composite name (see `chainmetrics metrics`).
        series: Series,

        /// Asset symbol. Defaults to the config's coin.
        #[arg(long)]
        coin: Option<String>,

        /// day or week. Defaults to the config's period.
        #[arg(long)]
        period: Option<String>,

        /// Also write the table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Also write the table as Parquet.
        #[arg(long)]
        parquet: Option<PathBuf>,
    },
    /// Fetch a series and chart it; price goes on a log-scaled twin axis.
    Plot {
        /// Metric or composite name (see `chainmetrics metrics`).
        series: Series,

        /// Asset symbol. Defaults to the config's coin.
        #[arg(long)]
        coin: Option<String>,

        /// day or week. Defaults to the config's period.
        #[arg(long)]
        period: Option<String>,

        /// Figure width in terminal cells.
        #[arg(long)]
        width: Option<u16>,

        /// Figure height in terminal cells.
        #[arg(long)]
        height: Option<u16>,

        /// Label size; 14 and above is drawn bold.
        #[arg(long)]
        font_size: Option<f32>,
    },
}

/// Anything the client can fetch by name.
#[derive(Debug, Clone, Copy)]
enum Series {
    Metric(Metric),
    Composite(Composite),
}

impl FromStr for Series {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(metric) = s.parse::<Metric>() {
            return Ok(Series::Metric(metric));
        }
        s.parse::<Composite>()
            .map(Series::Composite)
            .map_err(|_| format!("unknown series '{s}'; run `chainmetrics metrics` for the list"))
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Series::Metric(metric) => metric.name(),
            Series::Composite(composite) => composite.name(),
        };
        f.write_str(name)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Metrics => {
            run_metrics();
            Ok(())
        }
        Commands::Fetch {
            series,
            coin,
            period,
            csv,
            parquet,
        } => {
            let settings = load_settings(cli.config, cli.api_key, cli.utc_offset)?;
            run_fetch(&settings, series, coin, period, csv, parquet)
        }
        Commands::Plot {
            series,
            coin,
            period,
            width,
            height,
            font_size,
        } => {
            let settings = load_settings(cli.config, cli.api_key, cli.utc_offset)?;
            let size = FigureSize {
                width: width.unwrap_or(settings.chart.width),
                height: height.unwrap_or(settings.chart.height),
                font_size: font_size.unwrap_or(settings.chart.font_size),
            };
            run_plot(&settings, series, coin, period, size)
        }
    }
}

/// Settings from the config file and environment, then command-line overrides.
fn load_settings(
    config: Option<PathBuf>,
    api_key: Option<String>,
    utc_offset: Option<i32>,
) -> Result<Settings> {
    let mut settings = Settings::load(config.as_deref())?;
    if let Some(key) = api_key {
        settings.api.api_key = Some(key);
    }
    if let Some(hours) = utc_offset {
        settings.defaults.utc_offset_hours = Some(hours);
    }
    Ok(settings)
}

/// Logs go to stderr so tables on stdout stay clean. `-v` wins over `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_metrics() {
    println!("{:<38} {:<14} {:<50} columns", "name", "shape", "path");
    for metric in Metric::ALL {
        println!(
            "{:<38} {:<14} {:<50} {}",
            metric.name(),
            format!("{:?}", metric.shape()).to_lowercase(),
            metric.path(),
            metric.columns().join(", ")
        );
    }
    println!();
    println!("{:<38} joins", "composite");
    for composite in Composite::ALL {
        let (left, right) = composite.parts();
        println!("{:<38} {left} + {right}", composite.name());
    }
}

fn client(settings: &Settings) -> Result<MetricsClient<HttpSource>> {
    let Some(api_key) = settings.api_key() else {
        bail!("no API key: pass --api-key, set {API_KEY_ENV}, or add api.api_key to the config");
    };
    let source = HttpSource::new(settings.http_config())?;
    Ok(MetricsClient::new(source, api_key)
        .with_base_url(settings.api.base_url.clone())
        .with_time_basis(settings.time_basis()?))
}

fn fetch_series(
    settings: &Settings,
    series: Series,
    coin: Option<String>,
    period: Option<String>,
) -> Result<MetricTable> {
    let client = client(settings)?;
    let coin = coin.unwrap_or_else(|| settings.defaults.coin.clone());
    let period = match period {
        Some(p) => p.parse::<Resolution>()?,
        None => settings.defaults.period,
    };

    let table = match series {
        Series::Metric(metric) => client.fetch_metric(metric, &coin, period),
        Series::Composite(composite) => client.fetch_composite(composite, &coin, period),
    }
    .with_context(|| format!("fetching {series} for {coin} ({period})"))?;

    info!(%series, %coin, %period, rows = table.len(), "fetched");
    Ok(table)
}

fn run_fetch(
    settings: &Settings,
    series: Series,
    coin: Option<String>,
    period: Option<String>,
    csv: Option<PathBuf>,
    parquet: Option<PathBuf>,
) -> Result<()> {
    let table = fetch_series(settings, series, coin, period)?;
    println!("{}", table.to_dataframe()?);

    if let Some(path) = csv {
        table.write_csv(&path)?;
        info!(path = %path.display(), "wrote csv");
    }
    if let Some(path) = parquet {
        table.write_parquet(&path)?;
        info!(path = %path.display(), "wrote parquet");
    }
    Ok(())
}

fn run_plot(
    settings: &Settings,
    series: Series,
    coin: Option<String>,
    period: Option<String>,
    size: FigureSize,
) -> Result<()> {
    let table = fetch_series(settings, series, coin, period)?;
    if table.is_empty() {
        bail!("{series}: no rows to plot");
    }
    let mut figure = series_figure(&table, size);
    figure.title = Some(series.to_string());
    show(&figure)?;
    Ok(())
}

/// Price, when present, on the log-scaled twin; every other scalar column on
/// the primary axes.
fn series_figure(table: &MetricTable, size: FigureSize) -> Figure {
    let mut figure = match table.scalar(PRICE_COLUMN) {
        Some(prices) => with_price_overlay(table.times(), prices, size),
        None => prepare_canvas(size),
    };

    let names: Vec<&str> = table
        .column_names()
        .into_iter()
        .filter(|name| *name != TIME_COLUMN && *name != PRICE_COLUMN)
        .collect();
    if let [only] = names.as_slice() {
        figure.primary.set_y_label(*only, size.font_size);
    }
    for name in &names {
        if let Some(values) = table.scalar(name) {
            figure.primary.plot_times(table.times(), values).label(*name);
        }
    }
    figure.primary.show_legend();
    figure
}
