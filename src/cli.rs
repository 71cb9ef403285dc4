//! CLI definition and dispatch.

use chrono::{NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_bar_adapter::CsvBarAdapter;
use crate::adapters::csv_metadata_adapter::CsvMetadataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{
    parse_symbols, run_analysis_batch, run_screening_batch, shortlist, BatchTally,
};
use crate::domain::error::MarketstageError;
use crate::domain::resample::DEFAULT_WEEK_END;
use crate::domain::sector::{aggregate_sectors, DurationBucket, DEFAULT_TOP_MOVERS};
use crate::domain::bar::{BarSeries, Timeframe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::BarDataPort;
use crate::ports::metadata_port::MetadataPort;

#[derive(Parser, Debug)]
#[command(name = "marketstage", about = "Stage analysis and screening engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Daily indicator analysis with confidence scores
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols (defaults to the configured universe)
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Weekly Weinstein stage screening
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
        /// Print only the symbols passing all conditions
        #[arg(long)]
        shortlist_only: bool,
    },
    /// Sector performance heatmap
    Heatmap {
        #[arg(short, long)]
        config: PathBuf,
        /// Duration bucket: 1d, 1w, 1m, 3m, 6m, 1y, ytd
        #[arg(long, default_value = "1w")]
        duration: String,
        /// Custom window start (overrides --duration with --end-date)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// List the configured instrument universe
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing();

    match cli.command {
        Command::Analyze { config, symbols } => run_analyze(&config, symbols.as_deref()),
        Command::Screen {
            config,
            symbols,
            shortlist_only,
        } => run_screen(&config, symbols.as_deref(), shortlist_only),
        Command::Heatmap {
            config,
            duration,
            start_date,
            end_date,
        } => run_heatmap(&config, &duration, start_date, end_date),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketstage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = MarketstageError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

struct Wiring {
    bars: CsvBarAdapter,
    metadata: CsvMetadataAdapter,
    week_end: Weekday,
    top_movers: usize,
}

fn build_wiring(config: &FileConfigAdapter) -> Result<Wiring, MarketstageError> {
    let bars_dir = config
        .get_string("data", "bars_dir")
        .ok_or_else(|| MarketstageError::ConfigMissing {
            section: "data".into(),
            key: "bars_dir".into(),
        })?;
    let instruments_file = config.get_string("data", "instruments_file").ok_or_else(|| {
        MarketstageError::ConfigMissing {
            section: "data".into(),
            key: "instruments_file".into(),
        }
    })?;
    let benchmark_symbol = config
        .get_string("data", "benchmark_symbol")
        .unwrap_or_else(|| "NIFTY50".to_string());

    let week_end = match config.get_string("screening", "week_ends_on") {
        None => DEFAULT_WEEK_END,
        Some(value) => value.parse::<Weekday>().map_err(|_| {
            MarketstageError::ConfigInvalid {
                section: "screening".into(),
                key: "week_ends_on".into(),
                reason: format!("{} is not a weekday", value),
            }
        })?,
    };

    Ok(Wiring {
        bars: CsvBarAdapter::new(PathBuf::from(bars_dir), benchmark_symbol),
        metadata: CsvMetadataAdapter::from_file(&instruments_file)?,
        week_end,
        top_movers: config.get_usize("heatmap", "top_movers", DEFAULT_TOP_MOVERS),
    })
}

fn resolve_symbols(
    metadata: &CsvMetadataAdapter,
    symbols_arg: Option<&str>,
) -> Result<Vec<String>, MarketstageError> {
    match symbols_arg {
        Some(list) => parse_symbols(list),
        None => metadata.list_symbols(),
    }
}

fn print_tally(tally: &BatchTally) {
    eprintln!(
        "{} of {} symbols processed, {} skipped",
        tally.succeeded,
        tally.requested,
        tally.skipped.len()
    );
    for skipped in &tally.skipped {
        eprintln!("  skipped {}: {}", skipped.symbol, skipped.reason);
    }
}

fn run_analyze(config_path: &PathBuf, symbols_arg: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let wiring = match build_wiring(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let symbols = match resolve_symbols(&wiring.metadata, symbols_arg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let (results, tally) = run_analysis_batch(&wiring.bars, &wiring.metadata, &symbols);

    println!(
        "{:<12} {:<28} {:>10} {:>6} {:>6} {:>12} {:>10} {:>10}",
        "SYMBOL", "NAME", "PRICE", "RSI", "CONF", "MACD", "EMA21", "EMA200"
    );
    for row in &results {
        let rsi = row
            .frame
            .latest()
            .and_then(|r| r.rsi_14)
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<28} {:>10.2} {:>6} {:>6} {:>12} {:>10} {:>10}",
            row.symbol,
            truncate(&row.name, 28),
            row.current_price,
            rsi,
            row.confidence.total,
            format!("{:?}", row.macd_state),
            format!("{:?}", row.ema_21_state),
            format!("{:?}", row.ema_200_state),
        );
    }
    print_tally(&tally);

    ExitCode::SUCCESS
}

fn run_screen(config_path: &PathBuf, symbols_arg: Option<&str>, shortlist_only: bool) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let wiring = match build_wiring(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let symbols = match resolve_symbols(&wiring.metadata, symbols_arg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let (results, tally) =
        run_screening_batch(&wiring.bars, &wiring.metadata, &symbols, wiring.week_end);

    if shortlist_only {
        for symbol in shortlist(&results) {
            println!("{symbol}");
        }
        print_tally(&tally);
        return ExitCode::SUCCESS;
    }

    println!(
        "{:<12} {:>5} {:<14} {:>10} {:>8} {:>12} {:>10} {:>8}",
        "SYMBOL", "SCORE", "STAGE", "PRICE", "CHG%", "VOLUME", "MA30", "RS"
    );
    for row in &results {
        let chg = row
            .change_percent
            .map(|v| format!("{:+.2}", v))
            .unwrap_or_else(|| "-".into());
        let ma30 = row
            .ma30
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".into());
        let rs = row
            .rs
            .map(|v| format!("{:.4}", v))
            .unwrap_or_else(|| "-".into());
        let stage = if row.weinstein.insufficient_history {
            "insufficient".to_string()
        } else {
            row.stage.to_string()
        };
        println!(
            "{:<12} {:>5} {:<14} {:>10.2} {:>8} {:>12} {:>10} {:>8}",
            row.symbol, row.weinstein.score, stage, row.price, chg, row.volume, ma30, rs,
        );
    }
    print_tally(&tally);

    ExitCode::SUCCESS
}

fn run_heatmap(
    config_path: &PathBuf,
    duration: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let wiring = match build_wiring(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let symbols = match wiring.metadata.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Load everything that resolves; missing symbols just drop out of the
    // aggregation, mirroring batch behavior elsewhere.
    let mut series: Vec<BarSeries> = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        if let Ok(bars) = wiring.bars.fetch_daily(symbol, None, None) {
            let s = BarSeries::from_bars(symbol, Timeframe::Daily, bars);
            if !s.is_empty() {
                series.push(s);
            }
        }
    }

    let latest = series
        .iter()
        .filter_map(|s| s.last().map(|b| b.date))
        .max();
    let Some(as_of) = latest else {
        eprintln!("error: no bar data found");
        let err = MarketstageError::DataSource {
            reason: "no bar data found".into(),
        };
        return (&err).into();
    };

    let window = match (start_date, end_date) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, as_of),
        _ => match DurationBucket::parse(duration) {
            Some(bucket) => bucket.resolve(end_date.unwrap_or(as_of)),
            None => {
                let err = MarketstageError::ConfigInvalid {
                    section: "heatmap".into(),
                    key: "duration".into(),
                    reason: format!("{} (use 1d, 1w, 1m, 3m, 6m, 1y, ytd)", duration),
                };
                eprintln!("error: {err}");
                return (&err).into();
            }
        },
    };

    let metadata = &wiring.metadata;
    let summaries = aggregate_sectors(
        &series,
        |symbol| metadata.sector_of(symbol),
        window,
        wiring.top_movers,
    );

    println!("window: {} to {}", window.0, window.1);
    println!(
        "{:<28} {:>8} {:>8} {:>14}  {}",
        "SECTOR", "AVG%", "COUNT", "VOLUME", "TOP MOVERS"
    );
    for summary in &summaries {
        let movers = summary
            .ranked_top_movers
            .iter()
            .map(|m| format!("{} {:+.2}%", m.symbol, m.change_percent))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<28} {:>8.2} {:>8} {:>14}  {}",
            truncate(&summary.sector_name, 28),
            summary.average_change_percent,
            summary.member_count,
            summary.total_volume,
            movers,
        );
    }

    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let wiring = match build_wiring(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match wiring.metadata.list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{} - {}", symbol, wiring.metadata.name_of(&symbol));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}
