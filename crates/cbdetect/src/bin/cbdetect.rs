//! cbdetect CLI: find a chessboard in an image and print its corners as JSON.

use cbdetect::detect::{detect_chessboards, gray_view, load_gray};
use cbdetect::{DetectorParams, GridDetection};
use clap::{Parser, ValueEnum};
use log::{info, warn, LevelFilter};
use serde::Serialize;
use std::path::PathBuf;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "cbdetect")]
#[command(about = "Detect chessboard calibration grids and print their corners as JSON")]
#[command(version)]
struct Cli {
    /// Path to the input image (any format the `image` crate decodes).
    #[arg(long)]
    image: PathBuf,

    /// Expected number of inner corners per row.
    #[arg(long)]
    cols: usize,

    /// Expected number of inner corners per column.
    #[arg(long)]
    rows: usize,

    /// JSON file with detector parameters; missing fields keep defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report every detected grid instead of only the best one.
    #[arg(long)]
    all: bool,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Serialize)]
struct Report {
    image: String,
    width: usize,
    height: usize,
    expected_cols: usize,
    expected_rows: usize,
    candidates: usize,
    grids: Vec<GridDetection>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    #[cfg(feature = "tracing")]
    cbdetect::core::init_tracing(false, cli.log_level.into());
    #[cfg(not(feature = "tracing"))]
    cbdetect::core::init_with_level(cli.log_level.into())?;

    let params = match &cli.config {
        Some(path) => DetectorParams::from_json_file(path)?,
        None => DetectorParams::default(),
    };

    info!("loading {}", cli.image.display());
    let img = load_gray(&cli.image)?;
    let view = gray_view(&img);
    let result = detect_chessboards(&view, &params)?;

    let mut grids = result.grids();
    if !cli.all {
        grids.truncate(1);
    }
    if let Some(best) = grids.first() {
        if !best.matches_shape(cli.cols, cli.rows) {
            warn!(
                "best grid is {}x{}, expected {}x{}",
                best.cols, best.rows, cli.cols, cli.rows
            );
        }
    }

    let report = Report {
        image: cli.image.display().to_string(),
        width: view.width,
        height: view.height,
        expected_cols: cli.cols,
        expected_rows: cli.rows,
        candidates: result.candidates.len(),
        grids,
    };
    let json = serde_json::to_string_pretty(&report)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
