mod input;
mod logging;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use input::MatrixFile;
use logging::init_logging;
use matrix_core::MatrixError;
use matrix_generate::{MatrixEngine, Rows};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "matrix", version, about = "Preview cartesian test-case matrices")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every combination of a dimension file.
    Preview(PreviewArgs),
    /// Print the number of combinations of a dimension file.
    Count(CountArgs),
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Dimension file (TOML, or JSON with a `.json` extension).
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Stop after this many cases.
    #[arg(long)]
    limit: Option<usize>,
    /// Override `options.max_combinations` from the file.
    #[arg(long)]
    max_combinations: Option<usize>,
}

#[derive(Args, Debug)]
struct CountArgs {
    /// Dimension file (TOML, or JSON with a `.json` extension).
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per line.
    Json,
    /// Ordinal, case name and JSON object separated by tabs.
    Table,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    match cli.command {
        Command::Preview(args) => run_preview(args),
        Command::Count(args) => run_count(args),
    }
}

fn run_preview(args: PreviewArgs) -> Result<(), CliError> {
    let PreviewArgs {
        file,
        format,
        limit,
        max_combinations,
    } = args;

    let timer = Instant::now();
    let rows = load_rows(&file, max_combinations)?;
    let total = rows.total();
    tracing::info!(event = "preview_started", file = %file.display(), total);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut written = 0_usize;
    for row in rows.take(limit.unwrap_or(usize::MAX)) {
        let values = serde_json::to_string(&row.values)?;
        match format {
            Format::Json => writeln!(out, "{values}")?,
            Format::Table => writeln!(out, "{}\t{}\t{values}", row.ordinal, row.name())?,
        }
        written += 1;
    }
    out.flush()?;

    tracing::info!(
        event = "preview_finished",
        written,
        total,
        duration_ms = timer.elapsed().as_millis() as u64
    );
    Ok(())
}

fn run_count(args: CountArgs) -> Result<(), CliError> {
    let rows = load_rows(&args.file, None)?;
    println!("{}", rows.total());
    Ok(())
}

fn load_rows(path: &Path, max_combinations: Option<usize>) -> Result<Rows, CliError> {
    let file = MatrixFile::load(path)?;
    let shape = file.shape();

    let mut options = file.options.clone();
    if max_combinations.is_some() {
        options.max_combinations = max_combinations;
    }

    let engine = MatrixEngine::new(options);
    match engine.rows(&shape, &file.dimension_values()) {
        Ok(rows) => Ok(rows),
        Err(err) => {
            tracing::warn!(event = "matrix_rejected", error = %err, category = ?err.category());
            Err(err.into())
        }
    }
}
