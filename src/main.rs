use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tinytiles::{DEFAULT_BATCH_SIZE, DEFAULT_OUTPUT, Progress, RunConfig, RunSummary};
use tracing_subscriber::EnvFilter;

/// Shrink an MBTiles archive by removing every layer and attribute a map style
/// never uses.
#[derive(Parser, Debug)]
#[command(name = "tinytiles", version, about)]
struct Cli {
    /// Source MBTiles archive
    input: PathBuf,

    /// Style document whose layers decide what is kept
    style: PathBuf,

    /// Regex of attribute names to keep even if the style never uses them
    #[arg(short = 'a', long)]
    keep_attributes: Option<String>,

    /// Regex of layer names to keep even if the style never uses them
    #[arg(short = 'l', long)]
    keep_layers: Option<String>,

    /// Where to write the reduced archive
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Tile payloads are gzip-compressed
    #[arg(short = 'g', long)]
    gzipped: bool,

    /// Tiles rewritten per transaction
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_owned()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut config = RunConfig::new(self.input, self.style)
            .with_output(self.output)
            .with_gzipped(self.gzipped)
            .with_batch_size(self.batch_size);
        if let Some(pattern) = self.keep_layers {
            config = config.with_keep_layers(pattern);
        }
        if let Some(pattern) = self.keep_attributes {
            config = config.with_keep_attributes(pattern);
        }
        config
    }
}

/// Tile progress drawn on stderr.
struct TileBar(ProgressBar);

impl TileBar {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} tiles [{elapsed_precise}<{eta_precise}]",
        ) {
            bar.set_style(style);
        }
        Self(bar)
    }
}

impl Progress for TileBar {
    fn start(&mut self, total: u64) {
        self.0.set_length(total);
    }

    fn advance(&mut self, tiles: u64) {
        self.0.inc(tiles);
    }

    fn finish(&mut self) {
        self.0.finish_and_clear();
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tinytiles=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<RunSummary> {
    let config = cli.into_config();
    let summary = tinytiles::run(&config, &mut TileBar::new())
        .with_context(|| format!("failed to optimize {}", config.input.display()))?;
    Ok(summary)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    init_logging();

    match execute(cli) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
