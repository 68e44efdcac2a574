//! # recovlit CLI
//!
//! Command-line front end for the drug-recovery harmonization pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Run the batch pipeline
//! recovlit run data/ --sim-dir sim_reports/ --out-dir out/
//!
//! # Inspect an output table
//! recovlit info out/harmonized.parquet
//! ```

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use parquet::file::reader::{FileReader, SerializedFileReader};

use recovlit::bins::BinEdges;
use recovlit::config::Config;
use recovlit::pipeline::{self, PipelineConfig};
use recovlit::tolerance::ToleranceWindow;
use recovlit::writer::{CompressionType, WriterConfig};

/// recovlit - Drug-Recovery Literature Harmonization
#[derive(Parser)]
#[command(name = "recovlit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch pipeline over a source directory
    Run {
        /// Source directory containing literature_sources/*.csv
        #[arg(value_name = "SRC_DIR")]
        src_dir: PathBuf,

        /// Output directory for the Parquet tables (created if needed)
        #[arg(short, long, default_value = "recovlit_out")]
        out_dir: PathBuf,

        /// Optional simulation-report directory
        /// (recovery_standard.csv / recovery_panda.csv)
        #[arg(short, long)]
        sim_dir: Option<PathBuf>,

        /// Pass/alert cutoff on recovery percent
        #[arg(long)]
        cutoff: Option<f64>,

        /// Lower bound of the tolerance window (µg/mL, inclusive)
        #[arg(long)]
        window_low: Option<f64>,

        /// Upper bound of the tolerance window (µg/mL, inclusive)
        #[arg(long)]
        window_high: Option<f64>,

        /// ZSTD compression level for output files (1-22)
        #[arg(short = 'c', long)]
        compression_level: Option<i32>,

        /// Optional TOML configuration file (flags take precedence)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Display information about a recovlit Parquet file
    Info {
        /// Input Parquet file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Run {
            src_dir,
            out_dir,
            sim_dir,
            cutoff,
            window_low,
            window_high,
            compression_level,
            config,
        } => run_pipeline(
            src_dir,
            out_dir,
            sim_dir,
            cutoff,
            window_low,
            window_high,
            compression_level,
            config,
        ),
        Commands::Info { file } => run_info(file),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pipeline(
    src_dir: PathBuf,
    out_dir: PathBuf,
    sim_dir: Option<PathBuf>,
    cutoff: Option<f64>,
    window_low: Option<f64>,
    window_high: Option<f64>,
    compression_level: Option<i32>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let file_config = match &config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let mut pipeline_config = PipelineConfig::default();

    // Config file first, then CLI flags on top.
    if let Some(value) = file_config.analysis.cutoff {
        pipeline_config.cutoff = value;
    }
    if let Some([low, high]) = file_config.analysis.window {
        pipeline_config.window = ToleranceWindow::new(low, high);
    }
    if let Some(edges) = file_config.analysis.bin_edges {
        pipeline_config.bin_edges = BinEdges::new(edges).context("Invalid bin_edges in config")?;
    }

    let mut writer_config = WriterConfig::default();
    if let Some(level) = file_config.output.compression_level {
        writer_config.compression = CompressionType::Zstd(level);
    }
    if let Some(size) = file_config.output.row_group_size {
        writer_config.row_group_size = size;
    }
    if let Some(level) = compression_level {
        writer_config.compression = CompressionType::Zstd(level);
    }
    pipeline_config.writer = writer_config;

    if let Some(value) = cutoff {
        pipeline_config.cutoff = value;
    }
    if window_low.is_some() || window_high.is_some() {
        pipeline_config.window = ToleranceWindow::new(
            window_low.unwrap_or(pipeline_config.window.low),
            window_high.unwrap_or(pipeline_config.window.high),
        );
    }

    info!("recovlit - literature recovery harmonization");
    info!("Source: {}", src_dir.display());
    if let Some(sim) = &sim_dir {
        info!("Simulation reports: {}", sim.display());
    }
    info!("Output: {}", out_dir.display());
    info!("Cutoff: {}", pipeline_config.cutoff);
    info!(
        "Window: [{}, {}]",
        pipeline_config.window.low, pipeline_config.window.high
    );

    let stats = pipeline::run(&src_dir, sim_dir.as_deref(), &out_dir, &pipeline_config)
        .context("Pipeline run failed")?;

    println!("Run complete.");
    println!("  Source files:      {}", stats.source_files);
    println!("  Rows loaded:       {}", stats.normalize.rows_in);
    println!("  Rows kept:         {}", stats.normalize.rows_kept);
    println!("  Rows dropped:      {}", stats.normalize.rows_dropped);
    println!("  Recovery clipped:  {}", stats.normalize.recovery_clipped);
    println!("  PASS / ALERT:      {} / {}", stats.passes, stats.alerts);
    println!("  Simulation rows:   {}", stats.sim_rows);
    println!("  Tolerance groups:  {}", stats.tolerance_groups);
    println!("  Bin-aligned rows:  {}", stats.bin_rows);
    println!("  Output dir:        {}", out_dir.display());

    Ok(())
}

fn run_info(file: PathBuf) -> Result<()> {
    let handle = File::open(&file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let reader = SerializedFileReader::new(handle)
        .with_context(|| format!("Not a readable Parquet file: {}", file.display()))?;

    let metadata = reader.metadata();
    let file_metadata = metadata.file_metadata();

    println!("File: {}", file.display());
    println!("Rows: {}", file_metadata.num_rows());
    println!("Row groups: {}", metadata.num_row_groups());

    println!("Columns:");
    for column in file_metadata.schema_descr().columns() {
        println!("  {} ({})", column.name(), column.physical_type());
    }

    if let Some(kv) = file_metadata.key_value_metadata() {
        println!("Footer metadata:");
        for entry in kv {
            println!(
                "  {} = {}",
                entry.key,
                entry.value.as_deref().unwrap_or("<none>")
            );
        }
    }

    Ok(())
}
