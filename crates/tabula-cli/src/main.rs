//! tabula command-line interface.
//!
//! Resample sample tables from TOML job files:
//! ```sh
//! tabula resample job.toml
//! tabula inspect samples.csv
//! tabula validate job.toml
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "tabula: interpolated retrieval from sampled time series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resample a table at the query points of a TOML job file.
    Resample {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarise a sample table.
    Inspect {
        /// Path to the CSV sample table.
        table: PathBuf,
        /// Name of the independent column (default: the first column).
        #[arg(short, long)]
        independent: Option<String>,
    },
    /// Validate a job file and its input table without resampling.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resample { config, output } => {
            println!("tabula resample");
            println!("===============");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_resample(&job, &config)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_resampled_csv(&result, &out_dir.join("resampled.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_resampled_json(&result, &out_dir.join("resampled.json"))?;
            }

            println!("Resampling complete.");
            Ok(())
        }
        Commands::Inspect { table, independent } => {
            let series = tabula_io::read_table(&table, independent.as_deref())?;
            let summary = runner::summarize(&series)?;

            println!("Table: {}", table.display());
            println!("  samples:     {}", summary.samples);
            println!("  independent: {}", summary.independent.label());
            match summary.range {
                Some((lo, hi)) => println!("  range:       [{}, {}]", lo, hi),
                None => println!("  range:       (empty)"),
            }
            match summary.direction {
                Some(direction) => println!("  ordering:    {:?}", direction),
                None => println!("  ordering:    not strictly monotonic"),
            }
            println!("  channels:    {}", summary.channels.len());
            for channel in &summary.channels {
                match (channel.min, channel.max) {
                    (Some((x_min, min)), Some((x_max, max))) => println!(
                        "    {:<20} min {} at {}, max {} at {}",
                        channel.info.label(),
                        min,
                        x_min,
                        max,
                        x_max
                    ),
                    _ => println!("    {}", channel.info.label()),
                }
            }
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let series = runner::load_series(&job, &config)?;
            if series.len() < series.window_size() {
                anyhow::bail!(
                    "Input has {} samples but the interpolation window needs {}",
                    series.len(),
                    series.window_size()
                );
            }
            println!("Configuration is valid: {}", config.display());
            println!(
                "  {} samples, {} channels, {} queries",
                series.len(),
                series.num_channels(),
                job.query.points().len()
            );
            Ok(())
        }
    }
}
