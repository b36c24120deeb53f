//! CLI argument parsing for etv

use crate::config::EtvConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "etv")]
#[command(version)]
#[command(
    about = "Energy-saving trial verification: heating efficiency and efficacy per household",
    long_about = None
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// IANA timezone of the households (e.g. Europe/London)
    #[arg(long = "timezone", value_name = "TZ")]
    pub timezone: Option<String>,

    /// Base temperature of the HDD data in Celsius
    #[arg(long = "base-temp", value_name = "C")]
    pub base_temp: Option<f32>,

    /// Worker threads for per-household computation
    #[arg(short = 'j', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug")]
    pub debug: bool,

    /// Directory holding HDD.csv, NkWh.csv and optionally logs/
    #[arg(value_name = "IN_DIR")]
    pub in_dir: PathBuf,

    /// Directory for the reports (defaults to IN_DIR)
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: Option<PathBuf>,
}

impl Cli {
    /// Output directory, falling back to the input directory
    pub fn out_dir(&self) -> &PathBuf {
        self.out_dir.as_ref().unwrap_or(&self.in_dir)
    }

    /// Apply command-line overrides on top of `config`
    pub fn apply_overrides(&self, mut config: EtvConfig) -> EtvConfig {
        if let Some(tz) = &self.timezone {
            config.timezone = tz.clone();
        }
        if let Some(base) = self.base_temp {
            config.base_temperature_c = base;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config
    }
}
