use anyhow::Result;
use clap::Parser;
use etv::{cli::Cli, config::EtvConfig, driver};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `info` by default, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => EtvConfig::from_file(path)?,
        None => EtvConfig::default(),
    };
    let config = args.apply_overrides(config);

    let outcome = driver::run(&args.in_dir, args.out_dir(), &config)?;

    match outcome {
        driver::DriverOutcome::Basic {
            households,
            filtered_households,
        } => println!(
            "{} households, {} with good daily data; no segmentation (no logs/grouping.csv)",
            households, filtered_households
        ),
        driver::DriverOutcome::Segmented {
            households,
            segmented_households,
            summary,
            ..
        } => println!(
            "{} households, {} segmented; mean efficacy {:.3} (SD {:.3})",
            households, segmented_households, summary.efficacy.mean, summary.efficacy.p_sd
        ),
    }

    Ok(())
}
