//! energy-plots entry point: CLI wiring, config loading and chart dispatch.

mod cli;

use std::error::Error;
use std::fmt::Display;
use std::io;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use energy_plots::config::{PlotsConfig, WindConfig};
use energy_plots::error::PlotError;
use energy_plots::plots::{self, Prepared, RunOptions};
use energy_plots::plots::{
    categories, emissions, extremes, fission, half_life, intermittency, nuclear_cf, planets,
    primary_energy, timeline, venn, wind,
};

use cli::{Cli, Command};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Prints the summary to stdout, then exports and renders.
fn finish<S: Display>(prepared: Prepared<S>, opts: &RunOptions) -> Result<(), PlotError> {
    println!("{}", prepared.summary);
    if let Some(path) = plots::run(&prepared, opts)? {
        eprintln!("Chart written to {}", path.display());
    }
    Ok(())
}

/// Copies subcommand flags that shadow config fields into `cfg`.
fn apply_overrides(command: &Command, cfg: &mut PlotsConfig) {
    match command {
        Command::NuclearCf {
            window: Some(window),
        } => cfg.nuclear_cf.window = *window,
        Command::MeanOfExtremes {
            seed: Some(seed), ..
        } => cfg.extremes.synthetic.seed = *seed,
        _ => {}
    }
}

fn dispatch(command: Command, cfg: &PlotsConfig, opts: &RunOptions) -> Result<(), PlotError> {
    match command {
        Command::Intermittency { plot } => {
            finish(intermittency::prepare(&cfg.intermittency, plot)?, opts)
        }
        Command::Wind(args) => {
            let request = wind::WindRequest::new(args.view, args.year, args.start, args.end)?;
            finish(wind::prepare(&cfg.wind, &request)?, opts)
        }
        Command::NuclearCf { .. } => finish(nuclear_cf::prepare(&cfg.nuclear_cf)?, opts),
        Command::Categories(args) => finish(
            categories::prepare(&cfg.datasets.path, &args.key, args.attribute, args.sort)?,
            opts,
        ),
        Command::Emissions { key } => {
            let key = key.unwrap_or_else(|| cfg.datasets.emissions_key.clone());
            finish(emissions::prepare(&cfg.datasets.path, &key)?, opts)
        }
        Command::Fission => finish(fission::prepare(&cfg.fission)?, opts),
        Command::HalfLife => finish(half_life::prepare(&cfg.half_life)?, opts),
        Command::MeanOfExtremes { synthetic, .. } => {
            finish(extremes::prepare(&cfg.extremes, synthetic)?, opts)
        }
        Command::Timeline => finish(timeline::prepare(&cfg.timeline)?, opts),
        Command::Planets => finish(planets::prepare()?, opts),
        Command::PrimaryEnergy { key } => {
            let key = key.unwrap_or_else(|| cfg.datasets.consumption_key.clone());
            finish(primary_energy::prepare(&cfg.datasets.path, &key)?, opts)
        }
        Command::Venn => finish(venn::prepare()?, opts),
    }
}

fn report(err: &PlotError) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    // Without a config file the wind layout follows --year
    let mut config = match &cli.global.config {
        Some(path) => match PlotsConfig::from_toml_file(path) {
            Ok(cfg) => {
                info!(file = %path.display(), "loaded config");
                cfg
            }
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => {
            let mut cfg = PlotsConfig::default();
            if let Command::Wind(args) = &cli.command {
                cfg.wind = WindConfig::for_year(args.year);
            }
            cfg
        }
    };

    apply_overrides(&cli.command, &mut config);
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let opts = RunOptions {
        output: cli.global.output,
        size: config.render.size(),
        summary_only: cli.global.summary_only,
        series_out: cli.global.series_out,
    };

    if let Err(e) = dispatch(cli.command, &config, &opts) {
        report(&e);
        process::exit(1);
    }
}
