use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use energy_plots::plots::categories::SortOrder;
use energy_plots::plots::intermittency::IntermittencyPlot;
use energy_plots::plots::wind::WindView;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Energy and nuclear explanatory charts from public grid data",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// TOML file overriding input paths and chart parameters
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Image path; `.svg` selects vector output, anything else PNG
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Print the summary without rendering
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub summary_only: bool,

    /// Also write the plotted series as `series,x,value` CSV
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub series_out: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seasonal demand and solar variation from CAISO daily exports
    Intermittency {
        #[arg(long, value_enum, default_value_t = IntermittencyPlot::Scenario)]
        plot: IntermittencyPlot,
    },
    /// BPA wind generation or generation mix for one year
    Wind(WindArgs),
    /// Monthly US nuclear capacity factors with a rolling average
    NuclearCf {
        /// Rolling window in months
        #[arg(long)]
        window: Option<usize>,
    },
    /// Bar chart of one table of the energy-sources dataset
    Categories(CategoryArgs),
    /// Yearly CO2 emissions per region
    Emissions {
        /// Dataset table holding the trend
        #[arg(long)]
        key: Option<String>,
    },
    /// Energy released by fission of 1 kg U-235
    Fission,
    /// Exponential decay curves
    HalfLife,
    /// Mean, median and mean of the extremes of nuclear lifecycle studies
    MeanOfExtremes {
        /// Use a generated demo dataset instead of the study table
        #[arg(long, action = ArgAction::SetTrue)]
        synthetic: bool,

        /// Seed of the generated dataset
        #[arg(long, requires = "synthetic")]
        seed: Option<u64>,
    },
    /// Power Demonstration Reactor Program timeline
    Timeline,
    /// Solar insolence across the planets
    Planets,
    /// Worldwide primary energy consumption by source
    PrimaryEnergy {
        /// Dataset table holding the consumption breakdown
        #[arg(long)]
        key: Option<String>,
    },
    /// Which sources are renewable, scalable now and low carbon
    Venn,
}

#[derive(Args, Debug)]
pub struct WindArgs {
    #[arg(long, value_enum, default_value_t = WindView::Capacity)]
    pub view: WindView,

    /// Year of the BPA workbook; picks the input layout unless --config is given
    #[arg(long, default_value_t = 2020)]
    pub year: i32,

    /// First day shown (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day shown (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    /// Table name in the dataset file
    #[arg(required = true)]
    pub key: String,

    /// Index into list values (default: the middle one)
    #[arg(long)]
    pub attribute: Option<usize>,

    #[arg(long, value_enum, default_value_t = SortOrder::Label)]
    pub sort: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("energy-plots").chain(args.iter().copied()))
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["fission", "--summary-only", "-o", "out.svg"]).expect("valid args");
        assert!(cli.global.summary_only);
        assert_eq!(cli.global.output, Some(PathBuf::from("out.svg")));
        assert!(matches!(cli.command, Command::Fission));
    }

    #[test]
    fn intermittency_defaults_to_scenario() {
        let cli = parse(&["intermittency"]).expect("valid args");
        assert!(matches!(
            cli.command,
            Command::Intermittency {
                plot: IntermittencyPlot::Scenario
            }
        ));
    }

    #[test]
    fn wind_dates_parse() {
        let cli = parse(&[
            "wind", "--view", "mix", "--year", "2019", "--start", "2019-12-01",
        ])
        .expect("valid args");
        let Command::Wind(args) = cli.command else {
            panic!("expected wind");
        };
        assert_eq!(args.view, WindView::Mix);
        assert_eq!(args.year, 2019);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2019, 12, 1));
        assert_eq!(args.end, None);
    }

    #[test]
    fn wind_rejects_bad_date() {
        assert!(parse(&["wind", "--start", "12/01/2019"]).is_err());
    }

    #[test]
    fn categories_requires_key() {
        assert!(parse(&["categories"]).is_err());
        let cli = parse(&["categories", "lifecycle_emissions", "--sort", "descending"])
            .expect("valid args");
        let Command::Categories(args) = cli.command else {
            panic!("expected categories");
        };
        assert_eq!(args.key, "lifecycle_emissions");
        assert_eq!(args.sort, SortOrder::Descending);
    }

    #[test]
    fn seed_requires_synthetic() {
        assert!(parse(&["mean-of-extremes", "--seed", "7"]).is_err());
        assert!(parse(&["mean-of-extremes", "--synthetic", "--seed", "7"]).is_ok());
    }

    #[test]
    fn unknown_subcommand_fails() {
        assert!(parse(&["moons"]).is_err());
    }

    #[test]
    fn primary_energy_key_is_optional() {
        let cli = parse(&["primary-energy"]).expect("valid args");
        assert!(matches!(cli.command, Command::PrimaryEnergy { key: None }));
        let cli = parse(&["primary-energy", "--key", "consumption_2017"]).expect("valid args");
        let Command::PrimaryEnergy { key } = cli.command else {
            panic!("expected primary-energy");
        };
        assert_eq!(key.as_deref(), Some("consumption_2017"));
        assert!(matches!(parse(&["planets"]).map(|c| c.command), Ok(Command::Planets)));
        assert!(matches!(parse(&["venn"]).map(|c| c.command), Ok(Command::Venn)));
    }
}
