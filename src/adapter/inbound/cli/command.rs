//! Command-line interface definitions.
//!
//! Defines the CLI structure for the oceanus application using `clap`.
//! The CLI runs the analysis dashboard, lists filter options and manages
//! configuration files.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{FilterKind, FilterSet};

/// Temporal matching and anomaly detection over a maritime activity graph
#[derive(Parser, Debug)]
#[command(name = "oceanus")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the oceanus CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every dashboard panel for a date window and filters
    Analyze(AnalyzeArgs),

    /// List dropdown values for one filter dimension
    Options(OptionsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `oceanus config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Dashboard panels that can be printed on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Panel {
    /// Deliveries matched to vessel exits, with clusters
    Matched,
    /// Daily cargo and vessel counts with rolling anomalies
    Timeline,
    /// Dwell time per vessel, location and day
    Dwell,
    /// Fish deliveries scored by the isolation forest
    Outliers,
    /// Fish deliveries clustered by date and city
    DeliveryClusters,
    /// Quantity per city and species
    Species,
    /// Seasonal decomposition of daily cargo
    Decomposition,
}

impl Panel {
    pub const ALL: [Panel; 7] = [
        Panel::Matched,
        Panel::Timeline,
        Panel::Dwell,
        Panel::Outliers,
        Panel::DeliveryClusters,
        Panel::Species,
        Panel::Decomposition,
    ];

    /// Key used in JSON output.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Panel::Matched => "matched",
            Panel::Timeline => "timeline",
            Panel::Dwell => "dwell",
            Panel::Outliers => "outliers",
            Panel::DeliveryClusters => "delivery_clusters",
            Panel::Species => "species",
            Panel::Decomposition => "decomposition",
        }
    }

    /// Section title used in table output.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Panel::Matched => "Matched exits",
            Panel::Timeline => "Daily timeline",
            Panel::Dwell => "Dwell time",
            Panel::Outliers => "Delivery outliers",
            Panel::DeliveryClusters => "Delivery clusters",
            Panel::Species => "Species breakdown",
            Panel::Decomposition => "Seasonal decomposition",
        }
    }
}

/// Dropdown selections shared by `analyze` and `options`.
///
/// Each flag may be repeated; an absent flag leaves the dimension
/// unconstrained.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Restrict to a company (repeatable)
    #[arg(long = "company", value_name = "NAME")]
    pub companies: Vec<String>,

    /// Restrict to a city (repeatable)
    #[arg(long = "city", value_name = "NAME")]
    pub cities: Vec<String>,

    /// Restrict to a port (repeatable)
    #[arg(long = "port", value_name = "NAME")]
    pub ports: Vec<String>,

    /// Restrict to a region (repeatable)
    #[arg(long = "region", value_name = "NAME")]
    pub regions: Vec<String>,

    /// Restrict to a vessel (repeatable)
    #[arg(long = "vessel", value_name = "ID")]
    pub vessels: Vec<String>,

    /// Restrict to a fish species (repeatable)
    #[arg(long = "species", value_name = "NAME")]
    pub species: Vec<String>,
}

impl FilterArgs {
    /// Collect the flags into a [`FilterSet`].
    #[must_use]
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .with(FilterKind::Company, self.companies.iter().cloned())
            .with(FilterKind::City, self.cities.iter().cloned())
            .with(FilterKind::Port, self.ports.iter().cloned())
            .with(FilterKind::Region, self.regions.iter().cloned())
            .with(FilterKind::Vessel, self.vessels.iter().cloned())
            .with(FilterKind::Species, self.species.iter().cloned())
    }
}

/// Arguments for `oceanus analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print only this panel
    #[arg(long, value_enum)]
    pub panel: Option<Panel>,

    /// Maximum rows printed per panel
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `oceanus options`.
#[derive(Args, Debug)]
pub struct OptionsArgs {
    /// Filter dimension (company, city, port, region, vessel, species)
    pub kind: FilterKind,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Arguments for `oceanus config init`.
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output path for config file
    #[arg(default_value = "config.toml")]
    pub path: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

/// Config file path argument.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(default_value = "config.toml")]
    pub config: PathBuf,
}
