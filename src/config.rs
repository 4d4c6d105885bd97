//! TOML-based plot configuration.
//!
//! Every field defaults to the value the published charts were drawn with,
//! so an empty file (or no file at all) reproduces them. CLI flags override
//! individual fields after loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotsConfig {
    /// Output image size.
    #[serde(default)]
    pub render: RenderConfig,
    /// CAISO daily demand/solar inputs.
    #[serde(default)]
    pub intermittency: IntermittencyConfig,
    /// BPA generation workbook layout.
    #[serde(default)]
    pub wind: WindConfig,
    /// EIA monthly nuclear capacity factor workbook.
    #[serde(default)]
    pub nuclear_cf: NuclearCfConfig,
    /// Key-value dataset file shared by the category and emissions charts.
    #[serde(default)]
    pub datasets: DatasetsConfig,
    /// Fission energy breakdown input.
    #[serde(default)]
    pub fission: FissionConfig,
    /// Decay curves.
    #[serde(default)]
    pub half_life: HalfLifeConfig,
    /// Study table for the mean-of-extremes chart.
    #[serde(default)]
    pub extremes: ExtremesConfig,
    /// Reactor program timeline.
    #[serde(default)]
    pub timeline: TimelineConfig,
}

/// Output image size in pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
        }
    }
}

impl RenderConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// CAISO "Today's Outlook" CSV exports for one summer and one winter day.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntermittencyConfig {
    /// Directory holding the four exports.
    pub data_dir: PathBuf,
    pub summer_demand: String,
    pub winter_demand: String,
    pub summer_solar: String,
    pub winter_solar: String,
    /// Nominal spacing between samples (minutes).
    pub sample_interval_minutes: f64,
    /// CSV columns read per row, label column included.
    pub max_columns: usize,
    /// `chrono` format of `"<date> <time>"` built from the header row.
    pub timestamp_format: String,
    /// Row label prefix selecting the demand series.
    pub demand_row_prefix: String,
    /// Row label prefix selecting the solar series.
    pub solar_row_prefix: String,
}

impl Default for IntermittencyConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            summer_demand: "CAISO-demand-20190621.csv".to_string(),
            winter_demand: "CAISO-demand-20191221.csv".to_string(),
            summer_solar: "CAISO-renewables-20190621.csv".to_string(),
            winter_solar: "CAISO-renewables-20191221.csv".to_string(),
            sample_interval_minutes: 5.0,
            max_columns: 288,
            timestamp_format: "%m/%d/%Y %H:%M".to_string(),
            demand_row_prefix: "Demand (5".to_string(),
            solar_row_prefix: "Solar".to_string(),
        }
    }
}

/// Timestamp formats accepted in workbook date columns, tried in order.
fn default_timestamp_formats() -> Vec<String> {
    [
        "%m/%d/%y %H:%M",
        "%m/%d/%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d",
        "%Y %B",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// BPA "WindGenTotalLoadYTD" workbook, exported one CSV per sheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    /// Directory holding `<sheet>.csv` files.
    pub workbook: PathBuf,
    /// Sheets concatenated in order.
    pub sheets: Vec<String>,
    /// Preamble lines before the header row.
    pub skip_rows: usize,
    pub timestamp_column: String,
    pub timestamp_formats: Vec<String>,
    /// Source column name -> short name.
    pub renames: BTreeMap<String, String>,
    /// Rows with more empty cells than this are dropped.
    pub max_missing: usize,
    /// Nameplate capacity (MW); the observed peak when unset.
    pub capacity_mw: Option<f64>,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self::for_year(2020)
    }
}

impl WindConfig {
    /// Generation columns shown by the generation-mix view.
    pub const MIX_COLUMNS: &[&str] = &["Wind", "Hydro", "Nuclear", "Fossil/Biomass"];

    /// Layout of the workbook published for `year`.
    ///
    /// The preamble grew from 21 to 23 lines in the 2018 edition.
    pub fn for_year(year: i32) -> Self {
        let renames = [
            (
                "TOTAL WIND GENERATION  IN BPA CONTROL AREA (MW; SCADA 79687)",
                "Wind",
            ),
            ("TOTAL HYDRO GENERATION (MW; SCADA 79682)", "Hydro"),
            (
                "TOTAL FOSSIL/BIOMASS GENERATION (MW; SCADA 16377)",
                "Fossil/Biomass",
            ),
            ("TOTAL NUCLEAR GENERATION (MW; 70681)", "Nuclear"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        Self {
            workbook: PathBuf::from(format!("data/WindGenTotalLoadYTD_{year}")),
            sheets: vec!["January-June".to_string(), "July-December".to_string()],
            skip_rows: if year <= 2017 { 21 } else { 23 },
            timestamp_column: "Date/Time".to_string(),
            timestamp_formats: default_timestamp_formats(),
            renames,
            max_missing: 4,
            capacity_mw: None,
        }
    }
}

/// EIA Monthly Energy Review table 8.1, exported one CSV per sheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NuclearCfConfig {
    pub workbook: PathBuf,
    pub sheet: String,
    pub skip_rows: usize,
    pub date_column: String,
    pub value_column: String,
    pub timestamp_formats: Vec<String>,
    /// Rolling average window (months).
    pub window: usize,
}

impl Default for NuclearCfConfig {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("data/Table_8.1_Nuclear_Energy_Overview"),
            sheet: "Nick".to_string(),
            skip_rows: 0,
            date_column: "Month".to_string(),
            value_column: "Nuclear Generating Units, Capacity Factor".to_string(),
            timestamp_formats: default_timestamp_formats(),
            window: 12,
        }
    }
}

/// Key-value dataset file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetsConfig {
    pub path: PathBuf,
    /// Table holding the yearly emissions trend.
    pub emissions_key: String,
    /// Table holding worldwide primary energy consumption shares.
    pub consumption_key: String,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/energy-sources.toml"),
            emissions_key: "co2_emissions".to_string(),
            consumption_key: "worldwide_consumption".to_string(),
        }
    }
}

/// Fission energy release breakdown.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FissionConfig {
    /// Header-less `label,energy_ev` CSV.
    pub path: PathBuf,
    /// Total the components are normalized to (MWd/kg).
    pub total_mwd_per_kg: f64,
    /// Bar positions after which a dashed group divider is drawn.
    pub group_breaks: Vec<f64>,
}

impl Default for FissionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/u235-endf71-fission-energy.csv"),
            total_mwd_per_kg: crate::physics::U235_FISSION_MWD_PER_KG,
            group_breaks: vec![2.5, 5.5],
        }
    }
}

/// Radioactive decay curves.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HalfLifeConfig {
    /// Half-lives to draw (years).
    pub half_lives: Vec<f64>,
    /// Starting quantity (percent).
    pub initial: f64,
    /// Horizon (years).
    pub years: u32,
}

impl Default for HalfLifeConfig {
    fn default() -> Self {
        Self {
            half_lives: vec![50.0, 100.0, 200.0, 300.0],
            initial: 100.0,
            years: 500,
        }
    }
}

/// Lifecycle emission study table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtremesConfig {
    /// Whitespace-delimited study table.
    pub path: PathBuf,
    /// Leading tokens joined into the study label.
    pub label_tokens: usize,
    /// Token index of the harmonized value.
    pub value_column: usize,
    /// Parameters of the generated demo dataset.
    pub synthetic: SyntheticConfig,
}

impl Default for ExtremesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/yale-nuclear-co2-table.txt"),
            label_tokens: 2,
            value_column: 9,
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Clamped normal sample pinned at both bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    pub lower: f64,
    pub center: f64,
    pub upper: f64,
    pub std_dev: f64,
    /// Draws between the two pinned bounds.
    pub count: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            lower: 3.7,
            center: 12.0,
            upper: 110.0,
            std_dev: 5.0,
            count: 97,
            seed: 42,
        }
    }
}

/// Reactor program timeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineConfig {
    pub path: PathBuf,
    /// First year on the axis.
    pub start_year: i32,
    /// Axis end; later shutdowns get an overflow label.
    pub end_year: i32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/pdrp.toml"),
            start_year: 1951,
            end_year: 1977,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"intermittency.max_columns"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl PlotsConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let r = &self.render;
        if r.width == 0 || r.height == 0 {
            errors.push(ConfigError::new("render", "width and height must be > 0"));
        }

        let i = &self.intermittency;
        if !(i.sample_interval_minutes > 0.0 && i.sample_interval_minutes.is_finite()) {
            errors.push(ConfigError::new(
                "intermittency.sample_interval_minutes",
                "must be > 0",
            ));
        }
        if i.max_columns < 2 {
            errors.push(ConfigError::new(
                "intermittency.max_columns",
                "must be >= 2 (label column plus one sample)",
            ));
        }
        if i.demand_row_prefix.is_empty() {
            errors.push(ConfigError::new(
                "intermittency.demand_row_prefix",
                "must not be empty",
            ));
        }
        if i.solar_row_prefix.is_empty() {
            errors.push(ConfigError::new(
                "intermittency.solar_row_prefix",
                "must not be empty",
            ));
        }

        let w = &self.wind;
        if w.sheets.is_empty() {
            errors.push(ConfigError::new("wind.sheets", "must list at least one sheet"));
        }
        if w.timestamp_formats.is_empty() {
            errors.push(ConfigError::new(
                "wind.timestamp_formats",
                "must list at least one format",
            ));
        }
        if let Some(c) = w.capacity_mw {
            if c <= 0.0 {
                errors.push(ConfigError::new("wind.capacity_mw", "must be > 0"));
            }
        }

        let n = &self.nuclear_cf;
        if n.window == 0 {
            errors.push(ConfigError::new("nuclear_cf.window", "must be > 0"));
        }
        if n.timestamp_formats.is_empty() {
            errors.push(ConfigError::new(
                "nuclear_cf.timestamp_formats",
                "must list at least one format",
            ));
        }

        if self.fission.total_mwd_per_kg <= 0.0 {
            errors.push(ConfigError::new("fission.total_mwd_per_kg", "must be > 0"));
        }

        let h = &self.half_life;
        if h.half_lives.is_empty() || h.half_lives.iter().any(|&hl| hl <= 0.0) {
            errors.push(ConfigError::new(
                "half_life.half_lives",
                "must be a non-empty list of positive values",
            ));
        }
        if h.years == 0 {
            errors.push(ConfigError::new("half_life.years", "must be > 0"));
        }

        let e = &self.extremes;
        if e.value_column < e.label_tokens {
            errors.push(ConfigError::new(
                "extremes.value_column",
                "must not point inside the label tokens",
            ));
        }
        let s = &e.synthetic;
        if !(s.lower <= s.center && s.center <= s.upper) || s.lower == s.upper {
            errors.push(ConfigError::new(
                "extremes.synthetic",
                "requires lower <= center <= upper with lower < upper",
            ));
        }
        if s.std_dev < 0.0 {
            errors.push(ConfigError::new("extremes.synthetic.std_dev", "must be >= 0"));
        }

        let t = &self.timeline;
        if t.start_year >= t.end_year {
            errors.push(ConfigError::new(
                "timeline.start_year",
                "must be < timeline.end_year",
            ));
        }

        errors
    }
}
