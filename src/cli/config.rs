use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::session::settings::{ExploreSettings, SelectionMode};

// ============================================================================
// CLI argument parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "droidmap",
    version,
    about = "Autonomous Android UI explorer and navigation mapper"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: droidmap.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the adb binary
    #[arg(long, global = true)]
    pub adb_path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explore an installed app and map its screens
    Explore {
        /// Device serial (as shown by `droidmap devices`)
        #[arg(long)]
        device: String,

        /// Target application package name
        #[arg(long)]
        package: String,

        /// Stop after this many unique screens
        #[arg(long)]
        max_screens: Option<usize>,

        /// Maximum exploration depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Post-tap settle delay in milliseconds
        #[arg(long)]
        screen_delay: Option<u64>,

        /// Post-back settle delay in milliseconds (defaults to screen delay)
        #[arg(long)]
        back_delay: Option<u64>,

        /// Class-name substring to skip (repeatable)
        #[arg(long = "ignore")]
        ignore: Vec<String>,

        /// Relaunch the app whenever the foreground leaves it
        #[arg(long)]
        stay_in_app: bool,

        /// Selection policy: random
        #[arg(long)]
        mode: Option<String>,

        /// RNG seed for reproducible action orderings
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for screenshots, dumps, and the graph JSON
        #[arg(short, long, default_value = "droidmap-out")]
        output_dir: String,

        /// Write a JSONL step trace to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// List devices visible to adb
    Devices,
}

// ============================================================================
// Config file model (optional YAML)
// ============================================================================

/// Optional YAML config file: `droidmap.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub explore: ExploreFileConfig,
    #[serde(default)]
    pub adb: AdbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExploreFileConfig {
    pub max_screens: Option<usize>,
    pub max_depth: Option<usize>,
    pub screen_delay_ms: Option<u64>,
    pub back_delay_ms: Option<u64>,
    pub ignore_elements: Option<Vec<String>>,
    pub stay_in_app: Option<bool>,
    pub mode: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdbConfig {
    pub path: Option<String>,
}

/// Load config from a YAML file. Returns defaults if the file is missing or
/// malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("droidmap.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_mode(name: &str) -> SelectionMode {
    match name {
        "random" => SelectionMode::Random,
        other => {
            eprintln!("Unknown mode '{}', using random", other);
            SelectionMode::Random
        }
    }
}

// ============================================================================
// Settings resolution (CLI > config file > built-in defaults)
// ============================================================================

pub fn build_settings(
    max_screens: Option<usize>,
    max_depth: Option<usize>,
    screen_delay: Option<u64>,
    back_delay: Option<u64>,
    ignore: &[String],
    stay_in_app: bool,
    mode: Option<&str>,
    seed: Option<u64>,
    file: &ExploreFileConfig,
) -> ExploreSettings {
    let defaults = ExploreSettings::default();
    ExploreSettings {
        max_screens: max_screens.or(file.max_screens).unwrap_or(defaults.max_screens),
        max_depth: max_depth.or(file.max_depth).unwrap_or(defaults.max_depth),
        screen_delay_ms: screen_delay
            .or(file.screen_delay_ms)
            .unwrap_or(defaults.screen_delay_ms),
        back_delay_ms: back_delay.or(file.back_delay_ms),
        ignore_elements: if !ignore.is_empty() {
            ignore.to_vec()
        } else {
            file.ignore_elements
                .clone()
                .unwrap_or(defaults.ignore_elements)
        },
        stay_in_app: stay_in_app || file.stay_in_app.unwrap_or(false),
        mode: parse_mode(mode.or(file.mode.as_deref()).unwrap_or("random")),
        seed: seed.or(file.seed),
    }
}
