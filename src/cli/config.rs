use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::picker::settings::PickerSettings;
use crate::selector::selector_model::GeneratorConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "smart-selector",
    version,
    about = "Generate stable CSS selectors for elements of an HTML document"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: smart-selector.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a selector for every element matched by a target query
    Generate {
        /// HTML file, or JSON snapshot (.json)
        #[arg(long)]
        document: String,

        /// Query locating the element(s) to generate selectors for
        #[arg(long)]
        target: String,

        /// Print the full result, including attempted strategies, as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Append a decision trace to this JSONL file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Explain how the stability classifier judges identifier strings
    Classify {
        /// Values to classify (ids, class tokens, attribute values)
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Evaluate a query against a document and list the matches
    Query {
        #[arg(long)]
        document: String,

        #[arg(long)]
        selector: String,
    },

    /// Replay a JSONL file of picker requests against a document
    Replay {
        #[arg(long)]
        document: String,

        /// One picker request per line
        #[arg(long)]
        requests: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `smart-selector.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub picker: PickerSettings,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    /// JSONL file receiving one event per generated selector
    pub path: Option<String>,
}

// ============================================================================
// Config File Loading
// ============================================================================

pub const DEFAULT_CONFIG_PATH: &str = "smart-selector.yaml";

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Tracing filter directive for a `-v` count; `RUST_LOG` takes precedence in `main`.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
