use crate::catalog::AxisCatalog;
use crate::collaborators::ProjectFixture;
use crate::validation::ValidationSettings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CONCURRENT_CHECKS: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub collaborator_timeout: Duration,
    pub concurrent_checks: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            concurrent_checks: DEFAULT_CONCURRENT_CHECKS,
        }
    }
}

impl ServiceConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let file_config = if let Some(path) = args.config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            collaborator_timeout_secs: file_timeout_secs,
            concurrent_checks: file_concurrent_checks,
        } = file_config;

        let timeout_secs = args
            .collaborator_timeout_secs
            .or(file_timeout_secs)
            .unwrap_or(DEFAULT_COLLABORATOR_TIMEOUT_SECS);
        anyhow::ensure!(timeout_secs > 0, "collaborator timeout must be greater than zero");

        let concurrent_checks = args
            .concurrent_checks
            .or(file_concurrent_checks)
            .unwrap_or(DEFAULT_CONCURRENT_CHECKS);

        Ok(Self {
            collaborator_timeout: Duration::from_secs(timeout_secs),
            concurrent_checks,
        })
    }

    pub fn validation_settings(&self) -> ValidationSettings {
        ValidationSettings {
            collaborator_timeout: self.collaborator_timeout,
            concurrent_checks: self.concurrent_checks,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "postcoord",
    about = "Validate post-coordination updates and derive change events",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "POSTCOORD_COLLABORATOR_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Wait budget for each collaborator call",
        value_parser = clap::value_parser!(u64),
        global = true
    )]
    pub collaborator_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "POSTCOORD_CONCURRENT_CHECKS",
        value_name = "BOOL",
        help = "Run the collaborator-backed checks concurrently",
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new(),
        global = true
    )]
    pub concurrent_checks: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate an update request against fixture-backed collaborators
    Validate {
        #[arg(long, value_name = "FILE")]
        request: PathBuf,
        #[arg(long, value_name = "FILE")]
        fixtures: PathBuf,
    },
    /// Print the scale value events between two snapshots
    DiffScales {
        #[arg(long, value_name = "FILE")]
        old: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        new: Option<PathBuf>,
    },
    /// Print the per-view specification events between two snapshots
    DiffSpec {
        #[arg(long, value_name = "FILE")]
        old: PathBuf,
        #[arg(long, value_name = "FILE")]
        new: PathBuf,
    },
    /// Print the events of a first import
    Import {
        #[arg(long, value_name = "FILE")]
        spec: PathBuf,
        #[arg(long, value_name = "FILE")]
        scales: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        fixtures: PathBuf,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    collaborator_timeout_secs: Option<u64>,
    concurrent_checks: Option<bool>,
}

/// Axis catalog and project data served to the CLI's collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixtures {
    #[serde(default)]
    pub catalog: AxisCatalog,
    #[serde(default)]
    pub project: ProjectFixture,
}

impl Fixtures {
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path, "fixtures")
    }
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    load_document(path, "config")
}

/// Reads a YAML or JSON document, picking the format from the extension.
pub fn load_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        anyhow::bail!("{what} file {:?} does not exist", path);
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {what} file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML {what} {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON {what} {:?}", path))?,
        other => anyhow::bail!("unsupported {what} extension: {other}"),
    };
    Ok(parsed)
}
