//! Configuration for the GitLab reporter.
//!
//! Values come from an optional YAML/JSON file and are then overridden by
//! command-line flags. Resolution happens once, before any event is handled.

use cifold_ports::{DEFAULT_TB_FRAMES, TracebackOptions};
use cifold_schema::status::ScenarioStatus;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How failed scenarios are folded in the job log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum CollapsableMode {
    /// One section per step, holding the variables that step introduced.
    Steps,
    /// One section per introduced variable; step lines stay visible.
    Vars,
    /// Step lines stay visible; the whole final scope is one section.
    Scope,
}

impl CollapsableMode {
    pub const ALL: [CollapsableMode; 3] = [
        CollapsableMode::Steps,
        CollapsableMode::Vars,
        CollapsableMode::Scope,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollapsableMode::Steps => "steps",
            CollapsableMode::Vars => "vars",
            CollapsableMode::Scope => "scope",
        }
    }
}

impl fmt::Display for CollapsableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollapsableMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollapsableMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{first} and {second} cannot be used together")]
    Conflict {
        first: &'static str,
        second: &'static str,
    },
    #[error("unknown collapsable mode {0:?} (expected steps, vars or scope)")]
    UnknownMode(String),
    #[error("read config {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Configuration format types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Format from file extension; anything unrecognised is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Resolved reporter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// None means flat output.
    pub collapsable: Option<CollapsableMode>,

    /// Show internal calls in the traceback output
    pub tb_show_internal_calls: bool,

    /// Show local variables in the traceback output
    pub tb_show_locals: bool,

    /// Max stack trace entries to show (min=4)
    pub tb_max_frames: usize,

    /// Statuses whose scenarios get a path line; empty disables paths.
    pub show_paths: Vec<ScenarioStatus>,

    /// Append elapsed time to scenario and step lines.
    pub show_timings: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            collapsable: None,
            tb_show_internal_calls: false,
            tb_show_locals: false,
            tb_max_frames: DEFAULT_TB_FRAMES,
            show_paths: Vec::new(),
            show_timings: false,
        }
    }
}

impl ReporterConfig {
    pub fn with_collapsable(mut self, mode: Option<CollapsableMode>) -> Self {
        self.collapsable = mode;
        self
    }

    pub fn with_show_paths(mut self, statuses: impl IntoIterator<Item = ScenarioStatus>) -> Self {
        self.show_paths = statuses.into_iter().collect();
        self
    }

    pub fn traceback_options(&self) -> TracebackOptions {
        TracebackOptions::new(
            self.tb_show_internal_calls,
            self.tb_show_locals,
            self.tb_max_frames,
        )
    }

    pub fn shows_path_for(&self, status: ScenarioStatus) -> bool {
        self.show_paths.contains(&status)
    }

    /// Layer command-line flags over these values.
    ///
    /// Flags that were not given leave the current value alone. Asking for a
    /// collapsing mode and for flat output at once is rejected.
    pub fn apply_args(mut self, args: &GitlabArgs) -> Result<Self, ConfigError> {
        if args.gitlab_collapsable.is_some() && args.no_gitlab_collapsable {
            return Err(ConfigError::Conflict {
                first: "--gitlab-collapsable",
                second: "--no-gitlab-collapsable",
            });
        }
        if let Some(mode) = args.gitlab_collapsable {
            self.collapsable = Some(mode);
        }
        if args.no_gitlab_collapsable {
            self.collapsable = None;
        }
        self.tb_show_internal_calls |= args.tb_show_internal_calls;
        self.tb_show_locals |= args.tb_show_locals;
        if let Some(max_frames) = args.tb_max_frames {
            self.tb_max_frames = max_frames;
        }
        if let Some(statuses) = &args.show_paths {
            self.show_paths = statuses.clone();
        }
        self.show_timings |= args.show_timings;
        Ok(self)
    }
}

/// Command-line flags of the reporter, meant to be flattened into a host CLI.
#[derive(Debug, Clone, Default, Args)]
#[command(next_help_heading = "GitLab Reporter")]
pub struct GitlabArgs {
    /// Choose collapsable mode
    #[arg(long = "gitlab-collapsable", value_enum)]
    pub gitlab_collapsable: Option<CollapsableMode>,

    /// Turn collapsable sections off, overriding the config file
    #[arg(long = "no-gitlab-collapsable")]
    pub no_gitlab_collapsable: bool,

    /// Show internal calls in the traceback output
    #[arg(long)]
    pub tb_show_internal_calls: bool,

    /// Show local variables in the traceback output
    #[arg(long)]
    pub tb_show_locals: bool,

    /// Max stack trace entries to show (min=4)
    #[arg(long, value_name = "N")]
    pub tb_max_frames: Option<usize>,

    /// Print scenario paths for these statuses (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "STATUS")]
    pub show_paths: Option<Vec<ScenarioStatus>>,

    /// Show elapsed time next to scenarios and steps
    #[arg(long)]
    pub show_timings: bool,
}

/// Load configuration from a file
pub fn load_config(path: impl AsRef<Path>) -> Result<ReporterConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents, ConfigFormat::from_path(path)).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse configuration text; an empty document yields the defaults.
pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<ReporterConfig, String> {
    if contents.trim().is_empty() {
        return Ok(ReporterConfig::default());
    }
    match format {
        ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
    }
}
