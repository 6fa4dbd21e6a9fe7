//! Configuration for both deployment modes.
//!
//! - The webhook server reads a YAML file ([`ServerConfig`]).
//! - The Action reads `INPUT_*` and `GITHUB_*` environment variables
//!   ([`ActionInputs`]).
//!
//! Regex lists are compiled while loading, so a bad pattern stops the process
//! before any API call.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::auth::{
    AuthorizationGate, AuthorizationPolicy, DEFAULT_RERUN_LABEL, GateCheck, GateMode,
    InvalidPattern,
};
use crate::rerun::{ExecutionPolicy, RerunPipeline};
use crate::types::{CommentId, InvalidRepoId, RepoId};

/// Errors loading configuration. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    InvalidPattern(#[from] InvalidPattern),

    #[error("invalid listen address {0:?}")]
    InvalidAddress(String),

    #[error("no GitHub token configured")]
    MissingToken,

    #[error("missing required input {0}")]
    MissingInput(&'static str),

    #[error("input {name} is not a JSON list of strings: {source}")]
    InvalidList {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid comment_id {value:?}: {source}")]
    InvalidCommentId {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error(transparent)]
    InvalidRepository(#[from] InvalidRepoId),
}

// ─── Server configuration ─────────────────────────────────────────────────────

/// Top-level server config file.
///
/// ```yaml
/// server:
///   address: 0.0.0.0
///   port: 8080
/// github:
///   v3_api_url: https://api.github.com
///   token: ghp_...
///   webhook_secret: s3cret
/// app_configuration:
///   allow_user_regexp_list: []
///   deny_user_regexp_list: ["^dependabot"]
///   gate:
///     checks: [ok_to_test_label, privileged_association]
///     mode: any
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub app_configuration: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.address.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// REST API root; `None` means api.github.com.
    #[serde(default, alias = "api_url")]
    pub v3_api_url: Option<String>,
    /// May instead come from the command line or `GITHUB_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub webhook_secret: String,
}

/// Behaviour of the rerun pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub allow_user_regexp_list: Vec<String>,
    #[serde(default)]
    pub deny_user_regexp_list: Vec<String>,
    #[serde(default)]
    pub gate: GateConfig,
    /// Name (or path) of a workflow that must never be re-run, typically the
    /// one that hosts this bot.
    #[serde(default)]
    pub self_workflow: Option<String>,
    #[serde(default)]
    pub rerun_successful_runs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_checks")]
    pub checks: Vec<GateCheck>,
    #[serde(default)]
    pub mode: GateMode,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

fn default_checks() -> Vec<GateCheck> {
    vec![GateCheck::OkToTestLabel, GateCheck::UserPolicy]
}

fn default_labels() -> Vec<String> {
    vec![DEFAULT_RERUN_LABEL.to_string()]
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            checks: default_checks(),
            mode: GateMode::default(),
            labels: default_labels(),
        }
    }
}

impl AppConfig {
    pub fn policy(&self) -> Result<AuthorizationPolicy, ConfigError> {
        Ok(AuthorizationPolicy::compile(
            &self.allow_user_regexp_list,
            &self.deny_user_regexp_list,
        )?)
    }

    pub fn build_pipeline(&self) -> Result<RerunPipeline, ConfigError> {
        let gate = AuthorizationGate::new(
            self.gate.checks.clone(),
            self.gate.mode,
            self.gate.labels.clone(),
            self.policy()?,
        );
        Ok(RerunPipeline::new(
            gate,
            self.self_workflow.clone(),
            ExecutionPolicy {
                rerun_successful_runs: self.rerun_successful_runs,
            },
        ))
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServerConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        // Validation only, so bad patterns fail at load time. The compiled
        // policy is dropped; `build_pipeline` compiles its own.
        config.app_configuration.policy()?;
        Ok(config)
    }
}

// ─── Action inputs ────────────────────────────────────────────────────────────

/// Everything the Action reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    /// `None` when the input is empty; the triggering event is used instead.
    pub comment_id: Option<CommentId>,
    pub repo_token: String,
    pub allow_user_regexp_list: Vec<String>,
    pub deny_user_regexp_list: Vec<String>,
    /// From `GITHUB_REPOSITORY`.
    pub repository: RepoId,
    /// From `GITHUB_WORKFLOW`: the workflow running this Action.
    pub workflow: Option<String>,
    /// From `GITHUB_EVENT_PATH`.
    pub event_path: Option<PathBuf>,
    /// From `GITHUB_API_URL`.
    pub api_url: Option<String>,
}

impl ActionInputs {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads inputs through `lookup`, which maps an environment variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let comment_id = get("INPUT_COMMENT_ID")
            .map(|raw| {
                let value = raw.trim();
                value
                    .parse()
                    .map(CommentId)
                    .map_err(|source| ConfigError::InvalidCommentId {
                        value: value.to_string(),
                        source,
                    })
            })
            .transpose()?;

        let repo_token = get("INPUT_REPO_TOKEN").ok_or(ConfigError::MissingToken)?;
        let repository = RepoId::parse(
            &get("GITHUB_REPOSITORY").ok_or(ConfigError::MissingInput("GITHUB_REPOSITORY"))?,
        )?;

        Ok(ActionInputs {
            comment_id,
            repo_token,
            allow_user_regexp_list: parse_list(
                "allow_user_regexp_list",
                get("INPUT_ALLOW_USER_REGEXP_LIST"),
            )?,
            deny_user_regexp_list: parse_list(
                "deny_user_regexp_list",
                get("INPUT_DENY_USER_REGEXP_LIST"),
            )?,
            repository,
            workflow: get("GITHUB_WORKFLOW"),
            event_path: get("GITHUB_EVENT_PATH").map(PathBuf::from),
            api_url: get("GITHUB_API_URL"),
        })
    }

    /// The pipeline used by the Action: labelled PR and login patterns both
    /// required, and the Action's own workflow excluded.
    pub fn build_pipeline(&self) -> Result<RerunPipeline, ConfigError> {
        let policy = AuthorizationPolicy::compile(
            &self.allow_user_regexp_list,
            &self.deny_user_regexp_list,
        )?;
        Ok(RerunPipeline::new(
            AuthorizationGate::label_and_user_policy(policy),
            self.workflow.clone(),
            ExecutionPolicy::default(),
        ))
    }
}

/// Parses a JSON string array input; unset means empty.
fn parse_list(name: &'static str, raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => {
            serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidList { name, source })
        }
    }
}
