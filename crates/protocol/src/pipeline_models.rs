//! Pipeline configuration models for `.deploy-kit/pipelines/*.yaml`.
//!
//! This module defines the structure of pipeline definition files that
//! describe a linear, fail-fast deployment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_venv_dir() -> String {
    "${VENV_DIR}".to_string()
}

fn default_success_message() -> String {
    "Build succeeded!".to_string()
}

fn default_failure_message() -> String {
    "Build failed!".to_string()
}

fn default_test_command() -> Vec<String> {
    vec![
        "${VENV_DIR}/bin/python".to_string(),
        "-m".to_string(),
        "pytest".to_string(),
    ]
}

fn default_launch_app() -> String {
    "main:app".to_string()
}

fn default_launch_host() -> String {
    "0.0.0.0".to_string()
}

fn default_launch_port() -> u16 {
    8000
}

/// Creates an isolated Python environment and installs pinned requirements.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EnvironmentSetupStage {
    /// Interpreter used to create the environment (e.g. `python3.10`).
    pub interpreter: String,

    /// Directory the environment is created in.
    #[serde(default = "default_venv_dir")]
    pub venv_dir: String,

    /// Requirements file, relative to the working directory.
    pub manifest: String,

    /// Run `pip install --upgrade pip` before installing the manifest.
    #[serde(default = "default_true")]
    pub upgrade_pip: bool,

    /// Pass `--no-cache-dir` to the manifest install.
    #[serde(default = "default_true")]
    pub no_cache: bool,

    /// Pass `--no-deps` to the manifest install.
    #[serde(default = "default_true")]
    pub no_deps: bool,
}

/// Reloads systemd unit definitions and restarts one unit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceRestartStage {
    /// Unit to restart, e.g. `backend.service`.
    pub unit: String,

    /// Prefix every `systemctl` call with `sudo -n`.
    #[serde(default)]
    pub sudo: bool,

    /// Issue `systemctl daemon-reload` before the restart.
    #[serde(default = "default_true")]
    pub daemon_reload: bool,
}

/// Copies a credential-backed environment file to one or more locations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EnvFileStage {
    /// Name of the environment variable holding the source file path.
    pub credential: String,

    /// Destination paths the file is copied to.
    pub targets: Vec<String>,
}

/// Runs the project's test suite.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TestStage {
    /// Program and arguments.
    #[serde(default = "default_test_command")]
    pub command: Vec<String>,
}

/// Launches the application server directly instead of through systemd.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct LaunchStage {
    /// ASGI application path passed to uvicorn.
    #[serde(default = "default_launch_app")]
    pub app: String,

    #[serde(default = "default_launch_host")]
    pub host: String,

    #[serde(default = "default_launch_port")]
    pub port: u16,

    #[serde(default = "default_venv_dir")]
    pub venv_dir: String,
}

/// Arbitrary command lines run through the configured shell.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ShellStage {
    pub run: Vec<String>,
}

/// What a stage does, selected by the `kind` key in YAML.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StageKind {
    EnvironmentSetup(EnvironmentSetupStage),
    ServiceRestart(ServiceRestartStage),
    EnvFile(EnvFileStage),
    Test(TestStage),
    Launch(LaunchStage),
    Shell(ShellStage),
}

impl StageKind {
    /// The `kind` string as written in pipeline files.
    pub fn label(&self) -> &'static str {
        match self {
            StageKind::EnvironmentSetup(_) => "environment-setup",
            StageKind::ServiceRestart(_) => "service-restart",
            StageKind::EnvFile(_) => "env-file",
            StageKind::Test(_) => "test",
            StageKind::Launch(_) => "launch",
            StageKind::Shell(_) => "shell",
        }
    }
}

/// One step of a pipeline.
///
/// Stages run in file order. A stage with `enabled: false` stays in the
/// definition but is skipped at run time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Human readable name, unique within the pipeline.
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(flatten)]
    pub kind: StageKind,
}

/// Messages emitted once the pipeline finishes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PostActions {
    #[serde(default = "default_success_message")]
    pub success: String,

    #[serde(default = "default_failure_message")]
    pub failure: String,
}

impl Default for PostActions {
    fn default() -> Self {
        Self {
            success: default_success_message(),
            failure: default_failure_message(),
        }
    }
}

/// Defines a full deployment pipeline.
///
/// Pipelines are defined in `.deploy-kit/pipelines/*.yaml` files.
///
/// # Example
///
/// ```yaml
/// name: backend-deploy
/// environment:
///   VENV_DIR: venv
/// stages:
///   - name: Setup Environment
///     kind: environment-setup
///     interpreter: python3.10
///     venv-dir: ${VENV_DIR}
///     manifest: requirements.txt
///   - name: Restart Service
///     kind: service-restart
///     unit: backend.service
///   - name: Run Tests
///     kind: test
///     enabled: false
/// post:
///   success: Build succeeded!
///   failure: Build failed!
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Pipeline {
    /// Unique name identifying this pipeline.
    pub name: String,

    /// Variables available to `${NAME}` interpolation and exported to every
    /// command the pipeline spawns.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    pub stages: Vec<Stage>,

    #[serde(default)]
    pub post: PostActions,
}

impl Pipeline {
    /// Iterate over the stages that will actually run.
    pub fn enabled_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|stage| stage.enabled)
    }
}
