//! Per-run inputs shared by every stage.

use dk_protocol::config_models::GlobalConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Variable holding the virtual environment directory.
pub const VENV_DIR_VAR: &str = "VENV_DIR";

/// Used when neither the pipeline nor the caller sets [`VENV_DIR_VAR`].
pub const DEFAULT_VENV_DIR: &str = "venv";

/// Working directory, variables and shell for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Directory every command runs in; relative paths resolve against it.
    pub working_dir: PathBuf,

    /// Interpolation variables, also exported to every command.
    pub vars: BTreeMap<String, String>,

    /// Program used for `shell` stages.
    pub shell: String,
}

impl RunContext {
    /// A context with only the built-in `VENV_DIR=venv` default.
    pub fn new(working_dir: impl Into<PathBuf>, global: &GlobalConfig) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert(VENV_DIR_VAR.to_string(), DEFAULT_VENV_DIR.to_string());

        Self {
            working_dir: working_dir.into(),
            vars,
            shell: global.shell.clone(),
        }
    }

    /// Layer a pipeline's `environment` block over the defaults.
    pub fn with_environment(mut self, environment: &BTreeMap<String, String>) -> Self {
        self.vars
            .extend(environment.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Layer caller overrides (`--env KEY=VALUE`) over everything else.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.vars.extend(overrides);
        self
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Expand `$NAME` and `${NAME}` references from [`Self::vars`].
    ///
    /// Returns the name of the first undefined variable on failure.
    pub fn interpolate(&self, value: &str) -> Result<String, String> {
        shellexpand::env_with_context(value, |name: &str| {
            self.var(name).map(Some).ok_or(())
        })
        .map(|expanded| expanded.into_owned())
        .map_err(|e| e.var_name)
    }

    /// Resolve `path` against the working directory unless it is absolute.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Resolve a program name: bare names are left for `PATH` lookup, paths
    /// containing a separator are resolved against the working directory.
    pub fn resolve_program(&self, program: &str) -> String {
        if program.contains('/') {
            self.resolve(program).to_string_lossy().into_owned()
        } else {
            program.to_string()
        }
    }
}
