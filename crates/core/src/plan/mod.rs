//! Planning: expanding pipeline stages into concrete actions.
//!
//! The planner is pure: it reads a [`Pipeline`] and a [`RunContext`] and
//! produces the exact commands the engine will run, so `deploy-kit plan`
//! and `deploy-kit run` can never disagree. The whole pipeline is planned
//! before the first command runs; an undefined variable in a late stage
//! therefore fails the run before anything touches the host.

pub mod context;
pub mod error;

pub use context::{RunContext, DEFAULT_VENV_DIR, VENV_DIR_VAR};
pub use error::{PlanError, PlanResult};

use crate::executor::command::CommandSpec;
use dk_protocol::pipeline_models::{
    EnvFileStage, EnvironmentSetupStage, LaunchStage, Pipeline, ServiceRestartStage, ShellStage,
    Stage, StageKind, TestStage,
};
use std::fmt;
use std::path::PathBuf;

/// One unit of work inside a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Verify the requirements manifest exists and only holds exact pins.
    CheckManifest(PathBuf),

    /// Run a subprocess.
    Command(CommandSpec),

    /// Copy the file named by the `credential` variable to `dest`.
    CopyFile { credential: String, dest: PathBuf },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CheckManifest(path) => write!(f, "check manifest {}", path.display()),
            Action::Command(spec) => write!(f, "{spec}"),
            Action::CopyFile { credential, dest } => {
                write!(f, "copy ${credential} -> {}", dest.display())
            }
        }
    }
}

/// A stage with its actions expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub index: usize,
    pub name: String,
    pub kind: &'static str,
    pub enabled: bool,

    /// Empty for disabled stages.
    pub actions: Vec<Action>,
}

/// Expand every stage of `pipeline`.
pub fn plan_pipeline(pipeline: &Pipeline, ctx: &RunContext) -> PlanResult<Vec<StagePlan>> {
    pipeline
        .stages
        .iter()
        .enumerate()
        .map(|(index, stage)| -> PlanResult<StagePlan> {
            let actions = if stage.enabled {
                plan_stage(stage, ctx)?
            } else {
                Vec::new()
            };

            Ok(StagePlan {
                index,
                name: stage.name.clone(),
                kind: stage.kind.label(),
                enabled: stage.enabled,
                actions,
            })
        })
        .collect()
}

/// Expand a single stage regardless of its `enabled` flag.
pub fn plan_stage(stage: &Stage, ctx: &RunContext) -> PlanResult<Vec<Action>> {
    let planner = StagePlanner { stage, ctx };

    match &stage.kind {
        StageKind::EnvironmentSetup(setup) => planner.environment_setup(setup),
        StageKind::ServiceRestart(restart) => planner.service_restart(restart),
        StageKind::EnvFile(env_file) => planner.env_file(env_file),
        StageKind::Test(test) => planner.test(test),
        StageKind::Launch(launch) => planner.launch(launch),
        StageKind::Shell(shell) => Ok(planner.shell(shell)),
    }
}

struct StagePlanner<'a> {
    stage: &'a Stage,
    ctx: &'a RunContext,
}

impl StagePlanner<'_> {
    fn interpolate(&self, value: &str, field: &str) -> PlanResult<String> {
        let expanded = self
            .ctx
            .interpolate(value)
            .map_err(|name| PlanError::UndefinedVariable {
                stage: self.stage.name.clone(),
                field: field.to_string(),
                name,
            })?;

        if expanded.trim().is_empty() {
            return Err(PlanError::EmptyValue {
                stage: self.stage.name.clone(),
                field: field.to_string(),
            });
        }
        Ok(expanded)
    }

    fn command(&self, program: &str) -> CommandSpec {
        CommandSpec::new(self.ctx.resolve_program(program), self.ctx.working_dir.clone())
            .envs(&self.ctx.vars)
    }

    fn venv_program(&self, venv_dir: &str, name: &str) -> String {
        self.ctx
            .resolve(venv_dir)
            .join("bin")
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn environment_setup(&self, setup: &EnvironmentSetupStage) -> PlanResult<Vec<Action>> {
        let interpreter = self.interpolate(&setup.interpreter, "interpreter")?;
        let venv_dir = self.interpolate(&setup.venv_dir, "venv-dir")?;
        let manifest = self.interpolate(&setup.manifest, "manifest")?;
        let pip = self.venv_program(&venv_dir, "pip");

        let mut actions = vec![
            Action::CheckManifest(self.ctx.resolve(&manifest)),
            Action::Command(self.command(&interpreter).args(["-m", "venv"]).arg(venv_dir.as_str())),
        ];

        if setup.upgrade_pip {
            actions.push(Action::Command(
                self.command(&pip).args(["install", "--upgrade", "pip"]),
            ));
        }

        let mut install = self.command(&pip).args(["install", "-r"]).arg(manifest);
        if setup.no_cache {
            install = install.arg("--no-cache-dir");
        }
        if setup.no_deps {
            install = install.arg("--no-deps");
        }
        actions.push(Action::Command(install));

        Ok(actions)
    }

    fn systemctl<I, S>(&self, sudo: bool, args: I) -> Action
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = if sudo {
            self.command("sudo").args(["-n", "systemctl"])
        } else {
            self.command("systemctl")
        };
        Action::Command(spec.args(args))
    }

    fn service_restart(&self, restart: &ServiceRestartStage) -> PlanResult<Vec<Action>> {
        let unit = self.interpolate(&restart.unit, "unit")?;

        let mut actions = Vec::new();
        if restart.daemon_reload {
            actions.push(self.systemctl(restart.sudo, ["daemon-reload"]));
        }
        actions.push(self.systemctl(restart.sudo, ["restart", unit.as_str()]));
        actions.push(self.systemctl(restart.sudo, ["status", unit.as_str(), "--no-pager"]));

        Ok(actions)
    }

    fn env_file(&self, env_file: &EnvFileStage) -> PlanResult<Vec<Action>> {
        env_file
            .targets
            .iter()
            .map(|target| -> PlanResult<Action> {
                let target = self.interpolate(target, "targets")?;
                Ok(Action::CopyFile {
                    credential: env_file.credential.clone(),
                    dest: self.ctx.resolve(&target),
                })
            })
            .collect()
    }

    fn test(&self, test: &TestStage) -> PlanResult<Vec<Action>> {
        let argv = test
            .command
            .iter()
            .map(|word| self.interpolate(word, "command"))
            .collect::<PlanResult<Vec<_>>>()?;

        let Some((program, args)) = argv.split_first() else {
            return Err(PlanError::EmptyValue {
                stage: self.stage.name.clone(),
                field: "command".to_string(),
            });
        };

        Ok(vec![Action::Command(self.command(program).args(args.iter().cloned()))])
    }

    fn launch(&self, launch: &LaunchStage) -> PlanResult<Vec<Action>> {
        let venv_dir = self.interpolate(&launch.venv_dir, "venv-dir")?;
        let app = self.interpolate(&launch.app, "app")?;
        let host = self.interpolate(&launch.host, "host")?;
        let uvicorn = self.venv_program(&venv_dir, "uvicorn");

        Ok(vec![Action::Command(
            self.command(&uvicorn)
                .arg(app)
                .args(["--host".to_string(), host])
                .args(["--port".to_string(), launch.port.to_string()]),
        )])
    }

    /// Shell lines are handed to the shell untouched; it expands `$VAR`
    /// itself from the exported environment.
    fn shell(&self, shell: &ShellStage) -> Vec<Action> {
        shell
            .run
            .iter()
            .map(|line| Action::Command(self.command(&self.ctx.shell).arg("-c").arg(line.as_str())))
            .collect()
    }
}
