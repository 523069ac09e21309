//! Structural checks applied to every pipeline after it is parsed.

use dk_protocol::pipeline_models::{Pipeline, StageKind};
use serde_yaml::Value;
use std::collections::HashSet;

/// Keys every stage accepts regardless of its kind.
const COMMON_STAGE_KEYS: &[&str] = &["name", "enabled", "kind"];

/// Keys accepted for each `kind`, as written in pipeline files.
fn stage_keys(kind: &str) -> Option<&'static [&'static str]> {
    let keys: &'static [&'static str] = match kind {
        "environment-setup" => &[
            "interpreter",
            "venv-dir",
            "manifest",
            "upgrade-pip",
            "no-cache",
            "no-deps",
        ],
        "service-restart" => &["unit", "sudo", "daemon-reload"],
        "env-file" => &["credential", "targets"],
        "test" => &["command"],
        "launch" => &["app", "host", "port", "venv-dir"],
        "shell" => &["run"],
        _ => return None,
    };
    Some(keys)
}

/// Reject stage keys that no stage kind understands.
///
/// Stages are deserialized with their kind flattened in, which drops
/// unrecognised keys silently. A misspelt `enabled` would otherwise turn
/// a disabled stage back on. Runs on the raw document before typed
/// deserialization; unknown kinds and non-mapping stages are left for
/// serde to report.
pub fn check_stage_keys(document: &Value) -> Result<(), String> {
    let Some(stages) = document.get("stages").and_then(Value::as_sequence) else {
        return Ok(());
    };

    for (index, stage) in stages.iter().enumerate() {
        let Some(mapping) = stage.as_mapping() else {
            continue;
        };
        let Some(kind_keys) = stage.get("kind").and_then(Value::as_str).and_then(stage_keys)
        else {
            continue;
        };

        for key in mapping.keys() {
            let known = key
                .as_str()
                .is_some_and(|key| COMMON_STAGE_KEYS.contains(&key) || kind_keys.contains(&key));
            if known {
                continue;
            }

            let label = match stage.get("name").and_then(Value::as_str) {
                Some(name) => format!("stage '{name}'"),
                None => format!("stage #{}", index + 1),
            };
            let key = match key.as_str() {
                Some(key) => key.to_string(),
                None => format!("{key:?}"),
            };
            return Err(format!("{label}: unknown key '{key}'"));
        }
    }

    Ok(())
}

fn require(value: &str, what: &str, stage: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("stage '{stage}': {what} cannot be empty"));
    }
    Ok(())
}

/// Validate a parsed pipeline.
///
/// Returns a human readable reason on the first problem found. Disabled
/// stages are checked too so they stay runnable once switched on.
pub fn validate_pipeline(pipeline: &Pipeline) -> Result<(), String> {
    if pipeline.name.trim().is_empty() {
        return Err("pipeline name cannot be empty".to_string());
    }

    if pipeline.stages.is_empty() {
        return Err(format!("pipeline '{}' has no stages", pipeline.name));
    }

    let mut seen = HashSet::new();
    for stage in &pipeline.stages {
        if stage.name.trim().is_empty() {
            return Err("stage name cannot be empty".to_string());
        }
        if !seen.insert(stage.name.as_str()) {
            return Err(format!("duplicate stage name '{}'", stage.name));
        }

        let name = stage.name.as_str();
        match &stage.kind {
            StageKind::EnvironmentSetup(setup) => {
                require(&setup.interpreter, "interpreter", name)?;
                require(&setup.venv_dir, "venv-dir", name)?;
                require(&setup.manifest, "manifest", name)?;
            }
            StageKind::ServiceRestart(restart) => {
                require(&restart.unit, "unit", name)?;
                if restart.unit.chars().any(char::is_whitespace) {
                    return Err(format!("stage '{name}': unit '{}' contains whitespace", restart.unit));
                }
            }
            StageKind::EnvFile(env_file) => {
                require(&env_file.credential, "credential", name)?;
                if env_file.targets.is_empty() {
                    return Err(format!("stage '{name}': targets cannot be empty"));
                }
            }
            StageKind::Test(test) => match test.command.first() {
                Some(program) => require(program, "command", name)?,
                None => return Err(format!("stage '{name}': command cannot be empty")),
            },
            StageKind::Launch(launch) => {
                require(&launch.app, "app", name)?;
                require(&launch.host, "host", name)?;
                if launch.port == 0 {
                    return Err(format!("stage '{name}': port must be non-zero"));
                }
            }
            StageKind::Shell(shell) => {
                if shell.run.is_empty() {
                    return Err(format!("stage '{name}': run cannot be empty"));
                }
            }
        }
    }

    Ok(())
}
