//! Configuration file loader for `.deploy-kit/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.deploy-kit/` directory, including:
//! - `config.toml`: Global settings
//! - `pipelines/*.yaml`: Pipeline definitions

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::config::validate::{check_stage_keys, validate_pipeline};
use crate::config::CONFIG_DIR;
use dk_protocol::config_models::GlobalConfig;
use dk_protocol::pipeline_models::Pipeline;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads all configuration from the `.deploy-kit/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.deploy-kit/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. If directories or files
/// are missing (but the root exists), returns an empty/default configuration
/// rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML or YAML)
/// - A pipeline fails validation or two pipelines share a name
///
/// # Example
///
/// ```rust,no_run
/// use dk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} pipelines", config.pipelines.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let dk_dir = root.join(CONFIG_DIR);

    if !dk_dir.exists() {
        tracing::debug!(path = %dk_dir.display(), "no configuration directory, using defaults");
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&dk_dir)?;
    let pipelines = load_pipelines(&dk_dir)?;

    tracing::debug!(count = pipelines.len(), "loaded pipelines");

    Ok(AppConfig { global, pipelines })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(dk_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = dk_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path,
            source,
        })?;

    Ok(config)
}

/// Parses and validates a single pipeline file.
pub fn load_pipeline_file(path: &Path) -> ConfigResult<Pipeline> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let yaml_error = |source| ConfigError::YamlParse {
        path: path.to_path_buf(),
        source,
    };
    let document: serde_yaml::Value = serde_yaml::from_str(&content).map_err(yaml_error)?;

    check_stage_keys(&document).map_err(|reason| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    })?;

    let pipeline: Pipeline = serde_yaml::from_value(document).map_err(yaml_error)?;

    validate_pipeline(&pipeline).map_err(|reason| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(pipeline)
}

/// Loads all pipeline definitions from `pipelines/*.yaml`.
fn load_pipelines(dk_dir: &Path) -> ConfigResult<Vec<Pipeline>> {
    let pipelines_dir = dk_dir.join("pipelines");

    if !pipelines_dir.exists() {
        return Ok(Vec::new());
    }

    let mut pipelines = Vec::new();
    let mut origins: HashMap<String, PathBuf> = HashMap::new();

    for entry in WalkDir::new(&pipelines_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: pipelines_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let pipeline = load_pipeline_file(path)?;

        if let Some(first) = origins.get(&pipeline.name) {
            return Err(ConfigError::DuplicatePipeline {
                name: pipeline.name,
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        origins.insert(pipeline.name.clone(), path.to_path_buf());

        pipelines.push(pipeline);
    }

    Ok(pipelines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_protocol::pipeline_models::StageKind;
    use std::fs;
    use tempfile::tempdir;

    const DEPLOY_YAML: &str = r#"name: backend-deploy
environment:
  VENV_DIR: venv
stages:
  - name: Setup Environment
    kind: environment-setup
    interpreter: python3.10
    manifest: requirements.txt
  - name: Run Tests
    kind: test
    enabled: false
  - name: Restart Service
    kind: service-restart
    unit: backend.service
post:
  success: "Deployed"
"#;

    /// A complete `.deploy-kit/` structure loads global settings and pipelines.
    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let dk_dir = root.join(CONFIG_DIR);

        fs::create_dir_all(dk_dir.join("pipelines")).expect("Failed to create pipelines dir");

        fs::write(
            dk_dir.join("config.toml"),
            "default-pipeline = \"backend-deploy\"\nshell = \"bash\"\n",
        )
        .expect("Failed to write config.toml");
        fs::write(dk_dir.join("pipelines/deploy.yaml"), DEPLOY_YAML)
            .expect("Failed to write pipeline file");
        // Non-YAML files are ignored.
        fs::write(dk_dir.join("pipelines/README.md"), "# notes")
            .expect("Failed to write readme");

        let config = load_config(root).await.expect("Failed to load config");

        assert_eq!(config.global.default_pipeline.as_deref(), Some("backend-deploy"));
        assert_eq!(config.global.shell, "bash");

        assert_eq!(config.pipelines.len(), 1, "Should load 1 pipeline");
        let pipeline = &config.pipelines[0];
        assert_eq!(pipeline.name, "backend-deploy");
        assert_eq!(pipeline.stages.len(), 3);
        assert_eq!(pipeline.enabled_stages().count(), 2);
        assert_eq!(pipeline.post.success, "Deployed");
        assert_eq!(pipeline.post.failure, "Build failed!");
        assert!(matches!(
            &pipeline.stages[0].kind,
            StageKind::EnvironmentSetup(setup) if setup.venv_dir == "${VENV_DIR}"
        ));

        let selected = config.select_pipeline(None).expect("default pipeline");
        assert_eq!(selected.name, "backend-deploy");
    }

    /// Loading from a directory without `.deploy-kit` yields defaults.
    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should handle missing .deploy-kit");

        assert!(config.global.default_pipeline.is_none());
        assert_eq!(config.global.shell, "sh");
        assert!(config.pipelines.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        let dk_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&dk_dir).expect("Failed to create .deploy-kit");
        fs::write(dk_dir.join("config.toml"), "shell = \"zsh\"").expect("Failed to write config.toml");

        let config = load_config(dir.path())
            .await
            .expect("Should handle partial config");

        assert_eq!(config.global.shell, "zsh");
        assert!(config.pipelines.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let dk_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&dk_dir).expect("Failed to create .deploy-kit");
        fs::write(dk_dir.join("config.toml"), "shell = ").expect("Failed to write config.toml");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_invalid_yaml_reports_path() {
        let dir = tempdir().expect("Failed to create temp dir");
        let dk_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(dk_dir.join("pipelines")).expect("Failed to create pipelines dir");
        fs::write(dk_dir.join("pipelines/broken.yaml"), "name: [unclosed")
            .expect("Failed to write pipeline");

        let err = load_config(dir.path()).await.unwrap_err();
        match err {
            ConfigError::YamlParse { path, .. } => assert!(path.ends_with("broken.yaml")),
            other => panic!("Expected YamlParse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_validation_failure() {
        let dir = tempdir().expect("Failed to create temp dir");
        let dk_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(dk_dir.join("pipelines")).expect("Failed to create pipelines dir");
        fs::write(
            dk_dir.join("pipelines/empty.yml"),
            "name: empty\nstages: []\n",
        )
        .expect("Failed to write pipeline");

        let err = load_config(dir.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_load_config_rejects_unknown_stage_key() {
        let dir = tempdir().expect("Failed to create temp dir");
        let dk_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(dk_dir.join("pipelines")).expect("Failed to create pipelines dir");
        fs::write(
            dk_dir.join("pipelines/deploy.yaml"),
            DEPLOY_YAML.replace("    enabled: false", "    enable: false"),
        )
        .expect("Failed to write pipeline");

        let err = load_config(dir.path()).await.unwrap_err();
        match err {
            ConfigError::InvalidConfig { path, reason } => {
                assert!(path.ends_with("deploy.yaml"));
                assert!(reason.contains("stage 'Run Tests'"));
                assert!(reason.contains("'enable'"));
            }
            other => panic!("Expected InvalidConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_config_duplicate_names() {
        let dir = tempdir().expect("Failed to create temp dir");
        let dk_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(dk_dir.join("pipelines")).expect("Failed to create pipelines dir");
        fs::write(dk_dir.join("pipelines/a.yaml"), DEPLOY_YAML).expect("Failed to write a");
        fs::write(dk_dir.join("pipelines/b.yaml"), DEPLOY_YAML).expect("Failed to write b");

        let err = load_config(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicatePipeline { name, .. } if name == "backend-deploy"
        ));
    }
}
