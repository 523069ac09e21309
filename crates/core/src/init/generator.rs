//! Directory structure and file generation for `.deploy-kit` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// The pipeline written by `init --minimal`.
const MINIMAL_PIPELINE: &str = "pipelines/backend-deploy.yaml";

/// Options for initializing a `.deploy-kit` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project root where `.deploy-kit` will be created.
    pub target_dir: PathBuf,

    /// Overwrite template files in an existing `.deploy-kit` directory.
    pub force: bool,

    /// Only write `config.toml` and the backend deploy pipeline.
    pub minimal: bool,
}

/// Generate a `.deploy-kit` directory from the embedded templates.
///
/// ```text
/// .deploy-kit/
/// ├── config.toml
/// └── pipelines/
///     ├── backend-deploy.yaml
///     └── smoke-check.yaml (unless minimal)
/// ```
///
/// With `force`, template files overwrite their existing counterparts; other
/// files in the directory are left alone.
///
/// Returns the paths written, in order.
pub fn generate_deploy_kit_structure(options: &InitOptions) -> InitResult<Vec<PathBuf>> {
    let dk_dir = options.target_dir.join(CONFIG_DIR);

    if dk_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(dk_dir));
    }

    let pipelines_dir = dk_dir.join("pipelines");
    fs::create_dir_all(&pipelines_dir).map_err(|source| InitError::DirectoryCreate {
        path: pipelines_dir.clone(),
        source,
    })?;

    let mut templates = vec!["config.toml".to_string()];
    if options.minimal {
        templates.push(MINIMAL_PIPELINE.to_string());
    } else {
        templates.extend(list_templates("pipelines/"));
    }

    let mut written = Vec::with_capacity(templates.len());
    for template in &templates {
        written.push(write_template_file(&dk_dir, template)?);
    }

    tracing::debug!(dir = %dk_dir.display(), files = written.len(), "initialized");
    Ok(written)
}

fn write_template_file(dk_dir: &Path, template_path: &str) -> InitResult<PathBuf> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = dk_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path.clone(),
        source,
    })?;

    Ok(target_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_config;
    use tempfile::tempdir;

    fn options(dir: &Path, force: bool, minimal: bool) -> InitOptions {
        InitOptions {
            target_dir: dir.to_path_buf(),
            force,
            minimal,
        }
    }

    #[tokio::test]
    async fn test_generate_structure_success() {
        let dir = tempdir().unwrap();

        let written = generate_deploy_kit_structure(&options(dir.path(), false, false)).unwrap();

        let dk_dir = dir.path().join(".deploy-kit");
        assert_eq!(written.len(), 3);
        assert!(dk_dir.join("config.toml").exists());
        assert!(dk_dir.join("pipelines/backend-deploy.yaml").exists());
        assert!(dk_dir.join("pipelines/smoke-check.yaml").exists());

        // The generated project loads cleanly.
        let config = load_config(dir.path()).await.unwrap();
        assert_eq!(config.pipelines.len(), 2);
        assert_eq!(config.select_pipeline(None).unwrap().name, "backend-deploy");
    }

    #[test]
    fn test_generate_structure_minimal() {
        let dir = tempdir().unwrap();

        generate_deploy_kit_structure(&options(dir.path(), false, true)).unwrap();

        let dk_dir = dir.path().join(".deploy-kit");
        assert!(dk_dir.join("config.toml").exists());
        assert!(dk_dir.join("pipelines/backend-deploy.yaml").exists());
        assert!(!dk_dir.join("pipelines/smoke-check.yaml").exists());
    }

    #[test]
    fn test_generate_structure_exists_without_force() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".deploy-kit")).unwrap();

        let result = generate_deploy_kit_structure(&options(dir.path(), false, false));
        assert!(matches!(result, Err(InitError::DirectoryExists(_))));
    }

    #[test]
    fn test_generate_structure_exists_with_force() {
        let dir = tempdir().unwrap();
        let dk_dir = dir.path().join(".deploy-kit");
        fs::create_dir_all(dk_dir.join("pipelines")).unwrap();
        fs::write(dk_dir.join("config.toml"), "shell = \"bash\"\n").unwrap();
        fs::write(dk_dir.join("notes.txt"), "keep me").unwrap();

        generate_deploy_kit_structure(&options(dir.path(), true, false)).unwrap();

        let config = fs::read_to_string(dk_dir.join("config.toml")).unwrap();
        assert!(config.contains("default-pipeline"));
        assert_eq!(fs::read_to_string(dk_dir.join("notes.txt")).unwrap(), "keep me");
    }
}
