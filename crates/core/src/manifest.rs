//! Pinned requirements manifest (`requirements.txt`) checking.
//!
//! Dependencies are installed with `--no-deps`, so every package the service
//! needs must be listed with an exact `name==version` pin. The manifest is
//! checked before pip is invoked so a bad manifest fails the environment
//! setup stage without touching the environment directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Dependency manifest not found at {0}")]
    Missing(PathBuf),

    #[error("Failed to read dependency manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}:{line_no}: {reason}: '{line}'")]
    Malformed {
        path: PathBuf,
        line_no: usize,
        line: String,
        reason: String,
    },
}

/// One exact pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub requirements: Vec<Requirement>,
}

fn normalize_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '.'], "-")
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Cut at the first `#` that starts the line or follows whitespace.
/// A `#` glued to other text (URL fragments) is kept.
fn strip_comment(line: &str) -> &str {
    let mut after_space = true;
    for (idx, c) in line.char_indices() {
        if c == '#' && after_space {
            return &line[..idx];
        }
        after_space = c.is_whitespace();
    }
    line
}

/// Cut per-requirement options such as `--hash=sha256:...`.
fn strip_options(line: &str) -> &str {
    let mut after_space = false;
    for (idx, c) in line.char_indices() {
        if after_space && line[idx..].starts_with("--") {
            return &line[..idx];
        }
        after_space = c.is_whitespace();
    }
    line
}

/// Join `\`-continued lines, keeping the number of each logical line's
/// first physical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let (line_no, mut joined) = pending.take().unwrap_or((idx + 1, String::new()));
        match raw.trim_end().strip_suffix('\\') {
            Some(head) => {
                joined.push_str(head);
                joined.push(' ');
                pending = Some((line_no, joined));
            }
            None => {
                joined.push_str(raw);
                lines.push((line_no, joined));
            }
        }
    }

    lines.extend(pending);
    lines
}

fn parse_line(line: &str) -> Result<Option<Requirement>, String> {
    let line = strip_comment(line).trim();

    if line.is_empty() {
        return Ok(None);
    }

    // pip options (`--index-url`, `-c constraints.txt`) are passed through.
    if line.starts_with('-') {
        return Ok(None);
    }

    let line = strip_options(line);

    // Drop environment markers: `pkg==1.0; python_version < "3.11"`.
    let spec = line.split(';').next().unwrap_or(line).trim();

    let Some((name, version)) = spec.split_once("==") else {
        return Err("requirement is not pinned with ==".to_string());
    };

    let name = name.trim();
    let name = match name.find('[') {
        Some(idx) if name.ends_with(']') => &name[..idx],
        Some(_) => return Err("unterminated extras".to_string()),
        None => name,
    };
    if !valid_name(name) {
        return Err("invalid package name".to_string());
    }

    let version = version.trim();
    if version.is_empty() {
        return Err("missing version".to_string());
    }
    if version.starts_with('=') || version.contains(['*', ',', ' ', '<', '>', '~', '!']) {
        return Err("version is not an exact pin".to_string());
    }

    Ok(Some(Requirement {
        name: name.to_string(),
        version: version.to_string(),
    }))
}

/// Parse manifest text. `path` is only used for error messages.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let mut requirements = Vec::new();
    let mut seen = HashSet::new();

    for (line_no, line) in logical_lines(content) {
        let malformed = |reason: String| ManifestError::Malformed {
            path: path.to_path_buf(),
            line_no,
            line: line.trim().to_string(),
            reason,
        };

        let Some(requirement) = parse_line(&line).map_err(&malformed)? else {
            continue;
        };

        if !seen.insert(normalize_name(&requirement.name)) {
            return Err(malformed(format!("duplicate requirement '{}'", requirement.name)));
        }
        requirements.push(requirement);
    }

    Ok(Manifest {
        path: path.to_path_buf(),
        requirements,
    })
}

/// Read and check the manifest at `path`.
pub async fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::Missing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ManifestError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let manifest = parse_manifest(&content, path)?;
    if manifest.requirements.is_empty() {
        tracing::warn!(path = %path.display(), "dependency manifest pins no packages");
    }
    Ok(manifest)
}
