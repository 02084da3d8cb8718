use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::env::EnvMap;

/// Variables gathered for one run, plus the env files they came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedEnvironment {
    pub vars: EnvMap,
    pub env_files: Vec<PathBuf>,
}

pub fn load_env_file_sync(path: &Path, env: &mut EnvMap) -> Result<PathBuf> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading env file {}", path.display()))?;
    let iter = dotenvy::from_read_iter(Cursor::new(content));

    for item in iter {
        let (key, value) = item.with_context(|| format!("parsing env file {}", path.display()))?;
        env.insert(key, value);
    }

    Ok(path.to_path_buf())
}

/// Reads an env file (the explicit one, or `.env` under `base_dir` when it
/// exists) and overlays the process environment on top of it.
///
/// Process variables win over file values, so CI-provided secrets are never
/// shadowed by a stale local file.
pub fn capture_environment(
    explicit_env: Option<&Path>,
    base_dir: &Path,
) -> Result<LoadedEnvironment> {
    let mut vars = EnvMap::new();
    let mut env_files = Vec::new();

    match explicit_env {
        Some(path) => env_files.push(load_env_file_sync(path, &mut vars)?),
        None => {
            let default_path = base_dir.join(".env");
            if default_path.is_file() {
                env_files.push(load_env_file_sync(&default_path, &mut vars)?);
            }
        }
    }

    for (key, value) in std::env::vars_os() {
        if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
            vars.insert(key, value);
        }
    }

    Ok(LoadedEnvironment { vars, env_files })
}
