//! Checks that run once before the batch: the runtime must be resolvable and
//! the target artifact must exist.

use crate::error::{RepeatrError, Result};
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Resolve `name` to an executable path.
///
/// Names containing a path separator are taken as paths; bare names are
/// looked up in each `PATH` entry in order.
pub fn resolve_runtime(name: &str) -> Result<PathBuf> {
    resolve_in(name, env::var_os("PATH").as_deref())
}

fn resolve_in(name: &str, path_var: Option<&std::ffi::OsStr>) -> Result<PathBuf> {
    if name.is_empty() {
        return Err(RepeatrError::RuntimeNotFound(name.to_string()));
    }

    let candidate = Path::new(name);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(RepeatrError::RuntimeNotFound(name.to_string()))
        };
    }

    let found =
        path_var.and_then(|paths| env::split_paths(paths).map(|dir| dir.join(name)).find(|p| is_executable(p)));

    match found {
        Some(path) => {
            debug!("Resolved runtime {} to {}", name, path.display());
            Ok(path)
        }
        None => Err(RepeatrError::RuntimeNotFound(name.to_string())),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Fail unless the target artifact exists as a file.
pub fn check_target(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RepeatrError::TargetNotFound(path.to_path_buf()))
    }
}
