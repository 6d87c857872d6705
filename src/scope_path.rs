use crate::error::AppError;
use std::path::{Component, Path, PathBuf};

/// Joins `relative` onto `root`, rejecting any component sequence that would
/// climb above the join point. Purely lexical: traversal attempts are refused
/// before anything touches the filesystem.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf, AppError> {
    let mut depth: i32 = 0;
    let mut resolved = root.to_path_buf();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                depth += 1;
                resolved.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(AppError::InvalidPath);
                }
                resolved.pop();
            }
            // absolute paths and drive prefixes restart resolution outside root
            Component::RootDir | Component::Prefix(_) => return Err(AppError::InvalidPath),
        }
    }

    Ok(resolved)
}

/// Symlink-aware check for paths that must already exist. `root` is expected
/// to be canonical.
pub fn confirm_within(root: &Path, path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound
        } else {
            AppError::Io(err)
        }
    })?;

    if !canonical.starts_with(root) {
        return Err(AppError::InvalidPath);
    }
    Ok(canonical)
}
