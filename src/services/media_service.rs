use crate::config::Config;
use crate::error::AppError;
use crate::models::{EntryKind, MediaEntry};
use crate::scope_path;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions the listing exposes; everything else is skipped.
pub const MEDIA_EXTENSIONS: &[&str] = &["gif", "mp4", "png", "jpg", "jpeg", "webp"];

pub struct ListPage {
    pub total: usize,
    pub items: Vec<MediaEntry>,
}

pub struct DeleteOutcome {
    pub preview_removed: bool,
}

pub struct SaveOutcome {
    pub saved_path: String,
    pub preview_saved_path: Option<String>,
}

pub fn list_entries(
    config: &Config,
    subdir: &str,
    offset: usize,
    limit: usize,
) -> Result<ListPage, AppError> {
    let resolved = scope_path::resolve_within(&config.root, subdir)?;
    let target = scope_path::confirm_within(&config.root, &resolved)?;
    if !target.is_dir() {
        return Err(AppError::NotFound);
    }

    let mut entries = if config.recursive {
        collect_recursive(&config.root, &target)
    } else {
        collect_children(&config.root, &target)?
    };

    entries.sort_by(|a, b| {
        (b.kind == EntryKind::Dir)
            .cmp(&(a.kind == EntryKind::Dir))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let total = entries.len();
    let items = entries.into_iter().skip(offset).take(limit).collect();
    Ok(ListPage { total, items })
}

pub fn delete_file(config: &Config, filename: &str) -> Result<DeleteOutcome, AppError> {
    let resolved = scope_path::resolve_within(&config.root, filename)?;
    let target = scope_path::confirm_within(&config.root, &resolved)?;
    if !target.is_file() {
        return Err(AppError::NotFound);
    }

    fs::remove_file(&target).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound
        } else {
            AppError::DeleteFailed(err)
        }
    })?;

    // best-effort preview removal; absence is not an error
    let mut preview_removed = false;
    if has_extension(&target, "gif") {
        preview_removed = fs::remove_file(target.with_extension("png")).is_ok();
    }

    Ok(DeleteOutcome { preview_removed })
}

pub fn save_copy(config: &Config, filename: &str) -> Result<SaveOutcome, AppError> {
    let resolved = scope_path::resolve_within(&config.root, filename)?;
    let source = scope_path::confirm_within(&config.root, &resolved)?;
    if !source.is_file() {
        return Err(AppError::NotFound);
    }

    let dest_dir = config.saved_dir();
    fs::create_dir_all(&dest_dir)?;

    let name = source
        .file_name()
        .ok_or(AppError::InvalidPath)?
        .to_string_lossy()
        .to_string();
    let stem = Path::new(&name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.clone());
    let extension = Path::new(&name)
        .extension()
        .map(|e| e.to_string_lossy().to_string());

    let (dest, suffix) = free_destination(&dest_dir, &stem, extension.as_deref());
    fs::copy(&source, &dest)?;

    // the preview rides along under the suffix chosen for the primary file
    let mut preview_saved_path = None;
    if has_extension(&source, "gif") {
        let preview_src = source.with_extension("png");
        if preview_src.is_file() {
            let preview_dest = dest_dir.join(suffixed_name(&stem, suffix, Some("png")));
            if fs::copy(&preview_src, &preview_dest).is_ok() {
                preview_saved_path = Some(relative_to_root(&config.root, &preview_dest));
            }
        }
    }

    Ok(SaveOutcome {
        saved_path: relative_to_root(&config.root, &dest),
        preview_saved_path,
    })
}

fn collect_children(root: &Path, target: &Path) -> Result<Vec<MediaEntry>, AppError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(target)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            entries.push(entry_from_path(root, &path, EntryKind::Dir));
        } else if file_type.is_file() && has_media_extension(&path) {
            entries.push(entry_from_path(root, &path, EntryKind::File));
        }
    }
    Ok(entries)
}

fn collect_recursive(root: &Path, target: &Path) -> Vec<MediaEntry> {
    WalkDir::new(target)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_media_extension(entry.path()))
        .map(|entry| entry_from_path(root, entry.path(), EntryKind::File))
        .collect()
}

fn entry_from_path(root: &Path, path: &Path, kind: EntryKind) -> MediaEntry {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let metadata = fs::metadata(path).ok();
    let modified_at = metadata
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339());
    let (mime_type, size_bytes) = match kind {
        EntryKind::File => (
            mime_guess::from_path(path).first().map(|m| m.to_string()),
            metadata.as_ref().map(|m| m.len() as i64),
        ),
        EntryKind::Dir => (None, None),
    };

    MediaEntry {
        kind,
        name,
        path: relative_to_root(root, path),
        mime_type,
        size_bytes,
        modified_at,
    }
}

fn relative_to_root(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

fn has_media_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

fn suffixed_name(stem: &str, suffix: u32, extension: Option<&str>) -> String {
    match (suffix, extension) {
        (0, Some(ext)) => format!("{stem}.{ext}"),
        (0, None) => stem.to_string(),
        (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
        (n, None) => format!("{stem}_{n}"),
    }
}

// Check-then-create without locking: two concurrent saves of the same
// basename can pick the same suffix, last writer wins.
fn free_destination(dir: &Path, stem: &str, extension: Option<&str>) -> (PathBuf, u32) {
    let mut suffix = 0u32;
    loop {
        let candidate = dir.join(suffixed_name(stem, suffix, extension));
        if !candidate.exists() {
            return (candidate, suffix);
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn media_root(files: &[&str]) -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            File::create(&path).unwrap().write_all(b"data").unwrap();
        }
        let config = Config::new(dir.path(), false).unwrap();
        (dir, config)
    }

    #[test]
    fn list_sorts_dirs_first_then_case_insensitive() {
        let (dir, config) = media_root(&["Zebra.gif", "apple.mp4", "b.png"]);
        fs::create_dir_all(dir.path().join("sub")).unwrap();

        let page = list_entries(&config, "", 0, 20).unwrap();

        assert_eq!(page.total, 4);
        let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["sub", "apple.mp4", "b.png", "Zebra.gif"]);
        assert_eq!(page.items[0].kind, EntryKind::Dir);
    }

    #[test]
    fn list_filters_to_media_extensions() {
        let (_dir, config) = media_root(&["a.gif", "notes.txt", "clip.mp4", "raw.bin"]);

        let page = list_entries(&config, "", 0, 20).unwrap();

        assert_eq!(page.total, 2);
        let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.gif", "clip.mp4"]);
    }

    #[test]
    fn list_total_ignores_pagination() {
        let (_dir, config) = media_root(&["a.gif", "b.gif", "c.gif", "d.gif"]);

        let page = list_entries(&config, "", 1, 2).unwrap();

        assert_eq!(page.total, 4);
        let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b.gif", "c.gif"]);
    }

    #[test]
    fn list_offset_past_end_is_empty() {
        let (_dir, config) = media_root(&["a.gif"]);
        let page = list_entries(&config, "", 5, 20).unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn list_subdir_paths_are_relative_to_root() {
        let (_dir, config) = media_root(&["sub/a.gif"]);
        let page = list_entries(&config, "sub", 0, 20).unwrap();
        assert_eq!(page.items[0].path, "sub/a.gif");
        assert_eq!(page.items[0].mime_type.as_deref(), Some("image/gif"));
    }

    #[test]
    fn list_missing_subdir_is_not_found() {
        let (_dir, config) = media_root(&[]);
        assert!(matches!(
            list_entries(&config, "missing", 0, 20),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn list_escape_is_invalid_path() {
        let (_dir, config) = media_root(&[]);
        assert!(matches!(
            list_entries(&config, "../outside", 0, 20),
            Err(AppError::InvalidPath)
        ));
    }

    #[test]
    fn list_recursive_flattens_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("deep/deeper")).unwrap();
        fs::write(dir.path().join("top.gif"), b"x").unwrap();
        fs::write(dir.path().join("deep/mid.mp4"), b"x").unwrap();
        fs::write(dir.path().join("deep/deeper/low.png"), b"x").unwrap();
        fs::write(dir.path().join("deep/skip.txt"), b"x").unwrap();
        let config = Config::new(dir.path(), true).unwrap();

        let page = list_entries(&config, "", 0, 20).unwrap();

        assert_eq!(page.total, 3);
        let paths: Vec<&str> = page.items.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["deep/deeper/low.png", "deep/mid.mp4", "top.gif"]);
        assert!(page.items.iter().all(|e| e.kind == EntryKind::File));
    }

    #[test]
    fn delete_removes_gif_and_preview() {
        let (dir, config) = media_root(&["a.gif", "a.png", "b.mp4"]);

        let outcome = delete_file(&config, "a.gif").unwrap();

        assert!(outcome.preview_removed);
        assert!(!dir.path().join("a.gif").exists());
        assert!(!dir.path().join("a.png").exists());
        assert!(dir.path().join("b.mp4").exists());
    }

    #[test]
    fn delete_gif_without_preview_still_succeeds() {
        let (dir, config) = media_root(&["a.gif"]);

        let outcome = delete_file(&config, "a.gif").unwrap();

        assert!(!outcome.preview_removed);
        assert!(!dir.path().join("a.gif").exists());
    }

    #[test]
    fn delete_non_gif_leaves_siblings_alone() {
        let (dir, config) = media_root(&["b.mp4", "b.png"]);

        let outcome = delete_file(&config, "b.mp4").unwrap();

        assert!(!outcome.preview_removed);
        assert!(dir.path().join("b.png").exists());
    }

    #[test]
    fn delete_missing_file_is_not_found() {
        let (_dir, config) = media_root(&[]);
        assert!(matches!(
            delete_file(&config, "ghost.gif"),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn delete_directory_is_not_found() {
        let (dir, config) = media_root(&[]);
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        assert!(matches!(
            delete_file(&config, "sub"),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn delete_escape_is_invalid_path() {
        let (_dir, config) = media_root(&[]);
        assert!(matches!(
            delete_file(&config, "../../etc/passwd"),
            Err(AppError::InvalidPath)
        ));
    }

    #[test]
    fn save_copies_into_saved_dir() {
        let (dir, config) = media_root(&["b.mp4"]);

        let outcome = save_copy(&config, "b.mp4").unwrap();

        assert_eq!(outcome.saved_path, "Saved/b.mp4");
        assert!(outcome.preview_saved_path.is_none());
        assert!(dir.path().join("Saved/b.mp4").exists());
        assert!(dir.path().join("b.mp4").exists());
    }

    #[test]
    fn save_suffixes_instead_of_overwriting() {
        let (dir, config) = media_root(&["b.mp4"]);

        assert_eq!(save_copy(&config, "b.mp4").unwrap().saved_path, "Saved/b.mp4");
        assert_eq!(
            save_copy(&config, "b.mp4").unwrap().saved_path,
            "Saved/b_1.mp4"
        );
        assert_eq!(
            save_copy(&config, "b.mp4").unwrap().saved_path,
            "Saved/b_2.mp4"
        );
        assert!(dir.path().join("Saved/b_2.mp4").exists());
    }

    #[test]
    fn save_gif_carries_preview_with_same_suffix() {
        let (dir, config) = media_root(&["a.gif", "a.png"]);

        let first = save_copy(&config, "a.gif").unwrap();
        assert_eq!(first.saved_path, "Saved/a.gif");
        assert_eq!(first.preview_saved_path.as_deref(), Some("Saved/a.png"));

        let second = save_copy(&config, "a.gif").unwrap();
        assert_eq!(second.saved_path, "Saved/a_1.gif");
        assert_eq!(second.preview_saved_path.as_deref(), Some("Saved/a_1.png"));

        assert!(dir.path().join("Saved/a_1.gif").exists());
        assert!(dir.path().join("Saved/a_1.png").exists());
    }

    #[test]
    fn save_gif_without_preview_is_fine() {
        let (_dir, config) = media_root(&["a.gif"]);
        let outcome = save_copy(&config, "a.gif").unwrap();
        assert_eq!(outcome.saved_path, "Saved/a.gif");
        assert!(outcome.preview_saved_path.is_none());
    }

    #[test]
    fn save_missing_source_is_not_found() {
        let (_dir, config) = media_root(&[]);
        assert!(matches!(
            save_copy(&config, "ghost.gif"),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn save_from_subdir_flattens_basename() {
        let (dir, config) = media_root(&["sub/a.gif"]);
        let outcome = save_copy(&config, "sub/a.gif").unwrap();
        assert_eq!(outcome.saved_path, "Saved/a.gif");
        assert!(dir.path().join("Saved/a.gif").exists());
    }
}
