use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// A regular file found under the root, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub name: String,
}

pub fn compile_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

/// Snapshot every regular file under `root`.
///
/// Within a directory files come before subdirectories, each sorted by name,
/// so the order is stable across runs. `root/<archive_dir>` and anything
/// matching `ignore_patterns` (absolute or root-relative) is pruned. Symlinks
/// are not followed and never returned.
pub fn collect_files(
    root: &Path,
    archive_dir: &str,
    ignore_patterns: &[Pattern],
) -> Result<Vec<DiscoveredFile>, Error> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|entry| {
            !is_archive(entry, archive_dir) && !is_ignored(entry.path(), root, ignore_patterns)
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let permission_denied = err
                    .io_error()
                    .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
                if permission_denied && err.depth() > 0 {
                    error!("Access denied: {}", err);
                    continue;
                }
                return Err(err.into());
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.file_name().to_str() {
            Some(name) => files.push(DiscoveredFile {
                name: name.to_string(),
                path: entry.into_path(),
            }),
            None => warn!("Skipping file with non UTF-8 name: {}", entry.path().display()),
        }
    }

    Ok(files)
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_archive(entry: &DirEntry, archive_dir: &str) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == archive_dir
}

pub fn is_ignored(path: &Path, root: &Path, ignore_patterns: &[Pattern]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(path) || pattern.matches_path(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(files: &[DiscoveredFile], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_files_before_subdirectories() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a_dir")).unwrap();
        fs::write(root.join("a_dir").join("inner.txt"), "1").unwrap();
        fs::write(root.join("z.txt"), "2").unwrap();
        fs::write(root.join("b.txt"), "3").unwrap();

        let files = collect_files(root, "EXISTING", &[]).unwrap();
        assert_eq!(names(&files, root), vec!["b.txt", "z.txt", "a_dir/inner.txt"]);
        assert_eq!(files[0].name, "b.txt");
    }

    #[test]
    fn test_archive_dir_is_skipped_only_at_root() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("EXISTING").join("TXT")).unwrap();
        fs::write(root.join("EXISTING").join("TXT").join("old.txt"), "x").unwrap();
        fs::create_dir_all(root.join("EXISTING_backup")).unwrap();
        fs::write(root.join("EXISTING_backup").join("keep.txt"), "y").unwrap();
        fs::create_dir_all(root.join("sub").join("EXISTING")).unwrap();
        fs::write(root.join("sub").join("EXISTING").join("deep.txt"), "z").unwrap();

        let files = collect_files(root, "EXISTING", &[]).unwrap();
        assert_eq!(
            names(&files, root),
            vec!["EXISTING_backup/keep.txt", "sub/EXISTING/deep.txt"]
        );
    }

    #[test]
    fn test_ignore_patterns_prune_relative_paths() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("node_modules").join("pkg")).unwrap();
        fs::write(root.join("node_modules").join("pkg").join("index.js"), "x").unwrap();
        fs::write(root.join("notes.tmp"), "x").unwrap();
        fs::write(root.join("notes.md"), "x").unwrap();

        let patterns = compile_patterns(&[
            "node_modules".to_string(),
            "*.tmp".to_string(),
            "[invalid".to_string(),
        ]);
        assert_eq!(patterns.len(), 2);

        let files = collect_files(root, "EXISTING", &patterns).unwrap();
        assert_eq!(names(&files, root), vec!["notes.md"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tmp = tempdir().unwrap();
        assert!(collect_files(&tmp.path().join("missing"), "EXISTING", &[]).is_err());
    }
}
