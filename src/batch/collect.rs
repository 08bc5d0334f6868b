use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::error::UnatlasError;
use crate::parser::Registration;

/// Collect descriptor files from an input path.
///
/// A file is returned as-is, whatever its name. A directory is walked
/// recursively and only files whose name matches the registration's
/// pattern are kept. Results are sorted for stable reporting.
///
/// Only an unreadable `input` is an error. Subdirectories that cannot be
/// read are logged and skipped, and symlinked directories are not
/// followed.
pub fn collect_descriptors(
    input: &Path,
    registration: &Registration,
) -> Result<Vec<PathBuf>, UnatlasError> {
    if !input.exists() {
        return Err(UnatlasError::InputNotFound(input.to_path_buf()));
    }

    let mut paths = Vec::new();
    if input.is_dir() {
        collect_from_directory(input, registration, &mut paths)?;
        paths.sort();
    } else {
        paths.push(input.to_path_buf());
    }

    Ok(paths)
}

fn collect_from_directory(
    dir: &Path,
    registration: &Registration,
    paths: &mut Vec<PathBuf>,
) -> Result<(), UnatlasError> {
    let entries = std::fs::read_dir(dir).map_err(|e| UnatlasError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Failed to read an entry of '{}': {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();

        // file_type() does not follow symlinks
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                error!("Failed to stat '{}': {}", path.display(), e);
                continue;
            }
        };

        if file_type.is_dir() {
            if let Err(e) = collect_from_directory(&path, registration, paths) {
                error!("{}; skipping", e);
            }
        } else if file_type.is_symlink() && path.is_dir() {
            debug!("Not following symlinked directory '{}'", path.display());
        } else if registration.matches(&path) && path.is_file() {
            paths.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::resolve_parser;
    use std::fs;

    #[test]
    fn test_collects_matching_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("ui/buttons")).unwrap();
        fs::write(root.join("a.plist"), "").unwrap();
        fs::write(root.join("a.png"), "").unwrap();
        fs::write(root.join("ui/b.plist"), "").unwrap();
        fs::write(root.join("ui/buttons/c.plist"), "").unwrap();
        fs::write(root.join("ui/buttons/c.json"), "").unwrap();

        let cc = resolve_parser("cc").unwrap();
        let found = collect_descriptors(root, &cc).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("a.plist"),
                root.join("ui/b.plist"),
                root.join("ui/buttons/c.plist"),
            ]
        );
    }

    #[test]
    fn test_single_file_ignores_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("frames.txt");
        fs::write(&file, "").unwrap();

        let cc = resolve_parser("cc").unwrap();
        assert_eq!(collect_descriptors(&file, &cc).unwrap(), vec![file]);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let cc = resolve_parser("cc").unwrap();

        assert!(matches!(
            collect_descriptors(&dir.path().join("nope"), &cc),
            Err(UnatlasError::InputNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.plist"), "").unwrap();
        fs::write(root.join("good.plist"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; the walk must succeed either way
        let locked_readable = fs::read_dir(&locked).is_ok();

        let cc = resolve_parser("cc").unwrap();
        let found = collect_descriptors(root, &cc);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let found = found.unwrap();
        assert!(found.contains(&root.join("good.plist")));
        if !locked_readable {
            assert_eq!(found, vec![root.join("good.plist")]);
        }
    }

    #[test]
    fn test_unreadable_input_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cc = resolve_parser("cc").unwrap();
        let mut paths = Vec::new();

        let result = collect_from_directory(&dir.path().join("gone"), &cc, &mut paths);
        assert!(matches!(result, Err(UnatlasError::ReadDir { .. })));
        assert!(paths.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("top.plist"), "").unwrap();
        fs::write(root.join("sub/inner.plist"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("sub/loop")).unwrap();

        let cc = resolve_parser("cc").unwrap();
        let found = collect_descriptors(root, &cc).unwrap();

        assert_eq!(
            found,
            vec![root.join("sub/inner.plist"), root.join("top.plist")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_collected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::create_dir(root.join("walk")).unwrap();
        fs::write(root.join("real/frames.plist"), "").unwrap();
        std::os::unix::fs::symlink(
            root.join("real/frames.plist"),
            root.join("walk/frames.plist"),
        )
        .unwrap();

        let cc = resolve_parser("cc").unwrap();
        let found = collect_descriptors(&root.join("walk"), &cc).unwrap();

        assert_eq!(found, vec![root.join("walk/frames.plist")]);
    }
}
