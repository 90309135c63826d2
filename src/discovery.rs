use globset::GlobBuilder;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Finds template files under `root` whose relative path matches `pattern`.
///
/// Returns full paths sorted lexicographically so repeated runs process files
/// in a stable order. Matching follows the platform's case convention.
///
/// # Arguments
/// * `root` - Directory to search
/// * `pattern` - Glob pattern, e.g. `**/*.tt`
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Sorted full paths of matching files
pub fn find_templates<P: AsRef<Path>>(root: P, pattern: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::RootDoesNotExistError {
            root_dir: root.display().to_string(),
        });
    }

    let matcher = GlobBuilder::new(pattern)
        .case_insensitive(cfg!(windows))
        .build()?
        .compile_matcher();

    let mut templates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            templates.push(entry.path().to_path_buf());
        }
    }
    templates.sort();

    debug!(
        "Matched {} template(s) for '{}' under '{}'",
        templates.len(),
        pattern,
        root.display()
    );
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{RAZOR_TEMPLATE_GLOB, T4_TEMPLATE_GLOB};
    use std::fs::{create_dir_all, File};
    use tempfile::TempDir;

    #[test]
    fn finds_templates_recursively_and_sorted() {
        let root = TempDir::new().unwrap();
        let root = root.path();

        create_dir_all(root.join("sub/dir")).unwrap();
        File::create(root.join("zeta.tt")).unwrap();
        File::create(root.join("alpha.tt")).unwrap();
        File::create(root.join("sub/dir/nested.tt")).unwrap();
        File::create(root.join("readme.md")).unwrap();

        let found = find_templates(root, T4_TEMPLATE_GLOB).unwrap();
        assert_eq!(
            found,
            vec![
                root.join("alpha.tt"),
                root.join("sub/dir/nested.tt"),
                root.join("zeta.tt"),
            ]
        );
    }

    #[test]
    fn kinds_do_not_overlap() {
        let root = TempDir::new().unwrap();
        let root = root.path();

        File::create(root.join("a.tt")).unwrap();
        File::create(root.join("b.cshtml")).unwrap();

        let t4 = find_templates(root, T4_TEMPLATE_GLOB).unwrap();
        let razor = find_templates(root, RAZOR_TEMPLATE_GLOB).unwrap();
        assert_eq!(t4, vec![root.join("a.tt")]);
        assert_eq!(razor, vec![root.join("b.cshtml")]);
    }

    #[test]
    fn empty_root_yields_no_templates() {
        let root = TempDir::new().unwrap();
        let found = find_templates(root.path(), T4_TEMPLATE_GLOB).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope");
        let result = find_templates(&missing, T4_TEMPLATE_GLOB);
        match result {
            Err(Error::RootDoesNotExistError { root_dir }) => {
                assert!(root_dir.ends_with("nope"));
            }
            _ => panic!("Expected RootDoesNotExistError"),
        }
    }

    #[test]
    fn directories_are_never_matched() {
        let root = TempDir::new().unwrap();
        let root = root.path();

        create_dir_all(root.join("dir.tt")).unwrap();
        File::create(root.join("dir.tt/inner.tt")).unwrap();

        let found = find_templates(root, T4_TEMPLATE_GLOB).unwrap();
        assert_eq!(found, vec![root.join("dir.tt/inner.tt")]);
    }
}
