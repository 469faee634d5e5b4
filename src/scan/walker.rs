//! Template source discovery.

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::Config;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of enumerating template files.
pub struct TemplateFiles {
    pub files: Vec<PathBuf>,
    /// Distinct directories that were walked.
    pub directories: usize,
    /// Paths that could not be accessed.
    pub skipped: usize,
}

/// Directories holding template sources: the configured template roots
/// (literal paths or glob patterns) plus every `templates` directory
/// nested inside a module root.
pub fn template_dirs(base: &Path, config: &Config) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for root in &config.template_roots {
        if is_glob_pattern(root) {
            let full_pattern = base.join(root);
            let pattern_str = full_pattern.to_string_lossy();
            match glob(&pattern_str) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        if entry.is_dir() {
                            dirs.push(entry);
                        }
                    }
                }
                Err(err) => {
                    warn!(pattern = root.as_str(), %err, "invalid template root pattern");
                }
            }
        } else {
            let path = base.join(root);
            if path.is_dir() {
                dirs.push(path);
            } else {
                warn!(path = %path.display(), "template root does not exist");
            }
        }
    }

    for root in &config.module_roots {
        let root = base.join(root);
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).min_depth(1).into_iter().flatten() {
            if entry.file_type().is_dir() && entry.file_name() == std::ffi::OsStr::new("templates")
            {
                dirs.push(entry.into_path());
            }
        }
    }

    dirs.sort();
    dirs.dedup();
    dirs
}

/// Walk every template directory and collect files carrying one of the
/// configured template extensions.
pub fn template_files(base: &Path, config: &Config) -> TemplateFiles {
    let dirs = template_dirs(base, config);
    let mut files: Vec<PathBuf> = Vec::new();
    let mut skipped = 0;

    for dir in &dirs {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    skipped += 1;
                    warn!(%err, "cannot access path");
                    continue;
                }
            };
            if entry.file_type().is_file()
                && has_template_extension(entry.path(), &config.template_extensions)
            {
                files.push(entry.into_path());
            }
        }
    }

    // Overlapping roots (a templates dir inside a glob-matched root) must
    // not count a file twice.
    files.sort();
    files.dedup();

    TemplateFiles {
        files,
        directories: dirs.len(),
        skipped,
    }
}

fn has_template_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn config_with_roots(template_roots: &[&str], module_roots: &[&str]) -> Config {
        Config {
            template_roots: template_roots.iter().map(|s| s.to_string()).collect(),
            module_roots: module_roots.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn collects_template_files_by_extension() {
        let dir = tempdir().unwrap();
        let themes = dir.path().join("themes");
        fs::create_dir_all(&themes).unwrap();
        File::create(themes.join("index.htm")).unwrap();
        File::create(themes.join("partial.twig")).unwrap();
        File::create(themes.join("style.css")).unwrap();

        let found = template_files(dir.path(), &config_with_roots(&["themes"], &[]));
        assert_eq!(found.directories, 1);
        assert_eq!(found.files.len(), 2);
        assert!(!found.files.iter().any(|f| f.ends_with("style.css")));
    }

    #[test]
    fn finds_nested_module_template_dirs() {
        let dir = tempdir().unwrap();
        let module_templates = dir.path().join("modules").join("shop").join("templates");
        fs::create_dir_all(&module_templates).unwrap();
        File::create(module_templates.join("cart.htm")).unwrap();
        // Module files outside a templates dir are not scanned
        File::create(dir.path().join("modules").join("shop").join("readme.htm")).unwrap();

        let found = template_files(dir.path(), &config_with_roots(&[], &["modules"]));
        assert_eq!(found.directories, 1);
        assert_eq!(found.files.len(), 1);
        assert!(found.files[0].ends_with("cart.htm"));
    }

    #[test]
    fn expands_glob_template_roots() {
        let dir = tempdir().unwrap();
        for theme in ["alpha", "beta"] {
            let templates = dir.path().join("themes").join(theme).join("templates");
            fs::create_dir_all(&templates).unwrap();
            File::create(templates.join("page.htm")).unwrap();
        }

        let found = template_files(
            dir.path(),
            &config_with_roots(&["themes/*/templates"], &[]),
        );
        assert_eq!(found.directories, 2);
        assert_eq!(found.files.len(), 2);
    }

    #[test]
    fn overlapping_roots_deduplicate_files() {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("themes").join("site");
        fs::create_dir_all(&templates).unwrap();
        File::create(templates.join("page.htm")).unwrap();

        let found = template_files(
            dir.path(),
            &config_with_roots(&["themes", "themes/site"], &[]),
        );
        assert_eq!(found.files.len(), 1);
    }

    #[test]
    fn missing_roots_are_skipped() {
        let dir = tempdir().unwrap();
        let found = template_files(dir.path(), &config_with_roots(&["nonexistent"], &[]));
        assert_eq!(found.directories, 0);
        assert!(found.files.is_empty());
    }
}
