//! Template scanning: harvest translate-filter keys from template sources
//! and stage the ones the store does not know yet.

pub mod extractor;
pub mod walker;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::store::{SaveItem, TranslationStore};
use self::extractor::{KeyExtractor, TranslateFilterExtractor};

/// Counts reported back to the caller after a scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub directories: usize,
    pub files: usize,
    /// Total pattern matches, including rejected foreign-domain ones.
    pub matches: usize,
    /// Distinct keys referenced by the templates.
    pub distinct: usize,
    /// Keys newly inserted into the store.
    pub added: usize,
}

/// Collect every key referenced by the configured template trees.
///
/// Read-only; shared by [`scan`] and the unused-key audit. A single
/// unreadable file is skipped with a warning, never fatal to the whole
/// pass.
pub fn collect_template_keys(
    base: &Path,
    config: &Config,
    extractor: &dyn KeyExtractor,
) -> (HashSet<String>, ScanReport) {
    let found = walker::template_files(base, config);
    let mut keys = HashSet::new();
    let mut report = ScanReport {
        directories: found.directories,
        ..ScanReport::default()
    };

    for file in &found.files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                warn!(path = %file.display(), %err, "skipping unreadable template");
                continue;
            }
        };
        report.files += 1;
        let extraction = extractor.extract(&source);
        report.matches += extraction.matches;
        keys.extend(extraction.keys);
    }

    report.distinct = keys.len();
    (keys, report)
}

/// Scan the template trees and insert every referenced key the store does
/// not have yet, tagged with `target_group` and no values.
///
/// Idempotent: a second run over unchanged templates adds zero keys.
pub fn scan(
    store: &mut TranslationStore,
    base: &Path,
    config: &Config,
    target_group: &str,
) -> Result<ScanReport> {
    let extractor = TranslateFilterExtractor::new()?;
    let (keys, mut report) = collect_template_keys(base, config, &extractor);

    let existing = store.all_keys()?;
    let mut items: Vec<SaveItem> = keys
        .iter()
        .filter(|key| !existing.contains(key.as_str()))
        .map(|key| SaveItem::new(key.clone()).with_group(target_group))
        .collect();
    items.sort_by(|a, b| a.key.cmp(&b.key));

    report.added = items.len();
    if !items.is_empty() {
        store.save(&items)?;
    }
    debug!(
        files = report.files,
        distinct = report.distinct,
        added = report.added,
        "template scan finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::store::ListQuery;

    fn test_config() -> Config {
        Config {
            template_roots: vec!["themes".to_string()],
            module_roots: vec!["modules".to_string()],
            ..Default::default()
        }
    }

    fn write_template(base: &Path, rel: &str, contents: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn scan_inserts_missing_keys_under_the_target_group() {
        let dir = tempdir().unwrap();
        write_template(
            dir.path(),
            "themes/site/page.htm",
            "{{ 'Welcome'|t }} {{ 'Goodbye'|t }}",
        );
        let mut store = TranslationStore::open_in_memory().unwrap();

        let report = scan(&mut store, dir.path(), &test_config(), "frontend").unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(report.matches, 2);
        assert_eq!(report.distinct, 2);
        assert_eq!(report.added, 2);

        let rows = store.list(&ListQuery::for_group("frontend")).unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Goodbye", "Welcome"]);
        // Staged keys carry no values
        assert!(rows.iter().all(|r| r.values.is_empty()));
    }

    #[test]
    fn scan_is_idempotent() {
        let dir = tempdir().unwrap();
        write_template(dir.path(), "themes/page.htm", "{{ 'Welcome'|t }}");
        let mut store = TranslationStore::open_in_memory().unwrap();

        let first = scan(&mut store, dir.path(), &test_config(), "site").unwrap();
        assert_eq!(first.added, 1);

        let second = scan(&mut store, dir.path(), &test_config(), "site").unwrap();
        assert_eq!(second.distinct, 1);
        assert_eq!(second.added, 0);
        assert_eq!(store.count(&ListQuery::default()).unwrap(), 1);
    }

    #[test]
    fn scan_covers_module_template_dirs() {
        let dir = tempdir().unwrap();
        write_template(
            dir.path(),
            "modules/shop/templates/cart.twig",
            "{{ 'Checkout'|t }}",
        );
        let mut store = TranslationStore::open_in_memory().unwrap();

        let report = scan(&mut store, dir.path(), &test_config(), "site").unwrap();
        assert_eq!(report.added, 1);
        assert!(store.all_keys().unwrap().contains("Checkout"));
    }

    #[test]
    fn scan_ignores_foreign_domains_and_repeats() {
        let dir = tempdir().unwrap();
        write_template(
            dir.path(),
            "themes/page.htm",
            "{{ 'Hi'|t }} {{ 'Hi'|t }} {{ 'Later'|t('mail') }}",
        );
        let mut store = TranslationStore::open_in_memory().unwrap();

        let report = scan(&mut store, dir.path(), &test_config(), "site").unwrap();
        assert_eq!(report.matches, 3);
        assert_eq!(report.distinct, 1);
        assert_eq!(report.added, 1);
    }

    #[test]
    fn scan_does_not_touch_existing_keys() {
        let dir = tempdir().unwrap();
        write_template(dir.path(), "themes/page.htm", "{{ 'Welcome'|t }}");
        let mut store = TranslationStore::open_in_memory().unwrap();
        store
            .save(&[SaveItem::new("Welcome")
                .with_group("legacy")
                .with_value(1, "Hello")])
            .unwrap();

        let report = scan(&mut store, dir.path(), &test_config(), "site").unwrap();
        assert_eq!(report.added, 0);

        // Group and values survive the scan untouched.
        let (_, group) = store.find_key("Welcome").unwrap().unwrap();
        assert_eq!(group, "legacy");
        assert_eq!(store.value("Welcome", 1).unwrap().as_deref(), Some("Hello"));
    }
}
