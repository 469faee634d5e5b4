//! Import/export engine.
//!
//! Every format converts through the same intermediate shape,
//! [`TranslationEntry`], so format codecs stay pure transforms and the
//! language→site expansion plus batch save live in exactly one place.

pub mod archive;
pub mod csv;
pub mod json;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::sites::{self, Site};
use crate::store::{GroupUpdate, ListQuery, SaveItem, TranslationStore};

/// One key with its group and per-language values. Exports flatten sites
/// into languages on the way out; imports expand languages back to every
/// site sharing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub key: String,
    pub group: String,
    pub values: BTreeMap<String, String>,
}

/// Flatten the whole store into language-coded entries, ordered by key.
/// Untranslated languages are simply absent.
pub fn dump(store: &TranslationStore, all_sites: &[Site]) -> Result<Vec<TranslationEntry>> {
    let languages = sites::languages_of(all_sites);
    let rows = store.list(&ListQuery::default())?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = BTreeMap::new();
        for language in &languages {
            let value = sites::value_for_language(&row.values, all_sites, language);
            if !value.is_empty() {
                values.insert(language.clone(), value);
            }
        }
        entries.push(TranslationEntry {
            key: row.key,
            group: row.group,
            values,
        });
    }
    Ok(entries)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub entries: usize,
    pub created: usize,
    pub updated: usize,
    /// Values whose language matches no configured site.
    pub dropped_languages: usize,
}

/// Expand language-coded entries to per-site values and hand the result to
/// one batch save. `preserve_groups` is set by archive re-imports so an
/// existing key keeps its group.
pub fn import(
    store: &mut TranslationStore,
    all_sites: &[Site],
    entries: &[TranslationEntry],
    preserve_groups: bool,
) -> Result<ImportReport> {
    let by_language = sites::language_to_site_ids(all_sites);
    let mut report = ImportReport {
        entries: entries.len(),
        ..ImportReport::default()
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let group = if preserve_groups {
            GroupUpdate::PreserveOr(entry.group.clone())
        } else {
            GroupUpdate::Assign(entry.group.clone())
        };
        let mut values = BTreeMap::new();
        for (language, value) in &entry.values {
            match by_language.get(language) {
                Some(site_ids) => {
                    for site_id in site_ids {
                        values.insert(*site_id, value.clone());
                    }
                }
                None => {
                    report.dropped_languages += 1;
                    warn!(language = %language, key = %entry.key, "no site for language");
                }
            }
        }
        items.push(SaveItem {
            id: None,
            key: entry.key.clone(),
            group,
            values,
            delete: false,
        });
    }

    let save = store.save(&items)?;
    report.created = save.created;
    report.updated = save.updated;
    Ok(report)
}

/// Import a `translations/<language>/<group>.json` directory tree,
/// registering every discovered group up front and preserving the groups
/// of keys that already exist.
pub fn import_archive(
    store: &mut TranslationStore,
    all_sites: &[Site],
    root: &Path,
) -> Result<ImportReport> {
    let entries = archive::read_tree(root)?;
    let groups: BTreeSet<&str> = entries.iter().map(|e| e.group.as_str()).collect();
    for group in groups {
        store.ensure_group(group)?;
    }
    import(store, all_sites, &entries, true)
}
