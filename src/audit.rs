//! Unused-key auditing: cross-reference stored keys against template
//! usage and optionally delete the dead ones.

use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::scan::{collect_template_keys, extractor::TranslateFilterExtractor};
use crate::store::{ListQuery, SaveItem, TranslationStore};

/// Which stored keys an audit call considers. Exactly one selection is in
/// effect per call.
#[derive(Debug, Clone)]
pub enum KeyScope {
    All,
    Group(String),
    /// Restrict to this set, e.g. everything except inactive groups.
    Allowed(Vec<String>),
}

impl KeyScope {
    fn to_query(&self) -> ListQuery {
        match self {
            KeyScope::All => ListQuery::default(),
            KeyScope::Group(name) => ListQuery::for_group(name.clone()),
            KeyScope::Allowed(groups) => ListQuery {
                allowed_groups: Some(groups.clone()),
                ..ListQuery::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedCandidate {
    pub id: i64,
    pub key: String,
    pub group: String,
}

#[derive(Debug, Default)]
pub struct AuditReport {
    pub files_scanned: usize,
    pub candidates: Vec<UnusedCandidate>,
    /// Entries actually removed; zero for previews.
    pub deleted: usize,
}

/// Keys selected by `scope` that no scanned template references, without
/// mutating anything.
///
/// Only default-domain template references are extracted (see
/// [`TranslateFilterExtractor`]), so a key used exclusively through
/// another translation domain still shows up here. That matches the
/// admin panel's historical cleanup behavior; changing it would change
/// which entries users see deleted.
pub fn preview_unused(
    store: &TranslationStore,
    base: &Path,
    config: &Config,
    scope: &KeyScope,
) -> Result<AuditReport> {
    let extractor = TranslateFilterExtractor::new()?;
    let (referenced, scan_report) = collect_template_keys(base, config, &extractor);

    let stored = store.list(&scope.to_query())?;
    let candidates: Vec<UnusedCandidate> = stored
        .into_iter()
        .filter(|row| !referenced.contains(&row.key))
        .map(|row| UnusedCandidate {
            id: row.id,
            key: row.key,
            group: row.group,
        })
        .collect();

    debug!(
        files = scan_report.files,
        candidates = candidates.len(),
        "unused-key preview"
    );
    Ok(AuditReport {
        files_scanned: scan_report.files,
        candidates,
        deleted: 0,
    })
}

/// Delete every key [`preview_unused`] would report, in one transaction,
/// cascading their values.
pub fn delete_unused(
    store: &mut TranslationStore,
    base: &Path,
    config: &Config,
    scope: &KeyScope,
) -> Result<AuditReport> {
    let mut report = preview_unused(store, base, config, scope)?;
    if report.candidates.is_empty() {
        return Ok(report);
    }

    let items: Vec<SaveItem> = report
        .candidates
        .iter()
        .map(|candidate| SaveItem::delete_id(candidate.id))
        .collect();
    let save = store.save(&items)?;
    report.deleted = save.deleted;
    Ok(report)
}
