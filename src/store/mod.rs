//! Normalized key/value/group translation storage.
//!
//! The store is the single source of truth every other component reads and
//! writes through. Keys are globally unique across groups; values hang off
//! a key per site, and an absent value row means "untranslated" — storing
//! an empty string deletes the row. All batch mutations run inside one
//! SQLite transaction: they commit together or not at all.

pub mod cache;
mod groups;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::Result;
use crate::sites::{self, Site};
use self::cache::LookupCache;

/// The reserved default group. Never deleted or renamed; keys of deleted
/// groups fall back into it.
pub const DEFAULT_GROUP: &str = "site";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS translation_groups (
    name TEXT PRIMARY KEY
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS translation_keys (
    id         INTEGER PRIMARY KEY,
    key        TEXT NOT NULL UNIQUE,
    group_name TEXT NOT NULL DEFAULT 'site' REFERENCES translation_groups (name)
);

CREATE TABLE IF NOT EXISTS translation_values (
    key_id  INTEGER NOT NULL REFERENCES translation_keys (id) ON DELETE CASCADE,
    site_id INTEGER NOT NULL,
    value   TEXT NOT NULL,
    PRIMARY KEY (key_id, site_id)
);

INSERT OR IGNORE INTO translation_groups (name) VALUES ('site');
";

/// Group assignment intent for one save item.
///
/// The three callers of [`TranslationStore::save`] want different things:
/// interactive edits and template scans always pin the group, while archive
/// re-imports must not clobber a group picked in the admin panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupUpdate {
    /// Move the key into this group. Blank normalizes to [`DEFAULT_GROUP`].
    Assign(String),
    /// Keep an existing key's group; the carried name is used only when
    /// the save creates the key.
    PreserveOr(String),
}

/// One upsert or delete inside a save batch.
#[derive(Debug, Clone)]
pub struct SaveItem {
    /// Address an existing record directly; otherwise the key string is
    /// matched exactly and a new record is created on miss.
    pub id: Option<i64>,
    pub key: String,
    pub group: GroupUpdate,
    /// Site id -> value. An empty string deletes the stored value, since
    /// absent means "untranslated", never "empty".
    pub values: BTreeMap<i64, String>,
    pub delete: bool,
}

impl SaveItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.into(),
            group: GroupUpdate::PreserveOr(String::new()),
            values: BTreeMap::new(),
            delete: false,
        }
    }

    pub fn delete_id(id: i64) -> Self {
        Self {
            id: Some(id),
            key: String::new(),
            group: GroupUpdate::PreserveOr(String::new()),
            values: BTreeMap::new(),
            delete: true,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = GroupUpdate::Assign(group.into());
        self
    }

    pub fn with_value(mut self, site_id: i64, value: impl Into<String>) -> Self {
        self.values.insert(site_id, value.into());
        self
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
}

/// Filters shared by [`TranslationStore::list`] and
/// [`TranslationStore::count`].
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Case-insensitive key substring match.
    pub search: Option<String>,
    pub group: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// When supplied, results are restricted to these groups no matter
    /// what `group` says. Callers use this to hide inactive groups.
    pub allowed_groups: Option<Vec<String>>,
}

impl ListQuery {
    pub fn for_group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub id: i64,
    pub key: String,
    pub group: String,
    pub values: BTreeMap<i64, String>,
}

/// Lookup behavior for [`TranslationStore::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Consult the designated primary site when the requested site has no
    /// value.
    pub fallback_to_primary: bool,
    /// Create the key (value-less) on a complete miss and echo the key
    /// string back as the displayed value.
    pub create_if_missing: bool,
    /// Group for a created key; blank normalizes to [`DEFAULT_GROUP`].
    pub group: String,
}

pub struct TranslationStore {
    conn: Connection,
    cache: RefCell<LookupCache>,
}

impl TranslationStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            cache: RefCell::new(LookupCache::default()),
        })
    }

    /// Exact value lookup; `None` means untranslated. Results are cached
    /// per (site, key) until the next write.
    pub fn value(&self, key: &str, site_id: i64) -> Result<Option<String>> {
        if let Some(cached) = self.cache.borrow().get(site_id, key) {
            return Ok(cached);
        }
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT v.value FROM translation_values v \
                 JOIN translation_keys k ON k.id = v.key_id \
                 WHERE k.key = ?1 AND v.site_id = ?2",
                params![key, site_id],
                |row| row.get(0),
            )
            .optional()?;
        self.cache.borrow_mut().insert(site_id, key, found.clone());
        Ok(found)
    }

    /// The single-string lookup contract used by template rendering.
    ///
    /// Missing values fall back to the primary site when requested; a
    /// complete miss may create the key and echo it back, so templates
    /// always have something self-describing to display.
    pub fn resolve(
        &mut self,
        key: &str,
        site_id: i64,
        all_sites: &[Site],
        opts: &ResolveOptions,
    ) -> Result<Option<String>> {
        if let Some(value) = self.value(key, site_id)? {
            return Ok(Some(value));
        }
        if opts.fallback_to_primary
            && let Some(primary) = sites::primary_site(all_sites)
            && primary.id != site_id
            && let Some(value) = self.value(key, primary.id)?
        {
            return Ok(Some(value));
        }
        if opts.create_if_missing {
            let item = SaveItem::new(key).with_group(opts.group.clone());
            self.save(&[item])?;
            return Ok(Some(key.to_string()));
        }
        Ok(None)
    }

    /// Exact key match, returning `(id, group)`.
    pub fn find_key(&self, key: &str) -> Result<Option<(i64, String)>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, group_name FROM translation_keys WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }

    /// Every stored key string, for bulk diffing against template scans.
    pub fn all_keys(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM translation_keys")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = HashSet::new();
        for key in rows {
            keys.insert(key?);
        }
        Ok(keys)
    }

    /// Keys with their per-site value maps, ordered by key ascending.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<TranslationRow>> {
        let (where_sql, bound) = Self::filter_clause(query);
        let mut sql = format!(
            "SELECT id, key, group_name FROM translation_keys{} ORDER BY key ASC",
            where_sql
        );
        match (query.limit, query.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite treats a negative limit as "no limit".
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let bound_refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(bound_refs.as_slice(), |row| {
            Ok(TranslationRow {
                id: row.get(0)?,
                key: row.get(1)?,
                group: row.get(2)?,
                values: BTreeMap::new(),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }

        let mut values_stmt = self
            .conn
            .prepare("SELECT site_id, value FROM translation_values WHERE key_id = ?1")?;
        for row in &mut out {
            let values = values_stmt.query_map([row.id], |r| {
                Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
            })?;
            for value in values {
                let (site_id, value) = value?;
                row.values.insert(site_id, value);
            }
        }
        Ok(out)
    }

    /// Same filter semantics as [`TranslationStore::list`], count only.
    pub fn count(&self, query: &ListQuery) -> Result<usize> {
        let (where_sql, bound) = Self::filter_clause(query);
        let sql = format!("SELECT COUNT(*) FROM translation_keys{}", where_sql);
        let bound_refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|p| p.as_ref()).collect();
        let count: i64 = self
            .conn
            .query_row(&sql, bound_refs.as_slice(), |row| row.get(0))?;
        Ok(count as usize)
    }

    fn filter_clause(query: &ListQuery) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            bound.push(Box::new(format!("%{}%", like_escape(search))));
            clauses.push(format!("key LIKE ?{} ESCAPE '\\'", bound.len()));
        }
        if let Some(group) = query.group.as_deref().filter(|g| !g.is_empty()) {
            bound.push(Box::new(group.to_string()));
            clauses.push(format!("group_name = ?{}", bound.len()));
        }
        if let Some(allowed) = &query.allowed_groups {
            if allowed.is_empty() {
                // Nothing is allowed, so nothing matches.
                clauses.push("1 = 0".to_string());
            } else {
                let mut placeholders = Vec::with_capacity(allowed.len());
                for group in allowed {
                    bound.push(Box::new(group.clone()));
                    placeholders.push(format!("?{}", bound.len()));
                }
                clauses.push(format!("group_name IN ({})", placeholders.join(", ")));
            }
        }

        if clauses.is_empty() {
            (String::new(), bound)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), bound)
        }
    }

    /// Batch upsert/delete; the whole batch commits together or not at
    /// all.
    ///
    /// Per item: deletes win; blank keys are skipped; the record is
    /// resolved by id, then exact key, then created; the group follows the
    /// item's [`GroupUpdate`]; each value is upserted, with an empty
    /// string deleting the row.
    pub fn save(&mut self, items: &[SaveItem]) -> Result<SaveReport> {
        let report = self.save_tx(items);
        // Drop cached reads whether or not the batch committed.
        self.cache.borrow_mut().clear();
        report
    }

    fn save_tx(&mut self, items: &[SaveItem]) -> Result<SaveReport> {
        let tx = self.conn.transaction()?;
        let mut report = SaveReport::default();

        for item in items {
            if item.delete {
                match item.id {
                    // Already-deleted ids affect zero rows and are tolerated.
                    Some(id) => {
                        report.deleted +=
                            tx.execute("DELETE FROM translation_keys WHERE id = ?1", [id])?;
                    }
                    None => report.skipped += 1,
                }
                continue;
            }

            let key = item.key.trim();
            if key.is_empty() {
                report.skipped += 1;
                continue;
            }

            let mut existing: Option<(i64, String)> = match item.id {
                Some(id) => tx
                    .query_row(
                        "SELECT id, group_name FROM translation_keys WHERE id = ?1",
                        [id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?,
                None => None,
            };
            if existing.is_none() {
                existing = tx
                    .query_row(
                        "SELECT id, group_name FROM translation_keys WHERE key = ?1",
                        [key],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
            }

            let group = match (&item.group, &existing) {
                (GroupUpdate::PreserveOr(_), Some((_, current))) => current.clone(),
                (GroupUpdate::PreserveOr(fallback), None) => normalize_group(fallback),
                (GroupUpdate::Assign(name), _) => normalize_group(name),
            };
            tx.execute(
                "INSERT OR IGNORE INTO translation_groups (name) VALUES (?1)",
                [group.as_str()],
            )?;

            let key_id = match existing {
                Some((id, _)) => {
                    tx.execute(
                        "UPDATE translation_keys SET key = ?1, group_name = ?2 WHERE id = ?3",
                        params![key, group, id],
                    )?;
                    report.updated += 1;
                    id
                }
                None => {
                    tx.execute(
                        "INSERT INTO translation_keys (key, group_name) VALUES (?1, ?2)",
                        params![key, group],
                    )?;
                    report.created += 1;
                    tx.last_insert_rowid()
                }
            };

            for (site_id, value) in &item.values {
                if value.is_empty() {
                    tx.execute(
                        "DELETE FROM translation_values WHERE key_id = ?1 AND site_id = ?2",
                        params![key_id, site_id],
                    )?;
                } else {
                    tx.execute(
                        "INSERT INTO translation_values (key_id, site_id, value) \
                         VALUES (?1, ?2, ?3) \
                         ON CONFLICT (key_id, site_id) DO UPDATE SET value = excluded.value",
                        params![key_id, site_id, value],
                    )?;
                }
            }
        }

        tx.commit()?;
        debug!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            skipped = report.skipped,
            "saved translation batch"
        );
        Ok(report)
    }

    /// Delete one key and cascade its values. `Ok(false)` when the id is
    /// already gone.
    pub fn delete_by_id(&mut self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM translation_keys WHERE id = ?1", [id])?;
        self.cache.borrow_mut().clear();
        Ok(affected > 0)
    }
}

pub(crate) fn normalize_group(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_GROUP.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape LIKE metacharacters so searches match them literally.
fn like_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    fn store() -> TranslationStore {
        TranslationStore::open_in_memory().unwrap()
    }

    fn sites() -> Vec<Site> {
        vec![
            Site {
                id: 1,
                language: "en".to_string(),
                primary: true,
            },
            Site {
                id: 2,
                language: "es".to_string(),
                primary: false,
            },
        ]
    }

    #[test]
    fn save_then_list_round_trips_values() {
        let mut store = store();
        store
            .save(&[SaveItem::new("greeting")
                .with_group("site")
                .with_value(1, "Hello")
                .with_value(2, "Hola")])
            .unwrap();

        let rows = store.list(&ListQuery::for_group("site")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "greeting");
        assert_eq!(rows[0].values[&1], "Hello");
        assert_eq!(rows[0].values[&2], "Hola");
    }

    #[test]
    fn empty_value_deletes_only_that_site() {
        let mut store = store();
        store
            .save(&[SaveItem::new("greeting")
                .with_value(1, "Hello")
                .with_value(2, "Hola")])
            .unwrap();

        store.save(&[SaveItem::new("greeting").with_value(1, "")]).unwrap();

        let rows = store.list(&ListQuery::default()).unwrap();
        assert_eq!(rows[0].values.get(&1), None);
        assert_eq!(rows[0].values[&2], "Hola");
    }

    #[test]
    fn blank_keys_are_skipped() {
        let mut store = store();
        let report = store
            .save(&[SaveItem::new("   "), SaveItem::new("real")])
            .unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.created, 1);
        assert_eq!(store.count(&ListQuery::default()).unwrap(), 1);
    }

    #[test]
    fn key_is_trimmed_before_matching() {
        let mut store = store();
        store.save(&[SaveItem::new("greeting")]).unwrap();
        let report = store.save(&[SaveItem::new("  greeting  ")]).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 1);
    }

    #[test]
    fn preserve_keeps_existing_group_and_assign_moves_it() {
        let mut store = store();
        store
            .save(&[SaveItem::new("cta").with_group("marketing")])
            .unwrap();

        // Re-import with a different discovered group must not clobber.
        store.save(&[SaveItem {
            id: None,
            key: "cta".to_string(),
            group: GroupUpdate::PreserveOr("imported".to_string()),
            values: BTreeMap::new(),
            delete: false,
        }]).unwrap();
        let row = &store.list(&ListQuery::default()).unwrap()[0];
        assert_eq!(row.group, "marketing");

        // A fresh key created under PreserveOr takes the carried group.
        store.save(&[SaveItem {
            id: None,
            key: "fresh".to_string(),
            group: GroupUpdate::PreserveOr("imported".to_string()),
            values: BTreeMap::new(),
            delete: false,
        }]).unwrap();
        let (_, group) = store.find_key("fresh").unwrap().unwrap();
        assert_eq!(group, "imported");

        // An interactive edit always wins.
        store
            .save(&[SaveItem::new("cta").with_group("site")])
            .unwrap();
        let (_, group) = store.find_key("cta").unwrap().unwrap();
        assert_eq!(group, "site");
    }

    #[test]
    fn blank_group_normalizes_to_default() {
        let mut store = store();
        store.save(&[SaveItem::new("plain").with_group("  ")]).unwrap();
        let (_, group) = store.find_key("plain").unwrap().unwrap();
        assert_eq!(group, DEFAULT_GROUP);
    }

    #[test]
    fn delete_cascades_values() {
        let mut store = store();
        store
            .save(&[SaveItem::new("doomed").with_value(1, "x")])
            .unwrap();
        let (id, _) = store.find_key("doomed").unwrap().unwrap();

        assert!(store.delete_by_id(id).unwrap());
        assert_eq!(store.value("doomed", 1).unwrap(), None);
        assert!(!store.delete_by_id(id).unwrap());
    }

    #[test]
    fn delete_items_with_stale_ids_are_tolerated() {
        let mut store = store();
        store.save(&[SaveItem::new("kept")]).unwrap();
        let report = store
            .save(&[SaveItem::delete_id(9999), SaveItem::new("added")])
            .unwrap();
        assert_eq!(report.deleted, 0);
        assert_eq!(report.created, 1);
    }

    #[test]
    fn list_search_is_case_insensitive_substring() {
        let mut store = store();
        store
            .save(&[
                SaveItem::new("header.title"),
                SaveItem::new("footer.copyright"),
            ])
            .unwrap();

        let query = ListQuery {
            search: Some("HEADER".to_string()),
            ..Default::default()
        };
        let rows = store.list(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "header.title");
        assert_eq!(store.count(&query).unwrap(), 1);
    }

    #[test]
    fn list_search_escapes_like_metacharacters() {
        let mut store = store();
        store
            .save(&[SaveItem::new("100%_done"), SaveItem::new("100x-done")])
            .unwrap();
        let query = ListQuery {
            search: Some("100%_".to_string()),
            ..Default::default()
        };
        let rows = store.list(&query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "100%_done");
    }

    #[test]
    fn allowed_groups_restrict_regardless_of_group_filter() {
        let mut store = store();
        store
            .save(&[
                SaveItem::new("a").with_group("site"),
                SaveItem::new("b").with_group("hidden"),
            ])
            .unwrap();

        let query = ListQuery {
            group: Some("hidden".to_string()),
            allowed_groups: Some(vec!["site".to_string()]),
            ..Default::default()
        };
        assert!(store.list(&query).unwrap().is_empty());

        let query = ListQuery {
            allowed_groups: Some(Vec::new()),
            ..Default::default()
        };
        assert!(store.list(&query).unwrap().is_empty());
    }

    #[test]
    fn list_orders_by_key_and_paginates() {
        let mut store = store();
        store
            .save(&[
                SaveItem::new("charlie"),
                SaveItem::new("alpha"),
                SaveItem::new("bravo"),
            ])
            .unwrap();

        let query = ListQuery {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        };
        let keys: Vec<_> = store
            .list(&query)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["bravo", "charlie"]);
    }

    #[test]
    fn resolve_falls_back_to_primary_only_when_asked() {
        let mut store = store();
        let sites = sites();
        store
            .save(&[SaveItem::new("greeting").with_value(1, "Hello")])
            .unwrap();

        let with_fallback = ResolveOptions {
            fallback_to_primary: true,
            ..Default::default()
        };
        assert_eq!(
            store.resolve("greeting", 2, &sites, &with_fallback).unwrap(),
            Some("Hello".to_string())
        );

        let without = ResolveOptions::default();
        assert_eq!(store.resolve("greeting", 2, &sites, &without).unwrap(), None);
    }

    #[test]
    fn resolve_creates_missing_key_and_echoes_it() {
        let mut store = store();
        let sites = sites();
        let opts = ResolveOptions {
            fallback_to_primary: true,
            create_if_missing: true,
            group: "frontend".to_string(),
        };

        let shown = store.resolve("brand.tagline", 2, &sites, &opts).unwrap();
        assert_eq!(shown, Some("brand.tagline".to_string()));

        let (_, group) = store.find_key("brand.tagline").unwrap().unwrap();
        assert_eq!(group, "frontend");
        // Created value-less: still untranslated everywhere.
        assert_eq!(store.value("brand.tagline", 2).unwrap(), None);
    }

    #[test]
    fn value_cache_is_invalidated_by_writes() {
        let mut store = store();
        store
            .save(&[SaveItem::new("greeting").with_value(1, "Hello")])
            .unwrap();

        assert_eq!(store.value("greeting", 1).unwrap().as_deref(), Some("Hello"));
        assert_eq!(store.cache.borrow().len(), 1);

        store
            .save(&[SaveItem::new("greeting").with_value(1, "Hi")])
            .unwrap();
        assert_eq!(store.cache.borrow().len(), 0);
        assert_eq!(store.value("greeting", 1).unwrap().as_deref(), Some("Hi"));
    }

    #[test]
    fn save_rolls_back_the_whole_batch_on_mid_batch_failure() {
        let mut store = store();
        store
            .save(&[SaveItem::new("keep").with_value(1, "original")])
            .unwrap();

        // Simulate a persistence failure in the middle of the batch.
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER fail_on_boom BEFORE INSERT ON translation_keys \
                 WHEN NEW.key = 'boom' \
                 BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;",
            )
            .unwrap();

        let result = store.save(&[
            SaveItem::new("first").with_value(1, "a"),
            SaveItem::new("keep").with_value(1, "clobbered"),
            SaveItem::new("boom"),
            SaveItem::new("last").with_value(1, "b"),
        ]);
        assert!(matches!(result, Err(Error::Persistence(_))));

        // The store is unchanged from before the call.
        let keys = store.all_keys().unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("keep"));
        assert_eq!(store.value("keep", 1).unwrap().as_deref(), Some("original"));
        assert_eq!(store.value("first", 1).unwrap(), None);
    }

    #[test]
    fn upsert_overwrites_existing_value() {
        let mut store = store();
        store
            .save(&[SaveItem::new("greeting").with_value(1, "Hello")])
            .unwrap();
        store
            .save(&[SaveItem::new("greeting").with_value(1, "Howdy")])
            .unwrap();
        assert_eq!(store.value("greeting", 1).unwrap().as_deref(), Some("Howdy"));
    }

    #[test]
    fn save_by_id_can_rename_a_key() {
        let mut store = store();
        store.save(&[SaveItem::new("old.name")]).unwrap();
        let (id, _) = store.find_key("old.name").unwrap().unwrap();

        let mut item = SaveItem::new("new.name");
        item.id = Some(id);
        store.save(&[item]).unwrap();

        assert!(store.find_key("old.name").unwrap().is_none());
        assert_eq!(store.find_key("new.name").unwrap().unwrap().0, id);
    }
}
