//! Group taxonomy operations.

use rusqlite::params;
use tracing::debug;

use crate::error::{Error, Result};

use super::{DEFAULT_GROUP, TranslationStore, normalize_group};

impl TranslationStore {
    /// All group names, sorted ascending. Always contains
    /// [`DEFAULT_GROUP`].
    pub fn groups(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM translation_groups ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Create the group if it does not exist yet; returns the normalized
    /// name. Groups come into being implicitly whenever a key references
    /// them, so this never fails on duplicates.
    pub fn ensure_group(&mut self, name: &str) -> Result<String> {
        let name = normalize_group(name);
        self.conn.execute(
            "INSERT OR IGNORE INTO translation_groups (name) VALUES (?1)",
            [name.as_str()],
        )?;
        Ok(name)
    }

    /// Rename a group, moving its member keys along. Renaming onto an
    /// existing group merges into it.
    pub fn rename_group(&mut self, old: &str, new: &str) -> Result<()> {
        if old == DEFAULT_GROUP {
            return Err(Error::Validation(format!(
                "the \"{DEFAULT_GROUP}\" group is reserved and cannot be renamed"
            )));
        }
        let new = normalize_group(new);
        if new == old {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM translation_groups WHERE name = ?1)",
            [old],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::NotFound(format!("group \"{old}\"")));
        }
        tx.execute(
            "INSERT OR IGNORE INTO translation_groups (name) VALUES (?1)",
            [new.as_str()],
        )?;
        tx.execute(
            "UPDATE translation_keys SET group_name = ?1 WHERE group_name = ?2",
            params![new, old],
        )?;
        tx.execute("DELETE FROM translation_groups WHERE name = ?1", [old])?;
        tx.commit()?;
        debug!(old, new = new.as_str(), "renamed group");
        Ok(())
    }

    /// Delete a group, reassigning its member keys to [`DEFAULT_GROUP`].
    /// Returns how many keys were reassigned.
    pub fn delete_group(&mut self, name: &str) -> Result<usize> {
        if name == DEFAULT_GROUP {
            return Err(Error::Validation(format!(
                "the \"{DEFAULT_GROUP}\" group is reserved and cannot be deleted"
            )));
        }

        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM translation_groups WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::NotFound(format!("group \"{name}\"")));
        }
        let reassigned = tx.execute(
            "UPDATE translation_keys SET group_name = ?1 WHERE group_name = ?2",
            params![DEFAULT_GROUP, name],
        )?;
        tx.execute("DELETE FROM translation_groups WHERE name = ?1", [name])?;
        tx.commit()?;
        debug!(name, reassigned, "deleted group");
        Ok(reassigned)
    }
}
