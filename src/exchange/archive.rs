//! Archive codec: a directory tree of flat key→value maps, one file per
//! (language, group) pair, laid out as `translations/<language>/<group>.json`.
//!
//! Pure transform between the tree and [`TranslationEntry`] lists; nothing
//! here touches the store.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};

use super::TranslationEntry;

pub const ARCHIVE_ROOT: &str = "translations";

/// Write the entries below `root`, creating
/// `translations/<language>/<group>.json` files. Returns the number of
/// files written.
pub fn write_tree(root: &Path, entries: &[TranslationEntry]) -> Result<usize> {
    // (language, group) -> key -> value
    let mut files: BTreeMap<(String, String), BTreeMap<String, String>> = BTreeMap::new();
    for entry in entries {
        for (language, value) in &entry.values {
            files
                .entry((language.clone(), entry.group.clone()))
                .or_default()
                .insert(entry.key.clone(), value.clone());
        }
    }

    for ((language, group), map) in &files {
        let dir = root.join(ARCHIVE_ROOT).join(language);
        fs::create_dir_all(&dir)?;
        let file = fs::File::create(dir.join(format!("{group}.json")))?;
        serde_json::to_writer_pretty(file, map)?;
    }
    Ok(files.len())
}

/// Read a `translations/` tree back into entries. Values for the same
/// `(group, key)` are merged across language files into one entry, so a
/// key translated in three languages comes back as a single item.
pub fn read_tree(root: &Path) -> Result<Vec<TranslationEntry>> {
    let base = root.join(ARCHIVE_ROOT);
    if !base.is_dir() {
        return Err(Error::Validation(format!(
            "archive has no \"{ARCHIVE_ROOT}\" directory under {}",
            root.display()
        )));
    }

    let mut merged: BTreeMap<(String, String), BTreeMap<String, String>> = BTreeMap::new();
    for language_dir in fs::read_dir(&base)? {
        let language_dir = language_dir?;
        if !language_dir.file_type()?.is_dir() {
            warn!(path = %language_dir.path().display(), "ignoring stray archive file");
            continue;
        }
        let language = language_dir.file_name().to_string_lossy().into_owned();

        for file in fs::read_dir(language_dir.path())? {
            let file = file?;
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(group) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            else {
                continue;
            };
            let contents = fs::read_to_string(&path)?;
            let map: BTreeMap<String, String> = serde_json::from_str(&contents).map_err(|err| {
                Error::Validation(format!("malformed archive file {}: {err}", path.display()))
            })?;
            for (key, value) in map {
                merged
                    .entry((group.clone(), key))
                    .or_default()
                    .insert(language.clone(), value);
            }
        }
    }

    Ok(merged
        .into_iter()
        .map(|((group, key), values)| TranslationEntry { key, group, values })
        .collect())
}
