//! JSON codec: `{ group: { key: { "translations": { language: value } } } }`.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::normalize_group;

use super::TranslationEntry;

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyEntry {
    #[serde(default)]
    translations: BTreeMap<String, String>,
}

/// group -> key -> translations. BTreeMaps keep the output sorted and
/// stable across exports.
type Tree = BTreeMap<String, BTreeMap<String, KeyEntry>>;

pub fn write<W: Write>(writer: W, entries: &[TranslationEntry]) -> Result<()> {
    let mut tree: Tree = BTreeMap::new();
    for entry in entries {
        tree.entry(normalize_group(&entry.group)).or_default().insert(
            entry.key.clone(),
            KeyEntry {
                translations: entry.values.clone(),
            },
        );
    }
    serde_json::to_writer_pretty(writer, &tree)?;
    Ok(())
}

pub fn read<R: Read>(reader: R) -> Result<Vec<TranslationEntry>> {
    let tree: Tree = serde_json::from_reader(reader)?;
    let mut entries = Vec::new();
    for (group, keys) in tree {
        for (key, key_entry) in keys {
            entries.push(TranslationEntry {
                key,
                group: normalize_group(&group),
                values: key_entry.translations,
            });
        }
    }
    Ok(entries)
}
