//! Auto-translate bridge.
//!
//! Batches untranslated strings to an external provider, preserving the
//! original ordering and indices, and substitutes the results back. One
//! synchronous provider call per batch; failures abort the whole batch
//! with no retries and no partial results.

pub mod google;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::sites::Site;
use crate::store::{GroupUpdate, ListQuery, SaveItem, TranslationStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

impl TextFormat {
    pub fn mime(self) -> &'static str {
        match self {
            TextFormat::Plain => "text/plain",
            TextFormat::Html => "text/html",
        }
    }
}

/// Seam in front of the external translation API, so the batching logic
/// is testable without a network and the backend is swappable.
pub trait TranslationProvider {
    fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
        format: TextFormat,
    ) -> Result<Vec<String>>;
}

/// Remap a site language code to the provider's vocabulary
/// (e.g. `es-ES` -> `es`). Unmapped codes pass through.
pub fn remap_language<'a>(code: &'a str, map: &'a HashMap<String, String>) -> &'a str {
    map.get(code).map(String::as_str).unwrap_or(code)
}

/// Translate `texts` from `source_language` to `target_language` in one
/// provider call.
///
/// Equal codes (after remapping) or an all-blank input return the texts
/// unchanged without contacting the provider. Blank entries keep their
/// positions in the result.
pub fn translate_batch(
    provider: &dyn TranslationProvider,
    texts: &[String],
    source_language: &str,
    target_language: &str,
    format: TextFormat,
    language_map: &HashMap<String, String>,
) -> Result<Vec<String>> {
    let source = remap_language(source_language, language_map);
    let target = remap_language(target_language, language_map);
    if source == target {
        return Ok(texts.to_vec());
    }

    let mut positions = Vec::new();
    let mut pending = Vec::new();
    for (index, text) in texts.iter().enumerate() {
        if !text.trim().is_empty() {
            positions.push(index);
            pending.push(text.clone());
        }
    }
    if pending.is_empty() {
        return Ok(texts.to_vec());
    }

    debug!(
        total = texts.len(),
        pending = pending.len(),
        source,
        target,
        "dispatching translation batch"
    );
    let translated = provider.translate(&pending, source, target, format)?;
    if translated.len() != pending.len() {
        return Err(Error::Provider(format!(
            "expected {} translations, provider returned {}",
            pending.len(),
            translated.len()
        )));
    }

    let mut results = texts.to_vec();
    for (position, text) in positions.into_iter().zip(translated) {
        results[position] = text;
    }
    Ok(results)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranslateSummary {
    /// Keys that had a source value but none on the target site.
    pub candidates: usize,
    /// Sites sharing the target language that received the new values.
    pub sites_written: usize,
}

/// Fill every key that has a value on `source_site` but none on
/// `target_site`, using one provider batch. Results are written to every
/// site sharing the target's language; groups stay untouched.
pub fn translate_missing(
    store: &mut TranslationStore,
    all_sites: &[Site],
    source_site: i64,
    target_site: i64,
    provider: &dyn TranslationProvider,
    format: TextFormat,
    language_map: &HashMap<String, String>,
) -> Result<TranslateSummary> {
    let source = all_sites
        .iter()
        .find(|s| s.id == source_site)
        .ok_or_else(|| Error::NotFound(format!("site {source_site}")))?;
    let target = all_sites
        .iter()
        .find(|s| s.id == target_site)
        .ok_or_else(|| Error::NotFound(format!("site {target_site}")))?;

    let mut keys = Vec::new();
    let mut texts = Vec::new();
    for row in store.list(&ListQuery::default())? {
        if row.values.contains_key(&target_site) {
            continue;
        }
        let Some(text) = row.values.get(&source_site) else {
            continue;
        };
        texts.push(text.clone());
        keys.push(row.key);
    }
    if texts.is_empty() {
        return Ok(TranslateSummary::default());
    }

    let translated = translate_batch(
        provider,
        &texts,
        &source.language,
        &target.language,
        format,
        language_map,
    )?;

    let target_sites: Vec<i64> = all_sites
        .iter()
        .filter(|s| s.language == target.language)
        .map(|s| s.id)
        .collect();
    let items: Vec<SaveItem> = keys
        .iter()
        .zip(&translated)
        .map(|(key, value)| {
            let mut item = SaveItem::new(key.clone());
            item.group = GroupUpdate::PreserveOr(String::new());
            for site_id in &target_sites {
                item.values.insert(*site_id, value.clone());
            }
            item
        })
        .collect();
    store.save(&items)?;

    Ok(TranslateSummary {
        candidates: texts.len(),
        sites_written: target_sites.len(),
    })
}
