//! Site model and per-language aggregation.
//!
//! A site is one published destination with its own language code; many
//! sites can share a language. Every component that moves values between
//! "language" space (export columns, provider calls) and "site" space
//! (stored rows) goes through the helpers here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub language: String,
    /// The designated fallback site consulted when a value is missing for
    /// the requested site. Exactly one site carries this flag.
    #[serde(default)]
    pub primary: bool,
}

/// Sorted, de-duplicated language codes across all sites.
pub fn languages_of(sites: &[Site]) -> Vec<String> {
    let mut languages: Vec<String> = sites.iter().map(|s| s.language.clone()).collect();
    languages.sort();
    languages.dedup();
    languages
}

/// Language code -> ordered ids of the sites sharing it.
pub fn language_to_site_ids(sites: &[Site]) -> BTreeMap<String, Vec<i64>> {
    let mut map: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for site in sites {
        map.entry(site.language.clone()).or_default().push(site.id);
    }
    map
}

pub fn primary_site(sites: &[Site]) -> Option<&Site> {
    sites.iter().find(|s| s.primary)
}

/// First non-missing value among the sites matching `language`, else the
/// empty string. Exports use this to flatten multiple sites into one
/// language column.
pub fn value_for_language(
    values: &BTreeMap<i64, String>,
    sites: &[Site],
    language: &str,
) -> String {
    for site in sites.iter().filter(|s| s.language == language) {
        if let Some(value) = values.get(&site.id) {
            return value.clone();
        }
    }
    String::new()
}
