//! Translation-key extraction from template sources.

use regex::Regex;

use crate::error::{Error, Result};
use crate::store::DEFAULT_GROUP;

/// Outcome of extracting keys from one template source.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Total pattern matches, including ones rejected for carrying a
    /// foreign translation domain.
    pub matches: usize,
    /// Accepted, trimmed, non-empty keys in source order (may repeat).
    pub keys: Vec<String>,
}

/// Seam for the scan orchestration: how keys are pulled out of a template
/// source is swappable without touching directory walking or diffing.
pub trait KeyExtractor {
    fn extract(&self, source: &str) -> Extraction;
}

/// Matches string literals piped through the `t` translate filter, e.g.
/// `{{ 'About us'|t }}`. An argument list may name an explicit translation
/// domain (`{{ 'About us'|t('mail') }}`); only domain-less uses and the
/// default "site" domain are harvested — other domains are resolved
/// dynamically at render time and cannot be attributed here.
pub struct TranslateFilterExtractor {
    pattern: Regex,
}

const TRANSLATE_CALL: &str = concat!(
    r#"('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*")"#, // quoted key
    r"\s*\|\s*t\b",                             // the translate filter
    r#"(?:\s*\(\s*('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"))?"#, // optional quoted domain
);

impl TranslateFilterExtractor {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(TRANSLATE_CALL)
            .map_err(|err| Error::Validation(format!("invalid extraction pattern: {err}")))?;
        Ok(Self { pattern })
    }
}

impl KeyExtractor for TranslateFilterExtractor {
    fn extract(&self, source: &str) -> Extraction {
        let mut extraction = Extraction::default();
        for caps in self.pattern.captures_iter(source) {
            extraction.matches += 1;
            if let Some(domain) = caps.get(2)
                && unquote(domain.as_str()) != DEFAULT_GROUP
            {
                continue;
            }
            let key = unquote(&caps[1]);
            let key = key.trim();
            if !key.is_empty() {
                extraction.keys.push(key.to_string());
            }
        }
        extraction
    }
}

/// Strip the surrounding quotes and resolve backslash escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
