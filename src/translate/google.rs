//! Google Translate v2 backend.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};

use super::{TextFormat, TranslationProvider};

const ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

pub struct GoogleTranslator {
    client: Client,
    api_key: String,
}

impl GoogleTranslator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: ApiData,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    translations: Vec<ApiTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTranslation {
    translated_text: String,
}

impl TranslationProvider for GoogleTranslator {
    fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
        format: TextFormat,
    ) -> Result<Vec<String>> {
        debug!(count = texts.len(), source, target, "calling translate API");
        let wire_format = match format {
            TextFormat::Plain => "text",
            TextFormat::Html => "html",
        };
        let response = self
            .client
            .post(ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "q": texts,
                "source": source,
                "target": target,
                "format": wire_format,
            }))
            .send()
            .map_err(|err| Error::Provider(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Provider(format!("HTTP {status}: {body}")));
        }

        let parsed: ApiResponse = response
            .json()
            .map_err(|err| Error::Provider(format!("unreadable response: {err}")))?;
        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}
