//! CSV codec: header row `key,group,<language...>`, one row per key.

use std::io::{Read, Write};

use crate::error::{Error, Result};

use super::TranslationEntry;

pub fn write<W: Write>(writer: W, entries: &[TranslationEntry], languages: &[String]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["key".to_string(), "group".to_string()];
    header.extend(languages.iter().cloned());
    out.write_record(&header).map_err(csv_error)?;

    for entry in entries {
        let mut record = vec![entry.key.clone(), entry.group.clone()];
        for language in languages {
            record.push(entry.values.get(language).cloned().unwrap_or_default());
        }
        out.write_record(&record).map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

/// Parse entries back out of a CSV payload. The header defines the
/// column→language mapping; `key` and `group` are reserved column names.
/// Rows with a blank key are skipped. Empty language cells are kept as
/// empty values, so re-importing clears values removed upstream.
pub fn read<R: Read>(reader: R) -> Result<Vec<TranslationEntry>> {
    let mut input = csv::Reader::from_reader(reader);
    let headers = input.headers().map_err(csv_error)?.clone();

    let mut key_column = None;
    let mut group_column = None;
    let mut language_columns: Vec<(usize, String)> = Vec::new();
    for (index, name) in headers.iter().enumerate() {
        match name {
            "key" => key_column = Some(index),
            "group" => group_column = Some(index),
            _ if !name.trim().is_empty() => language_columns.push((index, name.to_string())),
            _ => {}
        }
    }
    let key_column = key_column
        .ok_or_else(|| Error::Validation("CSV header is missing the \"key\" column".to_string()))?;

    let mut entries = Vec::new();
    for record in input.records() {
        let record = record.map_err(csv_error)?;
        let key = record.get(key_column).unwrap_or("").trim();
        if key.is_empty() {
            continue;
        }
        let group = group_column
            .and_then(|index| record.get(index))
            .unwrap_or("")
            .to_string();
        let values = language_columns
            .iter()
            .map(|(index, language)| {
                (
                    language.clone(),
                    record.get(*index).unwrap_or("").to_string(),
                )
            })
            .collect();
        entries.push(TranslationEntry {
            key: key.to_string(),
            group,
            values,
        });
    }
    Ok(entries)
}

fn csv_error(err: csv::Error) -> Error {
    Error::Validation(format!("malformed CSV: {err}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(key: &str, group: &str, values: &[(&str, &str)]) -> TranslationEntry {
        TranslationEntry {
            key: key.to_string(),
            group: group.to_string(),
            values: values
                .iter()
                .map(|(l, v)| (l.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let entries = vec![
            entry("farewell", "site", &[("en", "Bye")]),
            entry("greeting", "site", &[("de", "Hallo"), ("en", "Hello")]),
        ];
        let mut buffer = Vec::new();
        write(&mut buffer, &entries, &["de".to_string(), "en".to_string()]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("key,group,de,en"));
        assert_eq!(lines.next(), Some("farewell,site,,Bye"));
        assert_eq!(lines.next(), Some("greeting,site,Hallo,Hello"));
    }

    #[test]
    fn reads_rows_using_header_languages() {
        let text = "key,group,en,de\ngreeting,site,Hello,Hallo\n";
        let entries = read(text.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "greeting");
        assert_eq!(entries[0].values["en"], "Hello");
        assert_eq!(entries[0].values["de"], "Hallo");
    }

    #[test]
    fn blank_keys_are_skipped() {
        let text = "key,group,en\n,site,Lost\n   ,site,Also lost\nkept,site,Value\n";
        let entries = read(text.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "kept");
    }

    #[test]
    fn empty_cells_become_empty_values() {
        let text = "key,group,en,de\ngreeting,site,Hello,\n";
        let entries = read(text.as_bytes()).unwrap();
        assert_eq!(entries[0].values["de"], "");
    }

    #[test]
    fn missing_key_column_is_a_validation_error() {
        let text = "group,en\nsite,Hello\n";
        assert!(matches!(
            read(text.as_bytes()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn quoted_fields_round_trip() {
        let entries = vec![entry(
            "quote",
            "site",
            &[("en", "She said \"hi\", twice")],
        )];
        let mut buffer = Vec::new();
        write(&mut buffer, &entries, &["en".to_string()]).unwrap();

        let parsed = read(buffer.as_slice()).unwrap();
        assert_eq!(parsed[0].values["en"], "She said \"hi\", twice");
    }

    #[test]
    fn read_tolerates_missing_trailing_cells() {
        let mut values = BTreeMap::new();
        values.insert("en".to_string(), "Hello".to_string());
        // flexible row lengths are a parse error in strict csv; headers
        // define three columns here and the row supplies three
        let text = "key,group,en\ngreeting,site,Hello\n";
        let entries = read(text.as_bytes()).unwrap();
        assert_eq!(entries[0].values, values);
    }
}
