use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::core::{SearchEngine, SynonymTable};
use crate::models::ProfessionalRecord;
use crate::services::source::{DataSource, SourceError};

/// Errors that make the catalog unusable
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch catalog: {0}")]
    SourceError(#[from] SourceError),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid catalog format: {0}")]
    InvalidFormat(String),
}

/// Validated catalog records plus how many entries were rejected
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub records: Vec<ProfessionalRecord>,
    pub skipped: usize,
}

/// Parse the catalog document: a JSON array of professional records
///
/// Malformed entries and repeated identifiers are skipped (first one wins);
/// only an unparseable or non-array document fails the whole load.
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    let document: Value = serde_json::from_str(text)?;

    let entries = document
        .as_array()
        .ok_or_else(|| CatalogError::InvalidFormat("expected a JSON array of professionals".into()))?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut catalog = Catalog {
        records: Vec::with_capacity(entries.len()),
        skipped: 0,
    };

    for (position, entry) in entries.iter().enumerate() {
        match ProfessionalRecord::from_value(entry) {
            Ok(record) => {
                if !seen.insert(record.id.clone()) {
                    tracing::warn!("Skipping catalog entry {}: duplicate id {}", position, record.id);
                    catalog.skipped += 1;
                    continue;
                }
                catalog.records.push(record);
            }
            Err(e) => {
                tracing::warn!("Skipping catalog entry {}: {}", position, e);
                catalog.skipped += 1;
            }
        }
    }

    Ok(catalog)
}

/// Parse the synonym document: `{ "term": ["alternate", ...] }`
///
/// Never fails. A malformed document yields an empty table; entries whose
/// value is not an array are ignored, as are non-string alternates.
pub fn parse_synonyms(text: &str) -> SynonymTable {
    let document: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring malformed synonym document: {}", e);
            return SynonymTable::new();
        }
    };

    let Some(map) = document.as_object() else {
        tracing::warn!("Ignoring synonym document: expected a JSON object");
        return SynonymTable::new();
    };

    let entries = map.iter().filter_map(|(term, alternates)| {
        let alternates = alternates.as_array()?;
        let alternates: Vec<String> = alternates
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        Some((term.as_str(), alternates))
    });

    SynonymTable::from_entries(entries)
}

/// Fetch both documents concurrently and build a ready engine
///
/// A synonym fetch failure degrades to an empty table; a catalog failure
/// is returned to the caller.
pub async fn load_engine<S: DataSource>(source: &S) -> Result<SearchEngine, CatalogError> {
    let (catalog, synonyms) = tokio::join!(source.fetch_catalog(), source.fetch_synonyms());

    let catalog = parse_catalog(&catalog?)?;

    let synonyms = match synonyms {
        Ok(Some(text)) => parse_synonyms(&text),
        Ok(None) => SynonymTable::new(),
        Err(e) => {
            tracing::warn!("Synonyms unavailable, continuing without expansion: {}", e);
            SynonymTable::new()
        }
    };

    let engine = SearchEngine::new(catalog.records, synonyms);

    tracing::info!(
        "Catalog loaded: {} records indexed, {} skipped, {} tokens, {} synonym entries",
        engine.records().len(),
        catalog.skipped,
        engine.index().len(),
        engine.synonyms().len()
    );

    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::source::StaticSource;

    #[test]
    fn test_parse_catalog_skips_malformed() {
        let text = r#"[
            {"id": "1", "nome": "Ana", "categoria": "Diarista", "keywords": ["limpeza", 3]},
            {"id": "2", "categoria": "Pintura"},
            {"id": "1", "nome": "Ana de novo", "categoria": "Diarista"},
            "not a record",
            {"id": 7, "nome": "Caio", "categoria": "Elétrica", "localizacao": {"lat": "?", "lng": 0}}
        ]"#;

        let catalog = parse_catalog(text).unwrap();
        let ids: Vec<_> = catalog.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "7"]);
        assert_eq!(catalog.skipped, 3);
        assert_eq!(catalog.records[0].keywords, vec!["limpeza"]);
        assert!(catalog.records[1].location.is_none());
    }

    #[test]
    fn test_parse_catalog_rejects_bad_documents() {
        assert!(matches!(parse_catalog("{oops"), Err(CatalogError::ParseError(_))));
        assert!(matches!(parse_catalog(r#"{"id": "1"}"#), Err(CatalogError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_synonyms() {
        let table = parse_synonyms(r#"{"pintor": ["pintura", 1, "pintora"], "x": "not a list"}"#);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("pintor").unwrap(), ["pintura", "pintora"]);
    }

    #[test]
    fn test_parse_synonyms_degrades_to_empty() {
        assert!(parse_synonyms("not json").is_empty());
        assert!(parse_synonyms("[1, 2]").is_empty());
    }

    #[tokio::test]
    async fn test_load_engine() {
        let source = StaticSource::new(
            r#"[{"id": "1", "nome": "Ana", "categoria": "Pintura", "keywords": ["pintor"]}]"#,
            Some(r#"{"pintora": ["pintor"]}"#.to_string()),
        );

        let engine = load_engine(&source).await.unwrap();
        assert_eq!(engine.records().len(), 1);
        assert!(engine.index().contains("pintor", "1"));
        assert_eq!(engine.synonyms().len(), 1);
    }

    #[tokio::test]
    async fn test_load_engine_catalog_failure() {
        let source = StaticSource::new("not json", None);
        assert!(load_engine(&source).await.is_err());
    }
}
