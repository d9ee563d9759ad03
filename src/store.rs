// 🗄️ Article Store - whole-collection JSON persistence
// The store is read and replaced as a unit; partial updates happen in memory

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Article as persisted in the JSON store, holder name encrypted.
///
/// `country` and `agent` are free-text labels; `country` is only ever used
/// as a lookup key into the exchange-rate table. `id` uniqueness is the
/// store's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Cipher token, or legacy plain text for old fixtures
    pub encrypted_holder: String,
    pub amount: f64,
    pub country: String,
    pub agent: String,
}

/// Read the full article collection. A store that cannot be read is fatal
/// for the request; no partial result is produced.
pub fn load_articles<P: AsRef<Path>>(path: P) -> Result<Vec<RawArticle>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read articles file: {:?}", path.as_ref()))?;

    serde_json::from_str(&content).context("Failed to parse articles JSON")
}

/// Replace the full article collection on disk.
///
/// Concurrent writers race here: last writer wins, no merge or version
/// check. Accepted limitation of the whole-file store.
pub fn save_articles<P: AsRef<Path>>(path: P, articles: &[RawArticle]) -> Result<()> {
    let content =
        serde_json::to_string_pretty(articles).context("Failed to serialize articles")?;

    fs::write(path.as_ref(), content)
        .with_context(|| format!("Failed to write articles file: {:?}", path.as_ref()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_article() -> RawArticle {
        RawArticle {
            id: "a-001".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            encrypted_holder: "Juan Pérez".to_string(),
            amount: 1000.0,
            country: "Argentina".to_string(),
            agent: "Comercial".to_string(),
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");

        save_articles(&path, &[sample_article()]).unwrap();
        let loaded = load_articles(&path).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "a-001");
        assert_eq!(loaded[0].amount, 1000.0);
        assert_eq!(loaded[0].country, "Argentina");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample_article()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("encryptedHolder"));
        assert!(obj.contains_key("timestamp"));
        assert!(!obj.contains_key("encrypted_holder"));
    }

    #[test]
    fn test_missing_store_is_an_error() {
        assert!(load_articles("/nonexistent/articles.json").is_err());
    }

    #[test]
    fn test_malformed_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        fs::write(&path, "not json at all").unwrap();

        assert!(load_articles(&path).is_err());
    }
}
