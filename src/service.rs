// 📊 Valuation Pipeline - raw article → served article
// Orchestrates exclusion, decryption, classification and currency conversion

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::crypto::EncryptionService;
use crate::rates::ExchangeRates;
use crate::rules::{classify, should_exclude, ArticleStatus};
use crate::store::{load_articles, save_articles, RawArticle};

/// Article as served over the API: holder name decrypted, amount converted,
/// status attached. Derived fresh on every read, never persisted, and never
/// carries the encrypted holder field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedArticle {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub holder_name: String,
    pub amount: f64,
    pub country: String,
    pub agent: String,
    pub amount_converted: f64,
    pub status: ArticleStatus,
}

/// Status breakdown over the classified set, plus the excluded count.
/// `total` covers only non-excluded articles: total = valid + invalid + pending.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArticleStats {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub pending: usize,
    pub excluded: usize,
}

/// Fields a caller may edit through the update operation. External names
/// (`holderName`, `amount`) map onto the stored encrypted holder and amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    HolderName,
    Amount,
}

impl FromStr for EditableField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "holderName" => Ok(EditableField::HolderName),
            "amount" => Ok(EditableField::Amount),
            other => Err(anyhow!(
                "Field '{other}' is not editable; only holderName and amount are"
            )),
        }
    }
}

/// The valuation pipeline over a JSON-file article store.
///
/// Holds no mutable state: the exchange-rate table is loaded once at
/// construction and the store is re-read per operation.
pub struct ArticlesService {
    articles_path: PathBuf,
    cipher: EncryptionService,
    rates: ExchangeRates,
}

impl ArticlesService {
    /// Wire the pipeline from configuration: cipher from the secret, rates
    /// from the rates file (falling back to the built-in table).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        articles_path: P,
        rates_path: Q,
        secret: &str,
    ) -> Self {
        Self::with_parts(
            articles_path,
            EncryptionService::new(secret),
            ExchangeRates::load_or_default(rates_path),
        )
    }

    /// Wire the pipeline from explicitly constructed collaborators.
    pub fn with_parts<P: AsRef<Path>>(
        articles_path: P,
        cipher: EncryptionService,
        rates: ExchangeRates,
    ) -> Self {
        ArticlesService {
            articles_path: articles_path.as_ref().to_path_buf(),
            cipher,
            rates,
        }
    }

    /// Run the full pipeline on one raw article.
    fn process(&self, article: &RawArticle, now: DateTime<Utc>) -> ProcessedArticle {
        ProcessedArticle {
            id: article.id.clone(),
            timestamp: article.timestamp,
            holder_name: self.cipher.decrypt(&article.encrypted_holder),
            amount: article.amount,
            country: article.country.clone(),
            agent: article.agent.clone(),
            amount_converted: self.rates.convert(&article.country, article.amount),
            status: classify(article.amount, article.timestamp, now),
        }
    }

    /// All served articles: load, drop excluded, process each survivor.
    /// Output keeps the store's natural order.
    pub fn processed_articles(&self) -> Result<Vec<ProcessedArticle>> {
        let now = Utc::now();
        let raw = load_articles(&self.articles_path)?;

        Ok(raw
            .iter()
            .filter(|article| !should_exclude(article, now))
            .map(|article| self.process(article, now))
            .collect())
    }

    /// Update one editable field of one article and persist the collection.
    ///
    /// Holder names are re-encrypted before storing; plaintext never reaches
    /// the store. Amounts are coerced from whatever JSON value the caller
    /// sent, with non-numeric input becoming 0. Returns `Ok(None)` when the
    /// id is unknown, without touching the store.
    pub fn update_article(
        &self,
        id: &str,
        field: EditableField,
        value: &Value,
    ) -> Result<Option<ProcessedArticle>> {
        let mut articles = load_articles(&self.articles_path)?;

        let Some(article) = articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        match field {
            EditableField::HolderName => {
                article.encrypted_holder = self.cipher.encrypt(&coerce_text(value));
            }
            EditableField::Amount => {
                article.amount = coerce_amount(value);
            }
        }

        let updated = article.clone();
        save_articles(&self.articles_path, &articles)?;

        // Re-run the full valuation for the touched article rather than
        // patching a previously served shape
        Ok(Some(self.process(&updated, Utc::now())))
    }

    /// Status counts over the classified set, excluded counted separately.
    pub fn article_stats(&self) -> Result<ArticleStats> {
        let now = Utc::now();
        let raw = load_articles(&self.articles_path)?;
        let excluded = raw
            .iter()
            .filter(|article| should_exclude(article, now))
            .count();

        let processed = self.processed_articles()?;

        let mut stats = ArticleStats {
            total: processed.len(),
            valid: 0,
            invalid: 0,
            pending: 0,
            excluded,
        };

        for article in &processed {
            match article.status {
                ArticleStatus::Valid => stats.valid += 1,
                ArticleStatus::Invalid => stats.invalid += 1,
                ArticleStatus::Pending => stats.pending += 1,
            }
        }

        Ok(stats)
    }
}

/// Caller-supplied replacement holder name as text.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Caller-supplied replacement amount. Non-numeric input coerces to 0
/// (documented permissive policy).
fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const TEST_SECRET: &str = "clave_de_pruebas";

    fn test_rates() -> ExchangeRates {
        ExchangeRates::from_rates(HashMap::from([
            ("Chile".to_string(), 0.0012),
            ("Argentina".to_string(), 0.0028),
            ("Estados Unidos".to_string(), 1.0),
        ]))
    }

    fn article(id: &str, timestamp: DateTime<Utc>, holder: &str) -> RawArticle {
        RawArticle {
            id: id.to_string(),
            timestamp,
            encrypted_holder: holder.to_string(),
            amount: 1000.0,
            country: "Argentina".to_string(),
            agent: "Comercial".to_string(),
        }
    }

    /// Write the given articles to a temp store and wire a service over it.
    fn service_with(articles: &[RawArticle]) -> (TempDir, ArticlesService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        save_articles(&path, articles).unwrap();

        let service =
            ArticlesService::with_parts(&path, EncryptionService::new(TEST_SECRET), test_rates());
        (dir, service)
    }

    #[test]
    fn test_list_decrypts_and_valuates() {
        let cipher = EncryptionService::new(TEST_SECRET);
        let past = Utc::now() - Duration::days(100);

        let mut raw = article("a1", past, "");
        raw.encrypted_holder = cipher.encrypt("Jane");
        raw.country = "Chile".to_string();

        let (_dir, service) = service_with(&[raw]);
        let served = service.processed_articles().unwrap();

        assert_eq!(served.len(), 1);
        assert_eq!(served[0].id, "a1");
        assert_eq!(served[0].holder_name, "Jane");
        assert_eq!(served[0].amount, 1000.0);
        assert_eq!(served[0].amount_converted, 1.2);
        assert_eq!(served[0].status, ArticleStatus::Valid);
    }

    #[test]
    fn test_list_passes_legacy_plaintext_holders_through() {
        let past = Utc::now() - Duration::days(10);
        let (_dir, service) = service_with(&[article("a1", past, "Juan Pérez")]);

        let served = service.processed_articles().unwrap();
        assert_eq!(served[0].holder_name, "Juan Pérez");
    }

    #[test]
    fn test_list_drops_only_fully_matching_exclusions() {
        let past = Utc::now() - Duration::days(200);
        let future = Utc::now() + Duration::days(20);

        let mut excluded = article("drop", past, "x");
        excluded.country = "Chile".to_string();
        excluded.agent = "XYZ".to_string();

        let mut wrong_country = article("keep-1", past, "x");
        wrong_country.agent = "XYZ".to_string();

        let mut wrong_agent = article("keep-2", past, "x");
        wrong_agent.country = "Chile".to_string();

        let mut future_date = article("keep-3", future, "x");
        future_date.country = "Chile".to_string();
        future_date.agent = "XYZ".to_string();

        let (_dir, service) =
            service_with(&[excluded, wrong_country, wrong_agent, future_date]);

        let served = service.processed_articles().unwrap();
        let ids: Vec<&str> = served.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["keep-1", "keep-2", "keep-3"]);
    }

    #[test]
    fn test_list_preserves_store_order() {
        let past = Utc::now() - Duration::days(5);
        let (_dir, service) = service_with(&[
            article("c", past, "x"),
            article("a", past, "x"),
            article("b", past, "x"),
        ]);

        let ids: Vec<String> = service
            .processed_articles()
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_served_articles_never_expose_encrypted_holder() {
        let past = Utc::now() - Duration::days(5);
        let (_dir, service) = service_with(&[article("a1", past, "Juan Pérez")]);

        let served = service.processed_articles().unwrap();
        let json = serde_json::to_value(&served[0]).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("holderName"));
        assert!(obj.contains_key("amountConverted"));
        assert!(obj.contains_key("status"));
        assert!(!obj.contains_key("encryptedHolder"));
        assert!(!obj.contains_key("encrypted_holder"));
    }

    #[test]
    fn test_stats_partition_and_excluded_count() {
        let past = Utc::now() - Duration::days(50);
        let future = Utc::now() + Duration::days(5);

        let valid = article("v1", past, "x");
        let pending = article("p1", future, "x");
        let mut invalid = article("i1", past, "x");
        invalid.amount = -10.0;
        let mut excluded = article("e1", past, "x");
        excluded.country = "Chile".to_string();
        excluded.agent = "XYZ".to_string();

        let (_dir, service) = service_with(&[valid, pending, invalid, excluded]);
        let stats = service.article_stats().unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.total, stats.valid + stats.invalid + stats.pending);
    }

    #[test]
    fn test_update_amount_persists_and_reclassifies() {
        let past = Utc::now() - Duration::days(30);
        let (_dir, service) = service_with(&[article("a1", past, "x")]);

        // Previously Valid; dropping the amount below zero flips it
        let updated = service
            .update_article("a1", EditableField::Amount, &json!(-5))
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, -5.0);
        assert_eq!(updated.status, ArticleStatus::Invalid);

        // The change survived the write: a fresh list sees it too
        let served = service.processed_articles().unwrap();
        assert_eq!(served[0].amount, -5.0);
        assert_eq!(served[0].status, ArticleStatus::Invalid);
    }

    #[test]
    fn test_update_holder_re_encrypts_before_storing() {
        let past = Utc::now() - Duration::days(30);
        let (dir, service) = service_with(&[article("a1", past, "x")]);

        let updated = service
            .update_article("a1", EditableField::HolderName, &json!("Ana Martínez"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.holder_name, "Ana Martínez");

        // The store never sees the plaintext
        let raw = load_articles(dir.path().join("articles.json")).unwrap();
        assert_ne!(raw[0].encrypted_holder, "Ana Martínez");
        assert_eq!(raw[0].encrypted_holder.split(':').count(), 2);

        let cipher = EncryptionService::new(TEST_SECRET);
        assert_eq!(cipher.decrypt(&raw[0].encrypted_holder), "Ana Martínez");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let past = Utc::now() - Duration::days(30);
        let (dir, service) = service_with(&[article("a1", past, "x")]);

        let result = service
            .update_article("missing", EditableField::Amount, &json!(7))
            .unwrap();
        assert!(result.is_none());

        // No mutation happened
        let raw = load_articles(dir.path().join("articles.json")).unwrap();
        assert_eq!(raw[0].amount, 1000.0);
    }

    #[test]
    fn test_update_coerces_non_numeric_amount_to_zero() {
        let past = Utc::now() - Duration::days(30);
        let (_dir, service) = service_with(&[article("a1", past, "x")]);

        let updated = service
            .update_article("a1", EditableField::Amount, &json!("not a number"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, 0.0);
        assert_eq!(updated.status, ArticleStatus::Invalid);
    }

    #[test]
    fn test_update_accepts_numeric_strings() {
        let past = Utc::now() - Duration::days(30);
        let (_dir, service) = service_with(&[article("a1", past, "x")]);

        let updated = service
            .update_article("a1", EditableField::Amount, &json!("250.5"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, 250.5);
        assert_eq!(updated.status, ArticleStatus::Valid);
    }

    #[test]
    fn test_editable_field_parsing() {
        assert_eq!(
            "holderName".parse::<EditableField>().unwrap(),
            EditableField::HolderName
        );
        assert_eq!(
            "amount".parse::<EditableField>().unwrap(),
            EditableField::Amount
        );
        assert!("country".parse::<EditableField>().is_err());
        assert!("encryptedHolder".parse::<EditableField>().is_err());
    }

    #[test]
    fn test_missing_store_propagates_error() {
        let service = ArticlesService::with_parts(
            "/nonexistent/articles.json",
            EncryptionService::new(TEST_SECRET),
            test_rates(),
        );

        assert!(service.processed_articles().is_err());
        assert!(service.article_stats().is_err());
        assert!(service
            .update_article("a1", EditableField::Amount, &json!(1))
            .is_err());
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Raw: Chile + Comercial agent, past date, amount 1000, holder "Jane"
        let cipher = EncryptionService::new(TEST_SECRET);
        let past = "2023-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let raw = RawArticle {
            id: "a1".to_string(),
            timestamp: past,
            encrypted_holder: cipher.encrypt("Jane"),
            amount: 1000.0,
            country: "Chile".to_string(),
            agent: "Comercial".to_string(),
        };

        let (_dir, service) = service_with(&[raw]);
        let served = service.processed_articles().unwrap();

        // Agent mismatch keeps it out of the exclusion, so it is served
        assert_eq!(served.len(), 1);
        let a = &served[0];
        assert_eq!(a.id, "a1");
        assert_eq!(a.holder_name, "Jane");
        assert_eq!(a.amount, 1000.0);
        assert_eq!(a.amount_converted, 1.2);
        assert_eq!(a.status, ArticleStatus::Valid);
    }
}
