// 🏷️ Business Rules - status classification and exclusion filter
// Pure functions over an explicit `now` so every rule is deterministic

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::RawArticle;

/// Agent label that participates in the exclusion conjunction (exact match)
const EXCLUDED_AGENT: &str = "XYZ";

/// Country label that participates in the exclusion conjunction (exact match)
const EXCLUDED_COUNTRY: &str = "Chile";

/// Lifecycle status of an article, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleStatus {
    Valid,
    Invalid,
    Pending,
}

/// Classify an article's amount and timestamp against `now`.
///
/// Priority-ordered, first match wins:
/// 1. amount ≤ 0          → Invalid (regardless of timestamp)
/// 2. timestamp after now → Pending
/// 3. otherwise           → Valid
pub fn classify(amount: f64, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> ArticleStatus {
    if amount <= 0.0 {
        return ArticleStatus::Invalid;
    }

    if timestamp > now {
        return ArticleStatus::Pending;
    }

    ArticleStatus::Valid
}

/// Whether an article is dropped from all served views.
///
/// A conjunction of three conditions, all required: strictly past timestamp,
/// agent "XYZ" and country "Chile". Exclusion is removal, not a status;
/// excluded articles only survive in the stats as a separate count.
pub fn should_exclude(article: &RawArticle, now: DateTime<Utc>) -> bool {
    article.timestamp < now
        && article.agent == EXCLUDED_AGENT
        && article.country == EXCLUDED_COUNTRY
}

// ============================================================================
// TESTS
// ============================================================================
