// Article Ledger - Core Library
// Record classification and valuation pipeline over a JSON-file article store

pub mod config;
pub mod crypto;
pub mod rates;
pub mod rules;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use crypto::{EncryptionService, UNDECRYPTABLE_HOLDER};
pub use rates::ExchangeRates;
pub use rules::{classify, should_exclude, ArticleStatus};
pub use service::{ArticleStats, ArticlesService, EditableField, ProcessedArticle};
pub use store::{load_articles, save_articles, RawArticle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
