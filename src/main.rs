// Article Ledger - CLI
// Mock-data generation and a quick stats view over the pipeline

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::env;
use std::path::Path;
use uuid::Uuid;

use article_ledger::{save_articles, AppConfig, ArticlesService, EncryptionService, RawArticle};

const COUNTRIES: &[&str] = &[
    "Argentina",
    "Brasil",
    "Chile",
    "Colombia",
    "México",
    "Perú",
    "Uruguay",
    "Ecuador",
    "Bolivia",
    "Paraguay",
    "Venezuela",
    "España",
    "Estados Unidos",
    "Francia",
    "Alemania",
    "Italia",
    "Reino Unido",
    "Canadá",
    "Australia",
];

const AGENTS: &[&str] = &[
    "Comercial",
    "Técnico",
    "Administrativo",
    "Gerencial",
    "Financiero",
    "Marketing",
    "Ventas",
    "Soporte",
    "Desarrollo",
    "Consultoría",
    "XYZ",
];

const NAMES: &[&str] = &[
    "Juan Pérez",
    "María García",
    "Carlos López",
    "Ana Martínez",
    "Luis Rodríguez",
    "Carmen Sánchez",
    "José González",
    "Laura Fernández",
    "Miguel Torres",
    "Elena Ramírez",
    "Santiago Díaz",
    "Valentina Rojas",
    "Camila Moreno",
    "Sofía Castillo",
    "Gabriela Soto",
];

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("generate") => {
            let count = match args.get(2) {
                Some(raw) => raw
                    .parse::<usize>()
                    .with_context(|| format!("Invalid article count: '{raw}'"))?,
                None => 10_000,
            };
            run_generate(count)
        }
        Some("stats") => run_stats(),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("📋 Article Ledger v{}", article_ledger::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  article-ledger generate [count]   Seed the article store with mock data");
    println!("  article-ledger stats              Print the status breakdown");
    println!();
    println!("API server: cargo run --bin article-server --features server");
}

/// Seed the article store with encrypted mock data, including cases for
/// every pipeline branch: exclusion candidates, non-positive amounts and
/// future-dated articles.
fn run_generate(count: usize) -> Result<()> {
    println!("🛠️  Generating mock articles");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::from_env()?;
    let cipher = EncryptionService::new(&config.encryption_key);
    let articles = generate_articles(&cipher, count);

    if let Some(parent) = config.articles_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {parent:?}"))?;
        }
    }

    save_articles(&config.articles_path, &articles)?;
    println!(
        "✓ Wrote {} articles to {:?}",
        articles.len(),
        config.articles_path
    );

    // Seed distribution summary
    let now = Utc::now();
    let xyz = articles.iter().filter(|a| a.agent == "XYZ").count();
    let chile = articles.iter().filter(|a| a.country == "Chile").count();
    let non_positive = articles.iter().filter(|a| a.amount <= 0.0).count();
    let future = articles.iter().filter(|a| a.timestamp > now).count();

    println!("\n📊 Seed distribution:");
    println!("   - Total: {}", articles.len());
    println!("   - Agent XYZ: {xyz}");
    println!("   - Country Chile: {chile}");
    println!("   - Non-positive amounts: {non_positive}");
    println!("   - Future dates: {future}");

    Ok(())
}

fn generate_articles(cipher: &EncryptionService, count: usize) -> Vec<RawArticle> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (0..count)
        .map(|_| {
            let mut country = COUNTRIES[rng.gen_range(0..COUNTRIES.len())].to_string();
            let mut agent = AGENTS[rng.gen_range(0..AGENTS.len())].to_string();
            let name = NAMES[rng.gen_range(0..NAMES.len())];

            // Mostly dates from the last two years, some in the next month
            let mut timestamp = random_timestamp(&mut rng, now);

            // ~5% full exclusion candidates: past + XYZ + Chile
            if rng.gen_bool(0.05) {
                country = "Chile".to_string();
                agent = "XYZ".to_string();
                timestamp = now - Duration::seconds(rng.gen_range(1..365 * 24 * 3600));
            }

            // ~5% non-positive amounts to exercise the Invalid branch
            let mut amount = (rng.gen_range(100.0..10_100.0_f64) * 100.0).round() / 100.0;
            if rng.gen_bool(0.05) {
                amount = if rng.gen_bool(0.5) { -amount } else { 0.0 };
            }

            RawArticle {
                id: Uuid::new_v4().to_string(),
                timestamp,
                encrypted_holder: cipher.encrypt(name),
                amount,
                country,
                agent,
            }
        })
        .collect()
}

fn random_timestamp<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    if rng.gen_bool(0.1) {
        // Next 30 days → Pending at read time
        now + Duration::seconds(rng.gen_range(1..30 * 24 * 3600))
    } else {
        // Last two years
        now - Duration::seconds(rng.gen_range(0..2 * 365 * 24 * 3600))
    }
}

/// Run the pipeline once and print the status breakdown.
fn run_stats() -> Result<()> {
    let config = AppConfig::from_env()?;

    if !Path::new(&config.articles_path).exists() {
        eprintln!("❌ Article store not found at {:?}", config.articles_path);
        eprintln!("   Run: cargo run generate");
        eprintln!("   to seed it first.");
        std::process::exit(1);
    }

    let service = ArticlesService::new(
        &config.articles_path,
        &config.rates_path,
        &config.encryption_key,
    );
    let stats = service.article_stats()?;

    println!("📈 Article stats");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   - Total:    {}", stats.total);
    println!("   - Valid:    {}", stats.valid);
    println!("   - Invalid:  {}", stats.invalid);
    println!("   - Pending:  {}", stats.pending);
    println!("   - Excluded: {}", stats.excluded);

    Ok(())
}
