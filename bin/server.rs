// Article Ledger - Web Server
// REST API with Axum over the valuation pipeline

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use article_ledger::{AppConfig, ArticleStats, ArticlesService, EditableField, ProcessedArticle};

/// Shared application state
#[derive(Clone)]
struct AppState {
    service: Arc<ArticlesService>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
        }
    }

    fn ok_with_count(data: T, count: usize) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: Some(count),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            count: None,
        }
    }
}

/// Update request body
#[derive(Deserialize)]
struct UpdateRequest {
    field: String,
    value: serde_json::Value,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/articles - All served articles
async fn get_articles(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.processed_articles() {
        Ok(articles) => {
            let count = articles.len();
            (
                StatusCode::OK,
                Json(ApiResponse::ok_with_count(articles, count)),
            )
                .into_response()
        }
        Err(e) => {
            eprintln!("Error getting articles: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<ProcessedArticle>>::error(
                    "Could not load articles",
                )),
            )
                .into_response()
        }
    }
}

/// GET /api/articles/stats - Status breakdown
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.article_stats() {
        Ok(stats) => (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response(),
        Err(e) => {
            eprintln!("Error getting stats: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ArticleStats>::error("Could not load stats")),
            )
                .into_response()
        }
    }
}

/// PUT /api/articles/:id - Update one editable field of one article
async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRequest>,
) -> impl IntoResponse {
    // Reject non-editable fields before any mutation
    let field: EditableField = match request.field.parse() {
        Ok(field) => field,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<ProcessedArticle>::error(e.to_string())),
            )
                .into_response();
        }
    };

    match state.service.update_article(&id, field, &request.value) {
        Ok(Some(article)) => (StatusCode::OK, Json(ApiResponse::ok(article))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<ProcessedArticle>::error("Article not found")),
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error updating article {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ProcessedArticle>::error(
                    "Could not update article",
                )),
            )
                .into_response()
        }
    }
}

/// GET / - Service banner with endpoint index
async fn serve_index() -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "message": "Article Ledger API",
        "version": article_ledger::VERSION,
        "endpoints": {
            "articles": "/api/articles",
            "stats": "/api/articles/stats",
            "health": "/api/health"
        }
    }))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Article Ledger - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e:#}");
            std::process::exit(1);
        }
    };

    if !config.articles_path.exists() {
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
    println!("✓ Article store: {:?}", config.articles_path);

    let state = AppState {
        service: Arc::new(service),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/articles", get(get_articles))
        .route("/articles/stats", get(get_stats))
        .route("/articles/:id", put(update_article))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:{}", config.port);
    println!("   Articles: http://localhost:{}/api/articles", config.port);
    println!(
        "   Stats:    http://localhost:{}/api/articles/stats",
        config.port
    );
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
