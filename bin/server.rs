// Chinook Insights - Web Server
// Serves the report as JSON and the rendered files under /reports

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chinook_insights::{compute_report, AnalysisReport, AppConfig, ReportLimits};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        })
        .into_response()
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message),
    };
    (status, Json(body)).into_response()
}

#[derive(Deserialize)]
struct TopQuery {
    limit: Option<usize>,
}

/// Recompute the report on a blocking thread; nothing is cached
async fn build_report(config: Arc<AppConfig>, limits: ReportLimits) -> Result<AnalysisReport, Response> {
    let joined = tokio::task::spawn_blocking(move || {
        let source = config.open_source()?;
        compute_report(source.as_ref(), &limits)
    })
    .await;

    match joined {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(e)) => {
            error!("Report failed: {}", e);
            let status = if e.is_fatal() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err(error_response(status, e.to_string()))
        }
        Err(e) => {
            error!("Report task panicked: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "report task failed".to_string(),
            ))
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse {
        success: true,
        data: Some("OK"),
        error: None,
    })
}

/// GET /api/report - Full report
async fn get_report(State(state): State<AppState>) -> Response {
    match build_report(state.config.clone(), state.config.limits).await {
        Ok(report) => ApiResponse::ok(report),
        Err(response) => response,
    }
}

/// GET /api/revenue/monthly - Monthly revenue series plus headline totals
async fn get_monthly_revenue(State(state): State<AppState>) -> Response {
    match build_report(state.config.clone(), state.config.limits).await {
        Ok(report) => ApiResponse::ok(report.revenue),
        Err(response) => response,
    }
}

/// GET /api/customers/top?limit=N - Top customers by revenue
async fn get_top_customers(State(state): State<AppState>, Query(query): Query<TopQuery>) -> Response {
    let mut limits = state.config.limits;
    match query.limit {
        Some(0) => {
            return error_response(StatusCode::BAD_REQUEST, "limit must be at least 1".to_string())
        }
        Some(n) => limits.customers = n,
        None => {}
    }

    match build_report(state.config.clone(), limits).await {
        Ok(report) => ApiResponse::ok(report.top_customers),
        Err(response) => response,
    }
}

/// GET /api/sales-reps - Revenue by support representative
async fn get_sales_reps(State(state): State<AppState>) -> Response {
    match build_report(state.config.clone(), state.config.limits).await {
        Ok(report) => ApiResponse::ok(report.sales_by_rep),
        Err(response) => response,
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .target(env_logger::Target::Stderr)
        .init();

    println!("🌐 Chinook Insights - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✓ Data source: {:?} ({})",
        config.source,
        config.source_location().display()
    );
    println!("✓ Reports directory: {}", config.reports_dir.display());

    let bind = config.server.bind.clone();
    let reports_dir = config.reports_dir.clone();

    // Create shared state
    let state = AppState {
        config: Arc::new(config),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/revenue/monthly", get(get_monthly_revenue))
        .route("/customers/top", get(get_top_customers))
        .route("/sales-reps", get(get_sales_reps))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .nest_service("/reports", ServeDir::new(reports_dir))
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on {}", bind);

    println!("\n🚀 Server running on http://{}", bind);
    println!("   API:     http://{}/api/report", bind);
    println!("   Reports: http://{}/reports/", bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
