// Web Server - REST API + dashboard page with Axum
// Handlers only hand out the precomputed dashboard; nothing is recomputed per request

use crate::aggregate::YearlyTotal;
use crate::dashboard::Dashboard;
use crate::figure::Figure;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state (read-only, no locking)
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Dashboard page
async fn serve_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.dashboard.html.clone())
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/figures/map - Animated map figure
async fn get_map_figure(State(state): State<AppState>) -> Json<ApiResponse<Figure>> {
    Json(ApiResponse::ok(state.dashboard.map_figure.clone()))
}

/// GET /api/figures/line - Yearly totals line figure
async fn get_line_figure(State(state): State<AppState>) -> Json<ApiResponse<Figure>> {
    Json(ApiResponse::ok(state.dashboard.line_figure.clone()))
}

/// GET /api/yearly-totals - Totals ascending by year
async fn get_yearly_totals(State(state): State<AppState>) -> Json<ApiResponse<Vec<YearlyTotal>>> {
    Json(ApiResponse::ok(state.dashboard.aggregates.yearly_totals.clone()))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    let state = AppState { dashboard };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/figures/map", get(get_map_figure))
        .route("/figures/line", get(get_line_figure))
        .route("/yearly-totals", get(get_yearly_totals))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_dashboard))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::{Dataset, Record};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<Dashboard>) {
        let dataset = Dataset::from_records(vec![
            Record::new("A", 2000, 100.0, 5.0),
            Record::new("B", 2000, 50.0, -5.0),
            Record::new("A", 2001, 200.0, 10.0),
        ]);
        let dashboard = Arc::new(Dashboard::build(&dataset, &Config::default()).unwrap());
        (router(dashboard.clone()), dashboard)
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_serves_precomputed_page() {
        let (router, dashboard) = app();
        let (status, body) = get_body(router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, dashboard.html);
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app();
        let (status, body) = get_body(router, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_map_figure_route() {
        let (router, _) = app();
        let (status, body) = get_body(router, "/api/figures/map").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["frames"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["data"][0]["zmin"], -10.0);
        assert_eq!(json["data"]["data"][0]["zmax"], 10.0);
    }

    #[tokio::test]
    async fn test_line_figure_route() {
        let (router, _) = app();
        let (_, body) = get_body(router, "/api/figures/line").await;

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["data"][0]["type"], "scatter");
        assert_eq!(json["data"]["data"][0]["x"], serde_json::json!([2000, 2001]));
    }

    #[tokio::test]
    async fn test_yearly_totals_route() {
        let (router, _) = app();
        let (_, body) = get_body(router, "/api/yearly-totals").await;

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json["data"],
            serde_json::json!([
                { "year": 2000, "disbursed": 150.0 },
                { "year": 2001, "disbursed": 200.0 }
            ])
        );
    }

    #[tokio::test]
    async fn test_repeat_requests_are_identical() {
        let (router, _) = app();
        let (_, first) = get_body(router.clone(), "/api/figures/map").await;
        let (_, second) = get_body(router, "/api/figures/map").await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (router, _) = app();
        let (status, _) = get_body(router, "/api/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
