mod results;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use crawldex_catalog::ResultStore;
use crawldex_core::CatalogError;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    request_id, require_api_key, spend_request_budget, ApiKeys, RequestBudget, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub store: ResultStore,
    /// Products per page when a browse request does not say.
    pub page_size: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    results_dir: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" => StatusCode::BAD_REQUEST,
            "unreadable_record" => StatusCode::UNPROCESSABLE_ENTITY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps a catalog failure to the error envelope for this request only.
pub(super) fn map_catalog_error(request_id: String, error: &CatalogError) -> ApiError {
    let code = match error {
        CatalogError::NotFound { .. } => "not_found",
        CatalogError::InvalidName { .. } => "bad_request",
        CatalogError::Schema => "unreadable_record",
        CatalogError::Io { .. } | CatalogError::Malformed { .. } => {
            tracing::error!(error = %error, "result record read failed");
            "read_failure"
        }
    };
    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(keys: ApiKeys, budget: RequestBudget) -> Router<AppState> {
    Router::new()
        .route("/api/v1/results", get(results::list_results))
        .route("/api/v1/results/{filename}", get(results::get_result))
        .route(
            "/api/v1/results/{filename}/statistics",
            get(results::get_statistics),
        )
        .route(
            "/api/v1/results/{filename}/products",
            get(results::list_products),
        )
        // Outermost first: only requests with a valid key spend the budget.
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(keys, require_api_key))
                .layer(axum::middleware::from_fn_with_state(
                    budget,
                    spend_request_budget,
                )),
        )
}

pub fn build_app(state: AppState, keys: ApiKeys, budget: RequestBudget) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(keys, budget))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let results_dir = match tokio::fs::metadata(state.store.dir()).await {
        Ok(meta) if meta.is_dir() => "ok",
        _ => {
            tracing::warn!(dir = %state.store.dir().display(), "health check: results directory missing");
            "missing"
        }
    };

    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            results_dir,
        },
        req_id.0,
    ))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
