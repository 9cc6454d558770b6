use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use crawldex_core::{CatalogError, ListingEntry, ProductPage, ProductQuery, Statistics};

use crate::middleware::RequestId;

use super::{map_catalog_error, ApiError, ApiResponse, AppState};

/// Runs a blocking catalog call off the async runtime.
async fn run_catalog<T, F>(request_id: &str, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CatalogError> + Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(map_catalog_error(request_id.to_owned(), &error)),
        Err(join_error) => {
            tracing::error!(error = %join_error, "catalog task failed");
            Err(ApiError::new(
                request_id,
                "internal_error",
                "catalog task failed",
            ))
        }
    }
}

pub(super) async fn list_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ListingEntry>>>, ApiError> {
    let store = state.store.clone();
    let entries = run_catalog(&req_id.0, move || store.list()).await?;
    Ok(Json(ApiResponse::new(entries, req_id.0)))
}

pub(super) async fn get_result(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let store = state.store.clone();
    let record = run_catalog(&req_id.0, move || store.detail(&filename)).await?;
    Ok(Json(ApiResponse::new(record, req_id.0)))
}

pub(super) async fn get_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<Statistics>>, ApiError> {
    let store = state.store.clone();
    let stats = run_catalog(&req_id.0, move || store.statistics(&filename)).await?;
    Ok(Json(ApiResponse::new(stats, req_id.0)))
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(filename): Path<String>,
    Query(mut query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<ProductPage>>, ApiError> {
    query.per_page = query.per_page.or(Some(state.page_size));
    let store = state.store.clone();
    let page = run_catalog(&req_id.0, move || store.products(&filename, &query)).await?;
    Ok(Json(ApiResponse::new(page, req_id.0)))
}
