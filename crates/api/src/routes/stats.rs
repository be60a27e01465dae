//! Admin statistics endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use order_store::OrderStore;
use stats::StatisticsReport;

use crate::error::ApiError;
use crate::routes::orders::AppState;

/// GET /stats — the aggregate statistics report.
///
/// No principal check here: the route is deployed behind the admin frontend
/// and relies on that context (see DESIGN.md).
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<StatisticsReport>, ApiError> {
    let report = state.stats.report().await?;
    Ok(Json(report))
}
