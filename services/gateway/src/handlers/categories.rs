use crate::error::AppError;
use crate::models::CreateCategoryRequest;
use crate::state::{now_nanos, AppState};
use crate::tenant::TenantContext;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use types::category::Category;
use types::ids::CategoryId;

/// The tenant's categories: the seeded profile plus any custom ones.
pub async fn list_categories(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<Vec<Category>>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "category_read", 120, 60.0)?;

    let store = state.store.read().await;
    Ok(Json(store.categories(ctx.tenant_id)?))
}

/// Create a custom category. The risk score is clamped to 1..=10.
pub async fn create_category(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "category_write", 30, 10.0)?;

    let mut store = state.store.write().await;
    let category = store.create_category(
        ctx.tenant_id,
        payload.name,
        payload.base_risk_score,
        now_nanos(),
    )?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Delete a category, detaching any assets that referenced it.
/// Valuation histories are untouched.
pub async fn delete_category(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "category_write", 30, 10.0)?;

    let mut store = state.store.write().await;
    store.delete_category(ctx.tenant_id, category_id, now_nanos())?;
    Ok(StatusCode::NO_CONTENT)
}
