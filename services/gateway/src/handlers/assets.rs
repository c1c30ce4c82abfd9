use crate::error::AppError;
use crate::models::{
    ArchiveAssetRequest, AssetView, CreateAssetRequest, HistoryEntry, UpdateAssetRequest,
};
use crate::state::{now_nanos, AppState};
use crate::tenant::TenantContext;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ledger::store::{NewAsset, UpdateAsset};
use risk_engine::summary;
use types::asset::Asset;
use types::ids::AssetId;

/// List the tenant's active assets with their risk assessments.
pub async fn list_assets(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<Vec<AssetView>>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_read", 120, 60.0)?;

    let store = state.store.read().await;
    let assets = store.active_assets(ctx.tenant_id)?;
    let categories = store.categories(ctx.tenant_id)?;

    let assessments = summary::assess_portfolio(&state.risk, &assets, &categories, now_nanos());
    let views = assets
        .into_iter()
        .zip(assessments)
        .map(|(asset, risk)| AssetView { asset, risk })
        .collect();
    Ok(Json(views))
}

/// Create an asset. The store appends its genesis valuation event.
pub async fn create_asset(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<Asset>), AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_write", 30, 10.0)?;

    let mut store = state.store.write().await;
    let asset = store.create_asset(
        ctx.tenant_id,
        NewAsset {
            name: payload.name,
            category_id: payload.category_id,
            purchase_price: payload.purchase_price,
            purchase_date: payload.purchase_date,
        },
        now_nanos(),
    )?;

    tracing::info!(tenant_id = %ctx.tenant_id, asset_id = %asset.asset_id, "Asset created");
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Edit an asset's metadata and/or revalue it. A changed value appends
/// an audit event; a pure metadata edit does not.
pub async fn update_asset(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(asset_id): Path<AssetId>,
    Json(payload): Json<UpdateAssetRequest>,
) -> Result<Json<Asset>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_write", 30, 10.0)?;

    let mut store = state.store.write().await;
    let asset = store.update_asset(
        ctx.tenant_id,
        asset_id,
        UpdateAsset {
            name: payload.name,
            category_id: payload.category_id,
            current_value: payload.current_value,
            note: payload.note,
        },
        now_nanos(),
    )?;
    Ok(Json(asset))
}

/// Archive an asset (soft delete). It disappears from active views;
/// its audit trail stays.
pub async fn archive_asset(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(asset_id): Path<AssetId>,
    payload: Option<Json<ArchiveAssetRequest>>,
) -> Result<Json<Asset>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_write", 30, 10.0)?;

    let reason = payload.and_then(|Json(p)| p.reason);

    let mut store = state.store.write().await;
    let asset = store.archive_asset(ctx.tenant_id, asset_id, reason, now_nanos())?;

    tracing::info!(tenant_id = %ctx.tenant_id, asset_id = %asset_id, "Asset archived");
    Ok(Json(asset))
}

/// Restore an archived asset into active views.
pub async fn restore_asset(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(asset_id): Path<AssetId>,
) -> Result<Json<Asset>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_write", 30, 10.0)?;

    let mut store = state.store.write().await;
    let asset = store.restore_asset(ctx.tenant_id, asset_id, now_nanos())?;

    tracing::info!(tenant_id = %ctx.tenant_id, asset_id = %asset_id, "Asset restored");
    Ok(Json(asset))
}

/// The asset's full audit trail, newest first.
pub async fn asset_history(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(asset_id): Path<AssetId>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_read", 120, 60.0)?;

    let store = state.store.read().await;
    let history = store.asset_history(ctx.tenant_id, asset_id)?;
    Ok(Json(history.into_iter().map(HistoryEntry::from).collect()))
}

/// Archived assets, the soft-delete view.
pub async fn archived_assets(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<Vec<Asset>>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "asset_read", 120, 60.0)?;

    let store = state.store.read().await;
    Ok(Json(store.archived_assets(ctx.tenant_id)?))
}
