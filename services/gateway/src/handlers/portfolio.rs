use crate::error::AppError;
use crate::models::{PortfolioAsset, PortfolioResponse};
use crate::state::{now_nanos, AppState};
use crate::tenant::TenantContext;
use axum::{extract::State, Json};
use risk_engine::summary;

/// Portfolio totals plus a per-asset risk line, over active assets only.
/// Archived assets contribute nothing to any aggregate.
pub async fn get_portfolio(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<PortfolioResponse>, AppError> {
    state
        .rate_limiter
        .check(ctx.tenant_id, "portfolio_read", 60, 30.0)?;

    let store = state.store.read().await;
    let assets = store.active_assets(ctx.tenant_id)?;
    let categories = store.categories(ctx.tenant_id)?;

    let totals = summary::summarize(&assets);
    let assessments = summary::assess_portfolio(&state.risk, &assets, &categories, now_nanos());

    let lines = assets
        .iter()
        .zip(&assessments)
        .map(|(asset, risk)| PortfolioAsset {
            asset_id: asset.asset_id,
            name: asset.name.clone(),
            current_value: asset.current_value,
            unrealized_gain: asset.unrealized_gain(),
            score: risk.score,
            band: risk.band,
            factors: risk.factors(),
        })
        .collect();

    Ok(Json(PortfolioResponse {
        summary: totals,
        assets: lines,
    }))
}
