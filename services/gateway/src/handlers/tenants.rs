use crate::error::AppError;
use crate::models::RegisterTenantResponse;
use crate::state::{now_nanos, AppState};
use axum::{extract::State, http::StatusCode, Json};
use types::ids::TenantId;

/// Register a new tenant and seed its default asset-class profile.
///
/// The only route that does not take a `TenantContext`: the tenant id
/// is minted here and returned to the caller.
pub async fn register_tenant(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RegisterTenantResponse>), AppError> {
    let tenant_id = TenantId::new();

    let mut store = state.store.write().await;
    let categories = store.register_tenant(tenant_id, now_nanos())?;

    tracing::info!(%tenant_id, "Tenant registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterTenantResponse {
            tenant_id,
            categories,
        }),
    ))
}
