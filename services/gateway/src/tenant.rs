//! Tenant scoping
//!
//! Authentication happens upstream of this service; by the time a
//! request arrives, the `X-Tenant-Id` header names a verified tenant.
//! Every handler that touches tenant data takes the `TenantContext`
//! extractor, so no route can forget the scoping.

use crate::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use types::ids::TenantId;
use uuid::Uuid;

/// Header carrying the caller's tenant id.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// The calling tenant, resolved from the request headers.
#[derive(Debug)]
pub struct TenantContext {
    pub tenant_id: TenantId,
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(TENANT_HEADER).ok_or_else(|| {
            AppError::Unauthorized(format!("Missing {} header", TENANT_HEADER))
        })?;

        let value = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid tenant header encoding".to_string()))?;

        let uuid: Uuid = value
            .parse()
            .map_err(|_| AppError::Unauthorized(format!("Invalid tenant id: {}", value)))?;

        Ok(TenantContext {
            tenant_id: TenantId::from_uuid(uuid),
        })
    }
}
