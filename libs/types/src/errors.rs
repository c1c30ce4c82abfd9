//! Error types for the asset ledger
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Top-level ledger error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    #[error("Tenant error: {0}")]
    Tenant(#[from] TenantError),

    #[error("System error: {message}")]
    System { message: String },
}

/// Asset-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Asset not found: {asset_id}")]
    NotFound { asset_id: String },

    #[error("Asset already archived: {asset_id}")]
    AlreadyArchived { asset_id: String },

    #[error("Asset is not archived: {asset_id}")]
    NotArchived { asset_id: String },

    #[error("Invalid asset name: {0}")]
    InvalidName(String),
}

/// Category-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CategoryError {
    #[error("Category not found: {category_id}")]
    NotFound { category_id: String },

    #[error("Invalid category name: {0}")]
    InvalidName(String),
}

/// Tenant-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TenantError {
    #[error("Tenant not registered: {tenant_id}")]
    NotRegistered { tenant_id: String },

    #[error("Tenant already registered: {tenant_id}")]
    AlreadyRegistered { tenant_id: String },
}
