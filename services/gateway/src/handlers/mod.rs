pub mod assets;
pub mod categories;
pub mod portfolio;
pub mod tenants;
