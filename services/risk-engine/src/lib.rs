//! Risk Engine Service
//!
//! Multi-factor risk scoring for illiquid alternative assets.
//!
//! Each active asset is scored from four factors: the inherent risk of
//! its asset class, how stale its valuation is, how concentrated the
//! portfolio is in it, and whether it sits on a heavy unrealized loss.
//! Scores are deterministic: all arithmetic is fixed-point and the
//! current time is always an explicit argument.

pub mod profile;
pub mod staleness;
pub mod concentration;
pub mod drawdown;
pub mod engine;
pub mod summary;
