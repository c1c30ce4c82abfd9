use crate::rate_limit::RateLimiter;
use ledger::store::LedgerStore;
use risk_engine::engine::RiskEngine;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    /// The Audit-Logged Valuation Store. Writers take the lock for the
    /// journal-then-apply commit; reads share it.
    pub store: Arc<RwLock<LedgerStore>>,
    pub risk: RiskEngine,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            risk: RiskEngine::new(),
            rate_limiter: Arc::new(RateLimiter::new()),
        }
    }
}

/// Wall-clock time as unix nanoseconds, the ledger's timestamp unit.
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos() as i64
}
