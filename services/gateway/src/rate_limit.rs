//! Per-tenant request throttling
//!
//! Token buckets keyed by tenant + action, so one tenant hammering the
//! write path cannot starve another tenant's reads.

use crate::error::AppError;
use dashmap::DashMap;
use std::time::Instant;
use types::ids::TenantId;

#[derive(Clone)]
struct Bucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl Bucket {
    fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate,
            last_update: Instant::now(),
        }
    }

    fn allow_request(&mut self, tokens: u32) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = f64::min(
            self.capacity as f64,
            self.tokens + elapsed * self.refill_rate,
        );
        self.last_update = now;

        // Consume token
        if self.tokens >= tokens as f64 {
            self.tokens -= tokens as f64;
            true
        } else {
            false // Rate limited
        }
    }
}

pub struct RateLimiter {
    buckets: DashMap<(TenantId, &'static str), Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Take one token from the tenant's bucket for `action`.
    ///
    /// The bucket is created on first use with the given capacity and
    /// refill rate (tokens per second).
    pub fn check(
        &self,
        tenant_id: TenantId,
        action: &'static str,
        capacity: u32,
        refill_rate: f64,
    ) -> Result<(), AppError> {
        let mut bucket = self
            .buckets
            .entry((tenant_id, action))
            .or_insert_with(|| Bucket::new(capacity, refill_rate));

        if bucket.allow_request(1) {
            Ok(())
        } else {
            Err(AppError::RateLimitExceeded(format!(
                "{} for tenant {}",
                action, tenant_id
            )))
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
