//! Sequence Generator
//!
//! 为人类可读订单号铸造严格递增的整数。并发调用者永远不会
//! 拿到同一个值：递增在存储引擎内以原子语句提交，冲突由这里
//! 的有界重试吸收，重试耗尽才以 `AllocationFailed` 暴露给调用方。
//! 崩溃产生的空洞是可接受的；重复永远不是。

use crate::db::repository::CounterRepository;
use crate::orders::store::StoreError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Counter domain for production orders
pub const ORDERS_DOMAIN: &str = "orders";

/// Store-level conflict retries before giving up
const MAX_ATTEMPTS: u32 = 3;

/// Format an allocated sequence as a human-readable order number.
///
/// Zero-padded to 4 digits; wider sequences keep all their digits.
pub fn format_order_number(sequence: i64) -> String {
    format!("CMD-{sequence:04}")
}

/// Race-safe allocator of increasing integers
#[derive(Clone)]
pub struct SequenceGenerator {
    counters: CounterRepository,
}

impl SequenceGenerator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            counters: CounterRepository::new(db),
        }
    }

    /// Allocate the next value for `domain`.
    ///
    /// Contention is retried transparently; callers only ever see
    /// total failure, as `StoreError::AllocationFailed`.
    pub async fn next(&self, domain: &str) -> Result<i64, StoreError> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.counters.increment(domain).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        domain,
                        attempt,
                        error = %e,
                        "Counter increment failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(StoreError::AllocationFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "retries exhausted".to_string()),
        ))
    }
}
