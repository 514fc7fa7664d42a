//! Counter Repository
//!
//! 序号分配的存储侧：整个读-改-写是**单条**原子语句，
//! 存储引擎在内部事务里执行，并发冲突由上层重试。
//! 绝不允许在语句外读取 current 再写回。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Counter;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "counter";

#[derive(Clone)]
pub struct CounterRepository {
    base: BaseRepository,
}

impl CounterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically increment the domain counter and return the new value.
    ///
    /// The first increment on a fresh domain yields 1. The value is
    /// only returned after the increment is durably committed —
    /// a crash mid-statement can skip a value but never hand the same
    /// value to two callers.
    pub async fn increment(&self, domain: &str) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("UPSERT type::thing($tb, $domain) SET current += 1 RETURN AFTER")
            .bind(("tb", TABLE))
            .bind(("domain", domain.to_string()))
            .await?;

        let counters: Vec<Counter> = result.take(0)?;
        counters
            .into_iter()
            .next()
            .map(|c| c.current)
            .ok_or_else(|| RepoError::Database("Counter increment returned no row".to_string()))
    }

    /// Read the current value without allocating (0 for a fresh domain)
    pub async fn current(&self, domain: &str) -> RepoResult<i64> {
        let counter: Option<Counter> = self.base.db().select((TABLE, domain)).await?;
        Ok(counter.map(|c| c.current).unwrap_or(0))
    }

    /// Seed the counter to a specific value.
    ///
    /// 仅用于迁移已有订单簿和测试场景。
    pub async fn seed(&self, domain: &str, value: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPSERT type::thing($tb, $domain) SET current = $value")
            .bind(("tb", TABLE))
            .bind(("domain", domain.to_string()))
            .bind(("value", value))
            .await?;
        Ok(())
    }
}
