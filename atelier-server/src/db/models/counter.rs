//! Sequence counter model
//!
//! 每个领域一条记录 (`counter:orders`)，`current` 只在原子
//! 读-改-写语句中变化，永远不在语句外读取后写回。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Counter row matching the `counter` table, keyed by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,

    /// Last allocated value; strictly increasing, never reused
    pub current: i64,
}
