//! Notification Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::NotificationRow;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "notification";

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append an event to the log
    pub async fn append(&self, row: NotificationRow) -> RepoResult<NotificationRow> {
        let created: Option<NotificationRow> = self.base.db().create(TABLE).content(row).await?;
        created.ok_or_else(|| RepoError::Database("Failed to append notification".to_string()))
    }

    /// Full log, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<NotificationRow>> {
        let rows: Vec<NotificationRow> = self
            .base
            .db()
            .query("SELECT * FROM notification ORDER BY timestamp DESC")
            .await?
            .take(0)?;
        Ok(rows)
    }

    /// Most recent events, newest first.
    ///
    /// 截断只是展示层的便利；订阅流始终推送完整日志。
    pub async fn find_recent(&self, limit: usize) -> RepoResult<Vec<NotificationRow>> {
        let rows: Vec<NotificationRow> = self
            .base
            .db()
            .query("SELECT * FROM notification ORDER BY timestamp DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<NotificationRow>> {
        let record_id = parse_record_id(TABLE, id)?;
        let row: Option<NotificationRow> = self.base.db().select(record_id).await?;
        Ok(row)
    }

    /// Add a viewer to the read set (set semantics: repeated calls
    /// are no-ops, a missing event is a no-op)
    pub async fn mark_read(&self, id: &str, viewer_uid: &str) -> RepoResult<()> {
        let record_id = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $thing SET read_by = array::union(read_by, [$viewer])")
            .bind(("thing", record_id))
            .bind(("viewer", viewer_uid.to_string()))
            .await?;
        Ok(())
    }

    /// Delete an event (no-op when already gone)
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let record_id = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", record_id))
            .await?;
        Ok(())
    }
}
