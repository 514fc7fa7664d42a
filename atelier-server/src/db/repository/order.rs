//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{OrderEditPatch, OrderRow, OrderTransitionPatch};
use shared::order::OrderFilter;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all orders matching the filter, newest update first.
    ///
    /// `order_number` 作为稳定的并列破除键：同一毫秒更新的订单
    /// 在每次查询中保持同一顺序。
    pub async fn find_all(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderRow>> {
        let mut sql = String::from("SELECT * FROM order");

        let mut clauses: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        if filter.created_by.is_some() {
            clauses.push("created_by = $created_by");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY updated_at DESC, order_number DESC");

        let mut query = self.base.db().query(sql);
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }
        if let Some(ref created_by) = filter.created_by {
            query = query.bind(("created_by", created_by.clone()));
        }

        let rows: Vec<OrderRow> = query.await?.take(0)?;
        Ok(rows)
    }

    /// Find order by id ("order:xxxx" or bare key)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<OrderRow>> {
        let record_id = parse_record_id(TABLE, id)?;
        let row: Option<OrderRow> = self.base.db().select(record_id).await?;
        Ok(row)
    }

    /// Persist a new order row
    pub async fn create(&self, row: OrderRow) -> RepoResult<OrderRow> {
        let created: Option<OrderRow> = self.base.db().create(TABLE).content(row).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Apply a status transition patch and return the updated row
    pub async fn apply_transition(
        &self,
        id: &str,
        patch: OrderTransitionPatch,
    ) -> RepoResult<OrderRow> {
        let record_id = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", record_id))
            .bind(("data", patch))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }

    /// Apply a full-field edit patch and return the updated row
    pub async fn apply_edit(&self, id: &str, patch: OrderEditPatch) -> RepoResult<OrderRow> {
        let record_id = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", record_id))
            .bind(("data", patch))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }

    /// Hard delete an order
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record_id = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", record_id))
            .await?;
        Ok(true)
    }
}
