//! Movement ledger repository (移动台账数据访问)
//! 只追加；除 synced 标志外没有任何更新路径

use crate::{error::AppError, models::movement::*};
use sqlx::{PgExecutor, PgPool, Row};
use uuid::Uuid;

pub struct MovementRepository {
    db: PgPool,
}

impl MovementRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 追加一条移动记录（可随扫描事务执行）
    pub async fn insert<'e, E>(&self, executor: E, m: &NewMovement) -> Result<Movement, AppError>
    where
        E: PgExecutor<'e>,
    {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements (
                movement_type, asset_id, asset_tag,
                from_location, to_location, quantity,
                scan_payload, performed_by, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(m.movement_type)
        .bind(m.asset_id)
        .bind(&m.asset_tag)
        .bind(&m.from_location)
        .bind(&m.to_location)
        .bind(m.quantity)
        .bind(&m.scan_payload)
        .bind(m.performed_by)
        .bind(&m.notes)
        .fetch_one(executor)
        .await?;

        Ok(movement)
    }

    /// 某资产的历史（最近在前）
    pub async fn history_for_asset(
        &self,
        asset_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let movements = sqlx::query_as::<_, Movement>(
            "SELECT * FROM movements WHERE asset_id = $1 ORDER BY occurred_at DESC LIMIT $2",
        )
        .bind(asset_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// 某活动现场的出入记录
    pub async fn history_for_event(
        &self,
        event_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let location = format!("EVENT_{}", event_id);
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT * FROM movements
            WHERE from_location = $1 OR to_location = $1
            ORDER BY occurred_at DESC
            LIMIT $2
            "#,
        )
        .bind(&location)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// 查询台账
    pub async fn list(
        &self,
        filters: &MovementFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let mut query = String::from("SELECT * FROM movements WHERE 1=1");
        let mut index = 0;

        if filters.movement_type.is_some() {
            index += 1;
            query.push_str(&format!(" AND movement_type = ${}", index));
        }
        if filters.asset_id.is_some() {
            index += 1;
            query.push_str(&format!(" AND asset_id = ${}", index));
        }
        if filters.location.is_some() {
            index += 1;
            query.push_str(&format!(
                " AND (from_location = ${} OR to_location = ${})",
                index, index
            ));
        }
        if filters.date_from.is_some() {
            index += 1;
            query.push_str(&format!(" AND occurred_at >= ${}", index));
        }
        if filters.date_to.is_some() {
            index += 1;
            query.push_str(&format!(" AND occurred_at <= ${}", index));
        }
        if filters.synced.is_some() {
            index += 1;
            query.push_str(&format!(" AND synced = ${}", index));
        }

        query.push_str(&format!(
            " ORDER BY occurred_at DESC LIMIT ${} OFFSET ${}",
            index + 1,
            index + 2
        ));

        let mut query_builder = sqlx::query_as::<_, Movement>(&query);

        if let Some(movement_type) = filters.movement_type {
            query_builder = query_builder.bind(movement_type);
        }
        if let Some(asset_id) = filters.asset_id {
            query_builder = query_builder.bind(asset_id);
        }
        if let Some(location) = &filters.location {
            query_builder = query_builder.bind(location);
        }
        if let Some(date_from) = filters.date_from {
            query_builder = query_builder.bind(date_from);
        }
        if let Some(date_to) = filters.date_to {
            query_builder = query_builder.bind(date_to);
        }
        if let Some(synced) = filters.synced {
            query_builder = query_builder.bind(synced);
        }

        let movements = query_builder
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(movements)
    }

    /// 统计台账记录数
    pub async fn count(&self, filters: &MovementFilters) -> Result<i64, AppError> {
        let mut query = String::from("SELECT COUNT(*) FROM movements WHERE 1=1");
        let mut index = 0;

        if filters.movement_type.is_some() {
            index += 1;
            query.push_str(&format!(" AND movement_type = ${}", index));
        }
        if filters.asset_id.is_some() {
            index += 1;
            query.push_str(&format!(" AND asset_id = ${}", index));
        }
        if filters.location.is_some() {
            index += 1;
            query.push_str(&format!(
                " AND (from_location = ${} OR to_location = ${})",
                index, index
            ));
        }
        if filters.date_from.is_some() {
            index += 1;
            query.push_str(&format!(" AND occurred_at >= ${}", index));
        }
        if filters.date_to.is_some() {
            index += 1;
            query.push_str(&format!(" AND occurred_at <= ${}", index));
        }
        if filters.synced.is_some() {
            index += 1;
            query.push_str(&format!(" AND synced = ${}", index));
        }

        let mut query_builder = sqlx::query(&query);

        if let Some(movement_type) = filters.movement_type {
            query_builder = query_builder.bind(movement_type);
        }
        if let Some(asset_id) = filters.asset_id {
            query_builder = query_builder.bind(asset_id);
        }
        if let Some(location) = &filters.location {
            query_builder = query_builder.bind(location);
        }
        if let Some(date_from) = filters.date_from {
            query_builder = query_builder.bind(date_from);
        }
        if let Some(date_to) = filters.date_to {
            query_builder = query_builder.bind(date_to);
        }
        if let Some(synced) = filters.synced {
            query_builder = query_builder.bind(synced);
        }

        let count: i64 = query_builder.fetch_one(&self.db).await?.get(0);
        Ok(count)
    }

    /// 标记已同步（远程同步协作方回写）
    pub async fn mark_synced(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE movements SET synced = TRUE WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
