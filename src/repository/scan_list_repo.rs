//! Scan list repository (扫描清单数据访问)

use crate::{
    error::AppError,
    models::event::QuoteLineItem,
    models::scan_list::*,
};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub struct ScanListRepository {
    db: PgPool,
}

impl ScanListRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 插入清单（随生成事务执行）
    pub async fn insert_list<'e, E>(
        &self,
        executor: E,
        event_id: Uuid,
        direction: ScanDirection,
        truck_id: &str,
        total_items: i32,
    ) -> Result<ScanList, AppError>
    where
        E: PgExecutor<'e>,
    {
        let list = sqlx::query_as::<_, ScanList>(
            r#"
            INSERT INTO scan_lists (event_id, direction, truck_id, total_items)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(direction)
        .bind(truck_id)
        .bind(total_items)
        .fetch_one(executor)
        .await?;

        Ok(list)
    }

    /// 插入期望行项目（随生成事务执行）
    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        scan_list_id: Uuid,
        line: &QuoteLineItem,
        position: i32,
    ) -> Result<PreparationListItem, AppError>
    where
        E: PgExecutor<'e>,
    {
        let item = sqlx::query_as::<_, PreparationListItem>(
            r#"
            INSERT INTO preparation_list_items (
                scan_list_id, sku, name, category, position, quantity_required
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(scan_list_id)
        .bind(&line.sku)
        .bind(&line.name)
        .bind(&line.category)
        .bind(position)
        .bind(line.quantity)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    /// 获取清单
    pub async fn get(&self, id: Uuid) -> Result<Option<ScanList>, AppError> {
        let list = sqlx::query_as::<_, ScanList>("SELECT * FROM scan_lists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(list)
    }

    /// 获取清单的行项目（按清单内顺序）
    pub async fn get_items(&self, scan_list_id: Uuid) -> Result<Vec<PreparationListItem>, AppError> {
        let items = sqlx::query_as::<_, PreparationListItem>(
            "SELECT * FROM preparation_list_items WHERE scan_list_id = $1 ORDER BY position",
        )
        .bind(scan_list_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// 列出活动的全部清单（按方向的固定顺序）
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<ScanList>, AppError> {
        let lists = sqlx::query_as::<_, ScanList>(
            "SELECT * FROM scan_lists WHERE event_id = $1 ORDER BY direction",
        )
        .bind(event_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lists)
    }

    /// 更新清单状态
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ScanListStatus,
    ) -> Result<Option<ScanList>, AppError> {
        let list = sqlx::query_as::<_, ScanList>(
            "UPDATE scan_lists SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;

        Ok(list)
    }

    /// 删除清单（级联删除行项目）
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM scan_lists WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
