//! Event repository (活动与报价数据访问)

use crate::{error::AppError, models::event::*};
use sqlx::PgPool;
use uuid::Uuid;

pub struct EventRepository {
    db: PgPool,
}

impl EventRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建活动
    pub async fn create(&self, req: &CreateEventRequest) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, client_name, client_contact, start_date, end_date, truck_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.client_name)
        .bind(&req.client_contact)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(&req.truck_id)
        .fetch_one(&self.db)
        .await?;

        Ok(event)
    }

    /// 获取活动
    pub async fn get(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(event)
    }

    /// 列出活动（按开始时间倒序）
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events ORDER BY start_date DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(events)
    }

    /// 指派卡车
    pub async fn assign_truck(&self, id: Uuid, truck_id: &str) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET truck_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(truck_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(event)
    }

    /// 定稿报价；只允许从 draft 转入
    pub async fn finalize_quote(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET quote_status = 'finalized', updated_at = NOW()
            WHERE id = $1 AND quote_status = 'draft'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(event)
    }

    /// 添加报价行
    pub async fn add_quote_line(
        &self,
        event_id: Uuid,
        req: &CreateQuoteLineRequest,
    ) -> Result<QuoteLineItem, AppError> {
        let line = sqlx::query_as::<_, QuoteLineItem>(
            r#"
            INSERT INTO quote_line_items (event_id, sku, name, category, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(&req.sku)
        .bind(&req.name)
        .bind(&req.category)
        .bind(req.quantity)
        .fetch_one(&self.db)
        .await?;

        Ok(line)
    }

    /// 列出活动的报价行
    pub async fn list_quote_lines(&self, event_id: Uuid) -> Result<Vec<QuoteLineItem>, AppError> {
        let lines = sqlx::query_as::<_, QuoteLineItem>(
            "SELECT * FROM quote_line_items WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lines)
    }
}
