//! 活动与报价服务
//! 报价定稿后行项目锁定，扫描清单才可生成

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::event::*;
use crate::repository::EventRepository;

pub struct EventService {
    db: PgPool,
}

impl EventService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建活动
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_event(&self, req: CreateEventRequest) -> Result<Event, AppError> {
        req.validate()?;

        if req.end_date < req.start_date {
            return Err(AppError::validation("end_date must not precede start_date"));
        }

        let event = EventRepository::new(self.db.clone()).create(&req).await?;
        info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    /// 获取活动
    pub async fn get_event(&self, event_id: Uuid) -> Result<Event, AppError> {
        EventRepository::new(self.db.clone())
            .get(event_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("event {}", event_id)))
    }

    /// 添加报价行；定稿后的报价不可再修改
    #[instrument(skip(self, req), fields(event_id = %event_id, sku = %req.sku))]
    pub async fn add_quote_line(
        &self,
        event_id: Uuid,
        req: CreateQuoteLineRequest,
    ) -> Result<QuoteLineItem, AppError> {
        req.validate()?;

        let repo = EventRepository::new(self.db.clone());
        let event = repo
            .get(event_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("event {}", event_id)))?;

        if event.quote_status != QuoteStatus::Draft {
            return Err(AppError::conflict("quote is no longer editable"));
        }

        repo.add_quote_line(event_id, &req).await
    }

    /// 列出报价行
    pub async fn list_quote_lines(&self, event_id: Uuid) -> Result<Vec<QuoteLineItem>, AppError> {
        EventRepository::new(self.db.clone())
            .list_quote_lines(event_id)
            .await
    }

    /// 定稿报价；空报价不可定稿
    #[instrument(skip(self))]
    pub async fn finalize_quote(&self, event_id: Uuid) -> Result<Event, AppError> {
        let repo = EventRepository::new(self.db.clone());
        repo.get(event_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("event {}", event_id)))?;

        let lines = repo.list_quote_lines(event_id).await?;
        if lines.is_empty() {
            return Err(AppError::validation("cannot finalize a quote with no line items"));
        }

        let event = repo
            .finalize_quote(event_id)
            .await?
            .ok_or_else(|| AppError::conflict("only draft quotes can be finalized"))?;

        info!(event_id = %event_id, lines = lines.len(), "Quote finalized");
        Ok(event)
    }

    /// 指派卡车
    #[instrument(skip(self))]
    pub async fn assign_truck(&self, event_id: Uuid, truck_id: &str) -> Result<Event, AppError> {
        if truck_id.trim().is_empty() {
            return Err(AppError::validation("truck_id must not be empty"));
        }

        EventRepository::new(self.db.clone())
            .assign_truck(event_id, truck_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("event {}", event_id)))
    }
}
