//! Event domain models
//! 活动、客户报价与报价行

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 报价状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quote_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// 草稿（行项目仍可编辑）
    Draft,
    /// 已定稿（可生成扫描清单）
    Finalized,
    /// 已取消
    Cancelled,
}

/// 活动
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub client_name: String,
    pub client_contact: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// 指派的卡车编号（生成扫描清单前必须指派）
    pub truck_id: Option<String>,
    pub quote_status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 报价行（种子化扫描清单的期望行）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuoteLineItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// 创建活动请求
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1, max = 256))]
    pub client_name: String,
    pub client_contact: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub truck_id: Option<String>,
}

/// 添加报价行请求
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateQuoteLineRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub category: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}
