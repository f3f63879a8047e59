//! Asset domain models
//! 资产 = 一台被序列化追踪的物理设备

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// 资产状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "asset_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// 在库可用
    Available,
    /// 已预留
    Reserved,
    /// 使用中（装车或在活动现场）
    InUse,
    /// 维修中
    Maintenance,
}

/// 资产（一台序列化追踪的设备）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    /// 业务标识（印在标签/二维码上）
    pub asset_tag: String,
    pub sku: String,
    pub serial_number: Option<String>,
    pub status: AssetStatus,
    /// 冻结的资产在活动期间不可再分配
    pub frozen: bool,
    /// 自由格式位置: "STOCK"、卡车编号或 "EVENT_<event_id>"
    pub location: String,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub value: f64,
    pub qr_payload: Option<String>,
    pub notes: Option<String>,
    pub tags: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// 是否可被新的出库分配占用
    pub fn is_assignable(&self) -> bool {
        self.status == AssetStatus::Available && !self.frozen
    }
}

/// 创建资产请求
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 64))]
    pub asset_tag: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    pub serial_number: Option<String>,
    pub qr_payload: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// 资产查询过滤器
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetListFilters {
    pub sku: Option<String>,
    pub status: Option<AssetStatus>,
    pub frozen: Option<bool>,
    pub location: Option<String>,
    pub search: Option<String>, // 搜索 asset_tag/serial_number
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_with(status: AssetStatus, frozen: bool) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            asset_tag: "LED-01-0001".to_string(),
            sku: "LED-01".to_string(),
            serial_number: None,
            status,
            frozen,
            location: "STOCK".to_string(),
            weight_kg: 3.2,
            volume_m3: 0.02,
            value: 180.0,
            qr_payload: None,
            notes: None,
            tags: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_assignable() {
        assert!(asset_with(AssetStatus::Available, false).is_assignable());
        assert!(!asset_with(AssetStatus::Available, true).is_assignable());
        assert!(!asset_with(AssetStatus::InUse, false).is_assignable());
        assert!(!asset_with(AssetStatus::Maintenance, false).is_assignable());
    }
}
