//! Movement domain models
//! 移动台账：每次成功扫描追加一条不可变记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 移动类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// 装车（仓库 → 卡车）
    Load,
    /// 卸车（卡车 → 活动现场）
    Unload,
    /// 回装（活动现场 → 卡车）
    Reload,
    /// 归库（卡车 → 仓库）
    Return,
    /// 人工拣货/搬运
    Pick,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Load => "load",
            MovementType::Unload => "unload",
            MovementType::Reload => "reload",
            MovementType::Return => "return",
            MovementType::Pick => "pick",
        }
    }
}

/// 移动记录（写入后除 synced 标志外不再变更）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movement {
    pub id: Uuid,
    pub movement_type: MovementType,
    pub asset_id: Uuid,
    /// 冗余的资产业务标识，审计视图无需回表
    pub asset_tag: String,
    pub from_location: String,
    pub to_location: String,
    pub quantity: i32,
    pub scan_payload: Option<String>,
    pub performed_by: Option<Uuid>,
    pub notes: Option<String>,
    /// 远程同步标志（同步协作方维护，引擎不读取）
    pub synced: bool,
    pub occurred_at: DateTime<Utc>,
}

/// 新移动记录
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub movement_type: MovementType,
    pub asset_id: Uuid,
    pub asset_tag: String,
    pub from_location: String,
    pub to_location: String,
    pub quantity: i32,
    pub scan_payload: Option<String>,
    pub performed_by: Option<Uuid>,
    pub notes: Option<String>,
}

impl NewMovement {
    /// 单件移动（扫描产生的移动始终数量为 1）
    pub fn single_unit(
        movement_type: MovementType,
        asset_id: Uuid,
        asset_tag: impl Into<String>,
        from_location: impl Into<String>,
        to_location: impl Into<String>,
    ) -> Self {
        Self {
            movement_type,
            asset_id,
            asset_tag: asset_tag.into(),
            from_location: from_location.into(),
            to_location: to_location.into(),
            quantity: 1,
            scan_payload: None,
            performed_by: None,
            notes: None,
        }
    }
}

/// 台账查询过滤器
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilters {
    pub movement_type: Option<MovementType>,
    pub asset_id: Option<Uuid>,
    pub location: Option<String>, // 匹配 from 或 to
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub synced: Option<bool>,
}
