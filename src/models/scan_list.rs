//! Scan list domain models
//! 每个活动每个转运方向一份期望清单；行项目按 SKU 聚合、按数量记录进度

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::asset::Asset;

/// 转运方向（固定的四段转运）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scan_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    /// 仓库 → 卡车（装车）
    StockToTruck,
    /// 卡车 → 活动现场（卸车）
    TruckToEvent,
    /// 活动现场 → 卡车（回装）
    EventToTruck,
    /// 卡车 → 仓库（归库）
    TruckToStock,
}

impl ScanDirection {
    /// 四个方向的固定顺序（清单生成按此顺序）
    pub fn all() -> [ScanDirection; 4] {
        [
            ScanDirection::StockToTruck,
            ScanDirection::TruckToEvent,
            ScanDirection::EventToTruck,
            ScanDirection::TruckToStock,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanDirection::StockToTruck => "stock_to_truck",
            ScanDirection::TruckToEvent => "truck_to_event",
            ScanDirection::EventToTruck => "event_to_truck",
            ScanDirection::TruckToStock => "truck_to_stock",
        }
    }
}

/// 扫描清单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scan_list_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScanListStatus {
    /// 尚无成功扫描
    Pending,
    /// 已有扫描、未全部完成
    InProgress,
    /// 全部行项目完成
    Completed,
    /// 已取消
    Cancelled,
}

/// 行项目进度状态（由数量推导，不落库）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    Partial,
    Complete,
}

/// 扫描清单
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScanList {
    pub id: Uuid,
    pub event_id: Uuid,
    pub direction: ScanDirection,
    /// 生成时从活动固化下来的卡车编号
    pub truck_id: String,
    /// 行项目数（非数量合计）
    pub total_items: i32,
    /// 已完成的行项目数
    pub scanned_items: i32,
    pub status: ScanListStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScanList {
    pub fn is_complete(&self) -> bool {
        self.status == ScanListStatus::Completed
    }
}

/// 期望行项目（一个 SKU 一行，数量粒度在行内）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PreparationListItem {
    pub id: Uuid,
    pub scan_list_id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub position: i32,
    pub quantity_required: i32,
    pub quantity_scanned: i32,
    /// 已记录的资产 id（有序，跨整份清单不重复）
    pub scanned_asset_ids: Json<Vec<Uuid>>,
    pub scanned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PreparationListItem {
    pub fn is_complete(&self) -> bool {
        self.quantity_scanned >= self.quantity_required
    }

    pub fn state(&self) -> ItemState {
        if self.quantity_scanned == 0 {
            ItemState::Pending
        } else if self.is_complete() {
            ItemState::Complete
        } else {
            ItemState::Partial
        }
    }
}

/// 单次成功扫描的结果
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub asset: Asset,
    pub item: PreparationListItem,
    pub scan_list: ScanList,
    /// 本次扫描是否恰好触发清单完成（边沿，只为 true 一次）
    pub triggered_completion: bool,
}

/// 清单进度统计
#[derive(Debug, Clone, Serialize)]
pub struct ScanListProgress {
    pub scan_list_id: Uuid,
    pub direction: ScanDirection,
    pub status: ScanListStatus,
    pub total_items: i32,
    pub completed_items: i32,
    pub required_units: i32,
    pub scanned_units: i32,
    pub percent_complete: f64,
}

impl ScanListProgress {
    /// 由清单与行项目汇总进度
    pub fn from_items(list: &ScanList, items: &[PreparationListItem]) -> Self {
        let required_units: i32 = items.iter().map(|i| i.quantity_required).sum();
        let scanned_units: i32 = items.iter().map(|i| i.quantity_scanned).sum();
        let completed_items = items.iter().filter(|i| i.is_complete()).count() as i32;

        let percent_complete = if required_units > 0 {
            scanned_units as f64 / required_units as f64 * 100.0
        } else {
            0.0
        };

        Self {
            scan_list_id: list.id,
            direction: list.direction,
            status: list.status,
            total_items: list.total_items,
            completed_items,
            required_units,
            scanned_units,
            percent_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(required: i32, scanned: i32) -> PreparationListItem {
        PreparationListItem {
            id: Uuid::new_v4(),
            scan_list_id: Uuid::new_v4(),
            sku: "LED-01".to_string(),
            name: "LED Par 64".to_string(),
            category: "lighting".to_string(),
            position: 0,
            quantity_required: required,
            quantity_scanned: scanned,
            scanned_asset_ids: Json(vec![]),
            scanned_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_state_transitions() {
        assert_eq!(item(3, 0).state(), ItemState::Pending);
        assert_eq!(item(3, 1).state(), ItemState::Partial);
        assert_eq!(item(3, 3).state(), ItemState::Complete);
    }

    #[test]
    fn test_direction_order_is_stable() {
        let all = ScanDirection::all();
        assert_eq!(all[0].as_str(), "stock_to_truck");
        assert_eq!(all[3].as_str(), "truck_to_stock");
    }

    #[test]
    fn test_progress_aggregation() {
        let list = ScanList {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            direction: ScanDirection::StockToTruck,
            truck_id: "TRUCK-7".to_string(),
            total_items: 2,
            scanned_items: 1,
            status: ScanListStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let items = vec![item(3, 3), item(2, 1)];
        let progress = ScanListProgress::from_items(&list, &items);

        assert_eq!(progress.completed_items, 1);
        assert_eq!(progress.required_units, 5);
        assert_eq!(progress.scanned_units, 4);
        assert!((progress.percent_complete - 80.0).abs() < f64::EPSILON);
    }
}
