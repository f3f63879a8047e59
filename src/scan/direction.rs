//! 方向映射
//! 方向 → (移动类型, 起点, 终点, 扫描后资产状态) 的固定查找表

use uuid::Uuid;

use crate::models::asset::{Asset, AssetStatus};
use crate::models::movement::MovementType;
use crate::models::scan_list::ScanDirection;

/// 一次扫描对应的移动与资产终态
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub movement_type: MovementType,
    pub from_location: String,
    pub to_location: String,
    pub asset_status: AssetStatus,
    pub asset_location: String,
}

/// 活动现场的位置标识
pub fn event_location(event_id: Uuid) -> String {
    format!("EVENT_{}", event_id)
}

/// 固定映射，只由方向决定，与资产身份无关
pub fn plan(
    direction: ScanDirection,
    truck_id: &str,
    event_id: Uuid,
    warehouse: &str,
) -> RoutePlan {
    match direction {
        ScanDirection::StockToTruck => RoutePlan {
            movement_type: MovementType::Load,
            from_location: warehouse.to_string(),
            to_location: truck_id.to_string(),
            asset_status: AssetStatus::InUse,
            asset_location: truck_id.to_string(),
        },
        ScanDirection::TruckToEvent => RoutePlan {
            movement_type: MovementType::Unload,
            from_location: truck_id.to_string(),
            to_location: event_location(event_id),
            asset_status: AssetStatus::InUse,
            asset_location: event_location(event_id),
        },
        ScanDirection::EventToTruck => RoutePlan {
            movement_type: MovementType::Reload,
            from_location: event_location(event_id),
            to_location: truck_id.to_string(),
            asset_status: AssetStatus::InUse,
            asset_location: truck_id.to_string(),
        },
        ScanDirection::TruckToStock => RoutePlan {
            movement_type: MovementType::Return,
            from_location: truck_id.to_string(),
            to_location: warehouse.to_string(),
            asset_status: AssetStatus::Available,
            asset_location: warehouse.to_string(),
        },
    }
}

/// 资产是否符合该方向的扫描要求
/// 出库扫描要求在库可用且未冻结；其余方向要求设备在途
pub fn asset_eligible(direction: ScanDirection, asset: &Asset) -> bool {
    match direction {
        ScanDirection::StockToTruck => asset.is_assignable(),
        _ => asset.status == AssetStatus::InUse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table() {
        let event_id = Uuid::new_v4();
        let truck = "TRUCK-7";

        let load = plan(ScanDirection::StockToTruck, truck, event_id, "STOCK");
        assert_eq!(load.movement_type, MovementType::Load);
        assert_eq!(load.from_location, "STOCK");
        assert_eq!(load.to_location, truck);
        assert_eq!(load.asset_status, AssetStatus::InUse);

        let unload = plan(ScanDirection::TruckToEvent, truck, event_id, "STOCK");
        assert_eq!(unload.movement_type, MovementType::Unload);
        assert_eq!(unload.from_location, truck);
        assert_eq!(unload.to_location, format!("EVENT_{}", event_id));

        let reload = plan(ScanDirection::EventToTruck, truck, event_id, "STOCK");
        assert_eq!(reload.movement_type, MovementType::Reload);
        assert_eq!(reload.from_location, format!("EVENT_{}", event_id));
        assert_eq!(reload.to_location, truck);

        let ret = plan(ScanDirection::TruckToStock, truck, event_id, "STOCK");
        assert_eq!(ret.movement_type, MovementType::Return);
        assert_eq!(ret.from_location, truck);
        assert_eq!(ret.to_location, "STOCK");
        assert_eq!(ret.asset_status, AssetStatus::Available);
    }

    #[test]
    fn test_mapping_ignores_asset_identity() {
        // 同一方向反复计算必须得到完全相同的结果
        let event_id = Uuid::new_v4();
        let a = plan(ScanDirection::StockToTruck, "TRUCK-1", event_id, "STOCK");
        let b = plan(ScanDirection::StockToTruck, "TRUCK-1", event_id, "STOCK");
        assert_eq!(a, b);
    }
}
