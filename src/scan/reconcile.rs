//! 对账状态机
//! 在内存中的清单快照上推进一次扫描；持久化由服务层在一个事务里完成

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::asset::Asset;
use crate::models::scan_list::{PreparationListItem, ScanList, ScanListStatus};
use crate::scan::error::ScanError;

/// 一次扫描推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanApplied {
    /// 被推进的行项目
    pub item_id: Uuid,
    /// 是否为该清单的第一次成功扫描（pending → in_progress）
    pub first_scan: bool,
    /// 是否恰好使整份清单达到 100%（in_progress → completed）
    pub triggered_completion: bool,
}

/// 已完成的行项目数
pub fn completed_item_count(items: &[PreparationListItem]) -> i32 {
    items.iter().filter(|i| i.is_complete()).count() as i32
}

/// 将一次扫描应用到清单快照
///
/// 检查顺序：
/// 1. 清单必须可扫（未取消、未完成）
/// 2. 资产 id 在整份清单中至多出现一次
/// 3. 必须存在该 SKU 的未完成行项目
pub fn apply_scan(
    list: &mut ScanList,
    items: &mut [PreparationListItem],
    asset: &Asset,
    now: DateTime<Utc>,
) -> Result<ScanApplied, ScanError> {
    if list.status == ScanListStatus::Cancelled {
        return Err(ScanError::ListCancelled(list.id));
    }
    if list.status == ScanListStatus::Completed {
        return Err(ScanError::AssetAlreadyScanned {
            asset_tag: asset.asset_tag.clone(),
        });
    }

    // 快照一致性：聚合计数必须与行项目吻合
    if list.total_items != items.len() as i32 {
        return Err(ScanError::InvariantViolation(format!(
            "scan list {} claims {} items but {} were loaded",
            list.id,
            list.total_items,
            items.len()
        )));
    }

    // 同一台资产在整份清单中只能被记录一次，无论行项目是否完成
    let duplicate = items
        .iter()
        .any(|item| item.scanned_asset_ids.0.contains(&asset.id));
    if duplicate {
        return Err(ScanError::AssetAlreadyScanned {
            asset_tag: asset.asset_tag.clone(),
        });
    }

    // 匹配该 SKU 的未完成行项目
    let target_index = items
        .iter()
        .position(|item| item.sku == asset.sku && !item.is_complete());

    let index = match target_index {
        Some(index) => index,
        None => {
            let sku_exists = items.iter().any(|item| item.sku == asset.sku);
            if sku_exists {
                // 行项目存在但已经满额
                return Err(ScanError::AssetAlreadyScanned {
                    asset_tag: asset.asset_tag.clone(),
                });
            }
            return Err(ScanError::AssetNotExpected {
                asset_tag: asset.asset_tag.clone(),
                sku: asset.sku.clone(),
            });
        }
    };

    record_asset(&mut items[index], asset.id, now)?;
    let item_id = items[index].id;

    // 重算聚合计数与状态
    list.scanned_items = completed_item_count(items);
    list.updated_at = now;

    let first_scan = list.status == ScanListStatus::Pending;
    if first_scan {
        list.status = ScanListStatus::InProgress;
    }

    let triggered_completion = list.scanned_items == list.total_items;
    if triggered_completion {
        list.status = ScanListStatus::Completed;
    }

    Ok(ScanApplied {
        item_id,
        first_scan,
        triggered_completion,
    })
}

/// 在行项目上登记一台资产，数量越界时拒绝而非修正
fn record_asset(
    item: &mut PreparationListItem,
    asset_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), ScanError> {
    if item.quantity_scanned >= item.quantity_required {
        return Err(ScanError::InvariantViolation(format!(
            "item {} would exceed required quantity {}",
            item.id, item.quantity_required
        )));
    }

    item.quantity_scanned += 1;
    item.scanned_asset_ids.0.push(asset_id);
    item.scanned_at = Some(now);
    item.updated_at = now;
    Ok(())
}
