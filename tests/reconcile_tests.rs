//! 对账状态机单元测试
//! 纯内存快照上验证：重复扫描、意外资产、数量不变量、完成边沿

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use logiscan::models::asset::{Asset, AssetStatus};
use logiscan::models::scan_list::*;
use logiscan::scan::reconcile::{apply_scan, completed_item_count};
use logiscan::scan::ScanError;

// ==================== 测试数据构造 ====================

fn make_list(direction: ScanDirection, total_items: i32) -> ScanList {
    ScanList {
        id: Uuid::new_v4(),
        event_id: Uuid::new_v4(),
        direction,
        truck_id: "TRUCK-7".to_string(),
        total_items,
        scanned_items: 0,
        status: ScanListStatus::Pending,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn make_item(list_id: Uuid, sku: &str, required: i32, position: i32) -> PreparationListItem {
    PreparationListItem {
        id: Uuid::new_v4(),
        scan_list_id: list_id,
        sku: sku.to_string(),
        name: format!("{} unit", sku),
        category: "lighting".to_string(),
        position,
        quantity_required: required,
        quantity_scanned: 0,
        scanned_asset_ids: Json(vec![]),
        scanned_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn make_asset(sku: &str, tag: &str) -> Asset {
    Asset {
        id: Uuid::new_v4(),
        asset_tag: tag.to_string(),
        sku: sku.to_string(),
        serial_number: None,
        status: AssetStatus::Available,
        frozen: false,
        location: "STOCK".to_string(),
        weight_kg: 1.0,
        volume_m3: 0.01,
        value: 100.0,
        qr_payload: Some(format!("ASSET:{}", tag)),
        notes: None,
        tags: Json(vec![]),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ==================== 场景 A: 同一资产重复扫描 ====================

#[test]
fn test_scenario_a_duplicate_asset_rejected_even_when_item_incomplete() {
    let mut list = make_list(ScanDirection::StockToTruck, 1);
    let mut items = vec![make_item(list.id, "LED-01", 3, 0)];
    let a1 = make_asset("LED-01", "LED-01-0001");

    // 第一次扫描通过
    let applied = apply_scan(&mut list, &mut items, &a1, Utc::now()).unwrap();
    assert!(!applied.triggered_completion);
    assert!(applied.first_scan);
    assert_eq!(items[0].quantity_scanned, 1);
    assert_eq!(items[0].state(), ItemState::Partial);
    assert_eq!(list.status, ScanListStatus::InProgress);

    // 行项目尚未完成，但同一台资产必须被拒绝
    let result = apply_scan(&mut list, &mut items, &a1, Utc::now());
    assert!(matches!(result, Err(ScanError::AssetAlreadyScanned { .. })));

    // 被拒绝的扫描不产生任何变更
    assert_eq!(items[0].quantity_scanned, 1);
    assert_eq!(list.scanned_items, 0);
}

// ==================== 场景 B: 两台不同资产完成行项目 ====================

#[test]
fn test_scenario_b_distinct_assets_complete_item_and_list() {
    let mut list = make_list(ScanDirection::StockToTruck, 1);
    let mut items = vec![make_item(list.id, "CHR-01", 2, 0)];
    let a2 = make_asset("CHR-01", "CHR-01-0001");
    let a3 = make_asset("CHR-01", "CHR-01-0002");

    let first = apply_scan(&mut list, &mut items, &a2, Utc::now()).unwrap();
    assert!(!first.triggered_completion);
    assert_eq!(items[0].state(), ItemState::Partial);

    let second = apply_scan(&mut list, &mut items, &a3, Utc::now()).unwrap();
    assert!(second.triggered_completion);
    assert_eq!(items[0].state(), ItemState::Complete);
    assert_eq!(list.scanned_items, 1);
    assert_eq!(list.status, ScanListStatus::Completed);

    // 两台资产都被记录、顺序保留
    assert_eq!(items[0].scanned_asset_ids.0, vec![a2.id, a3.id]);
}

// ==================== 场景 C: 不在清单上的 SKU ====================

#[test]
fn test_scenario_c_unexpected_sku_rejected() {
    let mut list = make_list(ScanDirection::StockToTruck, 1);
    let mut items = vec![make_item(list.id, "LED-01", 3, 0)];
    let stranger = make_asset("XYZ-99", "XYZ-99-0001");

    let result = apply_scan(&mut list, &mut items, &stranger, Utc::now());
    assert!(matches!(
        result,
        Err(ScanError::AssetNotExpected { ref sku, .. }) if sku == "XYZ-99"
    ));
    assert_eq!(list.status, ScanListStatus::Pending);
}

// ==================== 完成边沿 ====================

#[test]
fn test_completion_edge_fires_exactly_once() {
    let mut list = make_list(ScanDirection::TruckToStock, 2);
    let mut items = vec![
        make_item(list.id, "LED-01", 1, 0),
        make_item(list.id, "CHR-01", 2, 1),
    ];

    let scans = [
        make_asset("LED-01", "LED-01-0001"),
        make_asset("CHR-01", "CHR-01-0001"),
        make_asset("CHR-01", "CHR-01-0002"),
    ];

    let mut completions = 0;
    for asset in &scans {
        let applied = apply_scan(&mut list, &mut items, asset, Utc::now()).unwrap();
        if applied.triggered_completion {
            completions += 1;
        }
    }

    // 只有最后一行的最后一台触发完成
    assert_eq!(completions, 1);
    assert_eq!(list.status, ScanListStatus::Completed);

    // 对已完成清单的后续扫描一律拒绝
    let extra = make_asset("LED-01", "LED-01-0002");
    let result = apply_scan(&mut list, &mut items, &extra, Utc::now());
    assert!(matches!(result, Err(ScanError::AssetAlreadyScanned { .. })));
}

#[test]
fn test_completed_line_rejects_further_units_of_same_sku() {
    let mut list = make_list(ScanDirection::StockToTruck, 2);
    let mut items = vec![
        make_item(list.id, "LED-01", 1, 0),
        make_item(list.id, "CHR-01", 1, 1),
    ];

    let first = make_asset("LED-01", "LED-01-0001");
    apply_scan(&mut list, &mut items, &first, Utc::now()).unwrap();

    // LED-01 行已满，第二台 LED-01 是"已扫描"而非"不期望"
    let second = make_asset("LED-01", "LED-01-0002");
    let result = apply_scan(&mut list, &mut items, &second, Utc::now());
    assert!(matches!(result, Err(ScanError::AssetAlreadyScanned { .. })));

    // 清单整体仍未完成
    assert_eq!(list.status, ScanListStatus::InProgress);
    assert_eq!(list.scanned_items, 1);
}

// ==================== 不变量 ====================

#[test]
fn test_aggregate_counter_matches_complete_items_at_all_times() {
    let mut list = make_list(ScanDirection::EventToTruck, 2);
    let mut items = vec![
        make_item(list.id, "LED-01", 2, 0),
        make_item(list.id, "CHR-01", 1, 1),
    ];

    let scans = [
        make_asset("LED-01", "LED-01-0001"),
        make_asset("CHR-01", "CHR-01-0001"),
        make_asset("LED-01", "LED-01-0002"),
    ];

    for asset in &scans {
        apply_scan(&mut list, &mut items, asset, Utc::now()).unwrap();

        // 每一步之后：计数器与行项目一致，数量都在界内
        assert_eq!(list.scanned_items, completed_item_count(&items));
        for item in &items {
            assert!(item.quantity_scanned >= 0);
            assert!(item.quantity_scanned <= item.quantity_required);
        }
    }

    assert_eq!(list.scanned_items, 2);
}

#[test]
fn test_asset_id_appears_in_at_most_one_item() {
    // 两行同一 SKU：资产只会被记入其中一行
    let mut list = make_list(ScanDirection::StockToTruck, 2);
    let mut items = vec![
        make_item(list.id, "LED-01", 1, 0),
        make_item(list.id, "LED-01", 1, 1),
    ];

    let asset = make_asset("LED-01", "LED-01-0001");
    apply_scan(&mut list, &mut items, &asset, Utc::now()).unwrap();

    let occurrences: usize = items
        .iter()
        .filter(|i| i.scanned_asset_ids.0.contains(&asset.id))
        .count();
    assert_eq!(occurrences, 1);

    // 重扫同一台会被拒绝，哪怕第二行还空着
    let result = apply_scan(&mut list, &mut items, &asset, Utc::now());
    assert!(matches!(result, Err(ScanError::AssetAlreadyScanned { .. })));
}

#[test]
fn test_snapshot_mismatch_is_invariant_violation() {
    let mut list = make_list(ScanDirection::StockToTruck, 3);
    // 声称 3 行却只装载了 1 行
    let mut items = vec![make_item(list.id, "LED-01", 1, 0)];
    let asset = make_asset("LED-01", "LED-01-0001");

    let result = apply_scan(&mut list, &mut items, &asset, Utc::now());
    assert!(matches!(result, Err(ScanError::InvariantViolation(_))));
}

#[test]
fn test_cancelled_list_rejects_scans() {
    let mut list = make_list(ScanDirection::StockToTruck, 1);
    list.status = ScanListStatus::Cancelled;
    let mut items = vec![make_item(list.id, "LED-01", 1, 0)];
    let asset = make_asset("LED-01", "LED-01-0001");

    let result = apply_scan(&mut list, &mut items, &asset, Utc::now());
    assert!(matches!(result, Err(ScanError::ListCancelled(_))));
}
