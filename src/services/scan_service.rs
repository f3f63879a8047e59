//! 扫描对账服务
//! 一次扫描的完整编排：节流 → 解析候选 → 状态机推进 → 单事务落库 → 完成联动
//! 调用方（宿主应用）负责串行化调用，同一时刻至多一次扫描在途

use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::ScanningConfig;
use crate::models::asset::Asset;
use crate::models::movement::NewMovement;
use crate::models::scan_list::*;
use crate::repository::{AssetRepository, ScanListRepository, StockRepository};
use crate::scan::throttle::ScanThrottle;
use crate::scan::{direction, reconcile, PickPolicy, ScanError};
use crate::services::catalog_service::{CatalogService, Resolution};
use crate::services::completion::CompletionCoordinator;
use crate::services::ledger_service::MovementLedger;

pub struct ScanService {
    db: PgPool,
    catalog: Arc<CatalogService>,
    ledger: Arc<MovementLedger>,
    completion: Arc<CompletionCoordinator>,
    throttle: ScanThrottle,
    pick_policy: PickPolicy,
    warehouse_location: String,
}

impl ScanService {
    pub fn new(
        db: PgPool,
        catalog: Arc<CatalogService>,
        ledger: Arc<MovementLedger>,
        completion: Arc<CompletionCoordinator>,
        config: &ScanningConfig,
    ) -> Self {
        Self {
            db,
            catalog,
            ledger,
            completion,
            throttle: ScanThrottle::new(Duration::from_millis(config.throttle_ms)),
            pick_policy: config.parsed_pick_policy(),
            warehouse_location: config.warehouse_location.clone(),
        }
    }

    /// 记录一次扫描
    #[instrument(skip(self, code), fields(list_id = %scan_list_id))]
    pub async fn record_scan(
        &self,
        scan_list_id: Uuid,
        code: &str,
        performed_by: Option<Uuid>,
    ) -> Result<ScanOutcome, ScanError> {
        let result = self
            .record_scan_inner(scan_list_id, code, performed_by)
            .await;

        match &result {
            Ok(outcome) => {
                metrics::counter!("logiscan.scan.recorded").increment(1);
                info!(
                    asset_tag = %outcome.asset.asset_tag,
                    sku = %outcome.item.sku,
                    triggered_completion = outcome.triggered_completion,
                    "Scan recorded"
                );
            }
            Err(e) if e.is_user_recoverable() => {
                metrics::counter!("logiscan.scan.rejected", "reason" => e.code()).increment(1);
                debug!(reason = e.code(), "Scan rejected");
            }
            Err(e) => {
                error!(error = %e, "Scan failed");
            }
        }

        result
    }

    async fn record_scan_inner(
        &self,
        scan_list_id: Uuid,
        code: &str,
        performed_by: Option<Uuid>,
    ) -> Result<ScanOutcome, ScanError> {
        // 节流在任何状态读取之前，被拒绝的尝试零开销、零变更
        self.throttle.check().await?;

        let list_repo = ScanListRepository::new(self.db.clone());
        let list = list_repo
            .get(scan_list_id)
            .await?
            .ok_or(ScanError::ListNotFound(scan_list_id))?;

        if list.status == ScanListStatus::Cancelled {
            return Err(ScanError::ListCancelled(scan_list_id));
        }

        let items = list_repo.get_items(scan_list_id).await?;

        // 解析候选资产
        let resolution = self.catalog.resolve(code).await?;
        if resolution.candidates.is_empty() {
            return Err(ScanError::AssetNotFound {
                code: code.to_string(),
            });
        }
        let asset = self.select_candidate(&list, &items, resolution)?;

        // 在内存快照上推进状态机；被拒绝时数据库不被触碰
        let now = Utc::now();
        let mut updated_list = list.clone();
        let mut updated_items = items.clone();
        let applied = reconcile::apply_scan(&mut updated_list, &mut updated_items, &asset, now)?;

        let item = updated_items
            .iter()
            .find(|i| i.id == applied.item_id)
            .cloned()
            .ok_or_else(|| {
                ScanError::InvariantViolation(format!(
                    "reconciled item {} missing from snapshot",
                    applied.item_id
                ))
            })?;

        let plan = direction::plan(
            list.direction,
            &list.truck_id,
            list.event_id,
            &self.warehouse_location,
        );

        // 单个逻辑事务：行项目、聚合计数、资产状态、库存账面与移动记录
        // 要么全部生效，要么全不生效
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE preparation_list_items
            SET quantity_scanned = $2, scanned_asset_ids = $3, scanned_at = $4, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(item.quantity_scanned)
        .bind(sqlx::types::Json(item.scanned_asset_ids.0.clone()))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE scan_lists SET scanned_items = $2, status = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(updated_list.id)
        .bind(updated_list.scanned_items)
        .bind(updated_list.status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let asset_repo = AssetRepository::new(self.db.clone());
        asset_repo
            .update_status_location(&mut *tx, asset.id, plan.asset_status, &plan.asset_location)
            .await?;

        // 库存的使用中数量跟随出库/归库扫描
        let stock_repo = StockRepository::new(self.db.clone());
        match list.direction {
            ScanDirection::StockToTruck => {
                if !stock_repo.adjust_in_use(&mut *tx, &asset.sku, 1).await? {
                    return Err(ScanError::InvariantViolation(format!(
                        "stock item {} has no available quantity left",
                        asset.sku
                    )));
                }
            }
            ScanDirection::TruckToStock => {
                if !stock_repo.adjust_in_use(&mut *tx, &asset.sku, -1).await? {
                    return Err(ScanError::InvariantViolation(format!(
                        "stock item {} has no in-use quantity to return",
                        asset.sku
                    )));
                }
            }
            ScanDirection::TruckToEvent | ScanDirection::EventToTruck => {}
        }

        let mut movement = NewMovement::single_unit(
            plan.movement_type,
            asset.id,
            asset.asset_tag.clone(),
            plan.from_location.clone(),
            plan.to_location.clone(),
        );
        movement.scan_payload = Some(code.to_string());
        movement.performed_by = performed_by;

        self.ledger.record_with(&mut *tx, &movement).await?;

        tx.commit().await?;

        // 完成联动在事务提交之后执行；失败只报告，扫描不回滚，
        // 可通过 CompletionCoordinator::retry_side_effects 独立重试
        if applied.triggered_completion {
            if let Err(e) = self.completion.handle(&updated_list, &updated_items).await {
                error!(
                    error = %e,
                    list_id = %updated_list.id,
                    "Completion side effects failed, scan is kept"
                );
                metrics::counter!("logiscan.scan_list.side_effects_failed").increment(1);
            }
        }

        let mut asset_after = asset;
        asset_after.status = plan.asset_status;
        asset_after.location = plan.asset_location.clone();

        Ok(ScanOutcome {
            asset: asset_after,
            item,
            scan_list: updated_list,
            triggered_completion: applied.triggered_completion,
        })
    }

    /// 从候选资产中选出本次扫描的对象
    /// 已记录过的候选先被滤掉，同一 SKU 连续扫描会自然走到下一台设备
    fn select_candidate(
        &self,
        list: &ScanList,
        items: &[PreparationListItem],
        resolution: Resolution,
    ) -> Result<Asset, ScanError> {
        let recorded: HashSet<Uuid> = items
            .iter()
            .flat_map(|item| item.scanned_asset_ids.0.iter().copied())
            .collect();

        let first_tag = resolution
            .candidates
            .first()
            .map(|a| a.asset_tag.clone())
            .unwrap_or_default();

        let mut fresh: Vec<Asset> = resolution
            .candidates
            .into_iter()
            .filter(|a| !recorded.contains(&a.id))
            .collect();

        if fresh.is_empty() {
            return Err(ScanError::AssetAlreadyScanned {
                asset_tag: first_tag,
            });
        }

        if fresh.len() == 1 {
            return Ok(fresh.remove(0));
        }

        match self.pick_policy {
            PickPolicy::Explicit => Err(ScanError::AmbiguousMatch {
                sku: fresh[0].sku.clone(),
                candidates: fresh,
            }),
            PickPolicy::FirstAvailable => {
                let index = fresh
                    .iter()
                    .position(|a| direction::asset_eligible(list.direction, a))
                    .unwrap_or(0);
                Ok(fresh.remove(index))
            }
        }
    }

    /// 清单进度统计
    pub async fn get_progress(&self, scan_list_id: Uuid) -> Result<ScanListProgress, ScanError> {
        let list_repo = ScanListRepository::new(self.db.clone());
        let list = list_repo
            .get(scan_list_id)
            .await?
            .ok_or(ScanError::ListNotFound(scan_list_id))?;
        let items = list_repo.get_items(scan_list_id).await?;

        Ok(ScanListProgress::from_items(&list, &items))
    }

    /// 重置节流窗口（切换清单或会话时）
    pub async fn reset_throttle(&self) {
        self.throttle.reset().await;
    }
}
