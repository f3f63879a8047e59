//! 清单完成联动
//! 清单进入 completed 的那一次扫描触发；装车清单冻结资产，归库清单解冻

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::scan_list::{PreparationListItem, ScanDirection, ScanList, ScanListStatus};
use crate::repository::{AssetRepository, ScanListRepository};

pub struct CompletionCoordinator {
    db: PgPool,
}

impl CompletionCoordinator {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 执行完成联动
    /// 冻结/解冻是幂等操作：对已处于目标状态的资产无影响，失败后可安全重试
    #[instrument(skip(self, items), fields(list_id = %list.id, direction = list.direction.as_str()))]
    pub async fn handle(
        &self,
        list: &ScanList,
        items: &[PreparationListItem],
    ) -> Result<(), AppError> {
        let asset_ids: Vec<Uuid> = items
            .iter()
            .flat_map(|item| item.scanned_asset_ids.0.iter().copied())
            .collect();

        match list.direction {
            ScanDirection::StockToTruck => {
                let changed = AssetRepository::new(self.db.clone())
                    .set_frozen(&asset_ids, true)
                    .await?;
                info!(assets = asset_ids.len(), changed, "Assets frozen for event");
            }
            ScanDirection::TruckToStock => {
                let changed = AssetRepository::new(self.db.clone())
                    .set_frozen(&asset_ids, false)
                    .await?;
                info!(assets = asset_ids.len(), changed, "Assets released back to pool");
            }
            // 其余方向只有状态翻转，没有额外联动
            ScanDirection::TruckToEvent | ScanDirection::EventToTruck => {}
        }

        metrics::counter!("logiscan.scan_list.completed", "direction" => list.direction.as_str())
            .increment(1);

        Ok(())
    }

    /// 联动失败后的独立重试入口
    #[instrument(skip(self))]
    pub async fn retry_side_effects(&self, scan_list_id: Uuid) -> Result<(), AppError> {
        let repo = ScanListRepository::new(self.db.clone());

        let list = repo
            .get(scan_list_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("scan list {}", scan_list_id)))?;

        if list.status != ScanListStatus::Completed {
            return Err(AppError::validation(
                "side effects can only be retried for completed lists",
            ));
        }

        let items = repo.get_items(scan_list_id).await?;
        self.handle(&list, &items).await
    }
}
