//! 扫描清单生成服务
//! 从定稿报价为四个转运方向各生成一份期望清单；重复生成复用已有清单

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::QuoteStatus;
use crate::models::scan_list::{ScanDirection, ScanList, ScanListStatus};
use crate::repository::{EventRepository, ScanListRepository};
use crate::scan::ScanError;

pub struct GeneratorService {
    db: PgPool,
}

impl GeneratorService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 为活动生成全部四份扫描清单
    ///
    /// 幂等：活动已有清单时原样返回既有清单，绝不产生重复；
    /// 前置条件：报价已定稿、报价行非空、卡车已指派。
    #[instrument(skip(self))]
    pub async fn generate_all(&self, event_id: Uuid) -> Result<Vec<ScanList>, ScanError> {
        let event_repo = EventRepository::new(self.db.clone());
        let list_repo = ScanListRepository::new(self.db.clone());

        let event = event_repo
            .get(event_id)
            .await?
            .ok_or(ScanError::EventNotFound(event_id))?;

        let existing = list_repo.list_for_event(event_id).await?;
        if !existing.is_empty() {
            info!(
                event_id = %event_id,
                count = existing.len(),
                "Scan lists already exist, reusing"
            );
            return Ok(existing);
        }

        if event.quote_status != QuoteStatus::Finalized {
            return Err(ScanError::QuoteNotFinalized);
        }

        let lines = event_repo.list_quote_lines(event_id).await?;
        if lines.is_empty() {
            return Err(ScanError::NoQuoteItems);
        }

        let truck_id = event.truck_id.ok_or(ScanError::TruckNotAssigned)?;

        let mut tx = self.db.begin().await?;
        let mut lists = Vec::with_capacity(4);

        for direction in ScanDirection::all() {
            let list = list_repo
                .insert_list(&mut *tx, event_id, direction, &truck_id, lines.len() as i32)
                .await?;

            for (position, line) in lines.iter().enumerate() {
                list_repo
                    .insert_item(&mut *tx, list.id, line, position as i32)
                    .await?;
            }

            lists.push(list);
        }

        tx.commit().await?;

        metrics::counter!("logiscan.scan_list.generated").increment(4);
        info!(
            event_id = %event_id,
            line_items = lines.len(),
            truck_id = %truck_id,
            "Generated scan lists for all directions"
        );

        Ok(lists)
    }

    /// 重置清单：行项目清零、状态回到 pending
    #[instrument(skip(self))]
    pub async fn reset_list(&self, scan_list_id: Uuid) -> Result<ScanList, AppError> {
        let list_repo = ScanListRepository::new(self.db.clone());
        list_repo
            .get(scan_list_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("scan list {}", scan_list_id)))?;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE preparation_list_items
            SET quantity_scanned = 0, scanned_asset_ids = '[]', scanned_at = NULL, updated_at = NOW()
            WHERE scan_list_id = $1
            "#,
        )
        .bind(scan_list_id)
        .execute(&mut *tx)
        .await?;

        let list = sqlx::query_as::<_, ScanList>(
            r#"
            UPDATE scan_lists
            SET scanned_items = 0, status = 'pending', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(scan_list_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(list_id = %scan_list_id, "Scan list reset");
        Ok(list)
    }

    /// 取消清单；已完成的清单不可取消
    #[instrument(skip(self))]
    pub async fn cancel_list(&self, scan_list_id: Uuid) -> Result<ScanList, AppError> {
        let list_repo = ScanListRepository::new(self.db.clone());
        let list = list_repo
            .get(scan_list_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("scan list {}", scan_list_id)))?;

        if list.status == ScanListStatus::Completed {
            return Err(AppError::conflict("completed lists cannot be cancelled"));
        }

        let cancelled = list_repo
            .update_status(scan_list_id, ScanListStatus::Cancelled)
            .await?
            .ok_or_else(|| AppError::not_found(format!("scan list {}", scan_list_id)))?;

        info!(list_id = %scan_list_id, "Scan list cancelled");
        Ok(cancelled)
    }

    /// 删除清单（级联删除行项目）
    #[instrument(skip(self))]
    pub async fn delete_list(&self, scan_list_id: Uuid) -> Result<(), AppError> {
        let list_repo = ScanListRepository::new(self.db.clone());
        let deleted = list_repo.delete(scan_list_id).await?;

        if !deleted {
            return Err(AppError::not_found(format!("scan list {}", scan_list_id)));
        }

        info!(list_id = %scan_list_id, "Scan list deleted");
        Ok(())
    }
}
