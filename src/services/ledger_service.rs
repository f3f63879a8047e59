//! 移动台账服务
//! 纯追加：一次成功扫描一条记录；合法性校验是引擎的职责，不在这里

use sqlx::{PgExecutor, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::movement::*;
use crate::repository::MovementRepository;

pub struct MovementLedger {
    db: PgPool,
}

impl MovementLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 追加一条移动记录
    #[instrument(skip(self, movement), fields(asset_tag = %movement.asset_tag))]
    pub async fn record(&self, movement: &NewMovement) -> Result<Movement, AppError> {
        let repo = MovementRepository::new(self.db.clone());
        repo.insert(&self.db, movement).await
    }

    /// 在调用方的事务里追加一条移动记录
    pub async fn record_with<'e, E>(
        &self,
        executor: E,
        movement: &NewMovement,
    ) -> Result<Movement, AppError>
    where
        E: PgExecutor<'e>,
    {
        let repo = MovementRepository::new(self.db.clone());
        repo.insert(executor, movement).await
    }

    /// 某资产的移动历史
    pub async fn history_for_asset(
        &self,
        asset_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let repo = MovementRepository::new(self.db.clone());
        repo.history_for_asset(asset_id, limit).await
    }

    /// 某活动现场的出入历史
    pub async fn history_for_event(
        &self,
        event_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let repo = MovementRepository::new(self.db.clone());
        repo.history_for_event(event_id, limit).await
    }

    /// 查询台账
    pub async fn list(
        &self,
        filters: &MovementFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let repo = MovementRepository::new(self.db.clone());
        repo.list(filters, limit, offset).await
    }

    /// 统计台账记录数
    pub async fn count(&self, filters: &MovementFilters) -> Result<i64, AppError> {
        let repo = MovementRepository::new(self.db.clone());
        repo.count(filters).await
    }

    /// 标记已同步
    pub async fn mark_synced(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let repo = MovementRepository::new(self.db.clone());
        repo.mark_synced(ids).await
    }
}
