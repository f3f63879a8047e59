//! 目录管理服务
//! 目录条目创建、补货（按台生成序列化资产）、维修数量调整

use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use crate::error::AppError;
use crate::models::asset::{Asset, AssetListFilters, CreateAssetRequest};
use crate::models::stock::*;
use crate::repository::{AssetRepository, StockRepository};

pub struct StockService {
    db: PgPool,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建目录条目并按初始数量生成序列化资产
    #[instrument(skip(self, req), fields(sku = %req.sku))]
    pub async fn create_item(
        &self,
        req: CreateStockItemRequest,
    ) -> Result<(StockItem, Vec<Asset>), AppError> {
        req.validate()?;

        let stock_repo = StockRepository::new(self.db.clone());
        if stock_repo.get_by_sku(&req.sku).await?.is_some() {
            return Err(AppError::conflict(format!("sku {} already exists", req.sku)));
        }

        let item = stock_repo.create(&req).await?;
        let assets = self.spawn_assets(&item, 0, req.initial_quantity).await?;

        info!(
            sku = %item.sku,
            assets = assets.len(),
            "Stock item created"
        );

        Ok((item, assets))
    }

    /// 补货：提升总量并为每台新设备生成资产
    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        sku: &str,
        additional: i32,
    ) -> Result<(StockItem, Vec<Asset>), AppError> {
        if additional <= 0 {
            return Err(AppError::validation("additional quantity must be positive"));
        }

        let stock_repo = StockRepository::new(self.db.clone());
        stock_repo
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::not_found(format!("stock item {}", sku)))?;

        let asset_repo = AssetRepository::new(self.db.clone());
        let existing = asset_repo
            .count(&AssetListFilters {
                sku: Some(sku.to_string()),
                ..Default::default()
            })
            .await?;

        let item = stock_repo
            .add_quantity(sku, additional)
            .await?
            .ok_or_else(|| AppError::not_found(format!("stock item {}", sku)))?;

        let assets = self.spawn_assets(&item, existing as i32, additional).await?;

        info!(sku = %sku, additional, "Stock restocked");
        Ok((item, assets))
    }

    /// 调整维修数量（正数入修、负数出修）；可用数量不足时拒绝
    #[instrument(skip(self))]
    pub async fn adjust_maintenance(&self, sku: &str, delta: i32) -> Result<StockItem, AppError> {
        let stock_repo = StockRepository::new(self.db.clone());
        stock_repo
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::not_found(format!("stock item {}", sku)))?;

        stock_repo
            .adjust_maintenance(sku, delta)
            .await?
            .ok_or_else(|| AppError::conflict("insufficient available quantity"))
    }

    /// 软停用目录条目
    #[instrument(skip(self))]
    pub async fn deactivate_item(&self, sku: &str) -> Result<(), AppError> {
        let stock_repo = StockRepository::new(self.db.clone());
        if !stock_repo.deactivate(sku).await? {
            return Err(AppError::not_found(format!("stock item {}", sku)));
        }

        info!(sku = %sku, "Stock item deactivated");
        Ok(())
    }

    /// 列出目录条目
    pub async fn list_items(
        &self,
        filters: &StockListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StockItem>, AppError> {
        StockRepository::new(self.db.clone())
            .list(filters, limit, offset)
            .await
    }

    /// 按 SKU 获取目录条目
    pub async fn get_item(&self, sku: &str) -> Result<StockItem, AppError> {
        StockRepository::new(self.db.clone())
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::not_found(format!("stock item {}", sku)))
    }

    /// 为目录条目生成连续编号的序列化资产
    async fn spawn_assets(
        &self,
        item: &StockItem,
        start_index: i32,
        count: i32,
    ) -> Result<Vec<Asset>, AppError> {
        let asset_repo = AssetRepository::new(self.db.clone());
        let mut assets = Vec::with_capacity(count.max(0) as usize);

        for n in 0..count {
            let tag = format!("{}-{:04}", item.sku, start_index + n + 1);
            let req = CreateAssetRequest {
                asset_tag: tag.clone(),
                sku: item.sku.clone(),
                serial_number: None,
                qr_payload: Some(format!("ASSET:{}", tag)),
                notes: None,
                tags: Vec::new(),
            };
            assets.push(asset_repo.create(&req, item).await?);
        }

        Ok(assets)
    }
}
