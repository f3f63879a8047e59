//! Asset repository (资产数据访问)

use crate::{
    error::AppError,
    models::asset::*,
    models::stock::StockItem,
};
use sqlx::{PgExecutor, PgPool, Row};
use uuid::Uuid;

pub struct AssetRepository {
    db: PgPool,
}

impl AssetRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建资产，单位重量/体积/价值从目录条目固化
    pub async fn create(
        &self,
        req: &CreateAssetRequest,
        item: &StockItem,
    ) -> Result<Asset, AppError> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                asset_tag, sku, serial_number,
                weight_kg, volume_m3, value,
                qr_payload, notes, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&req.asset_tag)
        .bind(&req.sku)
        .bind(&req.serial_number)
        .bind(item.unit_weight_kg)
        .bind(item.unit_volume_m3)
        .bind(item.unit_value)
        .bind(&req.qr_payload)
        .bind(&req.notes)
        .bind(sqlx::types::Json(req.tags.clone()))
        .fetch_one(&self.db)
        .await?;

        Ok(asset)
    }

    /// 获取资产
    pub async fn get(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(asset)
    }

    /// 根据业务标识获取资产
    pub async fn get_by_tag(&self, asset_tag: &str) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE asset_tag = $1")
            .bind(asset_tag)
            .fetch_optional(&self.db)
            .await?;

        Ok(asset)
    }

    /// 根据序列号获取资产
    pub async fn get_by_serial(&self, serial_number: &str) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE serial_number = $1")
            .bind(serial_number)
            .fetch_optional(&self.db)
            .await?;

        Ok(asset)
    }

    /// 列出某 SKU 的全部资产（每台序列化设备一行）
    pub async fn list_by_sku(&self, sku: &str) -> Result<Vec<Asset>, AppError> {
        let assets =
            sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE sku = $1 ORDER BY asset_tag")
                .bind(sku)
                .fetch_all(&self.db)
                .await?;

        Ok(assets)
    }

    /// 列出资产
    pub async fn list(
        &self,
        filters: &AssetListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Asset>, AppError> {
        let mut query = String::from("SELECT * FROM assets WHERE 1=1");
        let mut index = 0;

        if filters.sku.is_some() {
            index += 1;
            query.push_str(&format!(" AND sku = ${}", index));
        }
        if filters.status.is_some() {
            index += 1;
            query.push_str(&format!(" AND status = ${}", index));
        }
        if filters.frozen.is_some() {
            index += 1;
            query.push_str(&format!(" AND frozen = ${}", index));
        }
        if filters.location.is_some() {
            index += 1;
            query.push_str(&format!(" AND location = ${}", index));
        }
        if filters.search.is_some() {
            index += 1;
            query.push_str(&format!(
                " AND (asset_tag ILIKE ${} OR serial_number ILIKE ${})",
                index,
                index + 1
            ));
            index += 1;
        }

        query.push_str(&format!(" ORDER BY asset_tag LIMIT ${} OFFSET ${}", index + 1, index + 2));

        let mut query_builder = sqlx::query_as::<_, Asset>(&query);

        if let Some(sku) = &filters.sku {
            query_builder = query_builder.bind(sku);
        }
        if let Some(status) = filters.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(frozen) = filters.frozen {
            query_builder = query_builder.bind(frozen);
        }
        if let Some(location) = &filters.location {
            query_builder = query_builder.bind(location);
        }
        let search_pattern;
        if let Some(search) = &filters.search {
            search_pattern = format!("%{}%", search);
            query_builder = query_builder.bind(&search_pattern);
            query_builder = query_builder.bind(&search_pattern);
        }

        let assets = query_builder
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(assets)
    }

    /// 统计资产数量
    pub async fn count(&self, filters: &AssetListFilters) -> Result<i64, AppError> {
        let mut query = String::from("SELECT COUNT(*) FROM assets WHERE 1=1");
        let mut index = 0;

        if filters.sku.is_some() {
            index += 1;
            query.push_str(&format!(" AND sku = ${}", index));
        }
        if filters.status.is_some() {
            index += 1;
            query.push_str(&format!(" AND status = ${}", index));
        }
        if filters.frozen.is_some() {
            index += 1;
            query.push_str(&format!(" AND frozen = ${}", index));
        }
        if filters.location.is_some() {
            index += 1;
            query.push_str(&format!(" AND location = ${}", index));
        }
        if filters.search.is_some() {
            index += 1;
            query.push_str(&format!(
                " AND (asset_tag ILIKE ${} OR serial_number ILIKE ${})",
                index,
                index + 1
            ));
        }

        let mut query_builder = sqlx::query(&query);

        if let Some(sku) = &filters.sku {
            query_builder = query_builder.bind(sku);
        }
        if let Some(status) = filters.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(frozen) = filters.frozen {
            query_builder = query_builder.bind(frozen);
        }
        if let Some(location) = &filters.location {
            query_builder = query_builder.bind(location);
        }
        let search_pattern;
        if let Some(search) = &filters.search {
            search_pattern = format!("%{}%", search);
            query_builder = query_builder.bind(&search_pattern);
            query_builder = query_builder.bind(&search_pattern);
        }

        let count: i64 = query_builder.fetch_one(&self.db).await?.get(0);
        Ok(count)
    }

    /// 更新资产状态与位置（随扫描事务执行）
    pub async fn update_status_location<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AssetStatus,
        location: &str,
    ) -> Result<bool, AppError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE assets SET status = $2, location = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(location)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 批量冻结/解冻；对已处于目标状态的资产是无操作，可安全重试
    pub async fn set_frozen(&self, ids: &[Uuid], frozen: bool) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE assets SET frozen = $2, updated_at = NOW() WHERE id = ANY($1) AND frozen <> $2",
        )
        .bind(ids)
        .bind(frozen)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
