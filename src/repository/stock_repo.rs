//! Stock catalog repository (目录数据访问)

use crate::{error::AppError, models::stock::*};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub struct StockRepository {
    db: PgPool,
}

impl StockRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 创建目录条目
    pub async fn create(&self, req: &CreateStockItemRequest) -> Result<StockItem, AppError> {
        let item = sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items (
                sku, name, category,
                unit_weight_kg, unit_volume_m3, unit_value,
                total_quantity, ownership,
                rental_price, purchase_price, dimensions,
                tags, tech_specs
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&req.sku)
        .bind(&req.name)
        .bind(&req.category)
        .bind(req.unit_weight_kg)
        .bind(req.unit_volume_m3)
        .bind(req.unit_value)
        .bind(req.initial_quantity)
        .bind(req.ownership)
        .bind(req.rental_price)
        .bind(req.purchase_price)
        .bind(&req.dimensions)
        .bind(sqlx::types::Json(req.tags.clone()))
        .bind(sqlx::types::Json(req.tech_specs.clone()))
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    /// 获取目录条目
    pub async fn get(&self, id: Uuid) -> Result<Option<StockItem>, AppError> {
        let item = sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(item)
    }

    /// 根据 SKU 获取目录条目
    pub async fn get_by_sku(&self, sku: &str) -> Result<Option<StockItem>, AppError> {
        let item = sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE sku = $1")
            .bind(sku)
            .fetch_optional(&self.db)
            .await?;

        Ok(item)
    }

    /// 列出目录条目
    pub async fn list(
        &self,
        filters: &StockListFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StockItem>, AppError> {
        let mut query = String::from("SELECT * FROM stock_items WHERE 1=1");
        let mut index = 0;

        if filters.category.is_some() {
            index += 1;
            query.push_str(&format!(" AND category = ${}", index));
        }
        if filters.ownership.is_some() {
            index += 1;
            query.push_str(&format!(" AND ownership = ${}", index));
        }
        if filters.active.is_some() {
            index += 1;
            query.push_str(&format!(" AND active = ${}", index));
        }
        if filters.search.is_some() {
            index += 1;
            query.push_str(&format!(" AND (sku ILIKE ${} OR name ILIKE ${})", index, index + 1));
            index += 1;
        }

        query.push_str(&format!(" ORDER BY sku LIMIT ${} OFFSET ${}", index + 1, index + 2));

        let mut query_builder = sqlx::query_as::<_, StockItem>(&query);

        if let Some(category) = &filters.category {
            query_builder = query_builder.bind(category);
        }
        if let Some(ownership) = filters.ownership {
            query_builder = query_builder.bind(ownership);
        }
        if let Some(active) = filters.active {
            query_builder = query_builder.bind(active);
        }
        let search_pattern;
        if let Some(search) = &filters.search {
            search_pattern = format!("%{}%", search);
            query_builder = query_builder.bind(&search_pattern);
            query_builder = query_builder.bind(&search_pattern);
        }

        let items = query_builder
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok(items)
    }

    /// 更新目录条目
    pub async fn update(
        &self,
        sku: &str,
        req: &UpdateStockItemRequest,
    ) -> Result<Option<StockItem>, AppError> {
        let tags_json = req.tags.as_ref().map(|t| sqlx::types::Json(t.clone()));
        let specs_json = req.tech_specs.as_ref().map(|s| sqlx::types::Json(s.clone()));

        let item = sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items
            SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                rental_price = COALESCE($4, rental_price),
                purchase_price = COALESCE($5, purchase_price),
                dimensions = COALESCE($6, dimensions),
                tags = COALESCE($7, tags),
                tech_specs = COALESCE($8, tech_specs),
                updated_at = NOW()
            WHERE sku = $1
            RETURNING *
            "#,
        )
        .bind(sku)
        .bind(&req.name)
        .bind(&req.category)
        .bind(req.rental_price)
        .bind(req.purchase_price)
        .bind(&req.dimensions)
        .bind(tags_json)
        .bind(specs_json)
        .fetch_optional(&self.db)
        .await?;

        Ok(item)
    }

    /// 增加总量（补货）
    pub async fn add_quantity(&self, sku: &str, additional: i32) -> Result<Option<StockItem>, AppError> {
        let item = sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items
            SET total_quantity = total_quantity + $2, updated_at = NOW()
            WHERE sku = $1
            RETURNING *
            "#,
        )
        .bind(sku)
        .bind(additional)
        .fetch_optional(&self.db)
        .await?;

        Ok(item)
    }

    /// 调整维修数量；可用数量不足时拒绝
    pub async fn adjust_maintenance(
        &self,
        sku: &str,
        delta: i32,
    ) -> Result<Option<StockItem>, AppError> {
        let item = sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items
            SET maintenance_quantity = maintenance_quantity + $2, updated_at = NOW()
            WHERE sku = $1
              AND maintenance_quantity + $2 >= 0
              AND total_quantity - (maintenance_quantity + $2) - in_use_quantity >= 0
            RETURNING *
            "#,
        )
        .bind(sku)
        .bind(delta)
        .fetch_optional(&self.db)
        .await?;

        Ok(item)
    }

    /// 调整使用中数量（随扫描事务执行）
    pub async fn adjust_in_use<'e, E>(
        &self,
        executor: E,
        sku: &str,
        delta: i32,
    ) -> Result<bool, AppError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE stock_items
            SET in_use_quantity = in_use_quantity + $2, updated_at = NOW()
            WHERE sku = $1
              AND in_use_quantity + $2 >= 0
              AND total_quantity - maintenance_quantity - (in_use_quantity + $2) >= 0
            "#,
        )
        .bind(sku)
        .bind(delta)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 软停用（存在资产引用时不做物理删除）
    pub async fn deactivate(&self, sku: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE stock_items SET active = FALSE, updated_at = NOW() WHERE sku = $1",
        )
        .bind(sku)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
