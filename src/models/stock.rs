//! Stock catalog domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

/// 所有权类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ownership_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OwnershipType {
    /// 自有设备
    Owned,
    /// 外租设备
    Rented,
}

/// 目录条目（一个 SKU，可对应多台资产）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockItem {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit_weight_kg: f64,
    pub unit_volume_m3: f64,
    pub unit_value: f64,
    pub total_quantity: i32,
    pub maintenance_quantity: i32,
    pub in_use_quantity: i32,
    pub ownership: OwnershipType,
    pub rental_price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub dimensions: Option<String>,
    pub tags: Json<Vec<String>>,
    pub tech_specs: Json<HashMap<String, String>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// 可用数量 = 总量 - 维修中 - 使用中
    pub fn available_quantity(&self) -> i32 {
        self.total_quantity - self.maintenance_quantity - self.in_use_quantity
    }
}

/// 创建目录条目请求
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct CreateStockItemRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub unit_weight_kg: f64,
    #[validate(range(min = 0.0))]
    pub unit_volume_m3: f64,
    #[validate(range(min = 0.0))]
    pub unit_value: f64,
    /// 初始总量（按数量生成序列化资产）
    #[validate(range(min = 0))]
    pub initial_quantity: i32,
    pub ownership: OwnershipType,
    pub rental_price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub dimensions: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tech_specs: HashMap<String, String>,
}

/// 更新目录条目请求
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct UpdateStockItemRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub category: Option<String>,
    pub rental_price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub dimensions: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tech_specs: Option<HashMap<String, String>>,
}

/// 目录查询过滤器
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockListFilters {
    pub category: Option<String>,
    pub ownership: Option<OwnershipType>,
    pub active: Option<bool>,
    pub search: Option<String>, // 搜索 sku/name
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn sample_item() -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            sku: "LED-01".to_string(),
            name: "LED Par 64".to_string(),
            category: "lighting".to_string(),
            unit_weight_kg: 3.2,
            unit_volume_m3: 0.02,
            unit_value: 180.0,
            total_quantity: 10,
            maintenance_quantity: 2,
            in_use_quantity: 3,
            ownership: OwnershipType::Owned,
            rental_price: Some(15.0),
            purchase_price: None,
            dimensions: None,
            tags: Json(vec!["par".to_string()]),
            tech_specs: Json(HashMap::new()),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_available_quantity() {
        let item = sample_item();
        assert_eq!(item.available_quantity(), 5);
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateStockItemRequest {
            sku: "".to_string(),
            name: "LED Par 64".to_string(),
            category: "lighting".to_string(),
            unit_weight_kg: 3.2,
            unit_volume_m3: 0.02,
            unit_value: 180.0,
            initial_quantity: 4,
            ownership: OwnershipType::Owned,
            rental_price: None,
            purchase_price: None,
            dimensions: None,
            tags: vec![],
            tech_specs: HashMap::new(),
        };
        assert!(req.validate().is_err());
    }
}
