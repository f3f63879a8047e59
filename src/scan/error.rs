//! 扫描结果分类
//! 操作员可恢复的拒绝、数据一致性违例与基础设施失败分开建模

use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::asset::Asset;

/// 扫描引擎错误类型
#[derive(Debug, Error)]
pub enum ScanError {
    // ==================== 操作员可恢复 ====================
    /// 扫码未命中任何资产或 SKU
    #[error("No asset matches code: {code}")]
    AssetNotFound { code: String },

    /// 资产的 SKU 不在本清单的任何行项目中
    #[error("Asset {asset_tag} (sku {sku}) is not expected on this list")]
    AssetNotExpected { asset_tag: String, sku: String },

    /// 资产已被记录过，或对应行项目（乃至整份清单）已完成
    #[error("Asset {asset_tag} has already been scanned")]
    AssetAlreadyScanned { asset_tag: String },

    /// 同一 SKU 命中多台候选资产，需要调用方明确选择
    #[error("Multiple assets match sku {sku}, explicit selection required")]
    AmbiguousMatch { sku: String, candidates: Vec<Asset> },

    /// 两次扫描间隔低于节流下限，未做任何状态变更
    #[error("Scan rejected: minimum interval is {min_interval_ms} ms")]
    TooFast { min_interval_ms: u64 },

    // ==================== 清单/活动前置条件 ====================
    #[error("Scan list not found: {0}")]
    ListNotFound(Uuid),

    #[error("Scan list is cancelled: {0}")]
    ListCancelled(Uuid),

    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Quote is not finalized")]
    QuoteNotFinalized,

    #[error("Event has no quote line items")]
    NoQuoteItems,

    #[error("Event has no assigned truck")]
    TruckNotAssigned,

    // ==================== 数据一致性 ====================
    /// 不变量被破坏时拒绝变更，绝不静默修正
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    // ==================== 基础设施 ====================
    #[error("Persistence failure: {0}")]
    Persistence(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ScanError {
    /// 操作员重新扫描即可恢复的拒绝（无任何状态变更）
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            ScanError::AssetNotFound { .. }
                | ScanError::AssetNotExpected { .. }
                | ScanError::AssetAlreadyScanned { .. }
                | ScanError::AmbiguousMatch { .. }
                | ScanError::TooFast { .. }
        )
    }

    /// 获取稳定错误码（供上层分类处理与指标标签）
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            ScanError::AssetNotExpected { .. } => "ASSET_NOT_EXPECTED",
            ScanError::AssetAlreadyScanned { .. } => "ASSET_ALREADY_SCANNED",
            ScanError::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            ScanError::TooFast { .. } => "TOO_FAST",
            ScanError::ListNotFound(_) => "LIST_NOT_FOUND",
            ScanError::ListCancelled(_) => "LIST_CANCELLED",
            ScanError::EventNotFound(_) => "EVENT_NOT_FOUND",
            ScanError::QuoteNotFinalized => "QUOTE_NOT_FINALIZED",
            ScanError::NoQuoteItems => "NO_QUOTE_ITEMS",
            ScanError::TruckNotAssigned => "TRUCK_NOT_ASSIGNED",
            ScanError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            ScanError::Persistence(_) => "PERSISTENCE_ERROR",
            ScanError::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_recoverable_classification() {
        assert!(ScanError::AssetNotFound { code: "X".to_string() }.is_user_recoverable());
        assert!(ScanError::TooFast { min_interval_ms: 1000 }.is_user_recoverable());
        assert!(!ScanError::InvariantViolation("x".to_string()).is_user_recoverable());
        assert!(!ScanError::NoQuoteItems.is_user_recoverable());
        assert!(!ScanError::Database(sqlx::Error::RowNotFound).is_user_recoverable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ScanError::AssetAlreadyScanned { asset_tag: "A1".to_string() }.code(),
            "ASSET_ALREADY_SCANNED"
        );
        assert_eq!(ScanError::TooFast { min_interval_ms: 1000 }.code(), "TOO_FAST");
        assert_eq!(ScanError::NoQuoteItems.code(), "NO_QUOTE_ITEMS");
    }
}
