//! 目录解析服务
//! 把一条解码后的扫码字符串解析成零台、一台或多台候选资产

use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::models::asset::Asset;
use crate::repository::AssetRepository;
use crate::scan::code;

/// 命中方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    /// 资产标识（或序列号）精确命中，至多一台
    Id,
    /// SKU 命中，每台序列化设备一条
    Sku,
}

/// 解析结果；候选为空不是错误，由引擎决定如何上报
#[derive(Debug, Clone)]
pub struct Resolution {
    pub candidates: Vec<Asset>,
    pub matched_by: MatchedBy,
}

pub struct CatalogService {
    db: PgPool,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 解析扫码字符串
    /// 查找顺序：资产标识 → SKU → 序列号；裸码先按资产标识试、再按 SKU 试
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw_code: &str) -> Result<Resolution, AppError> {
        let parsed = code::parse(raw_code);
        let repo = AssetRepository::new(self.db.clone());

        let tag_candidate = parsed.asset_tag().or(match &parsed {
            code::ParsedCode::Sku(s) => Some(s.as_str()),
            _ => None,
        });
        if let Some(tag) = tag_candidate {
            if let Some(asset) = repo.get_by_tag(tag).await? {
                debug!(asset_tag = tag, "Resolved by asset tag");
                return Ok(Resolution {
                    candidates: vec![asset],
                    matched_by: MatchedBy::Id,
                });
            }
        }

        if let Some(sku) = parsed.sku() {
            let candidates = repo.list_by_sku(sku).await?;
            if !candidates.is_empty() {
                debug!(sku = sku, count = candidates.len(), "Resolved by sku");
                return Ok(Resolution {
                    candidates,
                    matched_by: MatchedBy::Sku,
                });
            }
        }

        if let Some(serial) = parsed.serial() {
            if let Some(asset) = repo.get_by_serial(serial).await? {
                debug!(serial = serial, "Resolved by serial number");
                return Ok(Resolution {
                    candidates: vec![asset],
                    matched_by: MatchedBy::Id,
                });
            }
        }

        debug!("Code did not resolve to any asset");
        let matched_by = if parsed.asset_tag().is_some() {
            MatchedBy::Id
        } else {
            MatchedBy::Sku
        };
        Ok(Resolution {
            candidates: Vec::new(),
            matched_by,
        })
    }
}
