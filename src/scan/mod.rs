//! 扫描对账引擎核心
//! 纯状态机逻辑：载荷解析、方向映射、对账推进、节流
//! 持久化编排见 `services::scan_service`

pub mod code;
pub mod direction;
pub mod error;
pub mod reconcile;
pub mod throttle;

pub use error::ScanError;

/// 同一 SKU 命中多台候选资产时的选择策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPolicy {
    /// 返回 AmbiguousMatch，由调用方明确选择后按 asset_tag 重扫
    Explicit,
    /// 自动选择第一台符合方向要求的资产
    FirstAvailable,
}
