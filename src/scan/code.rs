//! 扫码载荷解析
//! 支持三种形式：结构化 JSON 载荷、冒号分隔的旧格式 TYPE:ID[:EXTRA]、裸 SKU

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// 旧格式: TYPE:ID[:EXTRA]，TYPE 为字母开头的标识
static LEGACY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*):([^:]+)(?::(.*))?$").unwrap());

/// 结构化二维码载荷
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ScanPayload {
    pub version: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub sku: Option<String>,
    pub serial: Option<String>,
    /// 批量码：一枚码覆盖多个 SKU
    pub skus: Option<Vec<String>>,
}

/// 解析后的扫码内容
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCode {
    /// JSON 载荷
    Payload(ScanPayload),
    /// 冒号分隔旧格式
    Legacy {
        kind: String,
        id: String,
        extra: Option<String>,
    },
    /// 裸 SKU
    Sku(String),
}

impl ParsedCode {
    /// 明确的资产标识（若有）
    pub fn asset_tag(&self) -> Option<&str> {
        match self {
            ParsedCode::Payload(p) => p.id.as_deref(),
            // 旧格式里 SKU/SERIAL 前缀之外的 ID 一律按资产标识处理
            ParsedCode::Legacy { kind, id, .. } => {
                match kind.to_ascii_uppercase().as_str() {
                    "SKU" | "ITEM" | "SERIAL" | "SN" => None,
                    _ => Some(id.as_str()),
                }
            }
            ParsedCode::Sku(_) => None,
        }
    }

    /// SKU（若有）
    pub fn sku(&self) -> Option<&str> {
        match self {
            ParsedCode::Payload(p) => p.sku.as_deref(),
            ParsedCode::Legacy { kind, id, .. } => {
                match kind.to_ascii_uppercase().as_str() {
                    "SKU" | "ITEM" => Some(id.as_str()),
                    _ => None,
                }
            }
            ParsedCode::Sku(sku) => Some(sku.as_str()),
        }
    }

    /// 序列号（若有）
    pub fn serial(&self) -> Option<&str> {
        match self {
            ParsedCode::Payload(p) => p.serial.as_deref(),
            ParsedCode::Legacy { kind, id, .. } => {
                match kind.to_ascii_uppercase().as_str() {
                    "SERIAL" | "SN" => Some(id.as_str()),
                    _ => None,
                }
            }
            ParsedCode::Sku(_) => None,
        }
    }

    /// 批量码覆盖的 SKU 列表
    pub fn batch_skus(&self) -> Option<&[String]> {
        match self {
            ParsedCode::Payload(p) => p.skus.as_deref(),
            _ => None,
        }
    }
}

/// 解析一条解码后的扫码字符串
pub fn parse(raw: &str) -> ParsedCode {
    let trimmed = raw.trim();

    // JSON 载荷优先；解析失败则继续按旧格式/裸 SKU 处理
    if trimmed.contains('{') {
        if let Ok(payload) = serde_json::from_str::<ScanPayload>(trimmed) {
            return ParsedCode::Payload(payload);
        }
    }

    if let Some(caps) = LEGACY_RE.captures(trimmed) {
        return ParsedCode::Legacy {
            kind: caps[1].to_string(),
            id: caps[2].to_string(),
            extra: caps.get(3).map(|m| m.as_str().to_string()),
        };
    }

    ParsedCode::Sku(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_sku() {
        let parsed = parse("LED-01");
        assert_eq!(parsed, ParsedCode::Sku("LED-01".to_string()));
        assert_eq!(parsed.sku(), Some("LED-01"));
        assert_eq!(parsed.asset_tag(), None);
    }

    #[test]
    fn test_legacy_asset_code() {
        let parsed = parse("ASSET:LED-01-0001");
        assert_eq!(parsed.asset_tag(), Some("LED-01-0001"));
        assert_eq!(parsed.sku(), None);
    }

    #[test]
    fn test_legacy_with_extra_segment() {
        let parsed = parse("ASSET:LED-01-0001:rev2");
        match &parsed {
            ParsedCode::Legacy { extra, .. } => assert_eq!(extra.as_deref(), Some("rev2")),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_legacy_sku_and_serial_kinds() {
        assert_eq!(parse("SKU:CHR-01").sku(), Some("CHR-01"));
        assert_eq!(parse("sn:9F-113").serial(), Some("9F-113"));
        assert_eq!(parse("SKU:CHR-01").asset_tag(), None);
    }

    #[test]
    fn test_json_payload() {
        let parsed = parse(r#"{"version":1,"type":"asset","id":"A-0007","sku":"LED-01","serial":"SN99"}"#);
        assert_eq!(parsed.asset_tag(), Some("A-0007"));
        assert_eq!(parsed.sku(), Some("LED-01"));
        assert_eq!(parsed.serial(), Some("SN99"));
    }

    #[test]
    fn test_json_batch_payload() {
        let parsed = parse(r#"{"version":1,"type":"batch","skus":["LED-01","CHR-01"]}"#);
        let skus = parsed.batch_skus().unwrap();
        assert_eq!(skus, ["LED-01".to_string(), "CHR-01".to_string()]);
    }

    #[test]
    fn test_invalid_json_falls_back_to_sku() {
        let parsed = parse("{not-json");
        assert_eq!(parsed, ParsedCode::Sku("{not-json".to_string()));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(parse("  LED-01  ").sku(), Some("LED-01"));
    }
}
