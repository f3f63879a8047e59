//! 日志与追踪系统
//! 初始化结构化日志；宿主应用已有 subscriber 时不要调用

use crate::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 初始化日志与追踪系统
pub fn init_telemetry(config: &AppConfig) {
    // 从环境变量构建过滤器，缺省回落到配置的级别
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // 根据配置选择日志格式
    let log_layer = match config.logging.format.to_lowercase().as_str() {
        "json" => {
            // JSON 格式（生产环境）
            tracing_subscriber::fmt::layer().json().with_target(false).boxed()
        }
        _ => {
            // 美化格式（开发环境）
            tracing_subscriber::fmt::layer().pretty().with_target(false).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.logging.level,
        format = %config.logging.format,
        "Telemetry initialized"
    );
}

/// 初始化指标收集器
/// 指标在首次使用时自动创建，embedder 负责安装 recorder
pub fn init_metrics() {
    tracing::debug!("Metrics initialized");
}
