//! LogiScan 核心库
//! 活动租赁设备的扫描清单对账引擎：清单生成、扫码对账、完成联动与移动台账
//! 以进程内库的形式被宿主应用消费，不暴露网络协议

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod scan;
pub mod services;
pub mod telemetry;
