//! Audiobook Studio - 有声书制作后端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audiobook Context: 有声书文档、字段检查、引用校验、项目聚合
//!
//! 应用层 (application/):
//! - Ports: ProjectRepository
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: JSON API
//! - Persistence: SQLite 存储
//! - Memory: 内存仓储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
