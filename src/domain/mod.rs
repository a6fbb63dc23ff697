//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Audiobook Context: 有声书文档、校验与项目管理

pub mod audiobook;
