//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod project_repo;

pub use database::*;
pub use project_repo::*;
