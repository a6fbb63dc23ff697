//! Memory Layer - In-Memory Storage
//!
//! 内存版仓储实现

mod project_repo;

pub use project_repo::InMemoryProjectRepository;
