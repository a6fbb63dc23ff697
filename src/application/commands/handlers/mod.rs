//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod project_handlers;

pub use project_handlers::*;
