//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET   健康检查
//! - /api/project/create            POST  从 JSON 请求体创建项目
//! - /api/project/upload            POST  上传 JSON 文档创建项目（multipart）
//! - /api/project/validate          POST  只校验文档
//! - /api/project/get               POST  获取项目详情
//! - /api/project/list              GET   列出所有项目
//! - /api/project/delete            POST  删除项目
//! - /api/project/assign_voice      POST  分配或清除角色音色
//! - /api/project/voice_settings    POST  修改角色音色参数
//! - /api/project/move_character    POST  调整角色顺序
//! - /api/project/remove_character  POST  删除未被引用的角色

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/project", project_routes())
}

/// Project 路由
fn project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_project))
        .route("/upload", post(handlers::upload_project))
        .route("/validate", post(handlers::validate_document))
        .route("/get", post(handlers::get_project))
        .route("/list", get(handlers::list_projects))
        .route("/delete", post(handlers::delete_project))
        .route("/assign_voice", post(handlers::assign_voice))
        .route("/voice_settings", post(handlers::update_voice_setting))
        .route("/move_character", post(handlers::move_character))
        .route("/remove_character", post(handlers::remove_character))
}
