//! Audiobook Studio
//!
//! - Domain: audiobook/ (Bounded Context)
//! - Application: commands, queries, ports
//! - Infrastructure: http, memory, persistence

use std::sync::Arc;

use audiobook_studio::application::ProjectRepositoryPort;
use audiobook_studio::config::{load_config, print_config, AppConfig};
use audiobook_studio::domain::audiobook::ReferentialValidator;
use audiobook_studio::infrastructure::http::{AppState, HttpServer, ServerConfig};
use audiobook_studio::infrastructure::memory::InMemoryProjectRepository;
use audiobook_studio::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteProjectRepository,
};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},audiobook_studio={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Audiobook Studio v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 初始化仓储：`:memory:` 使用内存仓储，否则使用 SQLite
    let project_repo: Arc<dyn ProjectRepositoryPort> = if config.database.is_in_memory() {
        tracing::warn!("Using in-memory project repository, data is lost on exit");
        Arc::new(InMemoryProjectRepository::new())
    } else {
        if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let db_config =
            DatabaseConfig::new(&config.database.path, config.database.max_connections);
        let pool = create_pool(&db_config).await?;
        run_migrations(&pool).await?;
        Arc::new(SqliteProjectRepository::new(pool))
    };

    let validator = ReferentialValidator::new(config.validation.rules());
    let state = AppState::new(project_repo, validator);

    let server_config = ServerConfig::new(
        &config.server.host,
        config.server.port,
        config.server.max_upload_size,
    );
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
