use roms_server::db::seed;
use roms_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env()?;

    // 3. 日志 (控制台 + 按天滚动文件)
    let logs_dir = config.logs_dir();
    std::fs::create_dir_all(&logs_dir)?;
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        Some(&logs_dir.to_string_lossy()),
    )?;

    print_banner();
    tracing::info!(environment = %config.environment, "🍽 ROMS server starting...");

    // 4. 初始化服务器状态并写入种子数据
    let state = ServerState::initialize(&config).await?;
    seed::run(&state.db.pool, &config).await?;

    // 5. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
