use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};

const DEV_ADMIN_USERNAME: &str = "admin";
const DEV_ADMIN_EMAIL: &str = "admin@roms.com";
const DEV_ADMIN_PASSWORD: &str = "admin123";

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_PATH | <WORK_DIR>/roms.db | SQLite 文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | 控制台输出 JSON |
/// | EVENT_CHANNEL_CAPACITY | 1024 | 广播通道容量 |
/// | POLL_INTERVAL_SECS | 30 | 客户端兜底轮询间隔 |
/// | SEED_TABLE_COUNT | 10 | 启动时补齐的桌台数量 |
/// | SEED_TABLE_CAPACITY | 4 | 种子桌台座位数 |
/// | ADMIN_USERNAME / ADMIN_EMAIL / ADMIN_PASSWORD | 开发默认值 | 初始管理员，非开发环境必填 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/roms HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库和日志
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub event_channel_capacity: usize,
    pub poll_interval_secs: u64,
    pub seed_table_count: i64,
    pub seed_table_capacity: i32,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 开发环境下缺省值全部可用；其他环境必须显式提供管理员账号和 JWT 密钥。
    pub fn from_env() -> Result<Self> {
        let environment = env_or("ENVIRONMENT", "development");
        let development = environment == "development";
        let production = environment == "production";

        let work_dir = env_or("WORK_DIR", "./data");
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("roms.db")
                .to_string_lossy()
                .into_owned()
        });

        let admin = |key: &str, dev_default: &str| -> Result<String> {
            match std::env::var(key) {
                Ok(v) if !v.trim().is_empty() => Ok(v),
                _ if development => Ok(dev_default.into()),
                _ => Err(ServerError::Config(format!(
                    "{key} must be set outside development"
                ))),
            }
        };

        Ok(Self {
            database_path,
            http_port: env_parse("HTTP_PORT", 3000),
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_parse("LOG_JSON", false),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY", 1024),
            poll_interval_secs: env_parse("POLL_INTERVAL_SECS", 30),
            seed_table_count: env_parse("SEED_TABLE_COUNT", 10),
            seed_table_capacity: env_parse("SEED_TABLE_CAPACITY", 4),
            admin_username: admin("ADMIN_USERNAME", DEV_ADMIN_USERNAME)?,
            admin_email: admin("ADMIN_EMAIL", DEV_ADMIN_EMAIL)?,
            admin_password: admin("ADMIN_PASSWORD", DEV_ADMIN_PASSWORD)?,
            jwt: JwtConfig::from_env(production)?,
            work_dir,
            environment,
        })
    }

    /// 使用自定义值覆盖部分配置，不读取环境变量
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: PathBuf::from(&work_dir)
                .join("roms.db")
                .to_string_lossy()
                .into_owned(),
            work_dir,
            http_port,
            ..Self::default()
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 日志目录
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./data".into(),
            database_path: "./data/roms.db".into(),
            http_port: 3000,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            event_channel_capacity: crate::message::bus::DEFAULT_CHANNEL_CAPACITY,
            poll_interval_secs: 30,
            seed_table_count: 10,
            seed_table_capacity: 4,
            admin_username: DEV_ADMIN_USERNAME.into(),
            admin_email: DEV_ADMIN_EMAIL.into(),
            admin_password: DEV_ADMIN_PASSWORD.into(),
            jwt: JwtConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_place_database_under_work_dir() {
        let config = Config::with_overrides("/tmp/roms-test", 0);
        assert_eq!(config.http_port, 0);
        assert!(config.database_path.ends_with("roms.db"));
        assert!(config.database_path.starts_with("/tmp/roms-test"));
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/roms-test/logs"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.event_channel_capacity, 1024);
        assert_eq!(config.seed_table_count, 10);
    }
}
