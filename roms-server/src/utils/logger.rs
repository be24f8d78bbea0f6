//! Logging Infrastructure
//!
//! - Console output, pretty in development and JSON when requested
//! - Daily rotating application logs under `<log_dir>/app` (deleted after 14 days)
//! - Security logs under `<log_dir>/security` (never deleted)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Application logs older than this are removed
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Clean up application log files (`app.YYYY-MM-DD.log`) older than 14 days
///
/// Returns the number of deleted files.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name
            .strip_prefix("app.")
            .and_then(|d| d.strip_suffix(".log"))
        else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

fn file_layer(
    dir: &Path,
    prefix: &str,
    json_format: bool,
    filter: fn(&tracing::Metadata<'_>) -> bool,
) -> anyhow::Result<BoxedLayer> {
    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)?;

    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender));

    let filter = tracing_subscriber::filter::filter_fn(filter);
    Ok(if json_format {
        layer.json().with_current_span(true).with_filter(filter).boxed()
    } else {
        layer.with_filter(filter).boxed()
    })
}

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set. With `log_dir` the application and
/// security streams are also written to daily files and an hourly cleanup task
/// is spawned, so this must run inside a tokio runtime in that case.
///
/// ```no_run
/// // Development setup (console only)
/// roms_server::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// roms_server::init_logger_with_file("info", true, Some("./data/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console
    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    }

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        layers.push(file_layer(&log_dir.join("app"), "app", json_format, |meta| {
            meta.target() != "security"
        })?);
        layers.push(file_layer(
            &log_dir.join("security"),
            "security",
            json_format,
            |meta| meta.target() == "security",
        )?);

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// 每小时清理一次过期日志
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Security log helper - records auth failures and denied operations
///
/// Written to the `security` target, which lands in `security.YYYY-MM-DD.log`
/// when file logging is enabled.
///
/// ```ignore
/// use roms_server::security_log;
///
/// security_log!(WARN, "auth_failed", email = "a@b.c", reason = "invalid_password");
/// security_log!(WARN, "status_forbidden", user_id = 3, target_status = "preparing");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        fs::create_dir_all(&app_dir).unwrap();

        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(APP_LOG_RETENTION_DAYS + 1);
        let old_file = app_dir.join(format!("app.{}.log", old.format("%Y-%m-%d")));
        let fresh_file = app_dir.join(format!("app.{}.log", today.format("%Y-%m-%d")));
        let foreign_file = app_dir.join("notes.txt");
        for f in [&old_file, &fresh_file, &foreign_file] {
            fs::write(f, "x").unwrap();
        }

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert!(!old_file.exists());
        assert!(fresh_file.exists());
        assert!(foreign_file.exists());
    }

    #[test]
    fn test_cleanup_without_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
    }
}
