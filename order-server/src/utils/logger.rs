//! Logging Infrastructure
//!
//! Structured logging setup for development and production.
//!
//! Features:
//! - Daily rotating application logs (`logs/app/`, deleted after 14 days)
//! - Permanent operator alert logs (`logs/operator/`, never deleted)
//!
//! Operator alerts are events with target `"operator"`, e.g. order number
//! allocation exhaustion.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days application logs are kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const APP_LOG_PREFIX: &str = "app";
const OPERATOR_LOG_PREFIX: &str = "operator";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn console_layer(level: &str, json_format: bool) -> BoxedLayer {
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(level_filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(level_filter(level))
            .boxed()
    }
}

fn file_layer(
    dir: &Path,
    prefix: &str,
    json_format: bool,
    filter: EnvFilter,
    operator_only: bool,
) -> BoxedLayer {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
    let target_filter = tracing_subscriber::filter::filter_fn(move |meta| {
        !operator_only || meta.target() == OPERATOR_LOG_PREFIX
    });

    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter)
            .with_filter(target_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter)
            .with_filter(target_filter)
            .boxed()
    }
}

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` takes precedence
/// * `json_format` - JSON output (production) or human readable (development)
/// * `log_dir` - Optional directory for file logging (e.g., Some("./work_dir/logs"))
///
/// Must be called from inside a tokio runtime when `log_dir` is set: the
/// cleanup task is spawned on it.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let mut layers = vec![console_layer(level, json_format)];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join(APP_LOG_PREFIX);
        let operator_log_dir = log_dir.join(OPERATOR_LOG_PREFIX);
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&operator_log_dir)?;

        layers.push(file_layer(
            &app_log_dir,
            APP_LOG_PREFIX,
            json_format,
            level_filter(level),
            false,
        ));
        layers.push(file_layer(
            &operator_log_dir,
            OPERATOR_LOG_PREFIX,
            json_format,
            EnvFilter::new("warn"),
            true,
        ));

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Delete application log files older than `keep_days` before `today`
///
/// Rotated files are named `app.YYYY-MM-DD`. Returns the number of deleted
/// files.
pub fn cleanup_old_logs(log_dir: &Path, today: NaiveDate, keep_days: i64) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join(APP_LOG_PREFIX);
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = today - chrono::Duration::days(keep_days);
    let mut deleted = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name
            .strip_prefix(APP_LOG_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            continue;
        };
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            deleted += 1;
        }
    }

    Ok(deleted)
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        let today = chrono::Local::now().date_naive();
        if let Err(e) = cleanup_old_logs(&log_dir, today, APP_LOG_RETENTION_DAYS) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}
