use crate::orders::DatePrefix;
use crate::utils::time::parse_timezone;
use crate::weather::{
    FALLBACK_STATUS, FallbackWeather, StaticWeather, WeatherProvider, WeatherReading,
    classify_weather,
};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (orders.redb, logs/) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | TIMEZONE | Asia/Taipei | 业务时区 |
/// | STORAGE_TIMEOUT_MS | 3000 | 单次存储操作超时(毫秒) |
/// | ORDER_NUMBER_YEAR_PREFIX | false | 订单号使用 YYYYMMDD 前缀 |
/// | WEATHER_STATUS | - | 固定天气 (sunny/cloudy/rainy/stormy 或气象署描述, 如 晴時多雲) |
/// | WEATHER_TEMPERATURE | - | 固定气温 |
/// | MAX_CONNECTIONS | 1000 | 最大并发请求数 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/shop HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    /// 业务时区 (订单日期、叫号按此时区切日)
    pub timezone: Tz,
    /// 单次存储操作超时 (毫秒)
    pub storage_timeout_ms: u64,
    /// 订单号是否带年份
    pub order_number_year_prefix: bool,
    /// 天气描述原文，启动时经 `classify_weather` 归类
    pub weather_status: Option<String>,
    pub weather_temperature: Option<f64>,
    /// 最大并发请求数
    pub max_connections: usize,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            timezone: std::env::var("TIMEZONE")
                .map(|tz| parse_timezone(&tz))
                .unwrap_or(crate::utils::time::DEFAULT_TIMEZONE),
            storage_timeout_ms: env_parse("STORAGE_TIMEOUT_MS").unwrap_or(3000),
            order_number_year_prefix: env_parse("ORDER_NUMBER_YEAR_PREFIX").unwrap_or(false),
            weather_status: std::env::var("WEATHER_STATUS")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            weather_temperature: env_parse("WEATHER_TEMPERATURE"),
            max_connections: env_parse("MAX_CONNECTIONS").unwrap_or(1000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS").unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    pub fn date_prefix(&self) -> DatePrefix {
        if self.order_number_year_prefix {
            DatePrefix::YearMonthDay
        } else {
            DatePrefix::MonthDay
        }
    }

    /// 天气来源：任一项配置即使用固定值，缺失项取默认
    pub fn weather_provider(&self) -> Arc<dyn WeatherProvider> {
        if self.weather_status.is_none() && self.weather_temperature.is_none() {
            return Arc::new(FallbackWeather);
        }
        let fallback = WeatherReading::default();
        let status = match self.weather_status.as_deref() {
            Some(description) => classify_weather(description).unwrap_or_else(|| {
                tracing::warn!(
                    weather = %description,
                    fallback = %FALLBACK_STATUS,
                    "Unknown WEATHER_STATUS, using fallback"
                );
                FALLBACK_STATUS
            }),
            None => fallback.status,
        };
        Arc::new(StaticWeather(WeatherReading {
            status,
            temperature: self.weather_temperature.unwrap_or(fallback.temperature),
        }))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::WeatherStatus;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/shop", 18080);
        assert_eq!(config.work_dir, "/tmp/shop");
        assert_eq!(config.http_port, 18080);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/shop/orders.redb")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/shop/logs"));
    }

    #[test]
    fn test_date_prefix_switch() {
        let mut config = Config::with_overrides("/tmp/shop", 18080);
        config.order_number_year_prefix = false;
        assert_eq!(config.date_prefix(), DatePrefix::MonthDay);
        config.order_number_year_prefix = true;
        assert_eq!(config.date_prefix(), DatePrefix::YearMonthDay);
    }

    #[test]
    fn test_weather_provider_selection() {
        let mut config = Config::with_overrides("/tmp/shop", 18080);
        config.weather_status = None;
        config.weather_temperature = None;
        assert_eq!(config.weather_provider().current(), WeatherReading::default());

        config.weather_status = Some("cloudy".to_string());
        let reading = config.weather_provider().current();
        assert_eq!(reading.status, WeatherStatus::Cloudy);
        assert_eq!(reading.temperature, 25.0);
    }

    #[test]
    fn test_weather_status_accepts_forecast_wording() {
        let mut config = Config::with_overrides("/tmp/shop", 18080);
        config.weather_temperature = Some(31.5);

        config.weather_status = Some("多雲時陰有短暫雨".to_string());
        assert_eq!(config.weather_provider().current().status, WeatherStatus::Cloudy);

        config.weather_status = Some("雷陣雨".to_string());
        assert_eq!(config.weather_provider().current().status, WeatherStatus::Rainy);

        // 无法归类时回退 sunny
        config.weather_status = Some("颱風".to_string());
        let reading = config.weather_provider().current();
        assert_eq!(reading.status, WeatherStatus::Sunny);
        assert_eq!(reading.temperature, 31.5);
    }
}
