//! Canonical enumerations for drink orders
//!
//! Every enum serializes to its canonical lower-case code (`full`, `no_ice`,
//! `pending`, ...). These codes are what gets persisted and what the admin
//! backend filters on.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Cup Size
// ============================================================================

/// 杯型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Size {
    /// 大杯
    Large,
    /// 小杯
    #[default]
    Small,
}

impl Size {
    pub const fn code(&self) -> &'static str {
        match self {
            Size::Large => "LARGE",
            Size::Small => "SMALL",
        }
    }
}

// ============================================================================
// Sugar Level
// ============================================================================

/// 甜度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SugarLevel {
    /// 全糖
    Full,
    /// 七分糖
    Seventy,
    /// 半糖
    Half,
    /// 微糖
    Light,
    /// 無糖
    Free,
}

impl SugarLevel {
    pub const ALL: [SugarLevel; 5] = [
        SugarLevel::Full,
        SugarLevel::Seventy,
        SugarLevel::Half,
        SugarLevel::Light,
        SugarLevel::Free,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            SugarLevel::Full => "full",
            SugarLevel::Seventy => "seventy",
            SugarLevel::Half => "half",
            SugarLevel::Light => "light",
            SugarLevel::Free => "free",
        }
    }

    /// Parse an exact canonical code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }
}

// ============================================================================
// Ice Level
// ============================================================================

/// 冰量 / 温度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IceLevel {
    /// 正常冰
    Iced,
    /// 少冰
    Less,
    /// 微冰
    Light,
    /// 去冰
    NoIce,
    /// 熱飲
    Hot,
    /// 常溫
    Room,
}

impl IceLevel {
    pub const ALL: [IceLevel; 6] = [
        IceLevel::Iced,
        IceLevel::Less,
        IceLevel::Light,
        IceLevel::NoIce,
        IceLevel::Hot,
        IceLevel::Room,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            IceLevel::Iced => "iced",
            IceLevel::Less => "less",
            IceLevel::Light => "light",
            IceLevel::NoIce => "no_ice",
            IceLevel::Hot => "hot",
            IceLevel::Room => "room",
        }
    }

    /// Parse an exact canonical code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }
}

// ============================================================================
// Weather
// ============================================================================

/// 下单时的天气分类
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherStatus {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
}

impl WeatherStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            WeatherStatus::Sunny => "sunny",
            WeatherStatus::Cloudy => "cloudy",
            WeatherStatus::Rainy => "rainy",
            WeatherStatus::Stormy => "stormy",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "sunny" => Some(WeatherStatus::Sunny),
            "cloudy" => Some(WeatherStatus::Cloudy),
            "rainy" => Some(WeatherStatus::Rainy),
            "stormy" => Some(WeatherStatus::Stormy),
            _ => None,
        }
    }
}

// ============================================================================
// Order Status
// ============================================================================

/// Unit order status
///
/// Transitions only move forward:
///
/// ```text
/// PENDING ──▶ PROCESSING ──▶ COMPLETED
///    │             │
///    └──────┬──────┘
///           ▼
///       CANCELLED
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Terminal states accept no further transition
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `self -> to` is an allowed forward transition
    pub const fn can_transition_to(&self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }
}

macro_rules! impl_display_code {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.code())
                }
            }
        )*
    };
}

impl_display_code!(Size, SugarLevel, IceLevel, WeatherStatus, OrderStatus);
