//! Order API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/checkout | POST | 结账，返回叫号与单杯订单号 |
//! | /api/orders | GET | 某日单杯订单 (`?date=&status=`) |
//! | /api/orders/stats | GET | 某日各状态数量 (`?date=`) |
//! | /api/orders/cursor | GET | 某日下一个叫号 (`?date=`) |
//! | /api/orders/cursor | PUT | 重置叫号游标 (游标失步修复) |
//! | /api/orders/{order_number} | GET | 单杯订单详情 |
//! | /api/orders/{order_number}/status | PUT | 状态流转 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/checkout", post(handler::checkout))
        .nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/cursor", get(handler::cursor).put(handler::reset_cursor))
        .route("/{order_number}", get(handler::get_by_number))
        .route("/{order_number}/status", put(handler::update_status))
}
