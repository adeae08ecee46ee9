//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 结账与订单管理接口

pub mod health;
pub mod orders;

use axum::Router;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// 组装完整路由
pub fn build_app(state: ServerState) -> Router {
    let max_connections = state.config.max_connections.max(1);

    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(ConcurrencyLimitLayer::new(max_connections)),
        )
        .with_state(state)
}
