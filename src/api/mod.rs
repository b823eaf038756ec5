pub mod handlers;

pub use handlers::{calculate, ping, root};

use crate::service::PricingCalculator;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// 构建路由
pub fn router(calculator: Arc<PricingCalculator>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ping", get(ping))
        .route("/calculate", post(calculate))
        .with_state(calculator)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
