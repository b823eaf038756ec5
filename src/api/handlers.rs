use crate::error::AppError;
use crate::models::{OrderBatch, PricingResult};
use crate::service::PricingCalculator;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// 计价响应体
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub result: PricingResult,
}

/// 运行状态
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Blinds pricing API is running" }))
}

/// 健康检查
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "pong" }))
}

/// 计价接口: 计算面积与金额, 并逐件写入台账
pub async fn calculate(
    State(calculator): State<Arc<PricingCalculator>>,
    payload: Result<Json<OrderBatch>, JsonRejection>,
) -> Response {
    let batch = match payload {
        Ok(Json(batch)) => batch,
        Err(rejection) => {
            tracing::warn!("Rejected /calculate payload: {}", rejection.body_text());
            return AppError::from(rejection).into_response();
        }
    };

    match calculator.compute(&batch).await {
        Ok(result) => {
            let response = CalculateResponse { ok: true, result };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
