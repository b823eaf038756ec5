use crate::ledger::LedgerError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 计价请求错误
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求体不合法, 未触碰台账
    #[error("Validation error: {0}")]
    Validation(String),

    /// 台账调用失败; 已写入的行不会回滚
    #[error("External store error after {rows_written} row(s): {source}")]
    ExternalStore {
        rows_written: usize,
        #[source]
        source: LedgerError,
    },
}

impl AppError {
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::ExternalStore { .. } => "external_store_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ExternalStore { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "type": self.error_type(),
            "message": self.to_string(),
        });
        if let Self::ExternalStore { rows_written, .. } = &self {
            error["rows_written"] = json!(rows_written);
        }

        (self.status_code(), Json(json!({ "ok": false, "error": error }))).into_response()
    }
}
