use super::{Ledger, LedgerError};
use crate::config::SheetsConfig;
use crate::models::{decimal, LedgerRow};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

/// bearer token 来源
///
/// Google OAuth access token 约一小时过期。`Static` 适合短期运行或测试;
/// 长期运行的服务应配置 `File`, 由外部刷新程序定期覆盖该文件,
/// 每次请求前都会重新读取。
#[derive(Debug, Clone)]
enum TokenSource {
    Static(String),
    File(PathBuf),
}

/// Google Sheets 台账 (Sheets API v4)
///
/// 进程启动时建立一次, 所有请求共用同一个 client。
/// token 的获取 (service account 换取) 在进程外完成。
pub struct SheetsLedger {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: TokenSource,
}

impl SheetsLedger {
    pub fn new(config: &SheetsConfig, timeout: Duration) -> Result<Self, LedgerError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .ok_or_else(|| LedgerError::Unavailable("spreadsheet id is not configured".to_string()))?;
        // 文件优先: 配置了刷新文件时忽略静态 token
        let token = match (&config.access_token_file, &config.access_token) {
            (Some(path), _) => TokenSource::File(PathBuf::from(path)),
            (None, Some(token)) => TokenSource::Static(token.clone()),
            (None, None) => {
                return Err(LedgerError::Unavailable(
                    "sheets access token is not configured".to_string(),
                ))
            }
        };

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
            sheet_name: config.sheet_name.clone(),
            token,
        })
    }

    async fn access_token(&self) -> Result<String, LedgerError> {
        match &self.token {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::File(path) => {
                let token = tokio::fs::read_to_string(path).await?.trim().to_string();
                if token.is_empty() {
                    return Err(LedgerError::Unavailable(format!(
                        "sheets token file {} is empty",
                        path.display()
                    )));
                }
                Ok(token)
            }
        }
    }

    /// "A2:G" -> "Sheet1!A2:G"; 已带工作表名的范围原样返回
    fn qualify(&self, range: &str) -> String {
        if range.contains('!') {
            range.to_string()
        } else {
            format!("{}!{}", self.sheet_name, range)
        }
    }

    fn values_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}/values", self.base_url, self.spreadsheet_id)
    }

    async fn check(response: Response) -> Result<(), LedgerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(LedgerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Ledger for SheetsLedger {
    fn backend(&self) -> &'static str {
        "sheets"
    }

    async fn clear_range(&self, range: &str) -> Result<(), LedgerError> {
        let url = format!("{}:batchClear", self.values_url());
        let token = self.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "ranges": [self.qualify(range)] }))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn append_row(&self, row: &LedgerRow) -> Result<(), LedgerError> {
        let url = format!("{}/{}:append", self.values_url(), self.sheet_name);
        let values = [&row.width, &row.height, &row.area, &row.billable_area]
            .map(decimal::to_f64);
        let token = self.access_token().await?;
        let response = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({ "values": [values] }))
            .send()
            .await?;
        Self::check(response).await
    }
}
