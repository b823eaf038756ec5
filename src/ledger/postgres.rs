use super::{Ledger, LedgerError};
use crate::models::LedgerRow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// 创建数据库连接池
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut connect_options = PgConnectOptions::from_str(database_url)?;

    // 设置慢查询日志阈值为 5秒
    connect_options = connect_options.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(5),
    );

    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
}

/// PostgreSQL 台账
///
/// 表结构需预先创建:
///
/// ```sql
/// CREATE TABLE t_panel_ledger (
///     fid         BIGSERIAL PRIMARY KEY,
///     fwidth      NUMERIC NOT NULL,
///     fheight     NUMERIC NOT NULL,
///     farea       NUMERIC NOT NULL,
///     fmoqarea    NUMERIC NOT NULL,
///     frecordtime TIMESTAMPTZ NOT NULL
/// );
/// ```
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    /// 表没有"单元格范围"的概念, 清空即删除全部数据行
    async fn clear_range(&self, range: &str) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM t_panel_ledger")
            .execute(&self.pool)
            .await?;
        tracing::info!(
            "清空台账 t_panel_ledger (range {} 不适用), 删除 {} 行",
            range,
            result.rows_affected()
        );
        Ok(())
    }

    async fn append_row(&self, row: &LedgerRow) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO t_panel_ledger (fwidth, fheight, farea, fmoqarea, frecordtime)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&row.width)
        .bind(&row.height)
        .bind(&row.area)
        .bind(&row.billable_area)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
