pub mod csv_file;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod sheets;

pub use csv_file::CsvLedger;
pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use postgres::{create_pool, PgLedger};
pub use sheets::SheetsLedger;

use crate::config::{LedgerBackend, LedgerConfig};
use crate::models::LedgerRow;
use async_trait::async_trait;
use std::sync::Arc;

/// 外部台账: 只追加, 支持按范围清空 (表头保留)
#[async_trait]
pub trait Ledger: Send + Sync {
    /// 后端名称, 用于日志
    fn backend(&self) -> &'static str;

    /// 清空数据区
    async fn clear_range(&self, range: &str) -> Result<(), LedgerError>;

    /// 追加一行到下一个空位置
    async fn append_row(&self, row: &LedgerRow) -> Result<(), LedgerError>;
}

/// 按配置建立台账连接, 进程内只调用一次
pub async fn connect_ledger(config: &LedgerConfig) -> Result<Arc<dyn Ledger>, LedgerError> {
    let ledger: Arc<dyn Ledger> = match config.backend {
        LedgerBackend::Sheets => Arc::new(SheetsLedger::new(&config.sheets, config.timeout())?),
        LedgerBackend::Postgres => {
            let pool = create_pool(&config.database.url).await?;
            Arc::new(PgLedger::new(pool))
        }
        LedgerBackend::Csv => Arc::new(CsvLedger::new(&config.csv.path)),
        LedgerBackend::Memory => Arc::new(MemoryLedger::new()),
    };
    tracing::info!("Ledger backend ready: {}", ledger.backend());
    Ok(ledger)
}
