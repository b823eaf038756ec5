use super::{Ledger, LedgerError};
use crate::models::LedgerRow;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 内存台账: 本地运行与测试用
#[derive(Debug, Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<LedgerRow>>,
    clears: AtomicUsize,
    appends: AtomicUsize,
    fail_on_append: Option<usize>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 n 次 append (从 1 开始计) 返回错误, 用于模拟中途失败
    pub fn failing_on_append(n: usize) -> Self {
        Self {
            fail_on_append: Some(n),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<LedgerRow> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn append_calls(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn clear_range(&self, _range: &str) -> Result<(), LedgerError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| LedgerError::Unavailable("memory ledger lock poisoned".to_string()))?;
        rows.clear();
        Ok(())
    }

    async fn append_row(&self, row: &LedgerRow) -> Result<(), LedgerError> {
        let call = self.appends.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_append == Some(call) {
            return Err(LedgerError::Unavailable(format!(
                "injected failure on append #{}",
                call
            )));
        }
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| LedgerError::Unavailable("memory ledger lock poisoned".to_string()))?;
        rows.push(row.clone());
        Ok(())
    }
}
