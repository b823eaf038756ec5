use super::{Ledger, LedgerError};
use crate::models::LedgerRow;
use async_trait::async_trait;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// CSV 文件台账: 第一行为表头, 之后每件一行
pub struct CsvLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(file: File) -> Result<(), LedgerError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(LedgerRow::HEADER)?;
        writer.flush()?;
        Ok(())
    }

    fn truncate(path: &Path) -> Result<(), LedgerError> {
        Self::write_header(File::create(path)?)
    }

    fn append_record(path: &Path, record: &[String]) -> Result<(), LedgerError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() == 0 {
            Self::write_header(file.try_clone()?)?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(record)?;
        writer.flush()?;
        Ok(())
    }

    /// 文件读写放到阻塞线程池执行, 锁在整个写入期间保持
    async fn run_blocking<F>(&self, job: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&Path) -> Result<(), LedgerError> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || job(&path))
            .await
            .map_err(|e| LedgerError::Unavailable(format!("csv writer task failed: {}", e)))?
    }
}

#[async_trait]
impl Ledger for CsvLedger {
    fn backend(&self) -> &'static str {
        "csv"
    }

    /// 截断为仅剩表头
    async fn clear_range(&self, range: &str) -> Result<(), LedgerError> {
        tracing::debug!("清空 CSV 台账 {} (range {})", self.path.display(), range);
        self.run_blocking(Self::truncate).await
    }

    async fn append_row(&self, row: &LedgerRow) -> Result<(), LedgerError> {
        let record = row.to_record();
        self.run_blocking(move |path| Self::append_record(path, &record)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decimal::from_f64;

    fn row(width: f64, height: f64) -> LedgerRow {
        let area = from_f64(width * height).unwrap();
        LedgerRow {
            width: from_f64(width).unwrap(),
            height: from_f64(height).unwrap(),
            billable_area: area.clone(),
            area,
        }
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::new(dir.path().join("ledger.csv"));

        ledger.append_row(&row(2.0, 1.0)).await.unwrap();
        ledger.append_row(&row(3.0, 1.0)).await.unwrap();

        let content = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content, "width,height,area,moq_area\n2,1,2,2\n3,1,3,3\n");
    }

    #[tokio::test]
    async fn test_clear_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::new(dir.path().join("ledger.csv"));

        ledger.append_row(&row(2.0, 1.0)).await.unwrap();
        ledger.clear_range("A2:G").await.unwrap();

        let content = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content, "width,height,area,moq_area\n");

        ledger.append_row(&row(2.5, 1.0)).await.unwrap();
        let content = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content, "width,height,area,moq_area\n2.5,1,2.5,2.5\n");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_concurrent_appends_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = std::sync::Arc::new(CsvLedger::new(dir.path().join("ledger.csv")));

        let writers: Vec<_> = (1..=4)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.append_row(&row(i as f64, 1.0)).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(ledger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "width,height,area,moq_area");
    }
}
