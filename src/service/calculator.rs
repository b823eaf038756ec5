use super::rules::PricingRules;
use crate::error::AppError;
use crate::ledger::{Ledger, LedgerError};
use crate::models::decimal::{from_f64, to_f64};
use crate::models::{LedgerRow, OrderBatch, PricingResult};
use bigdecimal::{BigDecimal, Zero};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// 计价服务
///
/// 每件展开为一行并逐行同步追加到台账, 行数与总件数成正比。
/// 这是台账的数据约定 (一件一行), 不合并为带倍数的单行。
pub struct PricingCalculator {
    ledger: Arc<dyn Ledger>,
    rules: PricingRules,
    clear_range: String,
    store_timeout: Duration,
    max_pieces: u64,
}

impl PricingCalculator {
    pub fn new(ledger: Arc<dyn Ledger>, rules: PricingRules) -> Self {
        Self {
            ledger,
            rules,
            clear_range: "A2:G".to_string(),
            store_timeout: Duration::from_secs(15),
            max_pieces: 1000,
        }
    }

    /// 单个批次展开后的件数上限
    pub fn with_max_pieces(mut self, max_pieces: u64) -> Self {
        self.max_pieces = max_pieces;
        self
    }

    pub fn with_clear_range(mut self, range: impl Into<String>) -> Self {
        self.clear_range = range.into();
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// 计价并写入台账
    ///
    /// 校验失败时不触碰台账; 台账失败时中止剩余行, 已写入的行保留。
    pub async fn compute(&self, batch: &OrderBatch) -> Result<PricingResult, AppError> {
        // 1. 校验 (任何写入之前)
        let total_pieces = batch.validate(self.max_pieces).map_err(AppError::Validation)?;
        let items = batch
            .items
            .iter()
            .map(|item| match (from_f64(item.width), from_f64(item.height)) {
                (Some(w), Some(h)) => Ok((item, w, h)),
                _ => Err(AppError::Validation(format!(
                    "invalid dimensions {} x {}",
                    item.width, item.height
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let record = !batch.dry_run;
        tracing::info!(
            "开始计价: {} 个规格, {} 件, clear={}, dry_run={}, ledger={}",
            items.len(),
            total_pieces,
            batch.clear_first,
            batch.dry_run,
            self.ledger.backend()
        );

        // 2. 清空旧数据
        if record && batch.clear_first {
            tracing::warn!("清空台账数据区 {}", self.clear_range);
            self.call_store(self.ledger.clear_range(&self.clear_range))
                .await
                .map_err(|source| {
                    tracing::error!("✗ 清空台账失败: {}", source);
                    AppError::ExternalStore {
                        rows_written: 0,
                        source,
                    }
                })?;
        }

        // 3. 逐件计算并追加
        let mut lines: Vec<LedgerRow> = Vec::new();
        let mut total_billable_area = 0.0_f64;

        for (idx, (item, width, height)) in items.iter().enumerate() {
            let pieces = item.pieces;
            for piece in 1..=pieces {
                let area = self.rules.area(item.width, item.height);
                let billable_area = self.rules.billable_area(&area);
                total_billable_area += to_f64(&billable_area);

                let row = LedgerRow {
                    width: width.clone(),
                    height: height.clone(),
                    area,
                    billable_area,
                };

                if record {
                    if let Err(source) = self.call_store(self.ledger.append_row(&row)).await {
                        tracing::error!(
                            "✗ 台账写入失败: items[{}] 第 {}/{} 件, 已写入 {} 行未回滚, 错误: {}",
                            idx,
                            piece,
                            pieces,
                            lines.len(),
                            source
                        );
                        return Err(AppError::ExternalStore {
                            rows_written: lines.len(),
                            source,
                        });
                    }
                    tracing::debug!(
                        "追加台账行 #{}: {} x {} area={} moq_area={}",
                        lines.len() + 1,
                        row.width,
                        row.height,
                        row.area,
                        row.billable_area
                    );
                }

                lines.push(row);
            }
        }

        // 4. 结算
        let settlement = self.rules.settle(total_billable_area);
        tracing::info!(
            "计价完成: {} 行, total_area={}, net={}, vat={}, total={}",
            lines.len(),
            total_billable_area,
            settlement.net,
            settlement.tax,
            settlement.total
        );

        Ok(PricingResult {
            lines,
            total_billable_area: from_f64(total_billable_area).unwrap_or_else(BigDecimal::zero),
            net_amount: settlement.net,
            tax_amount: settlement.tax,
            total_amount: settlement.total,
        })
    }

    /// 为单次台账调用加超时
    async fn call_store<F>(&self, call: F) -> Result<(), LedgerError>
    where
        F: Future<Output = Result<(), LedgerError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout(self.store_timeout)),
        }
    }
}
