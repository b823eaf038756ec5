use serde::{Deserialize, Deserializer, Serialize};

fn default_pieces() -> i64 {
    1
}

/// pcs 接受整数, 以及小数部分为 0 的数 (如 2.0)
fn deserialize_pieces<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Pieces {
        Int(i64),
        Float(f64),
    }

    match Pieces::deserialize(deserializer)? {
        Pieces::Int(n) => Ok(n),
        Pieces::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        Pieces::Float(f) => Err(serde::de::Error::custom(format!(
            "pcs must be an integer, got {}",
            f
        ))),
    }
}

/// 面板规格 (单个窗帘尺寸 + 件数)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub width: f64,
    pub height: f64,
    #[serde(
        rename = "pcs",
        default = "default_pieces",
        deserialize_with = "deserialize_pieces"
    )]
    pub pieces: i64,
}

impl PanelSpec {
    pub fn new(width: f64, height: f64, pieces: i64) -> Self {
        Self { width, height, pieces }
    }

    /// 宽高必须为正有限数, 件数至少为 1
    pub fn validate(&self) -> Result<(), String> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(format!("width must be a positive number, got {}", self.width));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(format!("height must be a positive number, got {}", self.height));
        }
        if self.pieces < 1 {
            return Err(format!("pcs must be a positive integer, got {}", self.pieces));
        }
        Ok(())
    }
}

/// 请求批次
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBatch {
    pub items: Vec<PanelSpec>,
    /// 写入前清空台账数据区 (保留表头)
    #[serde(rename = "clear", default)]
    pub clear_first: bool,
    /// 只计算, 不触碰台账
    #[serde(default)]
    pub dry_run: bool,
}

impl OrderBatch {
    pub fn new(items: Vec<PanelSpec>) -> Self {
        Self {
            items,
            clear_first: false,
            dry_run: false,
        }
    }

    pub fn with_clear(mut self, clear_first: bool) -> Self {
        self.clear_first = clear_first;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 展开后的总件数, 即应写入台账的行数; 溢出时返回 None
    pub fn total_pieces(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |acc, item| acc.checked_add(u64::try_from(item.pieces).ok()?))
    }

    /// 校验整个批次, 任一明细不合法即拒绝; 通过时返回总件数
    pub fn validate(&self, max_pieces: u64) -> Result<u64, String> {
        for (idx, item) in self.items.iter().enumerate() {
            item.validate().map_err(|e| format!("items[{}]: {}", idx, e))?;
        }
        match self.total_pieces() {
            Some(total) if total <= max_pieces => Ok(total),
            Some(total) => Err(format!(
                "batch has {} pieces, more than the limit of {}",
                total, max_pieces
            )),
            None => Err(format!("batch exceeds the limit of {} pieces", max_pieces)),
        }
    }
}
