use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 计价常量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// 每平方单价
    pub unit_price: f64,
    /// 税率 (0.05 = 5%)
    pub tax_rate: f64,
    /// 单件最小计费面积
    pub moq_area: f64,
    /// 单个批次展开后的件数上限 (每件一次台账写入)
    pub max_pieces: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Sheets,
    Postgres,
    Csv,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    /// 单次台账调用超时 (秒)
    pub timeout_secs: u64,
    /// clear 时清空的数据区, 不含表头
    pub clear_range: String,
    pub sheets: SheetsConfig,
    pub database: DatabaseConfig,
    pub csv: CsvConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    /// 静态 bearer token, 约一小时后过期
    pub access_token: Option<String>,
    /// 由外部程序刷新的 token 文件, 每次请求前重新读取; 优先于 `access_token`
    pub access_token_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    pub path: String,
}

impl LedgerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            pricing: PricingConfig {
                unit_price: 39.0,
                tax_rate: 0.05,
                moq_area: 1.5,
                max_pieces: 1000,
            },
            ledger: LedgerConfig {
                backend: LedgerBackend::Sheets,
                timeout_secs: 15,
                clear_range: "A2:G".to_string(),
                sheets: SheetsConfig {
                    base_url: "https://sheets.googleapis.com".to_string(),
                    spreadsheet_id: None,
                    sheet_name: "Sheet1".to_string(),
                    access_token: None,
                    access_token_file: None,
                },
                database: DatabaseConfig {
                    url: "postgres://localhost/blinds_pricing".to_string(),
                },
                csv: CsvConfig {
                    path: "ledger.csv".to_string(),
                },
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < blinds-pricing.{toml,yaml,json} < BLINDS_* 环境变量 < 简写环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("blinds-pricing").required(false))
            .add_source(
                Environment::with_prefix("BLINDS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("ledger.sheets.spreadsheet_id", std::env::var("SHEET_ID").ok())?
            .set_override_option(
                "ledger.sheets.access_token",
                std::env::var("SHEETS_ACCESS_TOKEN").ok(),
            )?
            .set_override_option(
                "ledger.sheets.access_token_file",
                std::env::var("SHEETS_ACCESS_TOKEN_FILE").ok(),
            )?
            .set_override_option("ledger.database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pricing = &self.pricing;
        for (name, value) in [
            ("unit_price", pricing.unit_price),
            ("tax_rate", pricing.tax_rate),
            ("moq_area", pricing.moq_area),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "pricing.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if pricing.tax_rate > 1.0 {
            return Err(ConfigError::Message(format!(
                "pricing.tax_rate must not exceed 1.0, got {}",
                pricing.tax_rate
            )));
        }

        if pricing.max_pieces == 0 {
            return Err(ConfigError::Message("pricing.max_pieces must be positive".to_string()));
        }

        if self.ledger.timeout_secs == 0 {
            return Err(ConfigError::Message("ledger.timeout_secs must be positive".to_string()));
        }

        if self.ledger.backend == LedgerBackend::Sheets {
            if self.ledger.sheets.spreadsheet_id.is_none() {
                return Err(ConfigError::Message(
                    "SHEET_ID (ledger.sheets.spreadsheet_id) is required for the sheets backend".to_string(),
                ));
            }
            let sheets = &self.ledger.sheets;
            if sheets.access_token.is_none() && sheets.access_token_file.is_none() {
                return Err(ConfigError::Message(
                    "SHEETS_ACCESS_TOKEN or SHEETS_ACCESS_TOKEN_FILE is required for the sheets backend"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}
