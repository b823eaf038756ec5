use blinds_pricing::{api, connect_ledger, AppConfig, PricingCalculator, PricingRules};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!(
        "Starting server with config: server={:?}, pricing={:?}, ledger={:?}",
        config.server, config.pricing, config.ledger.backend
    );

    let rules = PricingRules::try_from(&config.pricing)?;

    // 建立台账连接 (所有请求共用)
    let ledger = connect_ledger(&config.ledger).await?;

    let calculator = Arc::new(
        PricingCalculator::new(ledger, rules)
            .with_clear_range(config.ledger.clear_range.clone())
            .with_store_timeout(config.ledger.timeout())
            .with_max_pieces(config.pricing.max_pieces),
    );

    let app = api::router(calculator);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /           - banner");
    info!("  GET  /ping       - health check");
    info!("  POST /calculate  - price panels and append ledger rows");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
