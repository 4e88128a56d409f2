use native_payment_rs::api::{self, AppState};
use native_payment_rs::application::OrderService;
use native_payment_rs::infrastructure::{MemoryOrderStore, WeChatPayAdapter, WeChatPayConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // 加载环境变量
    dotenvy::dotenv().ok();

    info!("Starting native payment service...");

    // 初始化微信支付配置
    let wechat_config = WeChatPayConfig::from_env();
    info!(
        "WeChat Pay configuration loaded for mchid: {}",
        wechat_config.mchid
    );

    // 创建微信支付适配器；密钥加载失败直接终止
    let wechat_adapter = Arc::new(WeChatPayAdapter::new(wechat_config.clone())?);

    // 创建内存订单存储
    let store = Arc::new(MemoryOrderStore::new());

    // 创建订单服务
    let order_service = Arc::new(OrderService::new(wechat_adapter, store));

    // 创建应用状态和路由
    let app_state = AppState { order_service };
    let app = api::create_router(app_state);

    // 启动服务器
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /api/order - Create order");
    info!("  GET  /api/orders - List orders");
    info!("  GET  /api/order/:out_trade_no - Query order");
    info!("  POST /api/order/:out_trade_no/close - Close order");
    info!("  POST /api/order/:out_trade_no/refund - Refund order");
    info!("  POST /api/notify - WeChat payment webhook");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
