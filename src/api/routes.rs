use super::handlers::*;
use crate::ports::{OrderStorePort, WeChatPayPort};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router<T, R>(state: AppState<T, R>) -> Router
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/order", post(create_order::<T, R>))
        .route("/api/orders", get(list_orders::<T, R>))
        .route("/api/order/:out_trade_no", get(query_order::<T, R>))
        .route("/api/order/:out_trade_no/close", post(close_order::<T, R>))
        .route("/api/order/:out_trade_no/refund", post(refund_order::<T, R>))
        .route("/api/notify", post(payment_notify::<T, R>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
