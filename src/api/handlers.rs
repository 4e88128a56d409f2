use crate::application::{
    CreateOrderRequest, ErrorResponse, NotificationOutcome, OrderService, RefundRequest,
};
use crate::domain::errors::DomainError;
use crate::ports::{OrderStorePort, WeChatPayPort};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info};

/// 应用状态
pub struct AppState<T: WeChatPayPort, R: OrderStorePort> {
    pub order_service: Arc<OrderService<T, R>>,
}

impl<T: WeChatPayPort, R: OrderStorePort> Clone for AppState<T, R> {
    fn clone(&self) -> Self {
        Self {
            order_service: self.order_service.clone(),
        }
    }
}

/// 领域错误到HTTP状态码的映射
fn error_response(code: &str, e: DomainError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        DomainError::ValidationError(_)
        | DomainError::InvalidAmount(_)
        | DomainError::InvalidState { .. }
        | DomainError::SerializationError(_) => StatusCode::BAD_REQUEST,
        DomainError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::SignatureVerificationFailed => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse::new(code.to_string(), e.to_string())),
    )
}

/// 创建支付订单
pub async fn create_order<T, R>(
    State(state): State<AppState<T, R>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    info!("Received order creation request: {}", request.product_name);

    state
        .order_service
        .create_order(request)
        .await
        .map(|response| (StatusCode::CREATED, Json(response)))
        .map_err(|e| {
            error!("Order creation error: {}", e);
            error_response("ORDER_ERROR", e)
        })
}

/// 查询订单状态
pub async fn query_order<T, R>(
    State(state): State<AppState<T, R>>,
    Path(out_trade_no): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    info!("Received order query request: {}", out_trade_no);

    state
        .order_service
        .query_order(&out_trade_no)
        .await
        .map(|order| (StatusCode::OK, Json(order)))
        .map_err(|e| {
            error!("Order query error: {}", e);
            error_response("QUERY_ERROR", e)
        })
}

/// 获取订单列表
pub async fn list_orders<T, R>(
    State(state): State<AppState<T, R>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    state
        .order_service
        .list_orders()
        .await
        .map(|response| (StatusCode::OK, Json(response)))
        .map_err(|e| {
            error!("Order list error: {}", e);
            error_response("LIST_ERROR", e)
        })
}

/// 关闭未支付订单
pub async fn close_order<T, R>(
    State(state): State<AppState<T, R>>,
    Path(out_trade_no): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    info!("Received order close request: {}", out_trade_no);

    state
        .order_service
        .close_order(&out_trade_no)
        .await
        .map(|response| (StatusCode::OK, Json(response)))
        .map_err(|e| {
            error!("Order close error: {}", e);
            error_response("CLOSE_ERROR", e)
        })
}

/// 申请退款
pub async fn refund_order<T, R>(
    State(state): State<AppState<T, R>>,
    Path(out_trade_no): Path<String>,
    request: Option<Json<RefundRequest>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    info!("Received refund request: {}", out_trade_no);

    // 请求体可省略，默认全额退款
    let request = request.map(|Json(r)| r).unwrap_or_default();

    state
        .order_service
        .refund_order(&out_trade_no, request)
        .await
        .map(|response| (StatusCode::OK, Json(response)))
        .map_err(|e| {
            error!("Refund error: {}", e);
            error_response("REFUND_ERROR", e)
        })
}

/// 微信支付回调（支付和退款通知）
pub async fn payment_notify<T, R>(
    State(state): State<AppState<T, R>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    T: WeChatPayPort + 'static,
    R: OrderStorePort + 'static,
{
    info!("Received payment notification");

    let Some(timestamp) = header_str(&headers, "Wechatpay-Timestamp") else {
        return notify_fail(StatusCode::BAD_REQUEST, "Missing Wechatpay-Timestamp");
    };
    let Some(nonce) = header_str(&headers, "Wechatpay-Nonce") else {
        return notify_fail(StatusCode::BAD_REQUEST, "Missing Wechatpay-Nonce");
    };
    let Some(signature) = header_str(&headers, "Wechatpay-Signature") else {
        return notify_fail(StatusCode::BAD_REQUEST, "Missing Wechatpay-Signature");
    };

    match state
        .order_service
        .handle_notification(timestamp, nonce, signature, &body)
        .await
    {
        Ok(NotificationOutcome::Applied) => StatusCode::NO_CONTENT.into_response(),
        Ok(NotificationOutcome::Ignored) => (
            StatusCode::OK,
            Json(serde_json::json!({ "code": "SUCCESS", "message": "unknown event type" })),
        )
            .into_response(),
        Err(DomainError::SignatureVerificationFailed) => {
            error!("Notification signature verification failed");
            notify_fail(StatusCode::UNAUTHORIZED, "Signature verification failed")
        }
        Err(DomainError::SerializationError(e)) => {
            error!("Failed to parse notification: {}", e);
            notify_fail(
                StatusCode::BAD_REQUEST,
                &format!("Failed to parse notification: {}", e),
            )
        }
        Err(e) => {
            error!("Notification handling error: {}", e);
            notify_fail(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// 微信支付要求的失败应答格式
fn notify_fail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "code": "FAIL", "message": message })),
    )
        .into_response()
}
