use crate::domain::Order;
use serde::{Deserialize, Serialize};

/// 创建订单请求
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// 商品名称
    pub product_name: String,

    /// 订单金额（分）
    pub amount: i64,

    /// 可选：已有商户订单号（重新支付）
    #[serde(default)]
    pub out_trade_no: Option<String>,
}

/// 创建订单响应
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// 商户订单号
    pub order_id: String,

    /// 二维码链接
    pub code_url: String,

    /// 订单金额（分）
    pub amount: i64,

    /// 商品名称
    pub product_name: String,
}

/// 订单列表响应
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: usize,
}

/// 关闭订单响应
#[derive(Debug, Serialize)]
pub struct CloseOrderResponse {
    pub message: String,
    pub order_id: String,
}

/// 退款请求
#[derive(Debug, Default, Deserialize)]
pub struct RefundRequest {
    /// 退款金额（分），缺省或超额时全额退款
    #[serde(default)]
    pub refund_fee: i64,

    /// 退款原因
    #[serde(default)]
    pub reason: Option<String>,
}

/// 退款响应
#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub message: String,
    pub order_id: String,
    pub refund_no: String,
    pub refund_fee: i64,
    pub refund_status: String,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: String, message: String) -> Self {
        Self { error, message }
    }
}
