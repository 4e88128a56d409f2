use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Native下单请求参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNativeOrderRequest {
    pub out_trade_no: String,
    pub description: String,
    pub amount_cents: i64,
}

/// Native下单响应（二维码链接）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeOrderResponse {
    pub code_url: String,
}

/// 查询订单响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderQueryResponse {
    pub trade_state: String,
    pub transaction_id: Option<String>,
    pub trade_state_desc: Option<String>,
}

/// 退款申请参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefundRequest {
    pub out_trade_no: String,
    pub out_refund_no: String,
    pub refund_cents: i64,
    pub total_cents: i64,
    pub reason: String,
}

/// 退款申请响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundCreateResponse {
    pub refund_id: String,
    pub status: String,
}

/// 回调通知信封（解密前）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub id: String,
    pub event_type: String,
    pub resource: NotificationResource,
    pub create_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResource {
    pub algorithm: String,
    pub ciphertext: String,
    pub nonce: String,
    #[serde(default)]
    pub associated_data: String,
}

/// 支付通知解密后的交易数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResource {
    pub out_trade_no: String,
    pub transaction_id: String,
    pub trade_state: String,
    #[serde(default)]
    pub success_time: Option<String>,
    pub amount: TransactionAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAmount {
    pub total: i64,
}

/// 退款通知解密后的退款数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResource {
    pub out_trade_no: String,
    pub out_refund_no: String,
    #[serde(default)]
    pub refund_id: Option<String>,
    pub refund_status: String,
    #[serde(default)]
    pub success_time: Option<String>,
    pub amount: RefundAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundAmount {
    pub refund: i64,
}

/// 微信支付端口接口
#[async_trait]
pub trait WeChatPayPort: Send + Sync + Clone {
    /// 创建Native支付订单（扫码支付）
    async fn create_native_order(
        &self,
        request: CreateNativeOrderRequest,
    ) -> DomainResult<NativeOrderResponse>;

    /// 查询订单
    async fn query_order(&self, out_trade_no: &str) -> DomainResult<OrderQueryResponse>;

    /// 关闭订单
    async fn close_order(&self, out_trade_no: &str) -> DomainResult<()>;

    /// 申请退款
    async fn create_refund(
        &self,
        request: CreateRefundRequest,
    ) -> DomainResult<RefundCreateResponse>;

    /// 验证回调通知签名
    async fn verify_notification(
        &self,
        timestamp: &str,
        nonce: &str,
        body: &str,
        signature: &str,
    ) -> DomainResult<bool>;

    /// 解密回调通知
    async fn decrypt_notification(
        &self,
        ciphertext: &str,
        associated_data: &str,
        nonce: &str,
    ) -> DomainResult<String>;
}
