use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Money, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 订单实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 订单ID（内部）
    pub id: Uuid,

    /// 商户订单号（唯一键，创建后不可变）
    pub out_trade_no: String,

    /// 商品描述
    pub description: String,

    /// 订单金额
    pub amount: Money,

    /// 订单状态
    pub status: OrderStatus,

    /// 创建时间
    pub create_time: DateTime<Utc>,

    /// 支付完成时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_time: Option<DateTime<Utc>>,

    /// 微信支付交易号（支付后回填）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// 商户退款单号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_no: Option<String>,

    /// 退款金额
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<Money>,

    /// 退款完成时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_time: Option<DateTime<Utc>>,
}

impl Order {
    /// 创建新订单，初始状态为未支付
    pub fn new(out_trade_no: String, description: String, amount: Money) -> DomainResult<Self> {
        // 验证金额
        if amount.to_cents() <= 0 {
            return Err(DomainError::InvalidAmount(
                "Amount must be greater than 0".to_string(),
            ));
        }

        // 验证商户订单号
        if out_trade_no.is_empty() || out_trade_no.len() > 64 {
            return Err(DomainError::ValidationError(
                "Out trade no must be 1-64 characters".to_string(),
            ));
        }

        // 验证描述
        if description.is_empty() || description.len() > 127 {
            return Err(DomainError::ValidationError(
                "Description must be 1-127 characters".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            out_trade_no,
            description,
            amount,
            status: OrderStatus::NotPaid,
            create_time: Utc::now(),
            pay_time: None,
            transaction_id: None,
            refund_no: None,
            refund_amount: None,
            refund_time: None,
        })
    }

    /// 生成商户订单号，格式：N + 时间戳 + 8位随机串
    pub fn generate_trade_no() -> String {
        format!(
            "N{}{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        )
    }

    /// 生成商户退款单号，格式：R + 时间戳 + 8位随机串
    pub fn generate_refund_no() -> String {
        format!(
            "R{}{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        )
    }

    /// 检查是否可以重新支付
    pub fn can_repay(&self) -> bool {
        self.status == OrderStatus::NotPaid
    }

    /// 检查是否可以关闭
    pub fn can_close(&self) -> bool {
        self.status == OrderStatus::NotPaid
    }

    /// 检查是否可以退款
    pub fn can_refund(&self) -> bool {
        self.status == OrderStatus::Success
    }
}
