use crate::application::dto::{
    CloseOrderResponse, CreateOrderRequest, CreateOrderResponse, OrderListResponse, RefundRequest,
    RefundResponse,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{Money, Order, OrderStatus};
use crate::ports::wechat_pay_port::{
    CreateNativeOrderRequest, CreateRefundRequest, PaymentNotification, RefundResource,
    TransactionResource,
};
use crate::ports::{OrderStorePort, WeChatPayPort};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 回调通知处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// 已处理并更新订单
    Applied,
    /// 未知事件类型，确认但不处理
    Ignored,
}

/// 订单服务
pub struct OrderService<T: WeChatPayPort, R: OrderStorePort> {
    wechat_pay: Arc<T>,
    store: Arc<R>,
}

impl<T: WeChatPayPort, R: OrderStorePort> OrderService<T, R> {
    pub fn new(wechat_pay: Arc<T>, store: Arc<R>) -> Self {
        Self { wechat_pay, store }
    }

    /// 创建支付订单（或对未支付订单重新下单）
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> DomainResult<CreateOrderResponse> {
        // 1. 确定订单：传入已有订单号则复用原订单信息，否则新建
        let (out_trade_no, description, amount) =
            match request.out_trade_no.filter(|no| !no.is_empty()) {
                Some(no) => {
                    let existing = self
                        .store
                        .find_by_out_trade_no(&no)
                        .await?
                        .ok_or_else(|| DomainError::OrderNotFound(no.clone()))?;

                    if !existing.can_repay() {
                        return Err(DomainError::InvalidState {
                            expected: OrderStatus::NotPaid.to_string(),
                            actual: existing.status.to_string(),
                        });
                    }

                    (no, existing.description, existing.amount)
                }
                None => {
                    let out_trade_no = Order::generate_trade_no();
                    let order = Order::new(
                        out_trade_no.clone(),
                        request.product_name,
                        Money::from_cents(request.amount),
                    )?;
                    let description = order.description.clone();
                    let amount = order.amount;

                    self.store.save(order).await?;
                    debug!("Order saved: {}", out_trade_no);

                    (out_trade_no, description, amount)
                }
            };

        // 2. 调用微信支付Native下单接口
        let native = self
            .wechat_pay
            .create_native_order(CreateNativeOrderRequest {
                out_trade_no: out_trade_no.clone(),
                description: description.clone(),
                amount_cents: amount.to_cents(),
            })
            .await?;

        info!("Order created: {}", out_trade_no);

        Ok(CreateOrderResponse {
            order_id: out_trade_no,
            code_url: native.code_url,
            amount: amount.to_cents(),
            product_name: description,
        })
    }

    /// 查询订单；未支付订单实时向微信同步最新状态
    pub async fn query_order(&self, out_trade_no: &str) -> DomainResult<Order> {
        let order = self
            .store
            .find_by_out_trade_no(out_trade_no)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(out_trade_no.to_string()))?;

        if order.status != OrderStatus::NotPaid {
            return Ok(order);
        }

        // 查询失败不影响本地结果，下次查询或回调会再次同步
        match self.wechat_pay.query_order(out_trade_no).await {
            Ok(query) => match query.trade_state.as_str() {
                "SUCCESS" => {
                    if let Some(transaction_id) = query.transaction_id {
                        self.store
                            .update_pay_info(out_trade_no, &transaction_id)
                            .await?;
                    }
                }
                "CLOSED" => {
                    self.store
                        .update_status(out_trade_no, OrderStatus::Closed)
                        .await?;
                }
                state => {
                    debug!("Order state unchanged: {} ({})", out_trade_no, state);
                }
            },
            Err(e) => {
                warn!("Upstream query failed for {}: {}", out_trade_no, e);
            }
        }

        self.store
            .find_by_out_trade_no(out_trade_no)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(out_trade_no.to_string()))
    }

    /// 获取订单列表（按创建时间倒序）
    pub async fn list_orders(&self) -> DomainResult<OrderListResponse> {
        let orders = self.store.find_all().await?;
        let total = orders.len();
        Ok(OrderListResponse { orders, total })
    }

    /// 关闭未支付订单
    pub async fn close_order(&self, out_trade_no: &str) -> DomainResult<CloseOrderResponse> {
        let order = self
            .store
            .find_by_out_trade_no(out_trade_no)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(out_trade_no.to_string()))?;

        if !order.can_close() {
            return Err(DomainError::InvalidState {
                expected: OrderStatus::NotPaid.to_string(),
                actual: order.status.to_string(),
            });
        }

        self.wechat_pay.close_order(out_trade_no).await?;
        self.store
            .update_status(out_trade_no, OrderStatus::Closed)
            .await?;

        info!("Order closed: {}", out_trade_no);

        Ok(CloseOrderResponse {
            message: "Order closed".to_string(),
            order_id: out_trade_no.to_string(),
        })
    }

    /// 申请退款；仅支付成功的订单可退款
    pub async fn refund_order(
        &self,
        out_trade_no: &str,
        request: RefundRequest,
    ) -> DomainResult<RefundResponse> {
        let order = self
            .store
            .find_by_out_trade_no(out_trade_no)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(out_trade_no.to_string()))?;

        if !order.can_refund() {
            return Err(DomainError::InvalidState {
                expected: OrderStatus::Success.to_string(),
                actual: order.status.to_string(),
            });
        }

        // 缺省或超额时全额退款
        let refund_fee = if request.refund_fee <= 0 || request.refund_fee > order.amount.to_cents()
        {
            order.amount.to_cents()
        } else {
            request.refund_fee
        };

        let out_refund_no = Order::generate_refund_no();
        let reason = request
            .reason
            .unwrap_or_else(|| "Customer requested refund".to_string());

        let refund = self
            .wechat_pay
            .create_refund(CreateRefundRequest {
                out_trade_no: out_trade_no.to_string(),
                out_refund_no: out_refund_no.clone(),
                refund_cents: refund_fee,
                total_cents: order.amount.to_cents(),
                reason,
            })
            .await?;

        self.store
            .update_refund_info(out_trade_no, &out_refund_no, Money::from_cents(refund_fee))
            .await?;

        info!(
            "Refund submitted: order={}, refund_no={}, fee={}",
            out_trade_no, out_refund_no, refund_fee
        );

        Ok(RefundResponse {
            message: "Refund submitted".to_string(),
            order_id: out_trade_no.to_string(),
            refund_no: out_refund_no,
            refund_fee,
            refund_status: refund.status,
        })
    }

    /// 处理支付/退款回调通知
    pub async fn handle_notification(
        &self,
        timestamp: &str,
        nonce: &str,
        signature: &str,
        body: &str,
    ) -> DomainResult<NotificationOutcome> {
        // 1. 验签
        let verified = self
            .wechat_pay
            .verify_notification(timestamp, nonce, body, signature)
            .await?;
        if !verified {
            return Err(DomainError::SignatureVerificationFailed);
        }

        // 2. 解析信封并按事件类型分发
        let notification: PaymentNotification = serde_json::from_str(body)?;
        info!("Received notification: event_type={}", notification.event_type);

        match notification.event_type.as_str() {
            "TRANSACTION.SUCCESS" => {
                let plaintext = self.decrypt_resource(&notification).await?;
                let transaction: TransactionResource = serde_json::from_str(&plaintext)?;

                info!(
                    "Payment succeeded via notification: order={}, transaction={}",
                    transaction.out_trade_no, transaction.transaction_id
                );

                let existed = self
                    .store
                    .update_pay_info(&transaction.out_trade_no, &transaction.transaction_id)
                    .await?;
                if !existed {
                    warn!("Notification for unknown order: {}", transaction.out_trade_no);
                }

                Ok(NotificationOutcome::Applied)
            }
            "REFUND.SUCCESS" | "REFUND.ABNORMAL" | "REFUND.CLOSED" => {
                let plaintext = self.decrypt_resource(&notification).await?;
                let refund: RefundResource = serde_json::from_str(&plaintext)?;

                info!(
                    "Refund notification: status={}, order={}, refund_no={}",
                    refund.refund_status, refund.out_trade_no, refund.out_refund_no
                );

                match refund.refund_status.as_str() {
                    "SUCCESS" => {
                        self.store
                            .update_status(&refund.out_trade_no, OrderStatus::Refunded)
                            .await?;
                    }
                    "CLOSED" => {
                        // 退款关闭，恢复为已支付
                        self.store
                            .update_status(&refund.out_trade_no, OrderStatus::Success)
                            .await?;
                    }
                    status => {
                        warn!(
                            "Refund in abnormal state: order={}, status={}",
                            refund.out_trade_no, status
                        );
                    }
                }

                Ok(NotificationOutcome::Applied)
            }
            event_type => {
                info!("Ignoring unknown event type: {}", event_type);
                Ok(NotificationOutcome::Ignored)
            }
        }
    }

    async fn decrypt_resource(&self, notification: &PaymentNotification) -> DomainResult<String> {
        self.wechat_pay
            .decrypt_notification(
                &notification.resource.ciphertext,
                &notification.resource.associated_data,
                &notification.resource.nonce,
            )
            .await
    }
}
