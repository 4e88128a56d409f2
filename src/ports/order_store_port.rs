use crate::domain::errors::DomainResult;
use crate::domain::value_objects::{Money, OrderStatus};
use crate::domain::Order;
use async_trait::async_trait;

/// 订单存储端口接口
///
/// 所有写操作以商户订单号为键。`update_*` 系列返回订单是否存在。
#[async_trait]
pub trait OrderStorePort: Send + Sync {
    /// 保存订单（已存在则覆盖）
    async fn save(&self, order: Order) -> DomainResult<()>;

    /// 根据商户订单号查找
    async fn find_by_out_trade_no(&self, out_trade_no: &str) -> DomainResult<Option<Order>>;

    /// 获取所有订单（按创建时间倒序）
    async fn find_all(&self) -> DomainResult<Vec<Order>>;

    /// 更新订单状态；SUCCESS 记录支付时间，REFUNDED 记录退款时间
    async fn update_status(&self, out_trade_no: &str, status: OrderStatus) -> DomainResult<bool>;

    /// 更新支付信息：回填交易号并置为 SUCCESS
    async fn update_pay_info(
        &self,
        out_trade_no: &str,
        transaction_id: &str,
    ) -> DomainResult<bool>;

    /// 更新退款信息：记录退款单号和金额并置为 REFUNDING
    async fn update_refund_info(
        &self,
        out_trade_no: &str,
        refund_no: &str,
        refund_amount: Money,
    ) -> DomainResult<bool>;

    /// 删除订单（手动清理）
    async fn delete(&self, out_trade_no: &str) -> DomainResult<()>;
}
