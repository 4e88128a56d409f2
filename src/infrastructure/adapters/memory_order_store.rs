use crate::domain::errors::DomainResult;
use crate::domain::value_objects::{Money, OrderStatus};
use crate::domain::Order;
use crate::ports::order_store_port::OrderStorePort;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 内存订单存储
///
/// 以商户订单号为键的共享哈希表，读写通过一把粗粒度读写锁串行化。
/// 进程重启后状态丢失。
#[derive(Default, Clone)]
pub struct MemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStorePort for MemoryOrderStore {
    /// 保存订单（已存在则覆盖）
    async fn save(&self, order: Order) -> DomainResult<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.out_trade_no.clone(), order);
        Ok(())
    }

    /// 根据商户订单号查找
    async fn find_by_out_trade_no(&self, out_trade_no: &str) -> DomainResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(out_trade_no).cloned())
    }

    /// 获取所有订单（按创建时间倒序）
    async fn find_all(&self) -> DomainResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders.values().cloned().collect();
        result.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(result)
    }

    /// 更新订单状态；SUCCESS 记录支付时间，REFUNDED 记录退款时间
    async fn update_status(&self, out_trade_no: &str, status: OrderStatus) -> DomainResult<bool> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(out_trade_no) else {
            return Ok(false);
        };

        order.status = status;
        match status {
            OrderStatus::Success => order.pay_time = Some(Utc::now()),
            OrderStatus::Refunded => order.refund_time = Some(Utc::now()),
            _ => {}
        }

        debug!("Order status updated: {} -> {}", out_trade_no, status);
        Ok(true)
    }

    /// 更新支付信息：回填交易号并置为 SUCCESS
    async fn update_pay_info(
        &self,
        out_trade_no: &str,
        transaction_id: &str,
    ) -> DomainResult<bool> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(out_trade_no) else {
            return Ok(false);
        };

        order.transaction_id = Some(transaction_id.to_string());
        order.status = OrderStatus::Success;
        order.pay_time = Some(Utc::now());

        debug!("Order paid: {} ({})", out_trade_no, transaction_id);
        Ok(true)
    }

    /// 更新退款信息：记录退款单号和金额并置为 REFUNDING
    async fn update_refund_info(
        &self,
        out_trade_no: &str,
        refund_no: &str,
        refund_amount: Money,
    ) -> DomainResult<bool> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(out_trade_no) else {
            return Ok(false);
        };

        order.refund_no = Some(refund_no.to_string());
        order.refund_amount = Some(refund_amount);
        order.status = OrderStatus::Refunding;

        debug!("Order refunding: {} ({})", out_trade_no, refund_no);
        Ok(true)
    }

    /// 删除订单（手动清理）
    async fn delete(&self, out_trade_no: &str) -> DomainResult<()> {
        let mut orders = self.orders.write().await;
        orders.remove(out_trade_no);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(no: &str) -> Order {
        Order::new(no.to_string(), "测试商品".to_string(), Money::from_cents(100)).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryOrderStore::new();
        store.save(order("N1")).await.unwrap();

        let found = store.find_by_out_trade_no("N1").await.unwrap().unwrap();
        assert_eq!(found.out_trade_no, "N1");
        assert_eq!(found.status, OrderStatus::NotPaid);

        assert!(store.find_by_out_trade_no("N2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_by_trade_no() {
        let store = MemoryOrderStore::new();
        store.save(order("N1")).await.unwrap();

        let mut replacement = order("N1");
        replacement.description = "替换商品".to_string();
        store.save(replacement).await.unwrap();

        let found = store.find_by_out_trade_no("N1").await.unwrap().unwrap();
        assert_eq!(found.description, "替换商品");
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_sorted_by_create_time_desc() {
        let store = MemoryOrderStore::new();
        for no in ["N1", "N2", "N3"] {
            store.save(order(no)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].create_time >= all[1].create_time);
        assert!(all[1].create_time >= all[2].create_time);
        assert_eq!(all[0].out_trade_no, "N3");
        assert_eq!(all[2].out_trade_no, "N1");
    }

    #[tokio::test]
    async fn test_update_status_stamps_times() {
        let store = MemoryOrderStore::new();
        store.save(order("N1")).await.unwrap();

        assert!(store
            .update_status("N1", OrderStatus::Success)
            .await
            .unwrap());
        let paid = store.find_by_out_trade_no("N1").await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Success);
        assert!(paid.pay_time.is_some());

        assert!(store
            .update_status("N1", OrderStatus::Refunded)
            .await
            .unwrap());
        let refunded = store.find_by_out_trade_no("N1").await.unwrap().unwrap();
        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert!(refunded.refund_time.is_some());

        assert!(!store
            .update_status("missing", OrderStatus::Closed)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_pay_info() {
        let store = MemoryOrderStore::new();
        store.save(order("N1")).await.unwrap();

        assert!(store.update_pay_info("N1", "TX123").await.unwrap());
        let paid = store.find_by_out_trade_no("N1").await.unwrap().unwrap();
        assert_eq!(paid.status, OrderStatus::Success);
        assert_eq!(paid.transaction_id.as_deref(), Some("TX123"));
        assert!(paid.pay_time.is_some());

        assert!(!store.update_pay_info("missing", "TX123").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_refund_info() {
        let store = MemoryOrderStore::new();
        store.save(order("N1")).await.unwrap();

        assert!(store
            .update_refund_info("N1", "R123", Money::from_cents(80))
            .await
            .unwrap());
        let refunding = store.find_by_out_trade_no("N1").await.unwrap().unwrap();
        assert_eq!(refunding.status, OrderStatus::Refunding);
        assert_eq!(refunding.refund_no.as_deref(), Some("R123"));
        assert_eq!(refunding.refund_amount, Some(Money::from_cents(80)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryOrderStore::new();
        store.save(order("N1")).await.unwrap();

        store.delete("N1").await.unwrap();
        assert!(store.find_by_out_trade_no("N1").await.unwrap().is_none());

        // 删除不存在的订单不报错
        store.delete("N1").await.unwrap();
    }
}
