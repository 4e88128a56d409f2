pub mod memory_order_store;
pub mod wechat_pay_adapter;

pub use memory_order_store::MemoryOrderStore;
pub use wechat_pay_adapter::WeChatPayAdapter;
