pub mod order_store_port;
pub mod wechat_pay_port;

pub use order_store_port::OrderStorePort;
pub use wechat_pay_port::WeChatPayPort;
