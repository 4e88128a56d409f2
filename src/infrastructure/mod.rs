pub mod adapters;
pub mod config;

pub use adapters::{MemoryOrderStore, WeChatPayAdapter};
pub use config::WeChatPayConfig;
