pub mod wechat_config;

pub use wechat_config::WeChatPayConfig;
