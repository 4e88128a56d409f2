use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 微信支付配置（公钥模式）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeChatPayConfig {
    /// 公众账号ID
    pub appid: String,

    /// 商户号
    pub mchid: String,

    /// 商户API v3密钥（用于回调通知解密）
    pub api_v3_key: String,

    /// 商户证书序列号
    pub serial_no: String,

    /// 商户API私钥文件路径（PKCS#8格式）
    pub private_key_path: String,

    /// 微信支付公钥ID
    pub public_key_id: String,

    /// 微信支付公钥文件路径（用于回调验签）
    pub public_key_path: String,

    /// 支付结果回调地址
    pub notify_url: String,

    /// API基础URL
    pub base_url: String,
}

impl WeChatPayConfig {
    pub fn from_env() -> Arc<Self> {
        Arc::new(Self {
            appid: std::env::var("WECHAT_APPID").expect("WECHAT_APPID must be set"),
            mchid: std::env::var("WECHAT_MCHID").expect("WECHAT_MCHID must be set"),
            api_v3_key: std::env::var("WECHAT_API_V3_KEY").expect("WECHAT_API_V3_KEY must be set"),
            serial_no: std::env::var("WECHAT_SERIAL_NO").expect("WECHAT_SERIAL_NO must be set"),
            private_key_path: std::env::var("WECHAT_PRIVATE_KEY_PATH")
                .expect("WECHAT_PRIVATE_KEY_PATH must be set"),
            public_key_id: std::env::var("WECHAT_PUBLIC_KEY_ID")
                .expect("WECHAT_PUBLIC_KEY_ID must be set"),
            public_key_path: std::env::var("WECHAT_PUBLIC_KEY_PATH")
                .expect("WECHAT_PUBLIC_KEY_PATH must be set"),
            notify_url: std::env::var("WECHAT_NOTIFY_URL").expect("WECHAT_NOTIFY_URL must be set"),
            base_url: std::env::var("WECHAT_BASE_URL")
                .unwrap_or_else(|_| "https://api.mch.weixin.qq.com".to_string()),
        })
    }
}
