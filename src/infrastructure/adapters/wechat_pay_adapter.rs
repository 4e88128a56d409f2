use crate::domain::errors::{DomainError, DomainResult};
use crate::infrastructure::config::wechat_config::WeChatPayConfig;
use crate::ports::wechat_pay_port::*;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use async_trait::async_trait;
use base64::Engine;
use rand::rngs::OsRng;
use reqwest::Client;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, error};

/// 微信支付适配器实现（APIv3，公钥模式）
///
/// 请求签名、应答验签和回调解密都收敛在这一层，
/// 其余代码只通过 `WeChatPayPort` 与微信支付交互。
#[derive(Clone)]
pub struct WeChatPayAdapter {
    config: Arc<WeChatPayConfig>,
    client: Client,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl WeChatPayAdapter {
    /// 创建适配器；启动时一次性加载商户私钥和微信支付公钥，失败即终止
    pub fn new(config: Arc<WeChatPayConfig>) -> DomainResult<Self> {
        let private_key_pem = std::fs::read_to_string(&config.private_key_path).map_err(|e| {
            DomainError::ConfigurationError(format!(
                "Failed to read private key {}: {}",
                config.private_key_path, e
            ))
        })?;
        let private_key = RsaPrivateKey::from_pkcs8_pem(&private_key_pem)
            .map_err(|e| DomainError::CryptoError(format!("Failed to load private key: {}", e)))?;

        let public_key_pem = std::fs::read_to_string(&config.public_key_path).map_err(|e| {
            DomainError::ConfigurationError(format!(
                "Failed to read public key {}: {}",
                config.public_key_path, e
            ))
        })?;
        let public_key = RsaPublicKey::from_public_key_pem(&public_key_pem)
            .map_err(|e| DomainError::CryptoError(format!("Failed to load public key: {}", e)))?;

        Ok(Self {
            config,
            client: Client::new(),
            private_key,
            public_key,
        })
    }

    /// 生成请求签名（SHA256-RSA2048）
    fn build_signature(
        &self,
        method: &str,
        path: &str,
        timestamp: &str,
        nonce: &str,
        body: &str,
    ) -> DomainResult<String> {
        let message = format!("{}\n{}\n{}\n{}\n{}\n", method, path, timestamp, nonce, body);

        let signing_key = SigningKey::<Sha256>::new(self.private_key.clone());
        let signature = signing_key.sign_with_rng(&mut OsRng, message.as_bytes());

        Ok(base64::engine::general_purpose::STANDARD.encode(signature.to_bytes()))
    }

    /// 生成Authorization头
    fn build_authorization(&self, method: &str, path: &str, body: &str) -> DomainResult<String> {
        let timestamp = format!("{}", chrono::Utc::now().timestamp());
        let nonce = Self::generate_nonce_str();

        let signature = self.build_signature(method, path, &timestamp, &nonce, body)?;

        let auth = format!(
            "mchid=\"{}\",nonce_str=\"{}\",timestamp=\"{}\",serial_no=\"{}\",signature=\"{}\"",
            self.config.mchid, nonce, timestamp, self.config.serial_no, signature
        );

        Ok(format!("WECHATPAY2-SHA256-RSA2048 {}", auth))
    }

    /// 生成随机字符串
    fn generate_nonce_str() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// 解密回调数据（AEAD_AES_256_GCM）
    fn decrypt_callback_data(
        &self,
        ciphertext: &str,
        associated_data: &str,
        nonce: &str,
    ) -> DomainResult<String> {
        let ciphertext_bytes = base64::engine::general_purpose::STANDARD
            .decode(ciphertext)
            .map_err(|e| DomainError::CryptoError(format!("Base64 decode error: {}", e)))?;

        // AEAD_AES_256_GCM 要求12字节nonce
        if nonce.len() != 12 {
            return Err(DomainError::CryptoError(format!(
                "Invalid nonce length: {}",
                nonce.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(self.config.api_v3_key.as_bytes())
            .map_err(|e| DomainError::CryptoError(format!("AES init error: {}", e)))?;

        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(nonce.as_bytes()),
                Payload {
                    msg: ciphertext_bytes.as_ref(),
                    aad: associated_data.as_bytes(),
                },
            )
            .map_err(|e| DomainError::CryptoError(format!("Decrypt error: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| DomainError::CryptoError(format!("UTF8 decode error: {}", e)))
    }
}

#[async_trait]
impl WeChatPayPort for WeChatPayAdapter {
    /// 创建Native支付订单
    async fn create_native_order(
        &self,
        request: CreateNativeOrderRequest,
    ) -> DomainResult<NativeOrderResponse> {
        let path = "/v3/pay/transactions/native";
        let url = format!("{}{}", self.config.base_url, path);

        let body = json!({
            "appid": self.config.appid,
            "mchid": self.config.mchid,
            "description": request.description,
            "out_trade_no": request.out_trade_no,
            "notify_url": self.config.notify_url,
            "amount": {
                "total": request.amount_cents,
                "currency": "CNY"
            }
        });

        let body_str = body.to_string();
        debug!("Native order request body: {}", body_str);

        let authorization = self.build_authorization("POST", path, &body_str)?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body_str)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Native order API error: {} - {}", status, error_text);
            return Err(DomainError::WeChatPayError(format!(
                "Create order failed: {} - {}",
                status, error_text
            )));
        }

        let resp_json: serde_json::Value = response.json().await?;
        debug!("Native order response: {}", resp_json);

        let code_url = resp_json["code_url"]
            .as_str()
            .ok_or_else(|| DomainError::WeChatPayError("Missing code_url".to_string()))?;

        Ok(NativeOrderResponse {
            code_url: code_url.to_string(),
        })
    }

    /// 查询订单
    async fn query_order(&self, out_trade_no: &str) -> DomainResult<OrderQueryResponse> {
        let path = format!(
            "/v3/pay/transactions/out-trade-no/{}?mchid={}",
            out_trade_no, self.config.mchid
        );
        let url = format!("{}{}", self.config.base_url, path);

        let authorization = self.build_authorization("GET", &path, "")?;

        let response = self
            .client
            .get(&url)
            .header("Authorization", authorization)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::WeChatPayError(format!(
                "Query order failed: {} - {}",
                status, error_text
            )));
        }

        let resp_json: serde_json::Value = response.json().await?;

        Ok(OrderQueryResponse {
            trade_state: resp_json["trade_state"]
                .as_str()
                .unwrap_or("UNKNOWN")
                .to_string(),
            transaction_id: resp_json["transaction_id"].as_str().map(String::from),
            trade_state_desc: resp_json["trade_state_desc"].as_str().map(String::from),
        })
    }

    /// 关闭订单
    async fn close_order(&self, out_trade_no: &str) -> DomainResult<()> {
        let path = format!("/v3/pay/transactions/out-trade-no/{}/close", out_trade_no);
        let url = format!("{}{}", self.config.base_url, path);

        let body = json!({ "mchid": self.config.mchid });
        let body_str = body.to_string();

        let authorization = self.build_authorization("POST", &path, &body_str)?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .body(body_str)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::WeChatPayError(format!(
                "Close order failed: {} - {}",
                status, error_text
            )));
        }

        Ok(())
    }

    /// 申请退款
    async fn create_refund(
        &self,
        request: CreateRefundRequest,
    ) -> DomainResult<RefundCreateResponse> {
        let path = "/v3/refund/domestic/refunds";
        let url = format!("{}{}", self.config.base_url, path);

        let body = json!({
            "out_trade_no": request.out_trade_no,
            "out_refund_no": request.out_refund_no,
            "reason": request.reason,
            "notify_url": self.config.notify_url,
            "amount": {
                "refund": request.refund_cents,
                "total": request.total_cents,
                "currency": "CNY"
            }
        });

        let body_str = body.to_string();
        debug!("Refund request body: {}", body_str);

        let authorization = self.build_authorization("POST", path, &body_str)?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body_str)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Refund API error: {} - {}", status, error_text);
            return Err(DomainError::WeChatPayError(format!(
                "Create refund failed: {} - {}",
                status, error_text
            )));
        }

        let resp_json: serde_json::Value = response.json().await?;
        debug!("Refund response: {}", resp_json);

        Ok(RefundCreateResponse {
            refund_id: resp_json["refund_id"].as_str().unwrap_or_default().to_string(),
            status: resp_json["status"].as_str().unwrap_or("UNKNOWN").to_string(),
        })
    }

    /// 验证回调通知签名（微信支付公钥验签）
    async fn verify_notification(
        &self,
        timestamp: &str,
        nonce: &str,
        body: &str,
        signature: &str,
    ) -> DomainResult<bool> {
        let message = format!("{}\n{}\n{}\n", timestamp, nonce, body);

        let signature_bytes = base64::engine::general_purpose::STANDARD
            .decode(signature)
            .map_err(|e| DomainError::CryptoError(format!("Base64 decode error: {}", e)))?;
        let signature = Signature::try_from(signature_bytes.as_slice())
            .map_err(|e| DomainError::CryptoError(format!("Invalid signature: {}", e)))?;

        let verifying_key = VerifyingKey::<Sha256>::new(self.public_key.clone());
        Ok(verifying_key.verify(message.as_bytes(), &signature).is_ok())
    }

    /// 解密回调通知
    async fn decrypt_notification(
        &self,
        ciphertext: &str,
        associated_data: &str,
        nonce: &str,
    ) -> DomainResult<String> {
        self.decrypt_callback_data(ciphertext, associated_data, nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use rsa::signature::RandomizedSigner;

    const TEST_API_V3_KEY: &str = "0123456789abcdef0123456789abcdef";

    fn test_adapter() -> WeChatPayAdapter {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public_key = RsaPublicKey::from(&private_key);

        let dir = std::env::temp_dir();
        let private_key_path = dir.join(format!(
            "wechat_test_private_{}.pem",
            uuid::Uuid::new_v4().simple()
        ));
        let public_key_path = dir.join(format!(
            "wechat_test_public_{}.pem",
            uuid::Uuid::new_v4().simple()
        ));

        std::fs::write(
            &private_key_path,
            private_key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes(),
        )
        .unwrap();
        std::fs::write(
            &public_key_path,
            public_key.to_public_key_pem(LineEnding::LF).unwrap(),
        )
        .unwrap();

        let config = Arc::new(WeChatPayConfig {
            appid: "wx-test-appid".to_string(),
            mchid: "1900000001".to_string(),
            api_v3_key: TEST_API_V3_KEY.to_string(),
            serial_no: "TESTSERIAL".to_string(),
            private_key_path: private_key_path.to_string_lossy().into_owned(),
            public_key_id: "PUB_KEY_ID_TEST".to_string(),
            public_key_path: public_key_path.to_string_lossy().into_owned(),
            notify_url: "http://localhost:8080/api/notify".to_string(),
            base_url: "https://api.mch.weixin.qq.com".to_string(),
        });

        let adapter = WeChatPayAdapter::new(config).unwrap();
        std::fs::remove_file(private_key_path).ok();
        std::fs::remove_file(public_key_path).ok();
        adapter
    }

    #[tokio::test]
    async fn test_verify_notification_roundtrip() {
        let adapter = test_adapter();

        let timestamp = "1700000000";
        let nonce = "noncestring1";
        let body = r#"{"id":"evt-1","event_type":"TRANSACTION.SUCCESS"}"#;
        let message = format!("{}\n{}\n{}\n", timestamp, nonce, body);

        // 用同一密钥对模拟平台签名
        let signing_key = SigningKey::<Sha256>::new(adapter.private_key.clone());
        let signature = signing_key.sign_with_rng(&mut OsRng, message.as_bytes());
        let signature_b64 =
            base64::engine::general_purpose::STANDARD.encode(signature.to_bytes());

        let verified = adapter
            .verify_notification(timestamp, nonce, body, &signature_b64)
            .await
            .unwrap();
        assert!(verified);

        let tampered = adapter
            .verify_notification(timestamp, nonce, "{\"id\":\"evt-2\"}", &signature_b64)
            .await
            .unwrap();
        assert!(!tampered);
    }

    #[tokio::test]
    async fn test_decrypt_notification() {
        let adapter = test_adapter();

        let plaintext = r#"{"out_trade_no":"N1","transaction_id":"TX1"}"#;
        let nonce = "abcdefghijkl";
        let aad = "transaction";

        let cipher = Aes256Gcm::new_from_slice(TEST_API_V3_KEY.as_bytes()).unwrap();
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(nonce.as_bytes()),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: aad.as_bytes(),
                },
            )
            .unwrap();
        let ciphertext_b64 = base64::engine::general_purpose::STANDARD.encode(ciphertext);

        let decrypted = adapter
            .decrypt_notification(&ciphertext_b64, aad, nonce)
            .await
            .unwrap();
        assert_eq!(decrypted, plaintext);

        // 附加数据不一致时解密失败
        let result = adapter
            .decrypt_notification(&ciphertext_b64, "refund", nonce)
            .await;
        assert!(matches!(result, Err(DomainError::CryptoError(_))));
    }

    #[tokio::test]
    async fn test_decrypt_rejects_bad_nonce_length() {
        let adapter = test_adapter();
        let result = adapter.decrypt_notification("AAAA", "transaction", "short").await;
        assert!(matches!(result, Err(DomainError::CryptoError(_))));
    }
}
