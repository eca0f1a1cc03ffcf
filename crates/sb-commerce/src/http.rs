//! WooCommerce REST API client.
//!
//! Store resources live under `{store}/wp-json/wc/v3/` and authenticate with
//! the consumer key/secret pair; media uploads go to the WordPress media
//! endpoint `{store}/wp-json/wp/v2/media` with WordPress credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::CommerceConfig;
use crate::error::{CommerceError, CommerceResult};
use crate::gateway::{CommerceGateway, GatewayResponse};

/// HTTP gateway to a WooCommerce store.
pub struct WooCommerceGateway {
    client: reqwest::Client,
    api_base: String,
    media_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
    wp_username: Option<String>,
    wp_password: Option<SecretString>,
    timeout_secs: u64,
}

impl WooCommerceGateway {
    pub fn new(config: &CommerceConfig) -> CommerceResult<Self> {
        let store = config.store_url.trim().trim_end_matches('/');
        if store.is_empty() {
            return Err(CommerceError::Config("store_url is empty".into()));
        }
        let consumer_secret = config
            .consumer_secret
            .clone()
            .ok_or_else(|| CommerceError::Config("WC_CONSUMER_SECRET is not set".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CommerceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_base: format!("{store}/wp-json/wc/v3"),
            media_url: format!("{store}/wp-json/wp/v2/media"),
            consumer_key: config.consumer_key.clone(),
            consumer_secret,
            wp_username: config.wp_username.clone(),
            wp_password: config.wp_password.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.api_base, resource.trim_start_matches('/'))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(
            &self.consumer_key,
            Some(self.consumer_secret.expose_secret()),
        )
    }

    async fn send(&self, builder: RequestBuilder, resource: &str) -> CommerceResult<GatewayResponse> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CommerceError::Timeout(self.timeout_secs)
            } else {
                CommerceError::Http(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| CommerceError::Http(e.to_string()))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !(200..300).contains(&status) {
            tracing::warn!(resource, status, "store API returned non-success status");
        }
        Ok(GatewayResponse::new(status, body))
    }
}

#[async_trait]
impl CommerceGateway for WooCommerceGateway {
    async fn get(&self, resource: &str, query: &[(&str, String)]) -> CommerceResult<GatewayResponse> {
        let builder = self.authed(self.client.get(self.url(resource)).query(query));
        self.send(builder, resource).await
    }

    async fn post(&self, resource: &str, body: &Value) -> CommerceResult<GatewayResponse> {
        let builder = self.authed(self.client.post(self.url(resource)).json(body));
        self.send(builder, resource).await
    }

    async fn put(&self, resource: &str, body: &Value) -> CommerceResult<GatewayResponse> {
        let builder = self.authed(self.client.put(self.url(resource)).json(body));
        self.send(builder, resource).await
    }

    async fn delete(&self, resource: &str, query: &[(&str, String)]) -> CommerceResult<GatewayResponse> {
        let builder = self.authed(self.client.delete(self.url(resource)).query(query));
        self.send(builder, resource).await
    }

    async fn upload_media(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> CommerceResult<GatewayResponse> {
        let (Some(user), Some(password)) = (&self.wp_username, &self.wp_password) else {
            return Err(CommerceError::Config(
                "WP_USERNAME and WP_PASSWORD are required for media uploads".into(),
            ));
        };

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| CommerceError::InvalidParameter(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let builder = self
            .client
            .post(&self.media_url)
            .basic_auth(user, Some(password.expose_secret()))
            .multipart(form);
        self.send(builder, "media").await
    }
}
