//! Store connection settings.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;

/// Connection settings for the WooCommerce REST API.
///
/// Secrets are never read from the config file; they are filled in from
/// the environment by [`CommerceConfig::apply_env`].
#[derive(Debug, Clone, Deserialize)]
pub struct CommerceConfig {
    /// Store base URL, e.g. `https://shop.example.com`.
    #[serde(default)]
    pub store_url: String,
    /// REST API consumer key (not secret on its own).
    #[serde(default)]
    pub consumer_key: String,
    #[serde(skip)]
    pub consumer_secret: Option<SecretString>,
    /// WordPress user for media uploads.
    #[serde(default)]
    pub wp_username: Option<String>,
    #[serde(skip)]
    pub wp_password: Option<SecretString>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on list sizes fetched in one request.
    #[serde(default = "default_max_products_fetch")]
    pub max_products_fetch: u32,
    /// Directory image uploads must come from. Unset means any readable
    /// image file.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_products_fetch() -> u32 {
    10
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            consumer_key: String::new(),
            consumer_secret: None,
            wp_username: None,
            wp_password: None,
            timeout_secs: default_timeout_secs(),
            max_products_fetch: default_max_products_fetch(),
            upload_dir: None,
        }
    }
}

impl CommerceConfig {
    /// Overlay values from `WC_STORE_URL`, `WC_CONSUMER_KEY`,
    /// `WC_CONSUMER_SECRET`, `WP_USERNAME`, `WP_PASSWORD` and `UPLOAD_DIR`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = var("WC_STORE_URL") {
            self.store_url = url;
        }
        if let Some(key) = var("WC_CONSUMER_KEY") {
            self.consumer_key = key;
        }
        if let Some(secret) = var("WC_CONSUMER_SECRET") {
            self.consumer_secret = Some(SecretString::from(secret));
        }
        if let Some(user) = var("WP_USERNAME") {
            self.wp_username = Some(user);
        }
        if let Some(password) = var("WP_PASSWORD") {
            self.wp_password = Some(SecretString::from(password));
        }
        if let Some(dir) = var("UPLOAD_DIR") {
            self.upload_dir = Some(PathBuf::from(dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults() {
        let config = CommerceConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_products_fetch, 10);
        assert!(config.consumer_secret.is_none());
    }

    #[test]
    fn from_toml_ignores_secrets() {
        let config: CommerceConfig = toml::from_str(
            r#"
store_url = "https://shop.example.com"
consumer_key = "ck_abc"
consumer_secret = "should-not-load"
timeout_secs = 12
upload_dir = "/var/lib/storebot/uploads"
"#,
        )
        .unwrap();
        assert_eq!(config.store_url, "https://shop.example.com");
        assert_eq!(config.consumer_key, "ck_abc");
        assert!(config.consumer_secret.is_none());
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.max_products_fetch, 10);
        assert_eq!(config.upload_dir, Some(PathBuf::from("/var/lib/storebot/uploads")));
    }

    #[test]
    fn env_overlay() {
        let mut config = CommerceConfig::default();
        config.apply_vars(|name| match name {
            "WC_STORE_URL" => Some("https://env.example.com".into()),
            "WC_CONSUMER_SECRET" => Some("cs_env".into()),
            "WP_PASSWORD" => Some("   ".into()),
            "UPLOAD_DIR" => Some("/srv/uploads".into()),
            _ => None,
        });
        assert_eq!(config.store_url, "https://env.example.com");
        assert_eq!(
            config.consumer_secret.as_ref().unwrap().expose_secret(),
            "cs_env"
        );
        assert!(config.wp_password.is_none());
        assert_eq!(config.upload_dir, Some(PathBuf::from("/srv/uploads")));
    }

    #[test]
    fn debug_redacts_secret() {
        let mut config = CommerceConfig::default();
        config.consumer_secret = Some(SecretString::from("cs_live_123".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("cs_live_123"));
    }
}
