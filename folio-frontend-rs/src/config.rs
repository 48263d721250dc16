use std::sync::LazyLock;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Where the site's backend and media live. Values are baked in at build time; anything unset falls back to a
/// local development setup.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub api_base_url: String,
    /// Base URL relative image references are resolved against. Empty when no media host is configured.
    pub media_base_url: String,
    pub contact_email: String,
}

impl SiteConfig {
    pub fn from_build_env() -> Self {
        Self::from_parts(
            option_env!("FOLIO_API_URL"),
            option_env!("FOLIO_CLOUDINARY_CLOUD_NAME"),
            option_env!("FOLIO_CONTACT_EMAIL"),
        )
    }

    pub(crate) fn from_parts(
        api_url: Option<&str>,
        cloudinary_cloud_name: Option<&str>,
        contact_email: Option<&str>,
    ) -> Self {
        let api_base_url = match non_blank(api_url) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                log::info!("FOLIO_API_URL not set, using default: {DEFAULT_API_BASE_URL}");
                DEFAULT_API_BASE_URL.to_string()
            }
        };

        let media_base_url = non_blank(cloudinary_cloud_name)
            .map(|name| format!("https://res.cloudinary.com/{name}"))
            .unwrap_or_default();

        Self {
            api_base_url,
            media_base_url,
            contact_email: non_blank(contact_email).unwrap_or_default().to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) static CONFIG: LazyLock<SiteConfig> = LazyLock::new(SiteConfig::from_build_env);

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn site_config() -> SiteConfig {
    CONFIG.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_backend_without_media_host() {
        let config = SiteConfig::from_parts(None, None, None);
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.media_base_url, "");
        assert_eq!(config.contact_email, "");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = SiteConfig::from_parts(Some("  "), Some(""), Some(" "));
        assert_eq!(config, SiteConfig::from_parts(None, None, None));
    }

    #[test]
    fn configured_values() {
        let config = SiteConfig::from_parts(
            Some("https://api.example.com/"),
            Some("dgie5t9uw"),
            Some("me@example.com"),
        );
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.media_base_url, "https://res.cloudinary.com/dgie5t9uw");
        assert_eq!(config.contact_email, "me@example.com");
    }
}
