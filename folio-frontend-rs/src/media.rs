#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::config::CONFIG;

const BLOG_PLACEHOLDER: &str =
    "https://images.unsplash.com/photo-1499750310159-5b9883e73975?w=800&q=80";
const PROJECT_PLACEHOLDER: &str = "https://images.unsplash.com/photo-1555066931-4365d14bab8c";

/// Which stock image to show when an entity has no image of its own.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholder {
    Blog,
    Project,
}

impl Placeholder {
    pub fn url(self) -> &'static str {
        match self {
            Placeholder::Blog => BLOG_PLACEHOLDER,
            Placeholder::Project => PROJECT_PLACEHOLDER,
        }
    }
}

/// Absolute URLs pass through untouched, relative ones are hung off the media host.
pub fn resolve_image(media_base_url: &str, image: Option<&str>, placeholder: Placeholder) -> String {
    let Some(image) = image.map(str::trim).filter(|i| !i.is_empty()) else {
        return placeholder.url().to_string();
    };

    if image.starts_with("http") {
        return image.to_string();
    }

    format!(
        "{}/{}",
        media_base_url.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn image_url(image: Option<String>, placeholder: Placeholder) -> String {
    resolve_image(&CONFIG.media_base_url, image.as_deref(), placeholder)
}
