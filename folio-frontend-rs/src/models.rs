//! Records as the backend serves them, plus the small derived values the pages display.
//!
//! The free functions are exported to JS and take the raw fields, so the pages can call them on whatever they
//! already hold.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

const EXCERPT_CHARS: usize = 100;
const WORDS_PER_MINUTE: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct Comment {
    pub id: u64,
    pub name: String,
    pub comment: String,
    pub posted_at: DateTime<Utc>,
}

impl Comment {
    /// Letter shown in the commenter's avatar bubble.
    pub fn avatar_initial(&self) -> Option<String> {
        avatar_initial(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    /// Rendered HTML.
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_like: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl BlogPost {
    pub fn excerpt(&self) -> String {
        blog_excerpt(&self.content)
    }

    pub fn read_time(&self) -> String {
        read_time(&self.content)
    }
}

/// The blog index page: the newest post gets the large card, the rest go in the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct BlogIndex {
    pub featured: Option<BlogPost>,
    pub others: Vec<BlogPost>,
}

impl BlogIndex {
    /// `posts` in the order the backend listed them.
    pub fn split(posts: Vec<BlogPost>) -> Self {
        let mut posts = posts.into_iter();
        Self {
            featured: posts.next(),
            others: posts.collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub struct GalleryItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Comma separated, e.g. `"React, Django, Tailwind"`.
    #[serde(default)]
    pub techstack: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub livelink: Option<String>,
    #[serde(default)]
    pub githublink: Option<String>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_like: u64,
}

impl GalleryItem {
    pub fn tech_stack(&self) -> Vec<String> {
        split_tech_stack(&self.techstack)
    }

    pub fn year_label(&self, offset: FixedOffset) -> String {
        year_label(self.posted_at.as_ref(), offset)
    }
}

/// `utc_offset_minutes` is what JS calls `-new Date().getTimezoneOffset()`. Out of range offsets fall back to UTC.
pub fn viewer_offset(utc_offset_minutes: i32) -> FixedOffset {
    utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// e.g. "January 13, 2026", on the viewer's calendar.
pub fn display_date(timestamp: &DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp.with_timezone(&offset).format("%B %-d, %Y").to_string()
}

/// The posting year, or "Project" for undated entries.
pub fn year_label(posted_at: Option<&DateTime<Utc>>, offset: FixedOffset) -> String {
    posted_at
        .map(|posted_at| posted_at.with_timezone(&offset).year().to_string())
        .unwrap_or_else(|| "Project".to_string())
}

/// Drops everything of the form `<...>`. Entities are left as they are.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => {
                text.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            _ => {
                text.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    text.push_str(rest);
    text
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .inspect_err(|e| log::warn!("Unreadable timestamp {timestamp:?}: {e}"))
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn format_date(timestamp: &str, utc_offset_minutes: i32) -> Option<String> {
    parse_timestamp(timestamp).map(|timestamp| display_date(&timestamp, viewer_offset(utc_offset_minutes)))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn project_year(posted_at: Option<String>, utc_offset_minutes: i32) -> String {
    let posted_at = posted_at.as_deref().and_then(parse_timestamp);
    year_label(posted_at.as_ref(), viewer_offset(utc_offset_minutes))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn split_tech_stack(techstack: &str) -> Vec<String> {
    techstack
        .split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn avatar_initial(name: &str) -> Option<String> {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
}

/// The first hundred characters of the post's text, with "..." when it was cut.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn blog_excerpt(content: &str) -> String {
    let text = strip_tags(content);
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

/// "N min read" at two hundred words a minute, never less than one.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn read_time(content: &str) -> String {
    let words = strip_tags(content).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}
