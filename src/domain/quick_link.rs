use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PANEL_WIDTH: u32 = 320;
pub const MAX_PANEL_WIDTH: u32 = 800;
pub const DEFAULT_PANEL_WIDTH: u32 = 480;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickLink {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

impl QuickLink {
    pub fn new(title: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            url: normalize_url(&url),
        }
    }
}

/// Bare hostnames get an https:// prefix so the launcher can open them.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Keeps the user-adjustable panel width inside the renderable range.
pub fn clamp_panel_width(width: u32) -> u32 {
    width.clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH)
}
