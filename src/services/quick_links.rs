use anyhow::Result;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::quick_link::{clamp_panel_width, QuickLink, DEFAULT_PANEL_WIDTH};
use crate::repository::Repository;
use crate::services::validation::InputValidator;

pub const PANEL_WIDTH_KEY: &str = "quick_links_panel_width";

/// The launcher panel: a small ordered list of titled URLs plus the
/// user-adjustable panel width.
pub struct QuickLinksService {
    repository: Arc<Repository>,
}

impl QuickLinksService {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    pub async fn add_link(&self, title: &str, url: &str) -> Result<QuickLink> {
        let title = InputValidator::validate_link_title(title)?;
        let url = InputValidator::validate_link_url(url)?;

        let link = QuickLink::new(title, url);
        self.repository.quick_links.add(&link).await?;

        Ok(link)
    }

    /// Removing an id that is already gone is not an error.
    pub async fn remove_link(&self, id: Uuid) -> Result<()> {
        if !self.repository.quick_links.remove(id).await? {
            warn!(%id, "remove requested for unknown quick link");
        }
        Ok(())
    }

    pub async fn links(&self) -> Result<Vec<QuickLink>> {
        self.repository.quick_links.list().await
    }

    pub async fn panel_width(&self) -> Result<u32> {
        let stored = self
            .repository
            .settings
            .get(PANEL_WIDTH_KEY)
            .await?
            .and_then(|v| v.parse().ok());

        Ok(match stored {
            Some(width) => clamp_panel_width(width),
            None => DEFAULT_PANEL_WIDTH,
        })
    }

    /// Out-of-range widths are clamped rather than rejected.
    pub async fn set_panel_width(&self, width: u32) -> Result<u32> {
        let width = clamp_panel_width(width);
        self.repository
            .settings
            .set(PANEL_WIDTH_KEY, &width.to_string())
            .await?;
        Ok(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quick_link::{MAX_PANEL_WIDTH, MIN_PANEL_WIDTH};
    use crate::repository::database::init_test_database;

    async fn setup() -> QuickLinksService {
        let pool = init_test_database().await.unwrap();
        QuickLinksService::new(Arc::new(Repository::new(pool)))
    }

    #[tokio::test]
    async fn test_add_normalizes_and_orders() {
        let service = setup().await;

        service.add_link("GitHub", "github.com").await.unwrap();
        service
            .add_link(" Docs ", "https://docs.rs")
            .await
            .unwrap();

        let links = service.links().await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://github.com");
        assert_eq!(links[1].title, "Docs");
        assert_eq!(links[1].url, "https://docs.rs");
    }

    #[tokio::test]
    async fn test_add_rejects_blank_fields() {
        let service = setup().await;
        assert!(service.add_link("", "github.com").await.is_err());
        assert!(service.add_link("GitHub", "  ").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_tolerates_unknown_id() {
        let service = setup().await;

        let link = service.add_link("GitHub", "github.com").await.unwrap();
        service.remove_link(link.id).await.unwrap();
        assert!(service.links().await.unwrap().is_empty());

        service.remove_link(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_panel_width_defaults_and_clamps() {
        let service = setup().await;

        assert_eq!(service.panel_width().await.unwrap(), DEFAULT_PANEL_WIDTH);

        assert_eq!(service.set_panel_width(600).await.unwrap(), 600);
        assert_eq!(service.panel_width().await.unwrap(), 600);

        assert_eq!(service.set_panel_width(10_000).await.unwrap(), MAX_PANEL_WIDTH);
        assert_eq!(service.set_panel_width(10).await.unwrap(), MIN_PANEL_WIDTH);
        assert_eq!(service.panel_width().await.unwrap(), MIN_PANEL_WIDTH);
    }
}
