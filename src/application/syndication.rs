//! Syndication service for RSS feed generation.
//!
//! The feed carries every post, newest first, with the Markdown body
//! rendered to sanitized HTML as the item description.

use std::sync::Arc;

use thiserror::Error;
use time::format_description::well_known::Rfc2822;

use crate::application::render::render_markdown;
use crate::application::repos::{PostQuery, PostsRepo, RepoError, SitesRepo};
use crate::domain::posts;

#[derive(Clone)]
pub struct SyndicationService {
    posts: Arc<dyn PostsRepo>,
    sites: Arc<dyn SitesRepo>,
}

#[derive(Debug, Error)]
pub enum SyndicationError {
    #[error("failed to load site: {0}")]
    Site(String),
    #[error("failed to list posts: {0}")]
    Posts(String),
}

impl From<RepoError> for SyndicationError {
    fn from(err: RepoError) -> Self {
        SyndicationError::Posts(err.to_string())
    }
}

impl SyndicationService {
    pub fn new(posts: Arc<dyn PostsRepo>, sites: Arc<dyn SitesRepo>) -> Self {
        Self { posts, sites }
    }

    /// Generate RSS 2.0 feed XML over all posts.
    pub async fn rss_feed(&self) -> Result<String, SyndicationError> {
        let site = self
            .sites
            .default_site()
            .await
            .map_err(|e| SyndicationError::Site(e.to_string()))?;
        let base = format!("https://{}", site.domain.trim_end_matches('/'));

        let records = self.posts.list_posts(&PostQuery::All).await?;

        let mut items = String::new();
        for post in records {
            let pub_date = post
                .published_at
                .format(&Rfc2822)
                .unwrap_or_else(|_| post.published_at.to_string());
            let link = format!("{base}{}", posts::post_path(post.published_at, &post.slug));
            let description = render_markdown(&post.body_markdown);
            items.push_str(&format!(
                "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <pubDate>{}</pubDate>\n      <description><![CDATA[{}]]></description>\n    </item>\n",
                xml_escape(&post.title),
                link,
                link,
                pub_date,
                description,
            ));
        }

        let channel = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n    <title>{}</title>\n    <link>{}/</link>\n    <description>{}</description>\n{}  </channel>\n</rss>\n",
            xml_escape(&site.name),
            base,
            xml_escape(&site.name),
            items
        );

        Ok(channel)
    }
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
