//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    AuthorRecord, CategoryRecord, PostRecord, SiteRecord, TagRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Typed selection of posts for a listing view.
///
/// Every variant yields posts ordered by `published_at` descending with id
/// as the tie-break. Unknown category/tag slugs select nothing rather than
/// failing, so those views can render an empty listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostQuery {
    All,
    ByCategorySlug(String),
    ByTagSlug(String),
    BySearchTerm(String),
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError>;

    /// Look up a single post by publication year, publication month, and slug.
    async fn find_by_publication(
        &self,
        year: i32,
        month: u8,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError>;
}

#[async_trait]
pub trait SitesRepo: Send + Sync {
    /// The site this deployment serves. Installations are seeded with one
    /// site; with several, the oldest wins.
    async fn default_site(&self) -> Result<SiteRecord, RepoError>;
}

#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError>;
}
