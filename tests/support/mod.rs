//! In-memory repositories backing the integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use rivista::application::blog::BlogService;
use rivista::application::repos::{
    AuthorsRepo, CategoriesRepo, PostQuery, PostsRepo, RepoError, SitesRepo, TagsRepo,
};
use rivista::application::syndication::SyndicationService;
use rivista::domain::entities::{
    AuthorRecord, CategoryRecord, PostRecord, SiteRecord, TagRecord,
};

/// Fixed-content stand-in for the Postgres adapters. Contents are assembled
/// up front; the trait impls only read.
#[derive(Default)]
pub struct MemoryStore {
    pub posts: Vec<PostRecord>,
    pub categories: Vec<CategoryRecord>,
    pub tags: Vec<TagRecord>,
    pub post_tags: Vec<(Uuid, Uuid)>,
    pub sites: Vec<SiteRecord>,
    pub authors: Vec<AuthorRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        store.sites.push(SiteRecord {
            id: Uuid::new_v4(),
            name: "Test Blog".to_string(),
            domain: "test.com".to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        });
        store.authors.push(AuthorRecord {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            email: "user@example.com".to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        });
        store
    }

    pub fn add_category(&mut self, slug: &str, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.categories.push(CategoryRecord {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        });
        id
    }

    pub fn add_tag(&mut self, slug: &str, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tags.push(TagRecord {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            description: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        });
        id
    }

    pub fn add_post(
        &mut self,
        slug: &str,
        title: &str,
        body_markdown: &str,
        published_at: OffsetDateTime,
        category_id: Option<Uuid>,
        tag_ids: &[Uuid],
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.push(PostRecord {
            id,
            slug: slug.to_string(),
            title: title.to_string(),
            body_markdown: body_markdown.to_string(),
            published_at,
            site_id: self.sites[0].id,
            category_id,
            author_id: self.authors[0].id,
            created_at: published_at,
            updated_at: published_at,
        });
        for tag_id in tag_ids {
            self.post_tags.push((id, *tag_id));
        }
        id
    }

    fn sorted_posts(&self, filter: impl Fn(&PostRecord) -> bool) -> Vec<PostRecord> {
        let mut posts: Vec<PostRecord> = self
            .posts
            .iter()
            .filter(|post| filter(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });
        posts
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError> {
        let posts = match query {
            PostQuery::All => self.sorted_posts(|_| true),
            PostQuery::ByCategorySlug(slug) => {
                let category_id = self
                    .categories
                    .iter()
                    .find(|category| &category.slug == slug)
                    .map(|category| category.id);
                self.sorted_posts(|post| post.category_id.is_some() && post.category_id == category_id)
            }
            PostQuery::ByTagSlug(slug) => {
                let tag_id = self.tags.iter().find(|tag| &tag.slug == slug).map(|tag| tag.id);
                let post_ids: Vec<Uuid> = self
                    .post_tags
                    .iter()
                    .filter(|(_, tid)| Some(*tid) == tag_id)
                    .map(|(pid, _)| *pid)
                    .collect();
                self.sorted_posts(|post| post_ids.contains(&post.id))
            }
            PostQuery::BySearchTerm(term) => {
                let needle = term.to_lowercase();
                self.sorted_posts(|post| {
                    post.title.to_lowercase().contains(&needle)
                        || post.body_markdown.to_lowercase().contains(&needle)
                })
            }
        };
        Ok(posts)
    }

    async fn find_by_publication(
        &self,
        year: i32,
        month: u8,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .posts
            .iter()
            .find(|post| {
                let date = post.published_at.date();
                post.slug == slug && date.year() == year && u8::from(date.month()) == month
            })
            .cloned())
    }
}

#[async_trait]
impl CategoriesRepo for MemoryStore {
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(self.categories.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self.categories.iter().find(|c| c.slug == slug).cloned())
    }
}

#[async_trait]
impl TagsRepo for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        Ok(self.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let tag_ids: Vec<Uuid> = self
            .post_tags
            .iter()
            .filter(|(pid, _)| *pid == post_id)
            .map(|(_, tid)| *tid)
            .collect();
        Ok(self
            .tags
            .iter()
            .filter(|tag| tag_ids.contains(&tag.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SitesRepo for MemoryStore {
    async fn default_site(&self) -> Result<SiteRecord, RepoError> {
        self.sites.first().cloned().ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl AuthorsRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(self.authors.iter().find(|a| a.id == id).cloned())
    }
}

pub fn blog_service(store: &Arc<MemoryStore>) -> BlogService {
    BlogService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    )
}

pub fn syndication_service(store: &Arc<MemoryStore>) -> SyndicationService {
    SyndicationService::new(store.clone(), store.clone())
}
