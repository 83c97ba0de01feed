use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{PostQuery, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;

use super::PostgresRepositories;
use crate::infra::db::map_sqlx_error;

const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.body_markdown, p.published_at, \
     p.site_id, p.category_id, p.author_id, p.created_at, p.updated_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    slug: String,
    title: String,
    body_markdown: String,
    published_at: OffsetDateTime,
    site_id: Uuid,
    category_id: Option<Uuid>,
    author_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        PostRecord {
            id: row.id,
            slug: row.slug,
            title: row.title,
            body_markdown: row.body_markdown,
            published_at: row.published_at,
            site_id: row.site_id,
            category_id: row.category_id,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p WHERE 1=1 "));
        Self::apply_post_query(&mut qb, query);
        qb.push(" ORDER BY p.published_at DESC, p.id DESC ");

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn find_by_publication(
        &self,
        year: i32,
        month: u8,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.slug = "));
        qb.push_bind(slug);
        qb.push(" AND EXTRACT(YEAR FROM p.published_at)::int = ");
        qb.push_bind(year);
        qb.push(" AND EXTRACT(MONTH FROM p.published_at)::int = ");
        qb.push_bind(i32::from(month));

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}
