use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, TagsRepo};
use crate::domain::entities::TagRecord;

use super::PostgresRepositories;
use crate::infra::db::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct TagRow {
    id: Uuid,
    slug: String,
    name: String,
    description: String,
    created_at: OffsetDateTime,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        TagRecord {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let mut qb =
            QueryBuilder::new("SELECT id, slug, name, description, created_at FROM tags WHERE slug = ");
        qb.push_bind(slug);

        let row = qb
            .build_query_as::<TagRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT t.id, t.slug, t.name, t.description, t.created_at \
             FROM tags t INNER JOIN post_tags pt ON pt.tag_id = t.id WHERE pt.post_id = ",
        );
        qb.push_bind(post_id);
        qb.push(" ORDER BY t.name");

        let rows = qb
            .build_query_as::<TagRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }
}
