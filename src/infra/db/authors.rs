use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{AuthorsRepo, RepoError};
use crate::domain::entities::AuthorRecord;

use super::PostgresRepositories;
use crate::infra::db::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: Uuid,
    username: String,
    email: String,
    created_at: OffsetDateTime,
}

impl From<AuthorRow> for AuthorRecord {
    fn from(row: AuthorRow) -> Self {
        AuthorRecord {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl AuthorsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        let mut qb =
            QueryBuilder::new("SELECT id, username, email, created_at FROM authors WHERE id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<AuthorRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(AuthorRecord::from))
    }
}
