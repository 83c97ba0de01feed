use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, SitesRepo};
use crate::domain::entities::SiteRecord;

use super::PostgresRepositories;
use crate::infra::db::map_sqlx_error;

#[derive(sqlx::FromRow)]
struct SiteRow {
    id: Uuid,
    name: String,
    domain: String,
    created_at: OffsetDateTime,
}

impl From<SiteRow> for SiteRecord {
    fn from(row: SiteRow) -> Self {
        SiteRecord {
            id: row.id,
            name: row.name,
            domain: row.domain,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SitesRepo for PostgresRepositories {
    async fn default_site(&self) -> Result<SiteRecord, RepoError> {
        let row = sqlx::query_as::<_, SiteRow>(
            "SELECT id, name, domain, created_at FROM sites ORDER BY created_at ASC LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(SiteRecord::from).ok_or(RepoError::NotFound)
    }
}
