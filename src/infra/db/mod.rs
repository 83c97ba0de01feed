//! Postgres-backed repository implementations.

mod authors;
mod categories;
mod posts;
mod sites;
mod tags;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder, query,
    postgres::{PgPool, PgPoolOptions},
};

use crate::application::repos::PostQuery;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn apply_post_query<'q>(qb: &mut QueryBuilder<'q, Postgres>, query: &'q PostQuery) {
        match query {
            PostQuery::All => {}
            PostQuery::ByCategorySlug(slug) => {
                qb.push(
                    " AND EXISTS (SELECT 1 FROM categories c WHERE c.id = p.category_id AND c.slug = ",
                );
                qb.push_bind(slug);
                qb.push(")");
            }
            PostQuery::ByTagSlug(slug) => {
                qb.push(
                    " AND EXISTS (SELECT 1 FROM post_tags pt INNER JOIN tags t ON t.id = pt.tag_id WHERE pt.post_id = p.id AND t.slug = ",
                );
                qb.push_bind(slug);
                qb.push(")");
            }
            PostQuery::BySearchTerm(term) => {
                qb.push(" AND (p.title ILIKE ");
                qb.push_bind(format!("%{term}%"));
                qb.push(" OR p.body_markdown ILIKE ");
                qb.push_bind(format!("%{term}%"));
                qb.push(")");
            }
        }
    }
}
