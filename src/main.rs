use std::{process, sync::Arc, time::Duration};

use rivista::{
    application::{
        blog::BlogService,
        error::AppError,
        repos::{AuthorsRepo, CategoriesRepo, PostsRepo, SitesRepo, TagsRepo},
        syndication::SyndicationService,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    serve(settings).await
}

async fn serve(settings: config::Settings) -> Result<(), AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let state = build_http_state(&repositories);
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "rivista::server",
        addr = %settings.server.public_addr,
        "listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

fn build_http_state(repositories: &Arc<PostgresRepositories>) -> HttpState {
    let posts: Arc<dyn PostsRepo> = repositories.clone();
    let categories: Arc<dyn CategoriesRepo> = repositories.clone();
    let tags: Arc<dyn TagsRepo> = repositories.clone();
    let sites: Arc<dyn SitesRepo> = repositories.clone();
    let authors: Arc<dyn AuthorsRepo> = repositories.clone();

    let blog = Arc::new(BlogService::new(
        posts,
        categories,
        tags,
        sites.clone(),
        authors,
    ));
    let syndication = Arc::new(SyndicationService::new(repositories.clone(), sites));

    HttpState {
        blog,
        syndication,
        db: repositories.clone(),
    }
}

/// Resolve once a shutdown signal arrives; a timer then bounds how long
/// in-flight requests may take to drain.
async fn shutdown_signal(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!(
            target = "rivista::server",
            "failed to listen for shutdown signal"
        );
        return;
    }

    info!(target = "rivista::server", "shutdown signal received");

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "rivista::server",
            "graceful shutdown window elapsed, exiting"
        );
        process::exit(0);
    });
}
