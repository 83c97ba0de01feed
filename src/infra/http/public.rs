use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{
        blog::{BlogError, BlogService},
        error::HttpError,
        syndication::SyndicationService,
    },
    infra::db::PostgresRepositories,
    presentation::views::{
        ArchiveTemplate, CategoryIndexTemplate, CategoryTemplate, IndexTemplate, LayoutChrome,
        LayoutContext, PageMetaView, PostDetailContext, PostTemplate, SearchTemplate, TagTemplate,
        render_not_found_response, render_template_response,
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
    pub syndication: Arc<SyndicationService>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: HttpState) -> Router {
    // The router allows one parameter name per position, so the index page
    // number shares the `{year}` segment with the post-detail route;
    // extraction is positional.
    Router::new()
        .route("/", get(index))
        .route("/{year}", get(index_page))
        .route("/{year}/{month}/{slug}", get(post_detail))
        .route("/category/{slug}", get(category_listing))
        .route("/tag/{slug}", get(tag_listing))
        .route("/search", get(search))
        .route("/archive", get(archive))
        .route("/categories", get(category_index))
        .route("/feeds/posts", get(rss_feed))
        .route("/_health/db", get(db_health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    q: Option<String>,
    page: Option<String>,
}

/// Page numbers arrive as free-form query/path text; anything that does not
/// parse as a positive integer is treated as page 1.
fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

async fn index(State(state): State<HttpState>) -> Response {
    render_index(state, 1).await
}

async fn index_page(State(state): State<HttpState>, Path(page): Path<String>) -> Response {
    let Ok(page) = page.parse::<usize>() else {
        return not_found_with_chrome(&state).await;
    };
    render_index(state, page.max(1)).await
}

async fn render_index(state: HttpState, page: usize) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    match state.blog.index_context(page).await {
        Ok(content) => {
            let path = if content.page.number == 1 {
                "/".to_string()
            } else {
                format!("/{}", content.page.number)
            };
            let canonical = canonical_url(&chrome.meta.canonical, &path);
            let view = LayoutContext::new(chrome.with_canonical(canonical), content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    Path((year, month, slug)): Path<(String, String, String)>,
) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u8>()) else {
        return render_not_found_response(chrome);
    };

    match state.blog.post_detail(year, month, &slug).await {
        Ok(Some(content)) => {
            let canonical = canonical_url(&chrome.meta.canonical, &content.href);
            let meta = post_meta(&chrome, &content, canonical);
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn category_listing(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    let page = parse_page(query.page.as_deref());
    match state.blog.category_context(&slug, page).await {
        Ok(content) => {
            let canonical = canonical_url(&chrome.meta.canonical, &format!("/category/{slug}"));
            let view = LayoutContext::new(chrome.with_canonical(canonical), content);
            render_template_response(CategoryTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn tag_listing(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    let page = parse_page(query.page.as_deref());
    match state.blog.tag_context(&slug, page).await {
        Ok(content) => {
            let canonical = canonical_url(&chrome.meta.canonical, &format!("/tag/{slug}"));
            let view = LayoutContext::new(chrome.with_canonical(canonical), content);
            render_template_response(TagTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn search(State(state): State<HttpState>, Query(query): Query<SearchQuery>) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    let term = query.q.unwrap_or_default();
    let page = parse_page(query.page.as_deref());
    match state.blog.search_context(&term, page).await {
        Ok(content) => {
            let canonical = canonical_url(&chrome.meta.canonical, "/search");
            let view = LayoutContext::new(chrome.with_canonical(canonical), content);
            render_template_response(SearchTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn archive(State(state): State<HttpState>) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    match state.blog.archive_context().await {
        Ok(content) => {
            let canonical = canonical_url(&chrome.meta.canonical, "/archive");
            let view = LayoutContext::new(chrome.with_canonical(canonical), content);
            render_template_response(ArchiveTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn category_index(State(state): State<HttpState>) -> Response {
    let chrome = match load_chrome(&state).await {
        Ok(chrome) => chrome,
        Err(response) => return response,
    };

    match state.blog.category_index_context().await {
        Ok(content) => {
            let canonical = canonical_url(&chrome.meta.canonical, "/categories");
            let view = LayoutContext::new(chrome.with_canonical(canonical), content);
            render_template_response(CategoryIndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn rss_feed(State(state): State<HttpState>) -> Response {
    match state.syndication.rss_feed().await {
        Ok(body) => xml_response(body, "application/rss+xml"),
        Err(err) => HttpError::new(
            "infra::http::public::rss",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate RSS feed",
            err.to_string(),
        )
        .into_response(),
    }
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn fallback(State(state): State<HttpState>, _request: Request<Body>) -> Response {
    not_found_with_chrome(&state).await
}

async fn load_chrome(state: &HttpState) -> Result<LayoutChrome, Response> {
    state
        .blog
        .chrome()
        .await
        .map_err(|err: BlogError| HttpError::from(err).into_response())
}

async fn not_found_with_chrome(state: &HttpState) -> Response {
    match load_chrome(state).await {
        Ok(chrome) => render_not_found_response(chrome),
        Err(response) => response,
    }
}

fn post_meta(chrome: &LayoutChrome, content: &PostDetailContext, canonical: String) -> PageMetaView {
    let derived = summarize_html(&content.body_html, 180);
    let description = if derived.is_empty() {
        chrome.meta.description.clone()
    } else {
        derived
    };

    chrome
        .meta
        .clone()
        .with_canonical(canonical)
        .with_content(content.title.clone(), description)
}

fn summarize_html(html: &str, max_len: usize) -> String {
    let mut text = String::with_capacity(max_len);
    let mut in_tag = false;
    let mut last_was_space = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                continue;
            }
            '>' => {
                in_tag = false;
                last_was_space = false;
                continue;
            }
            _ if in_tag => continue,
            c if c.is_whitespace() => {
                if !last_was_space && !text.is_empty() {
                    text.push(' ');
                }
                last_was_space = true;
            }
            c => {
                text.push(c);
                last_was_space = false;
            }
        }

        if text.len() >= max_len {
            break;
        }
    }

    text.trim().to_string()
}

fn canonical_url(base: &str, path: &str) -> String {
    let root = normalize_public_site_url(base);
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        root
    } else {
        format!("{root}{trimmed}")
    }
}

fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    format!("{trimmed}/")
}

fn xml_response(body: String, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
