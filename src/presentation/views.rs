use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::pagination::Paginated;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }

    pub fn with_content(self, title: String, description: String) -> Self {
        Self {
            title,
            description,
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct CategoryBadge {
    pub name: String,
    pub href: String,
}

#[derive(Clone)]
pub struct TagBadge {
    pub name: String,
    pub href: String,
}

#[derive(Clone)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub href: String,
    pub body_html: String,
    pub published: String,
    pub iso_date: String,
    pub category: Option<CategoryBadge>,
    pub tags: Vec<TagBadge>,
}

/// Page-navigation metadata shared by every paginated template.
#[derive(Clone)]
pub struct PaginationView {
    pub number: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_number: usize,
    pub next_number: usize,
}

impl PaginationView {
    pub fn from_page<T>(page: &Paginated<T>) -> Self {
        Self {
            number: page.number,
            total_pages: page.total_pages,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_number: page.previous_number(),
            next_number: page.next_number(),
        }
    }
}

pub struct IndexContext {
    pub posts: Vec<PostCard>,
    pub page: PaginationView,
    pub has_results: bool,
}

/// Context for the category and tag listings; the two templates differ only
/// in the base path their pagination links use.
pub struct FilterListingContext {
    pub slug: String,
    pub name: Option<String>,
    pub posts: Vec<PostCard>,
    pub page: PaginationView,
    pub has_results: bool,
}

pub struct SearchContext {
    pub term: String,
    pub posts: Vec<PostCard>,
    pub page: PaginationView,
    pub has_results: bool,
    /// Prebuilt pagination targets; the search term needs form encoding, so
    /// these are assembled service-side rather than in the template.
    pub previous_href: String,
    pub next_href: String,
}

pub struct PostDetailContext {
    pub slug: String,
    pub title: String,
    pub href: String,
    pub body_html: String,
    pub published: String,
    pub iso_date: String,
    pub category: Option<CategoryBadge>,
    pub tags: Vec<TagBadge>,
    pub author: Option<String>,
}

pub struct ArchiveEntry {
    pub title: String,
    pub href: String,
    pub published: String,
}

pub struct ArchiveMonthView {
    pub name: &'static str,
    pub posts: Vec<ArchiveEntry>,
}

pub struct ArchiveYearView {
    pub year: i32,
    pub months: Vec<ArchiveMonthView>,
}

pub struct ArchiveContext {
    pub years: Vec<ArchiveYearView>,
}

pub struct CategoryGroupView {
    pub name: String,
    pub posts: Vec<ArchiveEntry>,
}

pub struct CategoryIndexContext {
    pub groups: Vec<CategoryGroupView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage."
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexContext>,
}

#[derive(Template)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub view: LayoutContext<FilterListingContext>,
}

#[derive(Template)]
#[template(path = "tag.html")]
pub struct TagTemplate {
    pub view: LayoutContext<FilterListingContext>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub view: LayoutContext<SearchContext>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

#[derive(Template)]
#[template(path = "archive.html")]
pub struct ArchiveTemplate {
    pub view: LayoutContext<ArchiveContext>,
}

#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoryIndexTemplate {
    pub view: LayoutContext<CategoryIndexContext>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
