//! Read-side orchestration: turns stored records into view contexts.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::archive::{self, ArchiveYear, CategoryGroup};
use crate::application::pagination::{LISTING_PAGE_SIZE, SEARCH_PAGE_SIZE, paginate};
use crate::application::render::render_markdown;
use crate::application::repos::{
    AuthorsRepo, CategoriesRepo, PostQuery, PostsRepo, RepoError, SitesRepo, TagsRepo,
};
use crate::domain::entities::{CategoryRecord, PostRecord, TagRecord};
use crate::domain::posts;
use crate::presentation::views::{
    ArchiveContext, ArchiveEntry, ArchiveMonthView, ArchiveYearView, BrandView, CategoryBadge,
    CategoryGroupView, CategoryIndexContext, FilterListingContext, IndexContext, LayoutChrome,
    PageMetaView, PaginationView, PostCard, PostDetailContext, SearchContext, TagBadge,
};

#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    tags: Arc<dyn TagsRepo>,
    sites: Arc<dyn SitesRepo>,
    authors: Arc<dyn AuthorsRepo>,
}

#[derive(Debug, Error)]
pub enum BlogError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        tags: Arc<dyn TagsRepo>,
        sites: Arc<dyn SitesRepo>,
        authors: Arc<dyn AuthorsRepo>,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
            sites,
            authors,
        }
    }

    /// Layout chrome derived from the site record: brand plus default meta.
    pub async fn chrome(&self) -> Result<LayoutChrome, BlogError> {
        let site = self.sites.default_site().await?;
        let canonical = format!("https://{}/", site.domain.trim_end_matches('/'));

        Ok(LayoutChrome {
            brand: BrandView {
                title: site.name.clone(),
                href: "/".to_string(),
            },
            meta: PageMetaView {
                title: site.name.clone(),
                description: site.name,
                canonical,
            },
        })
    }

    pub async fn index_context(&self, requested_page: usize) -> Result<IndexContext, BlogError> {
        let records = self.posts.list_posts(&PostQuery::All).await?;
        let page = paginate(records, LISTING_PAGE_SIZE, requested_page);
        let posts = self.build_cards(&page.items).await?;

        Ok(IndexContext {
            has_results: !posts.is_empty(),
            page: PaginationView::from_page(&page),
            posts,
        })
    }

    /// Category listing. An unknown slug is a soft miss: the view renders
    /// with no posts rather than erroring.
    pub async fn category_context(
        &self,
        slug: &str,
        requested_page: usize,
    ) -> Result<FilterListingContext, BlogError> {
        let name = self
            .categories
            .find_by_slug(slug)
            .await?
            .map(|category| category.name);
        let records = self
            .posts
            .list_posts(&PostQuery::ByCategorySlug(slug.to_string()))
            .await?;

        self.filter_listing(slug, name, records, requested_page)
            .await
    }

    /// Tag listing, with the same soft-miss contract as categories.
    pub async fn tag_context(
        &self,
        slug: &str,
        requested_page: usize,
    ) -> Result<FilterListingContext, BlogError> {
        let name = self.tags.find_by_slug(slug).await?.map(|tag| tag.name);
        let records = self
            .posts
            .list_posts(&PostQuery::ByTagSlug(slug.to_string()))
            .await?;

        self.filter_listing(slug, name, records, requested_page)
            .await
    }

    /// Substring search over title and body. An empty or whitespace-only
    /// term yields no results; it does not mean "all posts".
    pub async fn search_context(
        &self,
        term: &str,
        requested_page: usize,
    ) -> Result<SearchContext, BlogError> {
        let trimmed = term.trim();
        let records = if trimmed.is_empty() {
            Vec::new()
        } else {
            self.posts
                .list_posts(&PostQuery::BySearchTerm(trimmed.to_string()))
                .await?
        };

        let page = paginate(records, SEARCH_PAGE_SIZE, requested_page);
        let posts = self.build_cards(&page.items).await?;

        Ok(SearchContext {
            term: trimmed.to_string(),
            has_results: !posts.is_empty(),
            previous_href: search_page_href(trimmed, page.previous_number()),
            next_href: search_page_href(trimmed, page.next_number()),
            page: PaginationView::from_page(&page),
            posts,
        })
    }

    /// Detail lookup by publication year, month, and slug. `None` means the
    /// caller should render a not-found response.
    pub async fn post_detail(
        &self,
        year: i32,
        month: u8,
        slug: &str,
    ) -> Result<Option<PostDetailContext>, BlogError> {
        let Some(record) = self.posts.find_by_publication(year, month, slug).await? else {
            return Ok(None);
        };

        let category = match record.category_id {
            Some(id) => self.categories.find_by_id(id).await?,
            None => None,
        };
        let tags = self.tags.list_for_post(record.id).await?;
        let author = self
            .authors
            .find_by_id(record.author_id)
            .await?
            .map(|author| author.username);

        Ok(Some(PostDetailContext {
            href: posts::post_path(record.published_at, &record.slug),
            title: record.title,
            body_html: render_markdown(&record.body_markdown),
            published: posts::format_human_date(record.published_at.date()),
            iso_date: posts::format_iso_datetime(record.published_at),
            category: category.as_ref().map(category_badge),
            tags: tags.iter().map(tag_badge).collect(),
            author,
            slug: record.slug,
        }))
    }

    /// Year/month archive over the full post set.
    pub async fn archive_context(&self) -> Result<ArchiveContext, BlogError> {
        let records = self.posts.list_posts(&PostQuery::All).await?;
        let years = archive::group_by_year_month(records);

        Ok(ArchiveContext {
            years: years.into_iter().map(archive_year_view).collect(),
        })
    }

    /// Category index over the full post set, grouped by category name in
    /// first-seen (most-recent-post) order.
    pub async fn category_index_context(&self) -> Result<CategoryIndexContext, BlogError> {
        let records = self.posts.list_posts(&PostQuery::All).await?;
        let names: HashMap<Uuid, String> = self
            .categories
            .list_all()
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();
        let groups = archive::group_by_category(records, &names);

        Ok(CategoryIndexContext {
            groups: groups.into_iter().map(category_group_view).collect(),
        })
    }

    async fn filter_listing(
        &self,
        slug: &str,
        name: Option<String>,
        records: Vec<PostRecord>,
        requested_page: usize,
    ) -> Result<FilterListingContext, BlogError> {
        let page = paginate(records, LISTING_PAGE_SIZE, requested_page);
        let posts = self.build_cards(&page.items).await?;

        Ok(FilterListingContext {
            slug: slug.to_string(),
            name,
            has_results: !posts.is_empty(),
            page: PaginationView::from_page(&page),
            posts,
        })
    }

    async fn build_cards(&self, records: &[PostRecord]) -> Result<Vec<PostCard>, BlogError> {
        let mut categories: HashMap<Uuid, CategoryRecord> = HashMap::new();
        let mut cards = Vec::with_capacity(records.len());

        for record in records {
            if let Some(id) = record.category_id {
                if !categories.contains_key(&id) {
                    if let Some(category) = self.categories.find_by_id(id).await? {
                        categories.insert(id, category);
                    }
                }
            }
            let category = record.category_id.and_then(|id| categories.get(&id));
            let tags = self.tags.list_for_post(record.id).await?;
            cards.push(record_to_card(record, category, &tags));
        }

        Ok(cards)
    }
}

fn record_to_card(
    record: &PostRecord,
    category: Option<&CategoryRecord>,
    tags: &[TagRecord],
) -> PostCard {
    PostCard {
        slug: record.slug.clone(),
        title: record.title.clone(),
        href: posts::post_path(record.published_at, &record.slug),
        body_html: render_markdown(&record.body_markdown),
        published: posts::format_human_date(record.published_at.date()),
        iso_date: posts::format_iso_datetime(record.published_at),
        category: category.map(category_badge),
        tags: tags.iter().map(tag_badge).collect(),
    }
}

fn search_page_href(term: &str, page: usize) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("q", term);
    query.append_pair("page", &page.to_string());
    format!("/search?{}", query.finish())
}

fn category_badge(category: &CategoryRecord) -> CategoryBadge {
    CategoryBadge {
        name: category.name.clone(),
        href: format!("/category/{}", category.slug),
    }
}

fn tag_badge(tag: &TagRecord) -> TagBadge {
    TagBadge {
        name: tag.name.clone(),
        href: format!("/tag/{}", tag.slug),
    }
}

fn archive_entry(record: &PostRecord) -> ArchiveEntry {
    ArchiveEntry {
        title: record.title.clone(),
        href: posts::post_path(record.published_at, &record.slug),
        published: posts::format_human_date(record.published_at.date()),
    }
}

fn archive_year_view(year: ArchiveYear) -> ArchiveYearView {
    ArchiveYearView {
        year: year.year,
        months: year
            .months
            .into_iter()
            .map(|month| ArchiveMonthView {
                name: posts::month_name(month.month),
                posts: month.posts.iter().map(archive_entry).collect(),
            })
            .collect(),
    }
}

fn category_group_view(group: CategoryGroup) -> CategoryGroupView {
    CategoryGroupView {
        name: group.name,
        posts: group.posts.iter().map(archive_entry).collect(),
    }
}
