//! Service-level flows over an in-memory store: listings, search, detail,
//! grouping, and the feed.

mod support;

use std::sync::Arc;

use time::macros::datetime;

use support::{MemoryStore, blog_service, syndication_service};

#[tokio::test]
async fn index_orders_posts_newest_first() {
    let mut store = MemoryStore::new();
    store.add_post(
        "oldest",
        "Oldest",
        "body",
        datetime!(2016-03-02 09:30:00 UTC),
        None,
        &[],
    );
    store.add_post(
        "newest",
        "Newest",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    store.add_post(
        "middle",
        "Middle",
        "body",
        datetime!(2016-12-01 08:00:00 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.index_context(1).await.expect("index context");

    let titles: Vec<&str> = context.posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn index_pages_hold_five_posts_and_clamp() {
    let mut store = MemoryStore::new();
    for day in 1..=7 {
        store.add_post(
            &format!("post-{day}"),
            &format!("Post {day}"),
            "body",
            datetime!(2017-07-01 12:00:00 UTC) + time::Duration::days(day),
            None,
            &[],
        );
    }
    let blog = blog_service(&Arc::new(store));

    let first = blog.index_context(1).await.expect("first page");
    assert_eq!(first.posts.len(), 5);
    assert_eq!(first.page.total_pages, 2);
    assert!(first.page.has_next);

    let second = blog.index_context(2).await.expect("second page");
    assert_eq!(second.posts.len(), 2);

    let clamped = blog.index_context(9).await.expect("clamped page");
    assert_eq!(clamped.page.number, 2);
    let second_slugs: Vec<&str> = second.posts.iter().map(|p| p.slug.as_str()).collect();
    let clamped_slugs: Vec<&str> = clamped.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(second_slugs, clamped_slugs);
}

#[tokio::test]
async fn index_renders_markdown_bodies() {
    let mut store = MemoryStore::new();
    store.add_post(
        "my-first-post",
        "My first post",
        "This is [my first blog post](http://127.0.0.1:8000/)",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.index_context(1).await.expect("index context");

    let body = &context.posts[0].body_html;
    assert!(body.contains("href=\"http://127.0.0.1:8000/\""), "got: {body}");
    assert!(body.contains(">my first blog post</a>"), "got: {body}");
}

#[tokio::test]
async fn category_listing_filters_by_slug() {
    let mut store = MemoryStore::new();
    let python = store.add_category("python", "python");
    let perl = store.add_category("perl", "perl");
    store.add_post(
        "py-post",
        "Python post",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        Some(python),
        &[],
    );
    store.add_post(
        "perl-post",
        "Perl post",
        "body",
        datetime!(2017-06-01 12:00:00 UTC),
        Some(perl),
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.category_context("python", 1).await.expect("listing");

    assert_eq!(context.name.as_deref(), Some("python"));
    assert_eq!(context.posts.len(), 1);
    assert_eq!(context.posts[0].title, "Python post");
}

#[tokio::test]
async fn unknown_category_is_a_soft_miss() {
    let mut store = MemoryStore::new();
    store.add_post(
        "loose",
        "Loose post",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.category_context("blah", 1).await.expect("listing");

    assert!(context.name.is_none());
    assert!(context.posts.is_empty());
    assert!(!context.has_results);
}

#[tokio::test]
async fn tag_listing_uses_the_reverse_relation() {
    let mut store = MemoryStore::new();
    let perl = store.add_tag("perl", "perl");
    store.add_post(
        "tagged",
        "Tagged post",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[perl],
    );
    store.add_post(
        "untagged",
        "Untagged post",
        "body",
        datetime!(2017-06-01 12:00:00 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.tag_context("perl", 1).await.expect("listing");
    assert_eq!(context.posts.len(), 1);
    assert_eq!(context.posts[0].title, "Tagged post");

    let miss = blog.tag_context("blah", 1).await.expect("soft miss");
    assert!(miss.posts.is_empty());
    assert!(!miss.has_results);
}

#[tokio::test]
async fn search_matches_substrings_case_insensitively() {
    let mut store = MemoryStore::new();
    store.add_post(
        "my-first-post",
        "My first post",
        "This is my first blog post",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    store.add_post(
        "my-second-post",
        "My second post",
        "This is my second blog post",
        datetime!(2017-07-15 22:00:04 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.search_context("first", 1).await.expect("search");
    let titles: Vec<&str> = context.posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["My first post"]);

    let upper = blog.search_context("FIRST", 1).await.expect("search");
    assert_eq!(upper.posts.len(), 1);

    let second = blog.search_context("second", 1).await.expect("search");
    let titles: Vec<&str> = second.posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["My second post"]);
}

#[tokio::test]
async fn empty_search_term_yields_no_results() {
    let mut store = MemoryStore::new();
    store.add_post(
        "my-first-post",
        "My first post",
        "This is my first blog post",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let empty = blog.search_context("", 1).await.expect("search");
    assert!(empty.posts.is_empty());
    assert!(!empty.has_results);

    let blank = blog.search_context("   ", 1).await.expect("search");
    assert!(blank.posts.is_empty());
}

#[tokio::test]
async fn search_clamps_pages_past_the_end() {
    let mut store = MemoryStore::new();
    store.add_post(
        "my-first-post",
        "My first post",
        "This is my first blog post",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let first = blog.search_context("first", 1).await.expect("page 1");
    let clamped = blog.search_context("first", 2).await.expect("page 2");

    assert_eq!(clamped.page.number, 1);
    let first_slugs: Vec<&str> = first.posts.iter().map(|p| p.slug.as_str()).collect();
    let clamped_slugs: Vec<&str> = clamped.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(first_slugs, clamped_slugs);
}

#[tokio::test]
async fn post_detail_resolves_by_year_month_and_slug() {
    let mut store = MemoryStore::new();
    let python = store.add_category("python", "python");
    let perl = store.add_tag("perl", "perl");
    store.add_post(
        "my-first-post",
        "My first post",
        "This is my *first* blog post",
        datetime!(2017-07-14 22:00:04 UTC),
        Some(python),
        &[perl],
    );
    let blog = blog_service(&Arc::new(store));

    let detail = blog
        .post_detail(2017, 7, "my-first-post")
        .await
        .expect("lookup")
        .expect("post exists");

    assert_eq!(detail.title, "My first post");
    assert!(detail.body_html.contains("<em>first</em>"));
    assert_eq!(detail.category.as_ref().map(|c| c.name.as_str()), Some("python"));
    assert_eq!(detail.tags.len(), 1);
    assert_eq!(detail.author.as_deref(), Some("testuser"));
    assert_eq!(detail.href, "/2017/7/my-first-post");
}

#[tokio::test]
async fn post_detail_misses_on_wrong_publication_month() {
    let mut store = MemoryStore::new();
    store.add_post(
        "my-first-post",
        "My first post",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let miss = blog
        .post_detail(2017, 8, "my-first-post")
        .await
        .expect("lookup");
    assert!(miss.is_none());

    let wrong_slug = blog.post_detail(2017, 7, "another").await.expect("lookup");
    assert!(wrong_slug.is_none());
}

#[tokio::test]
async fn archive_spans_the_full_year_range() {
    let mut store = MemoryStore::new();
    store.add_post(
        "newer",
        "Newer",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    store.add_post(
        "older",
        "Older",
        "body",
        datetime!(2016-03-02 09:30:00 UTC),
        None,
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.archive_context().await.expect("archive");

    let years: Vec<i32> = context.years.iter().map(|y| y.year).collect();
    assert_eq!(years, vec![2017, 2016]);
    for year in &context.years {
        assert_eq!(year.months.len(), 12);
    }
    assert_eq!(context.years[0].months[6].posts[0].title, "Newer");
    assert_eq!(context.years[1].months[2].posts[0].title, "Older");
}

#[tokio::test]
async fn archive_of_empty_store_is_empty() {
    let blog = blog_service(&Arc::new(MemoryStore::new()));

    let archive = blog.archive_context().await.expect("archive");
    assert!(archive.years.is_empty());

    let categories = blog.category_index_context().await.expect("categories");
    assert!(categories.groups.is_empty());
}

#[tokio::test]
async fn category_index_groups_by_name_in_recency_order() {
    let mut store = MemoryStore::new();
    let python = store.add_category("python", "python");
    let perl = store.add_category("perl", "perl");
    store.add_post(
        "py-two",
        "Python two",
        "body",
        datetime!(2017-07-14 22:00:04 UTC),
        Some(python),
        &[],
    );
    store.add_post(
        "perl-one",
        "Perl one",
        "body",
        datetime!(2017-06-01 12:00:00 UTC),
        Some(perl),
        &[],
    );
    store.add_post(
        "py-one",
        "Python one",
        "body",
        datetime!(2016-03-02 09:30:00 UTC),
        Some(python),
        &[],
    );
    let blog = blog_service(&Arc::new(store));

    let context = blog.category_index_context().await.expect("categories");

    assert_eq!(context.groups.len(), 2);
    assert_eq!(context.groups[0].name, "python");
    assert_eq!(context.groups[0].posts.len(), 2);
    assert_eq!(context.groups[1].name, "perl");
    assert_eq!(context.groups[1].posts.len(), 1);
}

#[tokio::test]
async fn feed_lists_all_posts_newest_first_with_rendered_bodies() {
    let mut store = MemoryStore::new();
    store.add_post(
        "my-first-post",
        "My first post",
        "This is my *first* blog post",
        datetime!(2017-07-14 22:00:04 UTC),
        None,
        &[],
    );
    store.add_post(
        "my-second-post",
        "My second post",
        "This is my *second* blog post",
        datetime!(2017-07-15 22:00:04 UTC),
        None,
        &[],
    );
    let syndication = syndication_service(&Arc::new(store));

    let feed = syndication.rss_feed().await.expect("rss feed");

    assert!(feed.contains("<rss version=\"2.0\">"));
    assert!(feed.contains("<title>Test Blog</title>"));
    assert!(feed.contains("<title>My first post</title>"));
    assert!(feed.contains("This is my <em>first</em> blog post"));

    let second_pos = feed.find("My second post").expect("second in feed");
    let first_pos = feed.find("My first post").expect("first in feed");
    assert!(
        second_pos < first_pos,
        "newest post should come first in the feed"
    );

    assert!(feed.contains("https://test.com/2017/7/my-first-post"));
}
