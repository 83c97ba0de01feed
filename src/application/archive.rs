//! Grouping of the full post set for the archive and category-index views.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::entities::PostRecord;

/// One calendar year of the archive, with a slot for every month.
#[derive(Debug, Clone)]
pub struct ArchiveYear {
    pub year: i32,
    /// Exactly twelve buckets, January through December.
    pub months: Vec<ArchiveMonth>,
}

#[derive(Debug, Clone)]
pub struct ArchiveMonth {
    /// 1-based month number.
    pub month: u8,
    pub posts: Vec<PostRecord>,
}

/// Posts of one category, keyed by the category's display name.
#[derive(Debug, Clone)]
pub struct CategoryGroup {
    pub name: String,
    pub posts: Vec<PostRecord>,
}

/// Bucket a time-descending post list into years and months.
///
/// The result covers every integer year from the newest post's year down to
/// the oldest post's year inclusive; years without posts still get twelve
/// empty month slots. An empty input yields an empty archive.
pub fn group_by_year_month(posts: Vec<PostRecord>) -> Vec<ArchiveYear> {
    let (Some(newest), Some(oldest)) = (posts.first(), posts.last()) else {
        return Vec::new();
    };

    let newest_year = newest.published_at.year();
    let oldest_year = oldest.published_at.year();

    let mut years: Vec<ArchiveYear> = (oldest_year..=newest_year)
        .rev()
        .map(|year| ArchiveYear {
            year,
            months: (1..=12)
                .map(|month| ArchiveMonth {
                    month,
                    posts: Vec::new(),
                })
                .collect(),
        })
        .collect();

    for post in posts {
        let date = post.published_at.date();
        let year_index = (newest_year - date.year()) as usize;
        let month_index = usize::from(u8::from(date.month())) - 1;
        years[year_index].months[month_index].posts.push(post);
    }

    years
}

/// Group a time-descending post list by category name.
///
/// Groups appear in first-seen order while scanning the list, so categories
/// are ordered by the recency of their most recent post and posts inside a
/// group stay time-descending. Posts without a category (or whose category
/// id is absent from `names`) are omitted.
pub fn group_by_category(
    posts: Vec<PostRecord>,
    names: &HashMap<Uuid, String>,
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for post in posts {
        let Some(name) = post.category_id.and_then(|id| names.get(&id)) else {
            continue;
        };

        match index_by_name.get(name) {
            Some(&index) => groups[index].posts.push(post),
            None => {
                index_by_name.insert(name.clone(), groups.len());
                groups.push(CategoryGroup {
                    name: name.clone(),
                    posts: vec![post],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use time::macros::datetime;

    use super::*;

    fn post(slug: &str, published_at: OffsetDateTime, category_id: Option<Uuid>) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: slug.to_string(),
            body_markdown: String::new(),
            published_at,
            site_id: Uuid::new_v4(),
            category_id,
            author_id: Uuid::new_v4(),
            created_at: published_at,
            updated_at: published_at,
        }
    }

    #[test]
    fn archive_covers_exactly_the_year_range() {
        let posts = vec![
            post("newer", datetime!(2017-07-14 22:00:04 UTC), None),
            post("older", datetime!(2016-03-02 09:30:00 UTC), None),
        ];

        let years = group_by_year_month(posts);

        assert_eq!(
            years.iter().map(|y| y.year).collect::<Vec<_>>(),
            vec![2017, 2016]
        );
        for year in &years {
            assert_eq!(year.months.len(), 12);
        }
        assert_eq!(years[0].months[6].posts[0].slug, "newer");
        assert_eq!(years[1].months[2].posts[0].slug, "older");
    }

    #[test]
    fn archive_fills_gap_years_with_empty_months() {
        let posts = vec![
            post("newer", datetime!(2019-01-05 08:00:00 UTC), None),
            post("older", datetime!(2016-12-31 23:59:59 UTC), None),
        ];

        let years = group_by_year_month(posts);

        assert_eq!(
            years.iter().map(|y| y.year).collect::<Vec<_>>(),
            vec![2019, 2018, 2017, 2016]
        );
        assert!(years[1].months.iter().all(|m| m.posts.is_empty()));
        assert!(years[2].months.iter().all(|m| m.posts.is_empty()));
    }

    #[test]
    fn archive_of_nothing_is_empty() {
        assert!(group_by_year_month(Vec::new()).is_empty());
    }

    #[test]
    fn month_buckets_keep_descending_order() {
        let posts = vec![
            post("late", datetime!(2017-07-20 10:00:00 UTC), None),
            post("early", datetime!(2017-07-02 10:00:00 UTC), None),
        ];

        let years = group_by_year_month(posts);
        let july = &years[0].months[6];
        assert_eq!(
            july.posts.iter().map(|p| p.slug.as_str()).collect::<Vec<_>>(),
            vec!["late", "early"]
        );
    }

    #[test]
    fn categories_group_in_first_seen_order() {
        let python = Uuid::new_v4();
        let perl = Uuid::new_v4();
        let names = HashMap::from([
            (python, "python".to_string()),
            (perl, "perl".to_string()),
        ]);

        let posts = vec![
            post("py-two", datetime!(2017-07-14 22:00:04 UTC), Some(python)),
            post("perl-one", datetime!(2017-06-01 12:00:00 UTC), Some(perl)),
            post("py-one", datetime!(2016-03-02 09:30:00 UTC), Some(python)),
            post("loose", datetime!(2015-01-01 00:00:00 UTC), None),
        ];

        let groups = group_by_category(posts, &names);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "python");
        assert_eq!(groups[0].posts.len(), 2);
        assert_eq!(groups[1].name, "perl");
        assert_eq!(groups[1].posts.len(), 1);
    }

    #[test]
    fn category_index_of_nothing_is_empty() {
        assert!(group_by_category(Vec::new(), &HashMap::new()).is_empty());
    }
}
