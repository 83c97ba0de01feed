//! Page-number pagination over ordered record sets.

/// Posts per page on the index and category/tag listings.
pub const LISTING_PAGE_SIZE: usize = 5;
/// Results per page on the search view.
pub const SEARCH_PAGE_SIZE: usize = 5;

/// One page sliced out of an ordered sequence, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Paginated<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn previous_number(&self) -> usize {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> usize {
        (self.number + 1).min(self.total_pages)
    }
}

/// Slice `items` into the requested page.
///
/// Page numbers are 1-indexed. Requests past the last page clamp to the
/// last page; page 0 clamps to page 1. An empty sequence yields a single
/// empty page, so callers always receive a renderable page.
pub fn paginate<T>(items: Vec<T>, page_size: usize, requested: usize) -> Paginated<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = requested.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    Paginated {
        items,
        number,
        total_pages,
        total_items,
    }
}
