//! Deterministic page slicing.

use case_catalog_case_models::PageInfo;

/// Returns the 1-based `page` of `items`, `page_size` items per page.
///
/// The slice is `[(page - 1) * page_size, page * page_size)` clipped to
/// the collection. A page number below 1, a page size below 1, or a page
/// past the end all produce an empty slice.
#[must_use]
pub fn paginate<T>(items: &[T], page: i64, page_size: i64) -> &[T] {
    let Some((start, size)) = page_bounds(page, page_size) else {
        return &[];
    };

    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Pagination metadata for a collection of `total_items`.
#[must_use]
pub fn page_info(total_items: usize, page: i64, page_size: i64) -> PageInfo {
    let total_pages = usize::try_from(page_size)
        .ok()
        .filter(|size| *size > 0)
        .map_or(0, |size| total_items.div_ceil(size));

    PageInfo {
        page,
        page_size,
        total_items: total_items as u64,
        total_pages: total_pages as u64,
    }
}

fn page_bounds(page: i64, page_size: i64) -> Option<(usize, usize)> {
    if page < 1 || page_size < 1 {
        return None;
    }
    let size = usize::try_from(page_size).ok()?;
    let index = usize::try_from(page - 1).ok()?;
    Some((index.checked_mul(size)?, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_second_pages() {
        let items: Vec<u32> = (1..=30).collect();
        assert_eq!(paginate(&items, 1, 12), &items[0..12]);
        assert_eq!(paginate(&items, 2, 12), &items[12..24]);
        assert_eq!(paginate(&items, 3, 12), &items[24..30]);
    }

    #[test]
    fn pages_cover_every_item_exactly_once() {
        let items: Vec<u32> = (0..47).collect();
        for page_size in 1..=50 {
            let info = page_info(items.len(), 1, page_size);
            let mut seen = Vec::new();
            for page in 1..=i64::try_from(info.total_pages).unwrap() {
                seen.extend_from_slice(paginate(&items, page, page_size));
            }
            assert_eq!(seen, items, "page_size {page_size}");
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let items = [1, 2, 3, 4, 5];
        assert!(paginate(&items, 1000, 12).is_empty());
        assert!(paginate(&items, 2, 5).is_empty());
    }

    #[test]
    fn non_positive_arguments_are_empty() {
        let items = [1, 2, 3];
        assert!(paginate(&items, 1, 0).is_empty());
        assert!(paginate(&items, 1, -4).is_empty());
        assert!(paginate(&items, 0, 2).is_empty());
        assert!(paginate(&items, -1, 2).is_empty());
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let items = [1, 2, 3];
        assert!(paginate(&items, i64::MAX, i64::MAX).is_empty());
    }

    #[test]
    fn page_info_counts_pages() {
        assert_eq!(page_info(25, 1, 12).total_pages, 3);
        assert_eq!(page_info(24, 1, 12).total_pages, 2);
        assert_eq!(page_info(0, 1, 12).total_pages, 0);
        assert_eq!(page_info(10, 1, 0).total_pages, 0);
        assert_eq!(page_info(10, 3, 4).total_items, 10);
    }
}
