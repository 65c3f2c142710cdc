use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Items per listing page.
pub const PAGE_SIZE: usize = 5;

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: usize,
    pub num_pages: usize,
    /// Total items across all pages.
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_paginated: bool,
}

/// Number of pages needed for `count` items. An empty set still has page 1.
pub fn num_pages(count: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    count.max(1).div_ceil(per_page)
}

/// Resolves the raw `page` parameter against a result set of `count` items.
///
/// Accepts a positive integer or the literal `last`. Anything else, and any
/// page past the end, is a 404. Page 1 always exists.
pub fn resolve_page_number(
    raw: Option<&str>,
    count: usize,
    per_page: usize,
) -> Result<usize, AppError> {
    let last = num_pages(count, per_page);
    let raw = raw.map(str::trim).unwrap_or("1");

    let number = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) if raw == "last" => return Ok(last),
        Err(_) => {
            return Err(AppError::NotFound(
                "Page is not 'last', nor can it be converted to an int.".into(),
            ))
        }
    };

    if number < 1 {
        return Err(AppError::NotFound("That page number is less than 1".into()));
    }
    let number = number as usize;
    if number > last {
        return Err(AppError::NotFound("That page contains no results".into()));
    }
    Ok(number)
}

/// Index of the first item on page `number`.
pub fn offset(number: usize, per_page: usize) -> usize {
    (number.max(1) - 1) * per_page.max(1)
}

/// Wraps the items of page `number` with the metadata for `count` items.
pub fn page_of<T>(items: Vec<T>, number: usize, count: usize, per_page: usize) -> Page<T> {
    let num_pages = num_pages(count, per_page);
    Page {
        items,
        number,
        num_pages,
        count,
        has_next: number < num_pages,
        has_previous: number > 1,
        is_paginated: num_pages > 1,
    }
}

/// Cuts page `raw` out of an already ordered list.
pub fn paginate<T>(items: Vec<T>, raw: Option<&str>, per_page: usize) -> Result<Page<T>, AppError> {
    let count = items.len();
    let per_page = per_page.max(1);
    let number = resolve_page_number(raw, count, per_page)?;

    let items: Vec<T> = items
        .into_iter()
        .skip(offset(number, per_page))
        .take(per_page)
        .collect();

    Ok(page_of(items, number, count, per_page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_seven_items_split_five_and_two() {
        let items: Vec<u32> = (1..=7).collect();

        let first = paginate(items.clone(), None, PAGE_SIZE).unwrap();
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert!(first.is_paginated);
        assert_eq!(first.num_pages, 2);
        assert_eq!(first.count, 7);

        let second = paginate(items, Some("2"), PAGE_SIZE).unwrap();
        assert_eq!(second.items, vec![6, 7]);
        assert!(!second.has_next);
        assert!(second.has_previous);
    }

    #[test]
    fn test_last_keyword() {
        let items: Vec<u32> = (1..=11).collect();
        let page = paginate(items, Some("last"), PAGE_SIZE).unwrap();
        assert_eq!(page.number, 3);
        assert_eq!(page.items, vec![11]);
    }

    #[test]
    fn test_empty_result_has_a_first_page() {
        let page = paginate(Vec::<u32>::new(), None, PAGE_SIZE).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.is_paginated);
    }

    #[test]
    fn test_invalid_page_numbers_are_not_found() {
        let items: Vec<u32> = (1..=7).collect();
        for raw in ["0", "-1", "abc", "3", "2.5"] {
            let result = paginate(items.clone(), Some(raw), PAGE_SIZE);
            assert!(
                matches!(result, Err(AppError::NotFound(_))),
                "page={} should be a 404",
                raw
            );
        }
    }

    #[test]
    fn test_page_of_a_window() {
        assert_eq!(offset(1, PAGE_SIZE), 0);
        assert_eq!(offset(3, PAGE_SIZE), 10);

        let page = page_of(vec![11, 12], 3, 12, PAGE_SIZE);
        assert_eq!(page.num_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert!(page.is_paginated);
    }
}
