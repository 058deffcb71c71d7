//! Page requests and pages.

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::{MedicardError, MedicardResult};
use api_shared::Pagination;

/// A validated request for one page of a list.
///
/// `page` is 1-based. Both values must be positive; `per_page` is capped at
/// [`MAX_PAGE_SIZE`] rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    per_page: i64,
}

impl PageRequest {
    /// Build a page request from optional raw values, applying defaults (page 1, 20 per page).
    ///
    /// # Errors
    ///
    /// Returns `MedicardError::InvalidInput` if either value is zero or negative.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> MedicardResult<Self> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE);

        if page <= 0 || per_page <= 0 {
            return Err(MedicardError::InvalidInput(
                "page and page size must be positive integers".into(),
            ));
        }

        Ok(Self {
            page,
            per_page: per_page.min(MAX_PAGE_SIZE),
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the size of the filtered set it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total_items: i64,
}

impl<T> Page<T> {
    /// `ceil(total_items / per_page)`; zero for an empty set.
    pub fn total_pages(&self) -> i64 {
        (self.total_items + self.request.per_page - 1) / self.request.per_page
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.request.page,
            per_page: self.request.per_page,
            total_pages: self.total_pages(),
            total_items: self.total_items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total_items: self.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(total_items: i64, page: i64, per_page: i64) -> Page<()> {
        Page {
            items: vec![],
            request: PageRequest::new(Some(page), Some(per_page)).unwrap(),
            total_items,
        }
    }

    #[test]
    fn defaults_and_cap() {
        let req = PageRequest::new(None, None).unwrap();
        assert_eq!((req.page(), req.per_page()), (1, 20));

        let req = PageRequest::new(Some(2), Some(500)).unwrap();
        assert_eq!(req.per_page(), 100);
        assert_eq!(req.offset(), 100);
    }

    #[test]
    fn non_positive_values_are_rejected_not_clamped() {
        for (page, per_page) in [(0, 10), (-1, 10), (1, 0), (1, -5)] {
            assert!(
                PageRequest::new(Some(page), Some(per_page)).is_err(),
                "page={page} per_page={per_page} should be rejected"
            );
        }
    }

    #[test]
    fn total_pages_rounds_up_and_is_zero_when_empty() {
        assert_eq!(page_of(0, 1, 20).total_pages(), 0);
        assert_eq!(page_of(5, 2, 10).total_pages(), 1);
        assert_eq!(page_of(20, 1, 10).total_pages(), 2);
        assert_eq!(page_of(21, 1, 10).total_pages(), 3);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let req = PageRequest::new(Some(i64::MAX), Some(100)).unwrap();
        assert_eq!(req.offset(), i64::MAX);
    }
}
