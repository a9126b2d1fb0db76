use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// Pagination parameters as received from list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl PageRequest {
    /// Page number, 1-based.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to 1..=100.
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.per_page()
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: None,
            per_page: None,
        }
    }
}

/// One page of results plus the math the dashboard tables need.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
        let per_page = request.per_page();
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            items,
            page: request.page(),
            per_page,
            total,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_page_clamped() {
        let req = PageRequest {
            page: Some(2),
            per_page: Some(500),
        };
        assert_eq!(req.per_page(), 100);
        assert_eq!(req.offset(), 100);

        let req = PageRequest {
            page: Some(0),
            per_page: Some(0),
        };
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = PageRequest {
            page: Some(1),
            per_page: Some(10),
        };
        let page: Page<i32> = Page::new(vec![], &req, 41);
        assert_eq!(page.total_pages, 5);

        let page: Page<i32> = Page::new(vec![], &req, 40);
        assert_eq!(page.total_pages, 4);

        let page: Page<i32> = Page::new(vec![], &req, 0);
        assert_eq!(page.total_pages, 0);
    }
}
