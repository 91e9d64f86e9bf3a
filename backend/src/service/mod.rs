//! exposed operations
//!
//! One file per concern, each an `impl` block on [`crate::Server`].
//! These are the entry points the (out of scope) transport layer calls.

pub mod contest;
pub mod leaderboard;
pub mod problem;
pub mod registration;
pub mod scoring;

use crate::entity::contestant;

pub(crate) const DEFAULT_PAGE_SIZE: u64 = 50;
pub(crate) const MAX_PAGE_SIZE: u64 = 100;

/// Filter criteria shared by the listing endpoints. Every field is
/// independently optional; page is 1-based.
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct ListQuery {
    #[builder(default)]
    pub category: Option<contestant::Category>,
    #[builder(default)]
    pub search: Option<String>,
    #[builder(default = "1")]
    pub page: u64,
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    pub limit: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// clamp the requested window to `(limit, offset)`
pub(crate) fn page_window(page: u64, limit: u64) -> (u64, u64) {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let offset = page.max(1) - 1;
    (limit, offset * limit)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn window_defaults() {
        let query = ListQuery::default();
        assert_eq!(page_window(query.page, query.limit), (50, 0));
    }

    #[test]
    fn window_caps_limit() {
        assert_eq!(page_window(1, 1000), (100, 0));
        assert_eq!(page_window(0, 0), (1, 0));
    }

    #[test]
    fn window_offsets_pages() {
        assert_eq!(page_window(3, 20), (20, 40));
    }

    #[test]
    fn builder_fills_defaults() {
        let query = ListQueryBuilder::default()
            .search(Some("CX4".to_owned()))
            .build()
            .unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert!(query.category.is_none());
    }
}
