use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pagination metadata attached to every list response.
///
/// `total_items` and `total_pages` describe the filtered set, not the whole table. An empty
/// filtered set reports `totalPages = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number that was requested.
    pub current_page: i64,
    /// Effective page size after capping.
    pub per_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}
