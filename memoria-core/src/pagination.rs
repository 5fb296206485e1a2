//! Sort/order vocabulary shared by every list endpoint and the pagination
//! token codec in `memoria-security` (spec §4.8, §4.10).

use serde::{Deserialize, Serialize};

/// Column a `Space` listing may sort by (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    CreatedTime,
    Name,
    UpdatedTime,
}

impl Default for SortBy {
    fn default() -> Self {
        Self::CreatedTime
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Ascending
    }
}

/// A page of list results plus the opaque continuation token, if any
/// (spec §4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}
