//! Server page envelope.

use serde::{Deserialize, Serialize};

/// A page of results as returned by the remote API when pagination
/// parameters are supplied.
///
/// The same endpoints return a flat JSON array when called without
/// pagination; callers normalize both shapes (see the catalog service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    /// Zero-indexed page number.
    pub number: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> PageResponse<T> {
    /// Wrap a complete result set as a single page.
    #[must_use]
    pub fn single(content: Vec<T>) -> Self {
        let total = content.len();
        Self {
            total_elements: total as u64,
            total_pages: 1,
            size: u32::try_from(total).unwrap_or(u32::MAX),
            number: 0,
            first: true,
            last: true,
            content,
        }
    }
}
