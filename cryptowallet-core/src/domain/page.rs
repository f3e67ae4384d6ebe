//! Paged result sets and the request parameters that produce them

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Maximum number of page buttons shown by a pagination control
pub const PAGE_WINDOW: u32 = 5;

/// Page sizes offered by the admin tables
pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of a server-side sorted/filtered listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    /// An empty first page, used before anything was loaded
    pub fn empty(size: u32) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            size,
            number: 0,
            first: true,
            last: true,
        }
    }

    /// True when the server answered for an index beyond the last page
    pub fn is_past_end(&self) -> bool {
        self.number > 0 && self.number >= self.total_pages
    }

    /// Index of the last page, 0 for an empty listing
    pub fn last_index(&self) -> u32 {
        self.total_pages.saturating_sub(1)
    }

    /// Check the structural invariants of a page response
    pub fn validate(&self) -> Result<()> {
        if self.content.len() as u64 > self.size as u64 {
            return Err(Error::InvalidResponse(format!(
                "page holds {} items but size is {}",
                self.content.len(),
                self.size
            )));
        }
        if self.number >= self.total_pages.max(1) {
            return Err(Error::InvalidResponse(format!(
                "page number {} out of range for {} pages",
                self.number, self.total_pages
            )));
        }
        if self.first != (self.number == 0) {
            return Err(Error::InvalidResponse(format!(
                "first flag {} does not match page number {}",
                self.first, self.number
            )));
        }
        let expected_last = self.total_pages == 0 || self.number + 1 == self.total_pages;
        if self.last != expected_last {
            return Err(Error::InvalidResponse(format!(
                "last flag {} does not match page {} of {}",
                self.last, self.number, self.total_pages
            )));
        }
        Ok(())
    }

    /// 1-based range of item positions shown on this page
    pub fn showing(&self) -> Option<(u64, u64)> {
        if self.content.is_empty() {
            return None;
        }
        let start = self.number as u64 * self.size as u64 + 1;
        let end = (start - 1 + self.content.len() as u64).min(self.total_elements.max(start));
        Some((start, end))
    }

    /// Page indices of the navigation buttons around the current page
    pub fn window(&self) -> Range<u32> {
        page_window(self.number, self.total_pages)
    }
}

/// At most [`PAGE_WINDOW`] page indices centered on `current`,
/// clamped into `[0, total_pages - 1]`.
pub fn page_window(current: u32, total_pages: u32) -> Range<u32> {
    let count = PAGE_WINDOW.min(total_pages);
    let start = current
        .saturating_sub(2)
        .min(total_pages.saturating_sub(PAGE_WINDOW));
    start..start + count
}

/// Accept `size` only if it is one of [`PAGE_SIZES`]
pub fn offered_page_size(size: u32) -> Result<u32> {
    if PAGE_SIZES.contains(&size) {
        return Ok(size);
    }
    let offered: Vec<String> = PAGE_SIZES.iter().map(u32::to_string).collect();
    Err(Error::validation(format!(
        "Page size must be one of {}",
        offered.join(", ")
    )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::validation(format!("Unknown sort direction: {}", other))),
        }
    }
}

/// Paging and ordering shared by list and search calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_dir: SortDirection,
}

impl PageRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortDir", self.sort_dir.to_string()),
        ]
    }
}
