//! Page windows and the page envelope returned by list operations.
//!
//! # Responsibility
//! - Translate `(page, size)` into an `OFFSET`/`LIMIT` window.
//! - Derive `total_pages`, `first` and `last` from a total row count.
//!
//! # Invariants
//! - `size > 0` for every constructed `PageRequest`.
//! - `total_pages == ceil(total / size)`.
//! - A window past the last row is an empty page, never an error.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    size: u32,
}

/// Unchecked wire form; deserialization goes through `PageRequest::new`.
#[derive(Deserialize)]
struct RawPageRequest {
    page: i64,
    size: i64,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = ValidationError;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(raw.page, raw.size)
    }
}

impl PageRequest {
    /// Validates raw caller input.
    ///
    /// Negative pages and non-positive sizes are rejected here so the rest
    /// of the core can assume a well-formed window.
    pub fn new(page: i64, size: i64) -> Result<Self, ValidationError> {
        if page < 0 {
            return Err(ValidationError::NegativePage(page));
        }
        if size <= 0 {
            return Err(ValidationError::NonPositivePageSize(size));
        }
        let page = u32::try_from(page).map_err(|_| ValidationError::PageOutOfRange(page))?;
        let size = u32::try_from(size).map_err(|_| ValidationError::PageSizeOutOfRange(size))?;
        Ok(Self { page, size })
    }

    /// First page with the given size. A zero size falls back to the default.
    pub fn first(size: u32) -> Self {
        Self {
            page: 0,
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row offset of this window.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// Maximum rows in this window.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// The following window with the same size.
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Rows of one window plus the total count of matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

/// Page envelope: one bounded slice of results and pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    /// Builds the envelope for `content` fetched with `request`.
    pub fn of(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let total_pages = total_pages(total_elements, request.size());
        let page = i64::from(request.page());
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages,
            first: page == 0,
            last: page >= total_pages - 1,
        }
    }

    pub fn from_slice(slice: Slice<T>, request: PageRequest) -> Self {
        Self::of(slice.rows, request, slice.total)
    }

    /// Converts the content while keeping all metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

/// Ceiling division of a row count by a page size.
pub fn total_pages(total: i64, size: u32) -> i64 {
    if total <= 0 || size == 0 {
        return 0;
    }
    let size = i64::from(size);
    (total + size - 1) / size
}
