//! Offset pagination primitives shared by catalog listing endpoints.
//!
//! A caller supplies a [`PageRequest`] (raw, possibly zero page and size),
//! which is normalized against a [`PaginationConfig`] into [`PageParams`].
//! Repositories translate the params into `OFFSET`/`LIMIT` and wrap their
//! results in a [`Page`] envelope together with the unpaged total.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of items per page when the request leaves size unset.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound applied to requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised when building an invalid [`PaginationConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationConfigError {
    /// A size limit was zero.
    #[error("page sizes must be positive")]
    ZeroSize,
    /// The default size exceeds the maximum size.
    #[error("default page size {default_size} exceeds maximum {max_size}")]
    DefaultExceedsMax {
        /// Configured default size.
        default_size: u32,
        /// Configured maximum size.
        max_size: u32,
    },
}

/// Page size policy applied during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    default_size: u32,
    max_size: u32,
}

impl PaginationConfig {
    /// Build a policy, rejecting zero sizes and a default above the maximum.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationConfigError`] when either bound is invalid.
    pub const fn new(default_size: u32, max_size: u32) -> Result<Self, PaginationConfigError> {
        if default_size == 0 || max_size == 0 {
            return Err(PaginationConfigError::ZeroSize);
        }
        if default_size > max_size {
            return Err(PaginationConfigError::DefaultExceedsMax {
                default_size,
                max_size,
            });
        }
        Ok(Self {
            default_size,
            max_size,
        })
    }

    /// Size used when a request omits it.
    #[must_use]
    pub const fn default_size(&self) -> u32 {
        self.default_size
    }

    /// Largest size a request may ask for.
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.max_size
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// Raw page request as received from a caller.
///
/// Zero means "unset" for both fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// One-based page number.
    #[serde(default)]
    pub page: u32,
    /// Requested items per page.
    #[serde(default)]
    pub size: u32,
}

impl PageRequest {
    /// Build a request from raw values.
    #[must_use]
    pub const fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Apply defaults and clamping.
    ///
    /// Page 0 becomes 1, size 0 becomes the configured default, and sizes
    /// above the maximum are clamped to it.
    #[must_use]
    pub const fn normalize(self, config: &PaginationConfig) -> PageParams {
        let page = if self.page == 0 { 1 } else { self.page };
        let size = if self.size == 0 {
            config.default_size
        } else if self.size > config.max_size {
            config.max_size
        } else {
            self.size
        };
        PageParams { page, size }
    }
}

/// Normalized page parameters; `page >= 1` and `size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    size: u32,
}

impl PageParams {
    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip: `(page - 1) * size`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * (self.size as u64)
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }
}

/// Response envelope for a single page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// One-based page number that was served.
    pub page: u32,
    /// Page size that was applied.
    pub size: u32,
    /// Number of matching items ignoring the window.
    pub total: u64,
    /// Items on this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from normalized params, the unpaged total, and items.
    #[must_use]
    pub const fn new(params: PageParams, total: u64, items: Vec<T>) -> Self {
        Self {
            page: params.page,
            size: params.size,
            total,
            items,
        }
    }

    /// Convert each item, keeping the envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            size: self.size,
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
