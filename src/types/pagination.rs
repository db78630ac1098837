// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Pagination options and result metadata.
//!
//! The two backends paginate differently: the REST indexer takes a numeric
//! page, the JSON-RPC node takes an opaque cursor ("records strictly before
//! this signature"). Options carry both; each adapter reads the one its
//! backend understands and ignores the other.

use serde::{Deserialize, Serialize};

use super::{TimestampMillis, Transaction};

/// Default number of records per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Options for a transaction-history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOptions {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Page number for the offset-paged backend (1-based). Ignored by the
    /// cursor-paged backend.
    pub page: Option<u32>,
    /// Opaque cursor for the cursor-paged backend. Ignored by the
    /// offset-paged backend.
    pub cursor: Option<String>,
    /// Inclusive lower bound on block time. Applied post-fetch.
    pub start_time: Option<TimestampMillis>,
    /// Inclusive upper bound on block time. Applied post-fetch.
    pub end_time: Option<TimestampMillis>,
    /// Skip the cache lookup for this call. The fresh result is still
    /// written through.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bypass_cache: bool,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page: None,
            cursor: None,
            start_time: None,
            end_time: None,
            bypass_cache: false,
        }
    }
}

impl PaginationOptions {
    /// Options with the given page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the page number (offset-paged backend).
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the cursor (cursor-paged backend).
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Sets the inclusive time-range bounds.
    #[must_use]
    pub fn with_time_range(
        mut self,
        start: Option<TimestampMillis>,
        end: Option<TimestampMillis>,
    ) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Skips the cache lookup for this call.
    #[must_use]
    pub fn with_bypass_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }
}

/// Pagination state returned with each page.
///
/// `has_more` is inferred by the page-full heuristic on both backends.
/// When a post-fetch time-range filter shortens the page, `has_more` and
/// `next_cursor` still describe the unfiltered upstream page, so a page may
/// carry fewer than `limit` records while more exist upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    /// Whether another page is (heuristically) available upstream.
    pub has_more: bool,
    /// Page that produced this result (offset-paged backend).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Total page count, when the backend reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    /// Cursor for the next page (cursor-paged backend). Set only when
    /// `has_more` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Total record count, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// One page of unified transactions plus its pagination state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    /// Unified transaction records, newest first.
    pub data: Vec<Transaction>,
    /// Pagination state for the page.
    pub pagination: PaginationMetadata,
}

impl TransactionPage {
    /// An empty page with no further results.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            pagination: PaginationMetadata::default(),
        }
    }
}
