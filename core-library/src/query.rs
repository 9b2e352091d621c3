//! Listing options shared by every repository query.

use serde::{Deserialize, Serialize};

/// Offset, size and ordering of a listing
///
/// An empty `sort_by` keeps the driving set's natural order. A `size` of zero
/// or less means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Number of records to skip
    pub offset: usize,
    /// Maximum number of records (≤ 0 = unbounded)
    pub size: i64,
    /// Field name to order by
    pub sort_by: String,
    /// Reverse the order
    pub descending: bool,
    /// Order `sort_by` lexicographically instead of numerically
    pub alpha: bool,
}

impl QueryOptions {
    /// Options returning everything in natural order
    pub fn new() -> Self {
        Self::default()
    }

    /// Options ordered by `field`
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::query::QueryOptions;
    ///
    /// let options = QueryOptions::sorted_by("Name").with_alpha(true);
    /// assert_eq!(options.sort_by, "Name");
    /// assert!(options.alpha);
    /// ```
    pub fn sorted_by(field: impl Into<String>) -> Self {
        Self {
            sort_by: field.into(),
            ..Self::default()
        }
    }

    /// Set lexicographic ordering
    pub fn with_alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set descending ordering
    pub fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Set offset and size
    pub fn with_page(mut self, offset: usize, size: i64) -> Self {
        self.offset = offset;
        self.size = size;
        self
    }

    /// Maximum number of records, `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        if self.size <= 0 {
            None
        } else {
            usize::try_from(self.size).ok()
        }
    }

    /// Apply a default ordering when none was requested
    pub fn or_sorted_by(mut self, field: &str, alpha: bool) -> Self {
        if self.sort_by.is_empty() {
            self.sort_by = field.to_string();
            self.alpha = alpha;
        }
        self
    }
}
