//! Typed query parameters
//!
//! Every optional field is an `Option` skipped on serialization, so an unset
//! field never reaches the cache key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Listing, ListingStatus, ListingType, PropertyCategory};

/// Upper bound on a page of listings.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filter value meaning "no restriction" for category and location.
const ALL: &str = "All";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandSizeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

// == Listing Filter ==
/// Advanced search over active listings.
///
/// `category: None` and `location: None` mean "All".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PropertyCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_size_range: Option<LandSizeRange>,
}

impl ListingFilter {
    /// Checks the filter can be evaluated and keyed.
    pub fn validate(&self) -> Option<String> {
        if let Some(range) = &self.price_range {
            for bound in [range.min, range.max].into_iter().flatten() {
                if !bound.is_finite() {
                    return Some("Price bounds must be finite numbers".to_string());
                }
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Some("Price range minimum exceeds maximum".to_string());
                }
            }
        }
        if let Some(LandSizeRange {
            min: Some(min),
            max: Some(max),
        }) = self.land_size_range
        {
            if min > max {
                return Some("Land size range minimum exceeds maximum".to_string());
            }
        }
        if let Some(DateRange {
            listed_after: Some(after),
            listed_before: Some(before),
        }) = self.date_range
        {
            if after > before {
                return Some("listed_after is later than listed_before".to_string());
            }
        }
        None
    }

    /// Collapses spellings of "no restriction" into `None`.
    ///
    /// Blank text, `"All"` and empty ranges all become absent so equivalent
    /// filters share one cache entry.
    pub fn normalized(mut self) -> Self {
        fn blank_or_all(text: &Option<String>) -> bool {
            matches!(text, Some(t) if t.trim().is_empty() || t.trim() == ALL)
        }

        if blank_or_all(&self.location) {
            self.location = None;
        }
        self.location = self.location.map(|t| t.trim().to_string());
        if matches!(&self.search_query, Some(q) if q.trim().is_empty()) {
            self.search_query = None;
        }
        self.search_query = self.search_query.map(|q| q.trim().to_string());
        if self.price_range == Some(PriceRange::default()) {
            self.price_range = None;
        }
        if self.date_range == Some(DateRange::default()) {
            self.date_range = None;
        }
        if self.land_size_range == Some(LandSizeRange::default()) {
            self.land_size_range = None;
        }
        self
    }

    // == Matches ==
    /// Whether `listing` belongs in this filter's result.
    ///
    /// Only active listings ever match. Expects a [`normalized`](Self::normalized)
    /// filter: a literal `"All"` location is matched as text.
    pub fn matches(&self, listing: &Listing) -> bool {
        if listing.status != ListingStatus::Active {
            return false;
        }
        if matches!(self.listing_type, Some(t) if t != listing.listing_type) {
            return false;
        }
        if matches!(self.category, Some(c) if c != listing.category) {
            return false;
        }
        if let Some(location) = &self.location {
            if !contains_ignore_case(&listing.location, location) {
                return false;
            }
        }
        if let Some(range) = &self.price_range {
            if matches!(range.min, Some(min) if listing.price < min)
                || matches!(range.max, Some(max) if listing.price > max)
            {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if matches!(range.listed_after, Some(after) if listing.created_at < after)
                || matches!(range.listed_before, Some(before) if listing.created_at > before)
            {
                return false;
            }
        }
        if let Some(range) = &self.land_size_range {
            if range.min.is_some() || range.max.is_some() {
                let Some(size) = listing.land_size_value() else {
                    return false;
                };
                if matches!(range.min, Some(min) if size < min)
                    || matches!(range.max, Some(max) if size > max)
                {
                    return false;
                }
            }
        }
        if let Some(query) = &self.search_query {
            let hit = contains_ignore_case(&listing.title, query)
                || contains_ignore_case(&listing.location, query)
                || contains_ignore_case(&listing.description, query);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// == Page Query ==
/// Cursor-based page request. The cursor is the id of the previous page's
/// last listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
            status: None,
        }
    }
}

impl PageQuery {
    pub fn first(page_size: u32) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`, blank cursor dropped.
    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        if matches!(&self.cursor, Some(c) if c.is_empty()) {
            self.cursor = None;
        }
        self
    }
}

/// One page of listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub listings: Vec<Listing>,
    pub has_more: bool,
    pub next_page_cursor: Option<String>,
}
