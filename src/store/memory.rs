//! In-process document store
//!
//! Holds listings in memory with the same query semantics as the hosted
//! store: newest first, filters over active listings, cursor pagination.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{DocumentStore, StoreError, StoreResult};
use crate::models::{
    Coordinates, Listing, ListingFilter, ListingPage, ListingPatch, ListingStatus, ListingType,
    NewListing, PageQuery, PropertyCategory, Tenure,
};

#[derive(Debug)]
struct Record {
    /// Insertion order, breaks `created_at` ties
    seq: u64,
    listing: Listing,
}

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Record>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `listings`, keeping their ids and timestamps.
    pub fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let mut records = HashMap::new();
        let mut seq = 0;
        for listing in listings {
            records.insert(listing.id.clone(), Record { seq, listing });
            seq += 1;
        }

        Self {
            records: RwLock::new(records),
            next_seq: AtomicU64::new(seq),
        }
    }

    /// A store holding a couple of demo listings.
    pub fn with_demo_listings() -> Self {
        let now = Utc::now();

        let mut factory = NewListing::new(
            "Industrial Factory, Nibong Tebal, Penang",
            60_000_000.0,
            "Penang",
            PropertyCategory::Industrial,
            ListingType::Sale,
        );
        factory.land_size = "10.38 Acres".to_string();
        factory.featured = true;
        factory.description = "Large industrial factory with 10.38 acres.".to_string();
        factory.coordinates = Some(Coordinates { lat: 5.17, lng: 100.48 });

        let mut office = NewListing::new(
            "Modern Office Space, Georgetown",
            2_500_000.0,
            "Penang",
            PropertyCategory::Office,
            ListingType::Sale,
        );
        office.land_size = "2,500 sqft".to_string();
        office.tenure = Tenure::Leasehold;
        office.featured = true;
        office.description = "Prime office space in Georgetown.".to_string();
        office.coordinates = Some(Coordinates { lat: 5.41, lng: 100.33 });

        Self::with_listings([
            factory.into_listing("demo-1".to_string(), now),
            office.into_listing("demo-2".to_string(), now),
        ])
    }

    /// Number of stored listings.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn next_id(&self) -> (u64, String) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        (seq, format!("lst-{:06}", seq))
    }
}

impl Record {
    /// Sort key; larger is newer.
    fn position(&self) -> (DateTime<Utc>, u64) {
        (self.listing.created_at, self.seq)
    }
}

/// Newest first, insertion order breaking ties.
fn sorted_newest_first<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<&'a Record> {
    let mut sorted: Vec<&Record> = records.collect();
    sorted.sort_by(|a, b| b.position().cmp(&a.position()));
    sorted
}

fn newest_first<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<Listing> {
    sorted_newest_first(records)
        .into_iter()
        .map(|r| r.listing.clone())
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_all(&self) -> StoreResult<Vec<Listing>> {
        let records = self.records.read().await;
        Ok(newest_first(records.values()))
    }

    async fn fetch_by_id(&self, id: &str) -> StoreResult<Option<Listing>> {
        let records = self.records.read().await;
        Ok(records.get(id).map(|r| r.listing.clone()))
    }

    async fn fetch_filtered(&self, filter: &ListingFilter) -> StoreResult<Vec<Listing>> {
        let filter = filter.clone().normalized();
        let records = self.records.read().await;
        Ok(newest_first(
            records.values().filter(|r| filter.matches(&r.listing)),
        ))
    }

    async fn fetch_page(&self, query: &PageQuery) -> StoreResult<ListingPage> {
        let query = query.clone().normalized();
        let page_size = query.page_size as usize;

        let records = self.records.read().await;
        let ordered = sorted_newest_first(records.values().filter(|r| match query.status {
            Some(status) => r.listing.status == status,
            None => true,
        }));

        // The cursor record need not match the status filter; the page
        // continues from wherever it sorts.
        let start = match &query.cursor {
            Some(cursor) => {
                let Some(after) = records.get(cursor) else {
                    return Err(StoreError::InvalidInput(format!(
                        "Invalid pagination cursor: {}",
                        cursor
                    )));
                };
                ordered
                    .iter()
                    .position(|r| r.position() < after.position())
                    .unwrap_or(ordered.len())
            }
            None => 0,
        };

        let listings: Vec<Listing> = ordered
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(|r| r.listing.clone())
            .collect();
        let has_more = listings.len() == page_size;
        let next_page_cursor = if has_more {
            listings.last().map(|l| l.id.clone())
        } else {
            None
        };

        Ok(ListingPage {
            listings,
            has_more,
            next_page_cursor,
        })
    }

    async fn create(&self, listing: NewListing) -> StoreResult<String> {
        let (seq, id) = self.next_id();
        let listing = listing.into_listing(id.clone(), Utc::now());

        self.records
            .write()
            .await
            .insert(id.clone(), Record { seq, listing });
        debug!(id = %id, "Listing stored");
        Ok(id)
    }

    async fn update(&self, id: &str, patch: ListingPatch) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(record) => {
                patch.apply(&mut record.listing, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}
