//! Listing domain types
//!
//! Records as stored by the document store, plus the create/patch shapes
//! admin callers send.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    Sale,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyCategory {
    Commercial,
    Industrial,
    Land,
    Office,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenure {
    #[default]
    Freehold,
    Leasehold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Inactive,
    Sold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

// == Listing ==
/// A property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub location: String,
    pub category: PropertyCategory,
    pub listing_type: ListingType,
    /// Free text such as "1,000 sq ft"
    pub land_size: String,
    pub tenure: Tenure,
    pub image_url: String,
    pub featured: bool,
    pub status: ListingStatus,
    pub images: Vec<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub panorama_360: Vec<String>,
    pub description: String,
    pub coordinates: Option<Coordinates>,
    pub property_guru_url: Option<String>,
    pub iproperty_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// First number in `land_size`, ignoring thousands separators.
    ///
    /// `"1,000 sq ft"` gives `Some(1000)`; text without digits gives `None`.
    pub fn land_size_value(&self) -> Option<u64> {
        let start = self
            .land_size
            .find(|c: char| c.is_ascii_digit() || c == ',')?;
        let digits: String = self.land_size[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(|c| *c != ',')
            .collect();
        digits.parse().ok()
    }
}

// == New Listing ==
/// Payload for creating a listing. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub price: f64,
    pub location: String,
    pub category: PropertyCategory,
    pub listing_type: ListingType,
    #[serde(default)]
    pub land_size: String,
    #[serde(default)]
    pub tenure: Tenure,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub panorama_360: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub property_guru_url: Option<String>,
    #[serde(default)]
    pub iproperty_url: Option<String>,
}

impl NewListing {
    /// Minimal listing with the required fields set.
    pub fn new(
        title: impl Into<String>,
        price: f64,
        location: impl Into<String>,
        category: PropertyCategory,
        listing_type: ListingType,
    ) -> Self {
        Self {
            title: title.into(),
            price,
            location: location.into(),
            category,
            listing_type,
            land_size: String::new(),
            tenure: Tenure::default(),
            image_url: String::new(),
            featured: false,
            status: None,
            images: Vec::new(),
            video_url: None,
            audio_url: None,
            panorama_360: Vec::new(),
            description: String::new(),
            coordinates: None,
            property_guru_url: None,
            iproperty_url: None,
        }
    }

    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Some("Price must be a non-negative number".to_string());
        }
        None
    }

    /// Turns the payload into a stored record.
    pub fn into_listing(self, id: String, now: DateTime<Utc>) -> Listing {
        Listing {
            id,
            title: self.title,
            price: self.price,
            location: self.location,
            category: self.category,
            listing_type: self.listing_type,
            land_size: self.land_size,
            tenure: self.tenure,
            image_url: self.image_url,
            featured: self.featured,
            status: self.status.unwrap_or_default(),
            images: self.images,
            video_url: self.video_url,
            audio_url: self.audio_url,
            panorama_360: self.panorama_360,
            description: self.description,
            coordinates: self.coordinates,
            property_guru_url: self.property_guru_url,
            iproperty_url: self.iproperty_url,
            created_at: now,
            updated_at: now,
        }
    }
}

// == Listing Patch ==
/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub category: Option<PropertyCategory>,
    pub listing_type: Option<ListingType>,
    pub land_size: Option<String>,
    pub tenure: Option<Tenure>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ListingStatus>,
    pub images: Option<Vec<String>>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub panorama_360: Option<Vec<String>>,
    pub description: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub property_guru_url: Option<String>,
    pub iproperty_url: Option<String>,
}

impl ListingPatch {
    pub fn validate(&self) -> Option<String> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Some("Title cannot be empty".to_string());
        }
        if matches!(self.price, Some(price) if !price.is_finite() || price < 0.0) {
            return Some("Price must be a non-negative number".to_string());
        }
        None
    }

    /// Applies the set fields to `listing` and stamps `updated_at`.
    pub fn apply(self, listing: &mut Listing, now: DateTime<Utc>) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut listing.title, self.title);
        set(&mut listing.price, self.price);
        set(&mut listing.location, self.location);
        set(&mut listing.category, self.category);
        set(&mut listing.listing_type, self.listing_type);
        set(&mut listing.land_size, self.land_size);
        set(&mut listing.tenure, self.tenure);
        set(&mut listing.image_url, self.image_url);
        set(&mut listing.featured, self.featured);
        set(&mut listing.status, self.status);
        set(&mut listing.images, self.images);
        set_opt(&mut listing.video_url, self.video_url);
        set_opt(&mut listing.audio_url, self.audio_url);
        set(&mut listing.panorama_360, self.panorama_360);
        set(&mut listing.description, self.description);
        set_opt(&mut listing.coordinates, self.coordinates);
        set_opt(&mut listing.property_guru_url, self.property_guru_url);
        set_opt(&mut listing.iproperty_url, self.iproperty_url);
        listing.updated_at = now;
    }
}
