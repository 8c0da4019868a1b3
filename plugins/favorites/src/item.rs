//! The favorite record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storefront::Listing;

/// JSON keys owned by the typed fields, including the `artName` alias
const FIELD_KEYS: [&str; 6] = ["id", "name", "artName", "image", "price", "brand"];

/// A product saved as a favorite
///
/// Only `id` matters to the store. The remaining fields are what the list
/// screen shows; anything else the product carried when it was saved is kept
/// in `details` so it survives a save/load cycle untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub id: String,
    #[serde(alias = "artName")]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl FavoriteItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            price: None,
            brand: None,
            details: Map::new(),
        }
    }

    /// Snapshot a catalog product of either shop
    pub fn from_listing<L: Listing + ?Sized>(listing: &L) -> Self {
        Self {
            id: listing.id().to_string(),
            name: listing.title().to_string(),
            image: listing.image().to_string(),
            price: Some(listing.price()),
            brand: Some(listing.brand().to_string()),
            details: Map::new(),
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Attach an extra product field carried opaquely
    ///
    /// Keys that name a typed field are ignored; the typed field wins.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if FIELD_KEYS.contains(&key.as_str()) {
            tracing::debug!(id = %self.id, key = %key, "ignoring detail that shadows a field");
            return self;
        }
        self.details.insert(key, value.into());
        self
    }

    /// Extra product fields carried opaquely
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}
