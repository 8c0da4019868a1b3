//! Product catalog for the two storefront variants
//!
//! The camera shop and the art-supply shop share everything but their
//! product records. Both implement [`Listing`], which is all the favorites
//! and detail views need.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while reading a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate product id '{0}' in catalog")]
    DuplicateId(String),

    #[error("Feedback by '{author}' has rating {rating}, expected 1 to 5")]
    InvalidRating { author: String, rating: u8 },
}

/// A customer review shown on the product detail screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: u8,
    pub comment: String,
    pub author: String,
    /// Free-form timestamp as supplied by the catalog ("2 days ago", a date, ...)
    pub time: String,
}

/// A camera in the camera shop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: String,
    pub name: String,
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub brand: String,
    pub description: String,
    pub sensor: String,
    pub resolution: String,
    pub iso_range: String,
    pub shutter_speed: String,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
}

/// A product in the art-supply shop
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtSupply {
    pub id: String,
    pub art_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub glass_surface: bool,
    pub image: String,
    pub brand: String,
    /// Discount fraction, `0.1` for ten percent off
    #[serde(with = "rust_decimal::serde::float")]
    pub limited_time_deal: Decimal,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
}

impl ArtSupply {
    /// Price after the limited-time deal, rounded to cents
    pub fn deal_price(&self) -> Decimal {
        let discount = self.limited_time_deal.clamp(Decimal::ZERO, Decimal::ONE);
        (self.price * (Decimal::ONE - discount)).round_dp(2)
    }
}

/// Common view of a catalog product
pub trait Listing {
    fn id(&self) -> &str;

    /// Display name
    fn title(&self) -> &str;

    fn image(&self) -> &str;

    fn price(&self) -> Decimal;

    fn brand(&self) -> &str;

    fn feedbacks(&self) -> &[Feedback];

    /// Mean feedback rating, `None` when nobody has reviewed the product
    fn average_rating(&self) -> Option<f32> {
        average_rating(self.feedbacks())
    }
}

impl Listing for Camera {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn brand(&self) -> &str {
        &self.brand
    }

    fn feedbacks(&self) -> &[Feedback] {
        &self.feedbacks
    }
}

impl Listing for ArtSupply {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.art_name
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn brand(&self) -> &str {
        &self.brand
    }

    fn feedbacks(&self) -> &[Feedback] {
        &self.feedbacks
    }
}

/// Mean rating of `feedbacks`
pub fn average_rating(feedbacks: &[Feedback]) -> Option<f32> {
    if feedbacks.is_empty() {
        return None;
    }
    let total: u32 = feedbacks.iter().map(|f| u32::from(f.rating)).sum();
    Some(total as f32 / feedbacks.len() as f32)
}

/// An ordered, id-unique list of products
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog<T> {
    products: Vec<T>,
}

impl<T: Listing + DeserializeOwned> Catalog<T> {
    /// Parse a catalog from a JSON array of products
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, on a repeated product id, or on a feedback
    /// rating outside 1..=5.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<T> = serde_json::from_str(json)?;
        Self::new(products)
    }
}

impl<T: Listing> Catalog<T> {
    /// Build a catalog, validating ids and ratings
    pub fn new(products: Vec<T>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.id()) {
                return Err(CatalogError::DuplicateId(product.id().to_string()));
            }
            if let Some(bad) = product
                .feedbacks()
                .iter()
                .find(|f| !(1..=5).contains(&f.rating))
            {
                return Err(CatalogError::InvalidRating {
                    author: bad.author.clone(),
                    rating: bad.rating,
                });
            }
        }
        Ok(Self { products })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const CAMERAS: &str = r#"[
        {
            "id": "c1",
            "name": "Canon EOS R5",
            "image": "https://img.example/r5.png",
            "price": 3899.99,
            "brand": "Canon",
            "description": "Full-frame mirrorless",
            "sensor": "Full Frame CMOS",
            "resolution": "45 MP",
            "isoRange": "100-51200",
            "shutterSpeed": "1/8000 - 30 sec",
            "feedbacks": [
                { "rating": 5, "comment": "Superb", "author": "Mai", "time": "2024-03-01" },
                { "rating": 4, "comment": "Heavy", "author": "Tuan", "time": "2024-03-04" }
            ]
        },
        {
            "id": "c2",
            "name": "Fujifilm X100V",
            "image": "https://img.example/x100v.png",
            "price": 1399,
            "brand": "Fujifilm",
            "description": "Compact",
            "sensor": "APS-C X-Trans",
            "resolution": "26 MP",
            "isoRange": "160-12800",
            "shutterSpeed": "1/4000 - 15 min"
        }
    ]"#;

    const ART: &str = r#"[
        {
            "id": "a1",
            "artName": "Oil Pastel Set",
            "price": 20,
            "description": "48 colours",
            "glassSurface": false,
            "image": "https://img.example/pastel.png",
            "brand": "Sakura",
            "limitedTimeDeal": 0.15,
            "feedbacks": []
        }
    ]"#;

    #[test]
    fn test_parse_camera_catalog() {
        let catalog = Catalog::<Camera>::from_json(CAMERAS).unwrap();

        assert_eq!(catalog.len(), 2);
        let r5 = catalog.get("c1").unwrap();
        assert_eq!(r5.iso_range, "100-51200");
        assert_eq!(r5.price, Decimal::from_str("3899.99").unwrap());
        assert_eq!(r5.average_rating(), Some(4.5));
        assert!(catalog.get("c2").unwrap().feedbacks.is_empty());
        assert!(catalog.get("zz").is_none());
    }

    #[test]
    fn test_art_supply_listing_and_deal() {
        let catalog = Catalog::<ArtSupply>::from_json(ART).unwrap();
        let pastel = catalog.get("a1").unwrap();

        assert_eq!(pastel.title(), "Oil Pastel Set");
        assert_eq!(pastel.deal_price(), Decimal::from(17));
        assert_eq!(pastel.average_rating(), None);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = format!("[{0},{0}]", &ART[1..ART.len() - 1].trim());
        let err = Catalog::<ArtSupply>::from_json(&json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(ref id) if id == "a1"));
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        let json = CAMERAS.replace("\"rating\": 5", "\"rating\": 9");
        let err = Catalog::<Camera>::from_json(&json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRating { rating: 9, .. }));
    }

    #[test]
    fn test_average_rating_empty_is_none() {
        assert_eq!(average_rating(&[]), None);
    }
}
