//! Catalog product records.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A beer in the catalog, as returned by `GET /products`.
///
/// Products are immutable once fetched; the catalog replaces the whole list
/// on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend document id. The backend serializes it as `_id`.
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    /// Beer style (IPA, Stout, Lager, ...).
    #[serde(rename = "type")]
    pub beer_type: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Alcohol by volume, in percent.
    #[serde(default)]
    pub alcohol: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
}

/// Payload for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub beer_type: String,
    pub price: Price,
    pub description: String,
    pub image: String,
    pub alcohol: f32,
}

impl NewProduct {
    /// Field-level problems the backend would reject, in form order.
    ///
    /// An empty result means the payload is worth sending.
    #[must_use]
    pub fn problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name is required");
        }
        if self.beer_type.trim().is_empty() {
            problems.push("type is required");
        }
        if self.price == Price::ZERO {
            problems.push("price must be greater than zero");
        }
        if !(0.0..=100.0).contains(&self.alcohol) {
            problems.push("alcohol must be between 0 and 100");
        }
        problems
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "_id": "665f1c2a9b1e8a0012345678",
            "name": "IPA Artesanal",
            "type": "IPA",
            "price": 5500,
            "description": "IPA con intenso aroma a lupulo.",
            "image": "https://example.com/ipa.jpg",
            "alcohol": 6.5
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "665f1c2a9b1e8a0012345678");
        assert_eq!(product.beer_type, "IPA");
        assert_eq!(product.price, Price::new(5500));
        assert!(product.rating.is_none());
    }

    #[test]
    fn test_deserialize_accepts_plain_id_and_rating() {
        let json = r#"{"id":"p1","name":"Stout","type":"Stout","price":6200,
            "description":"","image":"","alcohol":8.2,"rating":4.5,"reviews":12}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.reviews, Some(12));
    }

    #[test]
    fn test_new_product_serializes_type_field() {
        let new = NewProduct {
            name: "Lager Premium".to_string(),
            beer_type: "Lager".to_string(),
            price: Price::new(4800),
            description: "Suave".to_string(),
            image: String::new(),
            alcohol: 5.0,
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["type"], "Lager");
        assert_eq!(value["price"], 4800);
        assert!(new.problems().is_empty());
    }

    #[test]
    fn test_new_product_problems() {
        let new = NewProduct {
            name: " ".to_string(),
            beer_type: String::new(),
            price: Price::ZERO,
            description: String::new(),
            image: String::new(),
            alcohol: 120.0,
        };
        assert_eq!(new.problems().len(), 4);
    }
}
