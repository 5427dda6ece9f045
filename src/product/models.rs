use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::schema::products;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub reviews: i32,
    pub category: Option<String>,
    pub size: Option<String>,
    pub features: Option<String>,
    pub specifications: Option<String>,
    pub benefits: Option<String>,
    pub compatibility: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry as served to the site, with list fields decoded from their stored JSON text.
#[derive(Serialize, Debug)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub reviews: i32,
    pub category: Option<String>,
    pub size: Option<String>,
    pub features: Vec<Value>,
    pub specifications: Vec<Value>,
    pub benefits: Vec<Value>,
    pub compatibility: Vec<Value>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            original_price: row.original_price,
            image_url: row.image_url,
            description: row.description,
            rating: row.rating,
            reviews: row.reviews,
            category: row.category,
            size: row.size,
            features: decode_list(row.features.as_deref()),
            specifications: decode_list(row.specifications.as_deref()),
            benefits: decode_list(row.benefits.as_deref()),
            compatibility: decode_list(row.compatibility.as_deref()),
            in_stock: row.in_stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: Option<f64>,
    #[validate(range(min = 0))]
    pub reviews: Option<i32>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub features: Option<Value>,
    pub specifications: Option<Value>,
    pub benefits: Option<Value>,
    pub compatibility: Option<Value>,
    pub in_stock: Option<bool>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i32>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub features: Option<String>,
    pub specifications: Option<String>,
    pub benefits: Option<String>,
    pub compatibility: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = products)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i32>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub features: Option<String>,
    pub specifications: Option<String>,
    pub benefits: Option<String>,
    pub compatibility: Option<String>,
    pub in_stock: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl ProductPayload {
    pub fn into_new(self) -> Option<NewProduct> {
        Some(NewProduct {
            name: self.name?.trim().to_owned(),
            price: self.price.unwrap_or(0.0),
            original_price: self.original_price,
            image_url: self.image_url,
            description: self.description,
            rating: self.rating,
            reviews: self.reviews,
            category: self.category,
            size: self.size,
            features: encode_list(self.features),
            specifications: encode_list(self.specifications),
            benefits: encode_list(self.benefits),
            compatibility: encode_list(self.compatibility),
            in_stock: self.in_stock,
        })
    }

    pub fn into_changes(self) -> UpdateProduct {
        UpdateProduct {
            name: self.name.map(|n| n.trim().to_owned()),
            price: self.price,
            original_price: self.original_price,
            image_url: self.image_url,
            description: self.description,
            rating: self.rating,
            reviews: self.reviews,
            category: self.category,
            size: self.size,
            features: encode_list(self.features),
            specifications: encode_list(self.specifications),
            benefits: encode_list(self.benefits),
            compatibility: encode_list(self.compatibility),
            in_stock: self.in_stock,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

/// Serialises a list field for storage. Arrays are kept as-is, free text is
/// split into one entry per non-empty line, `null` clears nothing.
pub fn encode_list(value: Option<Value>) -> Option<String> {
    let list = match value? {
        Value::Null => return None,
        Value::Array(items) => items,
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items,
            _ => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| Value::String(l.to_owned()))
                .collect(),
        },
        other => vec![other],
    };

    Some(Value::Array(list).to_string())
}

/// Reads a stored list field back; malformed legacy text becomes a single entry.
pub fn decode_list(stored: Option<&str>) -> Vec<Value> {
    let Some(text) = stored.map(str::trim).filter(|t| !t.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(other) => vec![other],
        Err(_) => vec![Value::String(text.to_owned())],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn arrays_are_stored_verbatim() {
        let stored = encode_list(Some(json!(["RFID tag", "Windshield sticker"])));
        assert_eq!(stored.as_deref(), Some(r#"["RFID tag","Windshield sticker"]"#));
    }

    #[test]
    fn free_text_is_split_into_lines() {
        let stored = encode_list(Some(json!("Instant activation\n\n  NETC compliant ")));
        assert_eq!(
            decode_list(stored.as_deref()),
            vec![json!("Instant activation"), json!("NETC compliant")]
        );
    }

    #[test]
    fn json_text_inside_a_string_is_unwrapped() {
        let stored = encode_list(Some(json!(r#"[{"k":"Validity","v":"5 years"}]"#)));
        assert_eq!(decode_list(stored.as_deref()), vec![json!({"k": "Validity", "v": "5 years"})]);
    }

    #[test]
    fn absent_or_null_means_no_change() {
        assert_eq!(encode_list(None), None);
        assert_eq!(encode_list(Some(Value::Null)), None);
    }

    #[test]
    fn legacy_text_decodes_to_single_entry() {
        assert_eq!(decode_list(Some("not json")), vec![json!("not json")]);
        assert!(decode_list(Some("   ")).is_empty());
        assert!(decode_list(None).is_empty());
    }
}
