use serde::{Deserialize, Serialize};

use crate::identity::{CategoryId, ProductId};
use crate::validation::{FieldError, Validate, Violations};

fn default_unit() -> String {
    "piece".to_string()
}

fn default_in_stock() -> bool {
    true
}

/// A sellable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in paise.
    pub price: u64,
    /// Pre-discount price for strike-through display. Not required to exceed `price`.
    #[serde(default)]
    pub original_price: Option<u64>,
    /// Display unit: "kg", "liter", "dozen", "piece", ...
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Referenced category. The store does not check that it exists.
    pub category_id: CategoryId,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl Product {
    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }

    /// Whether `original_price` would render as a discount.
    pub fn is_discounted(&self) -> bool {
        self.original_price.is_some_and(|orig| orig > self.price)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: u64,
    #[serde(default)]
    pub original_price: Option<u64>,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl NewProduct {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            unit: self.unit,
            image_url: self.image_url,
            category_id: self.category_id,
            in_stock: self.in_stock,
        }
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank("name", &self.name);
        v.not_blank("unit", &self.unit);
        v.not_blank("categoryId", self.category_id.as_str());
        v.into_errors()
    }
}

/// Partial product update; absent fields are left untouched and `null`
/// clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(
        default,
        deserialize_with = "crate::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_price: Option<Option<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::patch::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = original_price;
        }
        if let Some(unit) = self.unit {
            product.unit = unit;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = image_url;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
    }
}

impl Validate for ProductPatch {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank_opt("name", self.name.as_deref());
        v.not_blank_opt("unit", self.unit.as_deref());
        v.not_blank_opt("categoryId", self.category_id.as_ref().map(|c| c.as_str()));
        v.into_errors()
    }
}
