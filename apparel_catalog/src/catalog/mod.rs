//! Product catalog: the tabular store the resolved attribute set filters against.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::attributes::{AttributeKey, AttributeMap, AttributeValue, Category};

/// Errors raised while loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read catalog: {0}")]
    Read(#[from] csv::Error),
}

/// One product row from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub name: String,
    pub category: Category,
    pub price: f64,
    /// Comma-separated size list as shipped in the catalog, e.g. `"S,M,L"`.
    #[serde(default)]
    pub available_sizes: String,
    #[serde(default)]
    pub fit: Option<String>,
    #[serde(default)]
    pub fabric: Option<String>,
    #[serde(default)]
    pub sleeve_length: Option<String>,
    /// The catalog column is named `color`; the attribute is `color_or_print`.
    #[serde(default, rename = "color")]
    pub color_or_print: Option<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub neckline: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub pant_type: Option<String>,
}

impl ProductRecord {
    /// Whether the product is offered in the given size.
    pub fn has_size(&self, size: &str) -> bool {
        self.available_sizes
            .split(',')
            .any(|s| s.trim().eq_ignore_ascii_case(size.trim()))
    }

    /// Short human-readable description of the product.
    pub fn description(&self) -> String {
        let mut parts = Vec::new();
        if let Some(color) = &self.color_or_print {
            parts.push(color.to_lowercase());
        }
        if let Some(fabric) = &self.fabric {
            parts.push(fabric.to_lowercase());
        }
        parts.push(self.category.as_str().to_string());
        parts.join(" ")
    }
}

/// In-memory product catalog loaded from a CSV file.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-constructed records.
    pub fn from_products(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Load the catalog from a CSV file.
    ///
    /// Rows that fail to deserialize (unknown category, malformed price) are
    /// skipped with a diagnostic rather than aborting the load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let mut products = Vec::new();

        for (row, result) in reader.deserialize::<ProductRecord>().enumerate() {
            match result {
                Ok(product) => products.push(product),
                Err(err) => {
                    tracing::warn!(row = row + 1, error = %err, "skipping malformed catalog row");
                }
            }
        }

        tracing::info!(products = products.len(), path = %path.display(), "catalog loaded");
        Ok(Self { products })
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products in the catalog.
    pub fn all_products(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    /// Filter products by a resolved attribute map.
    ///
    /// Category, budget, and size apply to every product; the remaining
    /// filters apply only where the attribute is meaningful for the active
    /// category. Results are returned ascending by price, capped at
    /// `max_results`.
    pub fn filter(&self, attributes: &AttributeMap, max_results: usize) -> Vec<&ProductRecord> {
        let category = attributes
            .get(&AttributeKey::Category)
            .and_then(AttributeValue::as_scalar)
            .and_then(Category::parse);
        let budget = attributes
            .get(&AttributeKey::Budget)
            .and_then(AttributeValue::as_number);
        let size = attributes
            .get(&AttributeKey::Size)
            .and_then(AttributeValue::as_scalar);

        let mut matches: Vec<&ProductRecord> = self
            .products
            .iter()
            .filter(|p| category.is_none_or_eq(p.category))
            .filter(|p| budget.map_or(true, |b| p.price <= b))
            .filter(|p| size.map_or(true, |s| p.has_size(s)))
            .filter(|p| self.category_filters_pass(p, attributes, category))
            .collect();

        matches.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(max_results);
        matches
    }

    fn category_filters_pass(
        &self,
        product: &ProductRecord,
        attributes: &AttributeMap,
        category: Option<Category>,
    ) -> bool {
        let in_category = |allowed: &[Category]| category.map_or(false, |c| allowed.contains(&c));

        if in_category(&[Category::Top, Category::Dress, Category::Pants]) {
            if let Some(fit) = attributes.get(&AttributeKey::Fit) {
                if !field_equals(product.fit.as_deref(), fit) {
                    return false;
                }
            }
        }

        if let Some(fabric) = attributes.get(&AttributeKey::Fabric) {
            if !field_contains(product.fabric.as_deref(), fabric) {
                return false;
            }
        }

        if let Some(color) = attributes.get(&AttributeKey::ColorOrPrint) {
            if !field_contains(product.color_or_print.as_deref(), color) {
                return false;
            }
        }

        if in_category(&[Category::Top, Category::Dress]) {
            if let Some(sleeve) = attributes.get(&AttributeKey::SleeveLength) {
                if !field_contains(product.sleeve_length.as_deref(), sleeve) {
                    return false;
                }
            }
        }

        if in_category(&[Category::Dress]) {
            if let Some(neckline) = attributes.get(&AttributeKey::Neckline) {
                if !field_contains(product.neckline.as_deref(), neckline) {
                    return false;
                }
            }
            if let Some(occasion) = attributes.get(&AttributeKey::Occasion) {
                if !field_contains(product.occasion.as_deref(), occasion) {
                    return false;
                }
            }
        }

        if in_category(&[Category::Skirt]) {
            if let Some(length) = attributes.get(&AttributeKey::Length) {
                if !field_equals(product.length.as_deref(), length) {
                    return false;
                }
            }
        }

        if in_category(&[Category::Pants]) {
            if let Some(pant_type) = attributes.get(&AttributeKey::PantType) {
                if !field_contains(product.pant_type.as_deref(), pant_type) {
                    return false;
                }
            }
        }

        true
    }
}

/// Case-insensitive equality against a scalar or any list member.
fn field_equals(field: Option<&str>, value: &AttributeValue) -> bool {
    let Some(field) = field else { return false };
    match value {
        AttributeValue::Scalar(s) => field.eq_ignore_ascii_case(s.trim()),
        AttributeValue::List(items) => items.iter().any(|s| field.eq_ignore_ascii_case(s.trim())),
        AttributeValue::Number(_) => false,
    }
}

/// Case-insensitive substring match against a scalar or any list member.
fn field_contains(field: Option<&str>, value: &AttributeValue) -> bool {
    let Some(field) = field else { return false };
    let field = field.to_lowercase();
    match value {
        AttributeValue::Scalar(s) => field.contains(&s.trim().to_lowercase()),
        AttributeValue::List(items) => items
            .iter()
            .any(|s| field.contains(&s.trim().to_lowercase())),
        AttributeValue::Number(_) => false,
    }
}

trait OptionCategoryExt {
    fn is_none_or_eq(&self, category: Category) -> bool;
}

impl OptionCategoryExt for Option<Category> {
    fn is_none_or_eq(&self, category: Category) -> bool {
        self.map_or(true, |c| c == category)
    }
}
