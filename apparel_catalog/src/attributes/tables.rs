//! Category enumeration and the static validity tables.
//!
//! Which attributes apply to which category, and which values each bounded
//! attribute may take, are fixed properties of the catalog data. They are
//! modeled as static tables keyed by closed enums rather than ad hoc string
//! checks.

use serde::{Deserialize, Serialize};

use super::AttributeKey;

/// Product categories carried by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Dress,
    Skirt,
    Pants,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 4] = [
        Category::Top,
        Category::Dress,
        Category::Skirt,
        Category::Pants,
    ];

    /// Parse a category from a case-insensitive name.
    pub fn parse(name: &str) -> Option<Category> {
        match name.trim().to_lowercase().as_str() {
            "top" | "tops" => Some(Category::Top),
            "dress" | "dresses" => Some(Category::Dress),
            "skirt" | "skirts" => Some(Category::Skirt),
            "pants" => Some(Category::Pants),
            _ => None,
        }
    }

    /// Lowercase name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Dress => "dress",
            Category::Skirt => "skirt",
            Category::Pants => "pants",
        }
    }

    /// The attributes that are meaningful for this category.
    ///
    /// Inferred attributes outside this list are dropped during oracle
    /// response validation, and the catalog only filters on these.
    pub fn allowed_attributes(&self) -> &'static [AttributeKey] {
        match self {
            Category::Top => &[
                AttributeKey::Fit,
                AttributeKey::Fabric,
                AttributeKey::SleeveLength,
                AttributeKey::ColorOrPrint,
            ],
            Category::Dress => &[
                AttributeKey::Fit,
                AttributeKey::Fabric,
                AttributeKey::SleeveLength,
                AttributeKey::ColorOrPrint,
                AttributeKey::Occasion,
                AttributeKey::Neckline,
            ],
            Category::Skirt => &[
                AttributeKey::Fabric,
                AttributeKey::ColorOrPrint,
                AttributeKey::Length,
            ],
            Category::Pants => &[
                AttributeKey::Fit,
                AttributeKey::Fabric,
                AttributeKey::ColorOrPrint,
                AttributeKey::PantType,
            ],
        }
    }

    /// Whether the given attribute applies to this category.
    pub fn allows(&self, key: AttributeKey) -> bool {
        key == AttributeKey::Category || self.allowed_attributes().contains(&key)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The bounded set of valid values for an attribute, if one exists.
///
/// Free-form attributes (color/print, style, season, size, budget) have no
/// bounded table; their values pass through validation unchanged.
pub fn valid_values(key: AttributeKey) -> Option<&'static [&'static str]> {
    match key {
        AttributeKey::Category => Some(&["top", "dress", "skirt", "pants"]),
        AttributeKey::Fit => Some(&[
            "Relaxed",
            "Stretch to fit",
            "Body hugging",
            "Tailored",
            "Oversized",
            "Flowy",
            "Bodycon",
            "Slim",
            "Sleek and straight",
        ]),
        AttributeKey::Fabric => Some(&[
            "Linen",
            "Silk",
            "Cotton",
            "Rayon",
            "Satin",
            "Modal jersey",
            "Crepe",
            "Tencel",
            "Chambray",
            "Velvet",
            "Chiffon",
            "Denim",
            "Wool-blend",
            "Sequined velvet",
            "Tulle",
            "Organic cotton",
            "Viscose",
            "Cotton poplin",
            "Linen blend",
            "Cotton gauze",
            "Ribbed jersey",
            "Lace overlay",
            "Tencel twill",
        ]),
        AttributeKey::SleeveLength => Some(&[
            "Sleeveless",
            "Spaghetti straps",
            "Straps",
            "Short sleeves",
            "Short flutter sleeves",
            "Cap sleeves",
            "Quarter sleeves",
            "Long sleeves",
            "Full sleeves",
            "Cropped",
            "Bishop sleeves",
            "Balloon sleeves",
            "Bell sleeves",
            "Halter",
            "Tube",
            "One-shoulder",
        ]),
        AttributeKey::Neckline => Some(&[
            "V neck",
            "Sweetheart",
            "Square neck",
            "Boat neck",
            "Tubetop",
            "Halter",
            "Cowl neck",
            "Collar",
            "One-shoulder",
            "Polo collar",
            "Illusion bateau",
            "Round neck",
        ]),
        AttributeKey::Length => Some(&["Mini", "Short", "Midi", "Maxi"]),
        AttributeKey::PantType => Some(&[
            "Wide-legged",
            "Ankle length",
            "Flared",
            "Wide hem",
            "Straight ankle",
            "Mid-rise",
            "Low-rise",
        ]),
        AttributeKey::Occasion => Some(&[
            "Party", "Vacation", "Everyday", "Evening", "Work", "Vocation",
        ]),
        _ => None,
    }
}

/// Check a single string against the bounded table for a key, if any.
///
/// Returns `true` for attributes without a bounded table.
pub fn is_valid_value(key: AttributeKey, value: &str) -> bool {
    match valid_values(key) {
        Some(values) => values.iter().any(|v| v.eq_ignore_ascii_case(value.trim())),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Dress"), Some(Category::Dress));
        assert_eq!(Category::parse(" pants "), Some(Category::Pants));
        assert_eq!(Category::parse("tops"), Some(Category::Top));
        assert_eq!(Category::parse("jacket"), None);
    }

    #[test]
    fn test_allowed_attributes() {
        assert!(Category::Dress.allows(AttributeKey::Neckline));
        assert!(!Category::Top.allows(AttributeKey::Neckline));
        assert!(!Category::Skirt.allows(AttributeKey::Fit));
        assert!(Category::Pants.allows(AttributeKey::PantType));

        // Category itself is always allowed.
        for category in Category::ALL {
            assert!(category.allows(AttributeKey::Category));
        }
    }

    #[test]
    fn test_valid_values_bounded() {
        assert!(is_valid_value(AttributeKey::Fit, "Relaxed"));
        assert!(is_valid_value(AttributeKey::Fit, "relaxed"));
        assert!(!is_valid_value(AttributeKey::Fit, "Baggy"));
        assert!(is_valid_value(AttributeKey::Length, "Midi"));
        assert!(!is_valid_value(AttributeKey::Neckline, "Turtleneck"));
    }

    #[test]
    fn test_valid_values_free_form() {
        // No bounded table: anything goes.
        assert!(is_valid_value(AttributeKey::ColorOrPrint, "Midnight navy sequin"));
        assert!(is_valid_value(AttributeKey::Style, "cottagecore"));
    }
}
