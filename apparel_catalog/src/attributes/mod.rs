//! Attribute domain: the closed set of attribute keys and the value union.

mod tables;

pub use tables::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of attributes the engine resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    Category,
    Fit,
    Fabric,
    SleeveLength,
    ColorOrPrint,
    Occasion,
    Neckline,
    Length,
    PantType,
    Season,
    Style,
    Size,
    Budget,
}

impl AttributeKey {
    /// All attribute keys, in declaration order.
    pub const ALL: [AttributeKey; 13] = [
        AttributeKey::Category,
        AttributeKey::Fit,
        AttributeKey::Fabric,
        AttributeKey::SleeveLength,
        AttributeKey::ColorOrPrint,
        AttributeKey::Occasion,
        AttributeKey::Neckline,
        AttributeKey::Length,
        AttributeKey::PantType,
        AttributeKey::Season,
        AttributeKey::Style,
        AttributeKey::Size,
        AttributeKey::Budget,
    ];

    /// Canonical snake_case name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::Category => "category",
            AttributeKey::Fit => "fit",
            AttributeKey::Fabric => "fabric",
            AttributeKey::SleeveLength => "sleeve_length",
            AttributeKey::ColorOrPrint => "color_or_print",
            AttributeKey::Occasion => "occasion",
            AttributeKey::Neckline => "neckline",
            AttributeKey::Length => "length",
            AttributeKey::PantType => "pant_type",
            AttributeKey::Season => "season",
            AttributeKey::Style => "style",
            AttributeKey::Size => "size",
            AttributeKey::Budget => "budget",
        }
    }

    /// Parse a key from its canonical name or a known alias.
    ///
    /// Vibe mapping files and upstream extractors use `color` and `coverage`
    /// for what the catalog calls `color_or_print` and `sleeve_length`.
    pub fn parse(name: &str) -> Option<AttributeKey> {
        match name.trim().to_lowercase().as_str() {
            "category" => Some(AttributeKey::Category),
            "fit" => Some(AttributeKey::Fit),
            "fabric" => Some(AttributeKey::Fabric),
            "sleeve_length" | "coverage" => Some(AttributeKey::SleeveLength),
            "color_or_print" | "color" => Some(AttributeKey::ColorOrPrint),
            "occasion" => Some(AttributeKey::Occasion),
            "neckline" => Some(AttributeKey::Neckline),
            "length" => Some(AttributeKey::Length),
            "pant_type" => Some(AttributeKey::PantType),
            "season" => Some(AttributeKey::Season),
            "style" => Some(AttributeKey::Style),
            "size" => Some(AttributeKey::Size),
            "budget" => Some(AttributeKey::Budget),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value of a single attribute.
///
/// Vibe mapping files carry either a string or an array of strings per
/// attribute; budget is numeric. The untagged representation lets the JSON
/// file format deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Numeric value (budget).
    Number(f64),
    /// Single string value.
    Scalar(String),
    /// Ordered list of string values.
    List(Vec<String>),
}

impl AttributeValue {
    /// Create a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        AttributeValue::Scalar(value.into())
    }

    /// Create a list value.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether the value carries no usable content.
    ///
    /// Empty values never overwrite a populated key during fusion.
    pub fn is_empty(&self) -> bool {
        match self {
            AttributeValue::Number(_) => false,
            AttributeValue::Scalar(s) => s.trim().is_empty(),
            AttributeValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// View the value as a single string, if it is one.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// View the value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret the value as a number, parsing scalars like `"75"` or `"$75"`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Scalar(s) => s.trim().trim_start_matches('$').parse().ok(),
            AttributeValue::List(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Scalar(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Scalar(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Scalar(s) => write!(f, "{}", s),
            AttributeValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// A bag of attributes as exchanged between pipeline stages.
pub type AttributeMap = HashMap<AttributeKey, AttributeValue>;
