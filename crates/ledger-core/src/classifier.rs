//! Substring rules that decide both which bucket a category is counted under
//! and which icon and color it is drawn with.
//!
//! Both consumers read the same [`CATEGORY_RULES`] table, so a transaction is
//! never shown with a food icon while being counted under another bucket.

use serde::Serialize;

use crate::models::Bucket;

// ── Rule table ────────────────────────────────────────────────────────────────

/// What a matched category substring stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTag {
    Food,
    Pet,
    Gas,
    Bill,
    Shopping,
}

impl CategoryTag {
    /// Bucket the tag is counted under. Only food and pet have their own.
    pub fn bucket(&self) -> Bucket {
        match self {
            CategoryTag::Food => Bucket::Food,
            CategoryTag::Pet => Bucket::Pet,
            CategoryTag::Gas | CategoryTag::Bill | CategoryTag::Shopping => Bucket::Other,
        }
    }
}

/// Ordered `(substring, tag)` rules, first match wins. Matching is
/// case-sensitive.
///
/// Food and pet rules come first so the bucket of a category never depends on
/// the display-only rules below them.
///
/// A category matching several rules goes to the first one only.
pub const CATEGORY_RULES: &[(&str, CategoryTag)] = &[
    ("Dining", CategoryTag::Food),
    ("Groceries", CategoryTag::Food),
    ("Pet", CategoryTag::Pet),
    ("Gas", CategoryTag::Gas),
    ("Bill", CategoryTag::Bill),
    ("쇼핑", CategoryTag::Shopping),
    ("용돈", CategoryTag::Shopping),
];

/// First rule whose substring occurs in `category`.
pub fn tag_for(category: &str) -> Option<CategoryTag> {
    CATEGORY_RULES
        .iter()
        .find(|(needle, _)| category.contains(needle))
        .map(|&(_, tag)| tag)
}

/// Bucket for a category string. Unmatched categories fall into `Other`.
pub fn bucket_for(category: &str) -> Bucket {
    tag_for(category).map_or(Bucket::Other, |tag| tag.bucket())
}

// ── Display tokens ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Food,
    Pet,
    Fuel,
    Receipt,
    Shopping,
    Sparkle,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Food => "🥗",
            Icon::Pet => "🐾",
            Icon::Fuel => "⛽",
            Icon::Receipt => "🧾",
            Icon::Shopping => "🛍️",
            Icon::Sparkle => "✨",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Food,
    Pet,
    Utility,
    Default,
}

impl ColorToken {
    /// Background swatch behind the icon.
    pub fn hex(&self) -> &'static str {
        match self {
            ColorToken::Food => "#FFEDB2",
            ColorToken::Pet => "#E0F2F1",
            ColorToken::Utility => "#FFEBEE",
            ColorToken::Default => "#F3E5F5",
        }
    }
}

/// Icon and color for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub icon: Icon,
    pub color_token: ColorToken,
}

/// Display tokens for `category`. Total over every string.
pub fn classify(category: &str) -> Classification {
    let (icon, color_token) = match tag_for(category) {
        Some(CategoryTag::Food) => (Icon::Food, ColorToken::Food),
        Some(CategoryTag::Pet) => (Icon::Pet, ColorToken::Pet),
        Some(CategoryTag::Gas) => (Icon::Fuel, ColorToken::Utility),
        Some(CategoryTag::Bill) => (Icon::Receipt, ColorToken::Utility),
        Some(CategoryTag::Shopping) => (Icon::Shopping, ColorToken::Default),
        None => (Icon::Sparkle, ColorToken::Default),
    };
    Classification { icon, color_token }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
