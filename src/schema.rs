//! Translatable field schemas per entity type.

use crate::error::UnknownEntityType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shape of a translatable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Short single-line text (titles, names)
    Text,
    /// Multi-paragraph text
    LongText,
    /// Ordered list of short texts (highlights, tags)
    ListOfText,
}

/// Declaration of one translatable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub kind: FieldKind,
    pub max_length: Option<usize>,
}

impl FieldDef {
    pub const fn text(key: &'static str, max_length: usize) -> Self {
        Self {
            key,
            kind: FieldKind::Text,
            max_length: Some(max_length),
        }
    }

    pub const fn long_text(key: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::LongText,
            max_length: None,
        }
    }

    pub const fn list(key: &'static str) -> Self {
        Self {
            key,
            kind: FieldKind::ListOfText,
            max_length: None,
        }
    }

    /// SEO fields get target-language keyword optimisation in the prompt.
    pub fn is_seo(&self) -> bool {
        self.key.starts_with("meta_")
    }
}

const TOUR_FIELDS: &[FieldDef] = &[
    FieldDef::text("title", 120),
    FieldDef::text("short_description", 300),
    FieldDef::long_text("description"),
    FieldDef::list("highlights"),
    FieldDef::list("included"),
    FieldDef::list("excluded"),
    FieldDef::text("meta_title", 60),
    FieldDef::text("meta_description", 160),
];

const DESTINATION_FIELDS: &[FieldDef] = &[
    FieldDef::text("name", 80),
    FieldDef::long_text("description"),
    FieldDef::text("meta_title", 60),
    FieldDef::text("meta_description", 160),
];

const CATEGORY_FIELDS: &[FieldDef] = &[
    FieldDef::text("name", 80),
    FieldDef::long_text("description"),
];

const POST_FIELDS: &[FieldDef] = &[
    FieldDef::text("title", 120),
    FieldDef::text("excerpt", 300),
    FieldDef::long_text("content"),
    FieldDef::list("tags"),
    FieldDef::text("meta_title", 60),
    FieldDef::text("meta_description", 160),
];

/// Kinds of entity that carry translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Tour,
    Destination,
    Category,
    Post,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Tour => "tour",
            EntityType::Destination => "destination",
            EntityType::Category => "category",
            EntityType::Post => "post",
        }
    }

    /// The translatable fields of this entity type, in prompt order.
    pub fn field_defs(self) -> &'static [FieldDef] {
        match self {
            EntityType::Tour => TOUR_FIELDS,
            EntityType::Destination => DESTINATION_FIELDS,
            EntityType::Category => CATEGORY_FIELDS,
            EntityType::Post => POST_FIELDS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tour" => Ok(EntityType::Tour),
            "destination" => Ok(EntityType::Destination),
            "category" => Ok(EntityType::Category),
            "post" => Ok(EntityType::Post),
            other => Err(UnknownEntityType(other.to_string())),
        }
    }
}
