use serde::{Deserialize, Serialize};

use crate::identity::CategoryId;
use crate::validation::{FieldError, Validate, Violations};

/// A product grouping shown on the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Unique, URL-safe short name.
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Input for creating a category (seeding only; there is no public endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewCategory {
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            image_url: self.image_url,
        }
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Vec<FieldError> {
        let mut v = Violations::new();
        v.not_blank("name", &self.name);
        if !is_url_safe_slug(&self.slug) {
            v.push("slug", "must be lowercase letters, digits and dashes");
        }
        v.into_errors()
    }
}

/// Lowercase ASCII letters, digits and single inner dashes.
pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
