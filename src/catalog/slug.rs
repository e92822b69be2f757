use serde::{Deserialize, Serialize};
use std::fmt;

/// URL key for a product.
///
/// The only way to obtain a `Slug` is through normalization, so every product that reaches a
/// repository carries a normalized slug regardless of which code path built it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Derive from the explicit slug when one was supplied, otherwise from the title.
    pub fn derive(explicit: Option<&str>, title: &str) -> Self {
        let source = match explicit {
            Some(slug) if !slug.is_empty() => slug,
            _ => title,
        };
        Self::normalize(source)
    }

    /// Lower-case, spaces to underscores, apostrophes removed.
    pub fn normalize(raw: &str) -> Self {
        let normalized = raw
            .to_lowercase()
            .replace(' ', "_")
            .replace('\'', "");
        Slug(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Slug {
    fn from(raw: String) -> Self {
        Slug::normalize(&raw)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
