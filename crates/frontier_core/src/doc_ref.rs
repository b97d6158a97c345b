use std::fmt;

use crate::SeedError;

/// Identifies one remote document in a category chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    category: String,
    id: String,
}

impl DocumentRef {
    pub fn new(category: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            id: id.into(),
        }
    }

    /// Parses a path such as `/doc/sport/DdOJeMGKKOzb7HRXMg5zGV409`.
    ///
    /// Only the trailing two segments matter: the last is the id, the one
    /// before it the category. Anything in front is ignored, so both full
    /// URLs and bare `category/id` pairs are accepted.
    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        let trimmed = raw.trim();
        let mut segments = trimmed.rsplit('/');
        let id = segments.next().unwrap_or_default();
        let category = segments.next().unwrap_or_default();
        if id.is_empty() || category.is_empty() {
            return Err(SeedError::Malformed(trimmed.to_string()));
        }
        Ok(Self::new(category, id))
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request path relative to the API base url.
    pub fn path(&self) -> String {
        format!("/doc/{}/{}", self.category, self.id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.id)
    }
}

/// Parses a whitespace-delimited seed listing into document references.
pub fn parse_seed_list(raw: &str) -> Result<Vec<DocumentRef>, SeedError> {
    raw.split_whitespace().map(DocumentRef::parse).collect()
}
