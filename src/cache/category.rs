use crate::errors::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partitions of the cache. Each one carries its own budget and retention policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    General,
    Vectors,
    Thumbnails,
    Previews,
    Metadata,
    SearchResults,
    Models,
    Preprocessing,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::General,
        Category::Vectors,
        Category::Thumbnails,
        Category::Previews,
        Category::Metadata,
        Category::SearchResults,
        Category::Models,
        Category::Preprocessing,
    ];

    /// Position in [`Category::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Protection priority; lower values are evicted first when falling back across categories.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Category::General => 0,
            Category::Preprocessing => 1,
            Category::SearchResults => 2,
            Category::Previews => 3,
            Category::Thumbnails => 4,
            Category::Metadata => 5,
            Category::Vectors => 6,
            Category::Models => 7,
        }
    }

    /// All categories, lowest priority first.
    #[must_use]
    pub fn by_priority() -> [Category; 8] {
        let mut all = Self::ALL;
        all.sort_by_key(|c| c.priority());
        all
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Vectors => "vectors",
            Category::Thumbnails => "thumbnails",
            Category::Previews => "previews",
            Category::Metadata => "metadata",
            Category::SearchResults => "search_results",
            Category::Models => "models",
            Category::Preprocessing => "preprocessing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CacheError::UnknownCategory(s.to_string()))
    }
}
