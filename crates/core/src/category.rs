//! Resource categories users can ask about.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A queryable resource type. The set is fixed; each category maps to
/// exactly one feed endpoint in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ambulance,
    Helpline,
    Hospital,
    Medicine,
    Oxygen,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Ambulance,
        Category::Helpline,
        Category::Hospital,
        Category::Medicine,
        Category::Oxygen,
    ];

    /// The canonical lowercase name, also used as the chat command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ambulance => "ambulance",
            Category::Helpline => "helpline",
            Category::Hospital => "hospital",
            Category::Medicine => "medicine",
            Category::Oxygen => "oxygen",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}
