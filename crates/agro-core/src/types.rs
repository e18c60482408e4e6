use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AgroError;

// =============================================================================
// Crops
// =============================================================================

/// A crop covered by the knowledge base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crop {
    Cassava,
    Yam,
    Maize,
}

impl Crop {
    /// Every crop, in knowledge-base order.
    pub const ALL: [Crop; 3] = [Crop::Cassava, Crop::Yam, Crop::Maize];

    /// Lowercase name used in URLs, config and source tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Cassava => "cassava",
            Crop::Yam => "yam",
            Crop::Maize => "maize",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Crop::Cassava => "Cassava",
            Crop::Yam => "Yam",
            Crop::Maize => "Maize",
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Crop {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cassava" => Ok(Crop::Cassava),
            "yam" => Ok(Crop::Yam),
            "maize" | "corn" => Ok(Crop::Maize),
            other => Err(AgroError::Config(format!("unknown crop '{}'", other))),
        }
    }
}

/// What the user picked in the crop selector: one crop, or all of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CropSelection {
    Crop(Crop),
    All,
}

impl CropSelection {
    /// Every selectable option: each crop followed by `All`.
    pub fn options() -> Vec<CropSelection> {
        Crop::ALL
            .iter()
            .copied()
            .map(CropSelection::Crop)
            .chain(std::iter::once(CropSelection::All))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropSelection::Crop(crop) => crop.as_str(),
            CropSelection::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CropSelection::Crop(crop) => crop.label(),
            CropSelection::All => "All crops",
        }
    }
}

impl From<Crop> for CropSelection {
    fn from(crop: Crop) -> Self {
        CropSelection::Crop(crop)
    }
}

impl fmt::Display for CropSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropSelection {
    type Err = AgroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "all crops" | "all_crops" => Ok(CropSelection::All),
            other => other.parse::<Crop>().map(CropSelection::Crop),
        }
    }
}

impl From<CropSelection> for String {
    fn from(selection: CropSelection) -> Self {
        selection.as_str().to_string()
    }
}

impl TryFrom<String> for CropSelection {
    type Error = AgroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// Knowledge
// =============================================================================

/// One static passage of crop knowledge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// The crop this passage is about.
    pub crop: Crop,
    /// Passage text.
    pub text: String,
    /// Source identifier, e.g. `KB_1#planting`.
    pub source_tag: String,
}

impl KnowledgeEntry {
    pub fn new(crop: Crop, text: impl Into<String>, source_tag: impl Into<String>) -> Self {
        Self {
            crop,
            text: text.into(),
            source_tag: source_tag.into(),
        }
    }
}
