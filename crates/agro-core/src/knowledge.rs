//! Static crop knowledge base.
//!
//! The passages are compiled into the binary. Each crop gets one `KB_<n>`
//! source number and one passage per topic, tagged `KB_<n>#<topic>`.

use crate::types::{Crop, KnowledgeEntry};

/// (topic, text) pairs per crop.
type Passages = &'static [(&'static str, &'static str)];

const CASSAVA: Passages = &[
    (
        "overview",
        "Cassava is a major root crop widely cultivated in Nigeria for its starchy tubers, \
         which serve as a staple food and industrial raw material. It is drought-tolerant and \
         can be grown in poor soils, making it vital for food security.",
    ),
    (
        "climate",
        "Cassava climate & soil requirements: prefers warm, humid tropical climates (25–29°C), \
         sandy-loam soils (pH 5.5–6.5), rainfall 1,000–1,500 mm.",
    ),
    (
        "planting",
        "Cassava planting: stem cuttings (20–25 cm) on ridges/mounds, spacing 1m × 1m, \
         weed regularly.",
    ),
    (
        "pests",
        "Cassava pests/diseases: cassava mealybug, green mite, cassava mosaic disease, \
         bacterial blight.",
    ),
    (
        "harvest",
        "Cassava harvest: 9–12 months after planting, process tubers within 48 hours.",
    ),
    (
        "market",
        "Cassava market: processed into garri, fufu, starch, ethanol, and feed. \
         Nigeria is the world’s largest producer.",
    ),
];

const YAM: Passages = &[
    (
        "overview",
        "Yam is a staple food crop in Nigeria, culturally significant and economically \
         valuable. Nigeria produces over 70% of the world’s yams.",
    ),
    (
        "climate",
        "Yam climate & soil requirements: tropical climates (25–30°C), deep loamy soils rich \
         in organic matter, rainfall 1,200–1,500 mm.",
    ),
    (
        "planting",
        "Yam planting: tuber setts or small whole tubers, spacing 1m × 1m or 1.2m × 1.2m, \
         use stakes for vines.",
    ),
    (
        "pests",
        "Yam pests/diseases: yam beetles, nematodes, anthracnose, yam mosaic virus, tuber rots.",
    ),
    (
        "harvest",
        "Yam harvest: 8–12 months after planting, store in ventilated yam barns.",
    ),
    (
        "market",
        "Yam market: consumed boiled, pounded, fried, roasted, also exported fresh/processed.",
    ),
];

const MAIZE: Passages = &[
    (
        "overview",
        "Maize is an important cereal crop in Nigeria for food, livestock feed, and industry. \
         Grown nationwide, adaptable to many climates.",
    ),
    (
        "climate",
        "Maize climate & soil requirements: thrives at 18–27°C, fertile well-drained soils \
         (pH 5.5–7.0), rainfall 500–1,200 mm depending on variety.",
    ),
    (
        "planting",
        "Maize planting: direct seeding, spacing 75 cm × 25 cm, apply NPK fertilizer, weed early.",
    ),
    (
        "pests",
        "Maize pests/diseases: stem borers, armyworms, maize streak virus, rust, leaf blight.",
    ),
    (
        "harvest",
        "Maize harvest: dry husks, hard kernels; dry grains to 12–13% moisture.",
    ),
    (
        "market",
        "Maize market: consumed fresh or processed (pap, flour, feed), used in breweries and \
         food industries.",
    ),
];

/// The static mapping from crop to passages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Load the built-in knowledge base.
    pub fn load() -> Self {
        let entries = Crop::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, crop)| {
                passages_for(*crop).iter().map(move |(topic, text)| {
                    KnowledgeEntry::new(*crop, *text, format!("KB_{}#{}", i + 1, topic))
                })
            })
            .collect();
        Self { entries }
    }

    /// Build a knowledge base from arbitrary entries.
    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// All entries, in load order.
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Entries for a single crop, in load order.
    pub fn for_crop(&self, crop: Crop) -> Vec<&KnowledgeEntry> {
        self.entries.iter().filter(|e| e.crop == crop).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn passages_for(crop: Crop) -> Passages {
    match crop {
        Crop::Cassava => CASSAVA,
        Crop::Yam => YAM,
        Crop::Maize => MAIZE,
    }
}
