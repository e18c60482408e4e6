//! Builds the per-crop indexes and the aggregate "all crops" index.

use std::sync::Arc;

use tracing::info;

use agro_core::error::AgroError;
use agro_core::knowledge::KnowledgeBase;
use agro_core::types::{Crop, CropSelection, KnowledgeEntry};

use crate::embedding::{DynEmbeddingService, EmbeddingService};
use crate::index::VectorIndex;
use crate::search::PassageIndex;

/// One index per crop plus the aggregate.
///
/// Every crop has an index, even when the knowledge base holds no passages
/// for it.
#[derive(Debug, Clone)]
pub struct CropIndexSet {
    cassava: Arc<PassageIndex>,
    yam: Arc<PassageIndex>,
    maize: Arc<PassageIndex>,
    all: Arc<PassageIndex>,
}

impl CropIndexSet {
    /// The index attached to a selection.
    pub fn get(&self, selection: CropSelection) -> Arc<PassageIndex> {
        let index = match selection {
            CropSelection::Crop(Crop::Cassava) => &self.cassava,
            CropSelection::Crop(Crop::Yam) => &self.yam,
            CropSelection::Crop(Crop::Maize) => &self.maize,
            CropSelection::All => &self.all,
        };
        Arc::clone(index)
    }

    /// Passage counts per selection, in selector order.
    pub fn sizes(&self) -> Vec<(CropSelection, usize)> {
        CropSelection::options()
            .into_iter()
            .map(|s| (s, self.get(s).len()))
            .collect()
    }
}

/// Embeds knowledge passages and assembles indexes.
pub struct IndexBuilder {
    embedder: Arc<dyn DynEmbeddingService>,
}

impl IndexBuilder {
    pub fn new(embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            embedder: Arc::new(embedder),
        }
    }

    pub fn new_dyn(embedder: Arc<dyn DynEmbeddingService>) -> Self {
        Self { embedder }
    }

    /// Build a single index over `entries`.
    pub async fn build_for<'a, I>(&self, name: &str, entries: I) -> Result<PassageIndex, AgroError>
    where
        I: IntoIterator<Item = &'a KnowledgeEntry>,
    {
        let mut index = VectorIndex::new();
        for entry in entries {
            let embedding = self.embedder.embed_boxed(&entry.text).await?;
            index.insert(embedding, entry.clone());
        }
        info!(index = name, passages = index.len(), "Index built");
        Ok(PassageIndex::new(name, index, Arc::clone(&self.embedder)))
    }

    /// Build every crop index and the aggregate.
    ///
    /// Each passage is embedded once; the vector goes into its crop's index
    /// and into the aggregate. Embedding failures are returned unchanged.
    pub async fn build(&self, kb: &KnowledgeBase) -> Result<CropIndexSet, AgroError> {
        let mut cassava = VectorIndex::new();
        let mut yam = VectorIndex::new();
        let mut maize = VectorIndex::new();
        let mut all = VectorIndex::new();

        for entry in kb.entries() {
            let embedding = self.embedder.embed_boxed(&entry.text).await?;
            let crop_index = match entry.crop {
                Crop::Cassava => &mut cassava,
                Crop::Yam => &mut yam,
                Crop::Maize => &mut maize,
            };
            crop_index.insert(embedding.clone(), entry.clone());
            all.insert(embedding, entry.clone());
        }

        let finish = |name: &str, index: VectorIndex| {
            info!(index = name, passages = index.len(), "Index built");
            Arc::new(PassageIndex::new(name, index, Arc::clone(&self.embedder)))
        };

        Ok(CropIndexSet {
            cassava: finish(Crop::Cassava.as_str(), cassava),
            yam: finish(Crop::Yam.as_str(), yam),
            maize: finish(Crop::Maize.as_str(), maize),
            all: finish("all", all),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::embedding::HashingEmbedding;

    struct CountingEmbedding {
        inner: HashingEmbedding,
        calls: Arc<AtomicUsize>,
    }

    impl EmbeddingService for CountingEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, AgroError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(text).await
        }

        fn dimensions(&self) -> usize {
            EmbeddingService::dimensions(&self.inner)
        }
    }

    struct FailingEmbedding;

    impl EmbeddingService for FailingEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, AgroError> {
            Err(AgroError::Embedding("model unavailable".to_string()))
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    #[tokio::test]
    async fn test_build_full_knowledge_base() {
        let kb = KnowledgeBase::load();
        let set = IndexBuilder::new(HashingEmbedding::default())
            .build(&kb)
            .await
            .unwrap();

        for crop in Crop::ALL {
            assert_eq!(set.get(crop.into()).len(), kb.for_crop(crop).len());
            assert_eq!(set.get(crop.into()).name(), crop.as_str());
        }
        assert_eq!(set.get(CropSelection::All).len(), kb.len());
    }

    #[tokio::test]
    async fn test_each_passage_embedded_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let kb = KnowledgeBase::load();
        IndexBuilder::new(CountingEmbedding {
            inner: HashingEmbedding::default(),
            calls: Arc::clone(&calls),
        })
        .build(&kb)
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), kb.len());
    }

    #[tokio::test]
    async fn test_crop_without_passages_gets_empty_index() {
        let kb = KnowledgeBase::from_entries(vec![KnowledgeEntry::new(
            Crop::Yam,
            "Yam harvest: 8–12 months after planting.",
            "KB_2#harvest",
        )]);
        let set = IndexBuilder::new(HashingEmbedding::default())
            .build(&kb)
            .await
            .unwrap();
        assert!(set.get(Crop::Cassava.into()).is_empty());
        assert!(set.get(Crop::Maize.into()).is_empty());
        assert_eq!(set.get(Crop::Yam.into()).len(), 1);
    }

    #[tokio::test]
    async fn test_crop_index_only_returns_its_crop() {
        let kb = KnowledgeBase::load();
        let set = IndexBuilder::new(HashingEmbedding::default())
            .build(&kb)
            .await
            .unwrap();
        for crop in Crop::ALL {
            let index = set.get(crop.into());
            assert_eq!(index.name(), crop.as_str());
            let hits = index.search("when do I harvest", 10).await.unwrap();
            assert!(!hits.is_empty());
            assert!(hits.iter().all(|h| h.crop == crop));
        }
        assert_eq!(set.get(CropSelection::All).name(), "all");
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let kb = KnowledgeBase::load();
        let err = IndexBuilder::new(FailingEmbedding).build(&kb).await.unwrap_err();
        assert!(matches!(err, AgroError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_build_for_subset() {
        let kb = KnowledgeBase::load();
        let builder = IndexBuilder::new(HashingEmbedding::default());
        let index = builder.build_for("maize", kb.for_crop(Crop::Maize)).await.unwrap();
        assert_eq!(index.len(), kb.for_crop(Crop::Maize).len());
    }

    #[tokio::test]
    async fn test_sizes_in_selector_order() {
        let kb = KnowledgeBase::load();
        let set = IndexBuilder::new(HashingEmbedding::default())
            .build(&kb)
            .await
            .unwrap();
        let sizes = set.sizes();
        assert_eq!(sizes.len(), 4);
        assert_eq!(sizes[3], (CropSelection::All, kb.len()));
    }
}
