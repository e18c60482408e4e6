//! Benchmarks for index construction and passage search.
//!
//! The built-in knowledge base is tiny, so a synthetic corpus is also indexed
//! to see how brute-force search scales. Set `BENCH_LARGE=1` for 10,000
//! passages instead of 1,000.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use agro_core::knowledge::KnowledgeBase;
use agro_core::types::{Crop, CropSelection, KnowledgeEntry};
use agro_vector::{CropIndexSet, HashingEmbedding, IndexBuilder};

const SMALL_CORPUS: usize = 1_000;
const LARGE_CORPUS: usize = 10_000;

fn corpus_size() -> usize {
    if std::env::var("BENCH_LARGE").is_ok() {
        LARGE_CORPUS
    } else {
        SMALL_CORPUS
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime")
}

/// Synthetic passages built from the real ones with a numbered suffix.
fn synthetic_knowledge(count: usize) -> KnowledgeBase {
    let base = KnowledgeBase::load();
    let entries = base
        .entries()
        .iter()
        .cycle()
        .take(count)
        .enumerate()
        .map(|(i, e)| {
            KnowledgeEntry::new(e.crop, format!("{} Field note {}.", e.text, i), format!("{}-{}", e.source_tag, i))
        })
        .collect();
    KnowledgeBase::from_entries(entries)
}

fn build(rt: &tokio::runtime::Runtime, kb: &KnowledgeBase) -> CropIndexSet {
    rt.block_on(IndexBuilder::new(HashingEmbedding::default()).build(kb))
        .expect("build failed")
}

fn bench_build(c: &mut Criterion) {
    let rt = runtime();
    let kb = KnowledgeBase::load();

    c.bench_function("build_builtin_knowledge_base", |b| {
        b.iter(|| build(&rt, &kb));
    });
}

fn bench_search(c: &mut Criterion) {
    let rt = runtime();
    let count = corpus_size();
    let set = build(&rt, &synthetic_knowledge(count));

    let mut group = c.benchmark_group("passage_search");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function(format!("all_top1_{}passages", count), |b| {
        let index = set.get(CropSelection::All);
        b.iter(|| {
            let hits = rt
                .block_on(index.search("when should maize be harvested", 1))
                .expect("search failed");
            assert_eq!(hits.len(), 1);
            hits
        });
    });

    group.bench_function(format!("crop_top4_{}passages", count), |b| {
        let index = set.get(Crop::Cassava.into());
        b.iter(|| {
            rt.block_on(index.search("cassava mosaic disease", 4))
                .expect("search failed")
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
