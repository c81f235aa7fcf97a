//! Criterion benchmarks for Pilum index construction and retrieval.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pilum::document::{Assignment, Conjunction, Document, int_values};
use pilum::index::{BEIndex, IndexerBuilder};

/// Generate a randomized targeting corpus over four integer fields.
fn generate_documents(count: u32, rng: &mut StdRng) -> Vec<Document> {
    let fields: [(&str, usize, i64); 4] =
        [("a", 4, 50), ("b", 3, 20), ("c", 2, 10), ("d", 3, 30)];

    let mut documents = Vec::with_capacity(count as usize);
    for id in 1..=count {
        let mut conj = Conjunction::new();
        for (field, max_count, domain) in fields {
            let value_count = rng.random_range(0..max_count);
            if value_count > 0 {
                let values: Vec<i64> =
                    (0..value_count).map(|_| rng.random_range(0..domain)).collect();
                conj = conj.include(field, int_values(values));
            }
        }
        if conj.is_empty() {
            conj = conj.include("a", int_values([rng.random_range(0..50)]));
        }
        documents.push(Document::new(id).with_conjunction(conj));
    }
    documents
}

fn generate_queries(count: usize, rng: &mut StdRng) -> Vec<Assignment> {
    let mut queries = Vec::with_capacity(count);
    for _ in 0..count {
        let mut assigns = Assignment::new();
        assigns.insert("a".to_string(), int_values([rng.random_range(0..50)]));
        assigns.insert("b".to_string(), int_values([rng.random_range(0..20)]));
        assigns.insert("c".to_string(), int_values([rng.random_range(0..10)]));
        assigns.insert("d".to_string(), int_values([rng.random_range(0..30)]));
        queries.push(assigns);
    }
    queries
}

fn build_index(documents: &[Document]) -> Box<dyn BEIndex> {
    let mut builder = IndexerBuilder::new();
    for doc in documents {
        builder.add_document(doc).expect("benchmark corpus indexes");
    }
    builder.build_index().expect("benchmark index compiles")
}

fn bench_build(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBE7C);
    let documents = generate_documents(10_000, &mut rng);

    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("index_10k_docs", |b| {
        b.iter(|| black_box(build_index(&documents)));
    });
    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBE7C);
    let documents = generate_documents(10_000, &mut rng);
    let index = build_index(&documents);
    let queries = generate_queries(256, &mut rng);

    let mut group = c.benchmark_group("retrieve");
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("random_assignments_10k_docs", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(index.retrieve(query).expect("query succeeds"));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_retrieve);
criterion_main!(benches);
