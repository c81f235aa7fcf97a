//! Oracle equivalence tests: the index against a brute-force evaluator
//! over randomized corpora.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pilum::document::{Assignment, Conjunction, Document, int_values};
use pilum::error::Result;
use pilum::index::{BEIndex, IndexerBuilder};

/// A targeting rule over up to four integer fields; an empty field list
/// means the field is unconstrained.
#[derive(Debug, Clone, Default)]
struct MockTargeting {
    id: u32,
    fields: Vec<(&'static str, Vec<i64>)>,
    excludes: Vec<(&'static str, Vec<i64>)>,
}

impl MockTargeting {
    fn to_conjunction(&self) -> Conjunction {
        let mut conj = Conjunction::new();
        for (field, values) in &self.fields {
            if !values.is_empty() {
                conj = conj.include(*field, int_values(values.iter().copied()));
            }
        }
        for (field, values) in &self.excludes {
            if !values.is_empty() {
                conj = conj.exclude(*field, int_values(values.iter().copied()));
            }
        }
        conj
    }

    fn matches(&self, query: &[(&'static str, Vec<i64>)]) -> bool {
        let lookup = |field: &str| {
            query
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, values)| values.as_slice())
                .unwrap_or(&[])
        };
        for (field, values) in &self.fields {
            if values.is_empty() {
                continue;
            }
            let assigned = lookup(field);
            if !assigned.iter().any(|value| values.contains(value)) {
                return false;
            }
        }
        for (field, values) in &self.excludes {
            if values.is_empty() {
                continue;
            }
            let assigned = lookup(field);
            if assigned.iter().any(|value| values.contains(value)) {
                return false;
            }
        }
        true
    }
}

fn rand_values(rng: &mut StdRng, max_count: usize, domain: i64) -> Vec<i64> {
    let count = rng.random_range(0..max_count);
    let mut values: Vec<i64> = (0..count).map(|_| rng.random_range(0..domain)).collect();
    values.sort_unstable();
    values.dedup();
    values
}

fn to_assignment(query: &[(&'static str, Vec<i64>)]) -> Assignment {
    let mut assigns = Assignment::new();
    for (field, values) in query {
        if !values.is_empty() {
            assigns.insert(field.to_string(), int_values(values.iter().copied()));
        }
    }
    assigns
}

fn check_corpus(
    targets: &HashMap<u32, MockTargeting>,
    index: &dyn BEIndex,
    queries: &[Vec<(&'static str, Vec<i64>)>],
) -> Result<()> {
    for query in queries {
        let mut expected: Vec<u32> = targets
            .values()
            .filter(|target| target.matches(query))
            .map(|target| target.id)
            .collect();
        expected.sort_unstable();

        let got = index.retrieve(&to_assignment(query))?;
        assert_eq!(got, expected, "query {query:?} diverged from brute force");
    }
    Ok(())
}

#[test]
fn test_random_corpus_matches_brute_force() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5EED_0001);
    let mut builder = IndexerBuilder::new();
    let mut targets = HashMap::new();

    for id in 1..3000u32 {
        let target = MockTargeting {
            id,
            fields: vec![
                ("a", rand_values(&mut rng, 4, 10)),
                ("b", rand_values(&mut rng, 3, 5)),
                ("c", rand_values(&mut rng, 2, 2)),
                ("d", rand_values(&mut rng, 3, 6)),
            ],
            excludes: Vec::new(),
        };
        let conj = target.to_conjunction();
        if conj.is_empty() {
            continue;
        }
        builder.add_document(&Document::new(id).with_conjunction(conj))?;
        targets.insert(id, target);
    }
    let index = builder.build_index()?;

    let queries: Vec<_> = (0..300)
        .map(|_| {
            vec![
                ("a", rand_values(&mut rng, 4, 10)),
                ("b", rand_values(&mut rng, 3, 5)),
                ("c", rand_values(&mut rng, 2, 2)),
                ("d", rand_values(&mut rng, 3, 6)),
            ]
        })
        .collect();
    check_corpus(&targets, index.as_ref(), &queries)
}

#[test]
fn test_k2_leapfrog_sweep() -> Result<()> {
    // Single-conjunction K=2 documents over two fields with a wide token
    // domain, so the cursor advance has to leap over long runs.
    let mut rng = StdRng::seed_from_u64(0x5EED_0002);
    let mut builder = IndexerBuilder::new();
    let mut targets = HashMap::new();

    for id in 1..10_000u32 {
        let a = rng.random_range(0..200);
        let b = rng.random_range(0..200);
        let target = MockTargeting {
            id,
            fields: vec![("a", vec![a]), ("b", vec![b])],
            excludes: Vec::new(),
        };
        builder.add_document(&Document::new(id).with_conjunction(target.to_conjunction()))?;
        targets.insert(id, target);
    }
    let index = builder.build_index()?;

    let queries: Vec<_> = (0..200)
        .map(|_| {
            vec![
                ("a", rand_values(&mut rng, 3, 200)),
                ("b", rand_values(&mut rng, 3, 200)),
            ]
        })
        .collect();
    check_corpus(&targets, index.as_ref(), &queries)
}

#[test]
fn test_exclusion_fuzz() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5EED_0003);
    let mut builder = IndexerBuilder::new();
    let mut targets = HashMap::new();

    for id in 1..1000u32 {
        let target = MockTargeting {
            id,
            fields: vec![
                ("a", rand_values(&mut rng, 4, 8)),
                ("b", rand_values(&mut rng, 3, 8)),
            ],
            excludes: vec![
                ("c", rand_values(&mut rng, 3, 6)),
                ("a", rand_values(&mut rng, 2, 8)),
            ],
        };
        let conj = target.to_conjunction();
        if conj.is_empty() {
            continue;
        }
        builder.add_document(&Document::new(id).with_conjunction(conj))?;
        targets.insert(id, target);
    }
    let index = builder.build_index()?;

    let queries: Vec<_> = (0..300)
        .map(|_| {
            vec![
                ("a", rand_values(&mut rng, 4, 8)),
                ("b", rand_values(&mut rng, 3, 8)),
                ("c", rand_values(&mut rng, 3, 6)),
            ]
        })
        .collect();
    check_corpus(&targets, index.as_ref(), &queries)
}
