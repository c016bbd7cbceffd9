//! Integration tests for the tagging resolver

use std::sync::Arc;

use parley_foundation::{EntityTag, TagSource};
use parley_tagger::{Lattice, Tagging, TaggingResolver};
use proptest::prelude::*;

fn tag(entity_type: &str, start: usize, end: usize, confidence: f64) -> EntityTag {
    EntityTag {
        entity_type: Arc::from(entity_type),
        surface: entity_type.to_lowercase(),
        canonical: entity_type.to_lowercase(),
        confidence,
        start,
        end,
        char_start: start * 5,
        char_end: end * 5,
        source: TagSource::Keyword,
    }
}

fn types(tagging: &Tagging) -> Vec<&str> {
    tagging.tags().iter().map(|t| &*t.entity_type).collect()
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn longer_entity_wins_a_tie() {
    // "go to the tree house"
    let lattice = Lattice::new(
        vec![
            tag("Entity1", 3, 4, 1.0),
            tag("Entity2", 4, 5, 1.0),
            tag("Building", 3, 5, 1.0),
        ],
        5,
    );
    let taggings: Vec<Tagging> = TaggingResolver::new(lattice).collect();
    assert_eq!(taggings.len(), 2);
    assert_eq!(types(&taggings[0]), vec!["Building"]);
    assert_eq!(types(&taggings[1]), vec!["Entity1", "Entity2"]);
    assert!((taggings[0].score() - 0.4).abs() < 1e-9);
}

#[test]
fn confidence_beats_length() {
    let lattice = Lattice::new(
        vec![
            tag("Weak", 0, 2, 0.3),
            tag("A", 0, 1, 1.0),
            tag("B", 1, 2, 1.0),
        ],
        2,
    );
    let taggings: Vec<Tagging> = TaggingResolver::new(lattice).collect();
    assert_eq!(types(&taggings[0]), vec!["A", "B"]);
    assert_eq!(types(&taggings[1]), vec!["Weak"]);
}

#[test]
fn ambiguous_surface_yields_one_tagging_per_type() {
    let lattice = Lattice::new(
        vec![tag("Color", 0, 1, 1.0), tag("Fruit", 0, 1, 1.0)],
        1,
    );
    let taggings: Vec<Tagging> = TaggingResolver::new(lattice).collect();
    assert_eq!(taggings.len(), 2);
    assert_eq!(types(&taggings[0]), vec!["Color"]);
    assert_eq!(types(&taggings[1]), vec!["Fruit"]);
}

#[test]
fn produced_counts_taggings() {
    let lattice = Lattice::new(vec![tag("A", 0, 1, 1.0), tag("B", 0, 1, 0.5)], 1);
    let mut resolver = TaggingResolver::new(lattice);
    assert_eq!(resolver.produced(), 0);
    resolver.next();
    assert_eq!(resolver.produced(), 1);
    assert_eq!(resolver.by_ref().count(), 1);
    assert_eq!(resolver.produced(), 2);
}

#[test]
fn of_type_filters_tags() {
    let lattice = Lattice::new(vec![tag("A", 0, 1, 1.0), tag("B", 1, 2, 1.0)], 2);
    let tagging = TaggingResolver::new(lattice).next().unwrap();
    assert_eq!(tagging.of_type("B").count(), 1);
    assert_eq!(tagging.of_type("C").count(), 0);
}

// =============================================================================
// Properties
// =============================================================================

fn lattices() -> impl Strategy<Value = Lattice> {
    (1usize..7).prop_flat_map(|n| {
        let tags = prop::collection::vec(
            (0..n, 1usize..4, 0usize..3, 1u32..=10).prop_map(move |(start, len, ty, conf)| {
                let end = (start + len).min(n);
                let name = ["A", "B", "C"][ty];
                tag(name, start, end, f64::from(conf) / 10.0)
            }),
            0..8,
        );
        tags.prop_map(move |tags| Lattice::new(tags, n))
    })
}

proptest! {
    #[test]
    fn taggings_are_disjoint_and_maximal(lattice in lattices()) {
        let all = lattice.tags().to_vec();
        for tagging in TaggingResolver::new(lattice).take(50) {
            let chosen = tagging.tags();
            for (i, a) in chosen.iter().enumerate() {
                for b in &chosen[i + 1..] {
                    prop_assert!(!a.overlaps(b));
                }
            }
            for candidate in &all {
                let picked = chosen.iter().any(|c| c == candidate);
                prop_assert!(picked || chosen.iter().any(|c| c.overlaps(candidate)));
            }
        }
    }

    #[test]
    fn scores_stay_under_the_bound(lattice in lattices()) {
        let mut resolver = TaggingResolver::new(lattice);
        for _ in 0..50 {
            let Some(bound) = resolver.upper_bound() else {
                break;
            };
            let Some(tagging) = resolver.next() else {
                break;
            };
            prop_assert!(tagging.score() <= bound + 1e-9);
            prop_assert!((0.0..=1.0).contains(&tagging.score()));
        }
    }
}
