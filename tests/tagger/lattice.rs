//! Integration tests for entity tagging

use parley_foundation::{EngineConfig, EnglishTokenizer, TagSource, Tokenizer};
use parley_lexicon::{EntityIndex, RegexRegistry};
use parley_tagger::{EntityTagger, Lattice};

fn house_index() -> EntityIndex {
    let mut index = EntityIndex::new();
    index.insert("tree", "Entity1", "tree");
    index.insert("house", "Entity2", "house");
    index.insert("tree house", "Building", "tree house");
    index
}

fn tag(config: &EngineConfig, text: &str, index: &EntityIndex, regexes: &RegexRegistry) -> Lattice {
    let utterance = EnglishTokenizer.utterance(text);
    EntityTagger::new(config).tag(&utterance, index, regexes)
}

fn spans(lattice: &Lattice) -> Vec<(&str, usize, usize)> {
    lattice
        .tags()
        .iter()
        .map(|t| (&*t.entity_type, t.start, t.end))
        .collect()
}

// =============================================================================
// Keyword Candidates
// =============================================================================

#[test]
fn overlapping_keywords_are_all_kept() {
    let lattice = tag(
        &EngineConfig::exact(),
        "go to the tree house",
        &house_index(),
        &RegexRegistry::new(),
    );
    assert_eq!(lattice.token_count(), 5);
    assert_eq!(
        spans(&lattice),
        vec![("Building", 3, 5), ("Entity1", 3, 4), ("Entity2", 4, 5)]
    );
}

#[test]
fn canonical_value_comes_from_index() {
    let mut index = EntityIndex::new();
    index.insert("big apple", "City", "new york");
    let lattice = tag(&EngineConfig::exact(), "fly to the Big Apple", &index, &RegexRegistry::new());
    let tag = &lattice.tags()[0];
    assert_eq!(tag.surface, "Big Apple");
    assert_eq!(tag.canonical, "new york");
    assert_eq!((tag.char_start, tag.char_end), (11, 20));
}

#[test]
fn window_limits_entity_length() {
    let config = EngineConfig::exact().with_max_window(1);
    let lattice = tag(&config, "go to the tree house", &house_index(), &RegexRegistry::new());
    assert!(!lattice.contains_type("Building"));
    assert!(lattice.contains_type("Entity1"));
    assert!(lattice.contains_type("Entity2"));
}

#[test]
fn empty_utterance_gives_empty_lattice() {
    let lattice = tag(&EngineConfig::default(), "   ", &house_index(), &RegexRegistry::new());
    assert!(lattice.is_empty());
    assert_eq!(lattice.token_count(), 0);
}

// =============================================================================
// Fuzzy Candidates
// =============================================================================

#[test]
fn misspelling_matches_with_reduced_confidence() {
    let lattice = tag(
        &EngineConfig::default(),
        "go to the tree hose",
        &house_index(),
        &RegexRegistry::new(),
    );
    let entity2 = lattice
        .tags()
        .iter()
        .find(|t| &*t.entity_type == "Entity2")
        .unwrap();
    assert_eq!(entity2.source, TagSource::Fuzzy { distance: 1 });
    assert_eq!(entity2.canonical, "house");
    assert!((entity2.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn exact_config_ignores_misspellings() {
    let lattice = tag(
        &EngineConfig::exact(),
        "go to the tree hose",
        &house_index(),
        &RegexRegistry::new(),
    );
    assert_eq!(spans(&lattice), vec![("Entity1", 3, 4)]);
}

#[test]
fn short_words_are_never_fuzzy() {
    let mut index = EntityIndex::new();
    index.insert("cat", "Animal", "cat");
    let lattice = tag(&EngineConfig::default(), "the bat", &index, &RegexRegistry::new());
    assert!(lattice.is_empty());
}

// =============================================================================
// Regex Candidates
// =============================================================================

#[test]
fn regex_tags_join_keyword_tags() {
    let mut regexes = RegexRegistry::new();
    regexes.register(r"at (?P<Time>\d+ ?pm)").unwrap();
    let config = EngineConfig::exact().with_regex_confidence(0.75);
    let lattice = tag(&config, "tree house at 5 pm", &house_index(), &regexes);

    let time = lattice
        .tags()
        .iter()
        .find(|t| &*t.entity_type == "Time")
        .unwrap();
    assert_eq!((time.start, time.end), (3, 5));
    assert!((time.confidence - 0.75).abs() < 1e-9);
    assert!(lattice.contains_type("Building"));
}
