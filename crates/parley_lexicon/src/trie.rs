//! Entity index: a persistent character trie over normalized surface values.
//!
//! Every terminal node holds the set of entity types registered for that
//! exact string, so one surface may stay ambiguous until scoring. Nodes live
//! in `im` collections: cloning an index is O(1) and mutations share
//! structure with earlier snapshots.

use std::collections::BTreeSet;
use std::sync::Arc;

use im::{OrdMap, Vector};

/// One association between an indexed surface value and an entity type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Entity type the surface belongs to.
    pub entity_type: Arc<str>,
    /// Canonical value the surface stands for.
    pub canonical: Arc<str>,
    /// Registration sequence number (insertion order tie-break).
    pub seq: u64,
}

/// A fuzzy lookup hit.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzyHit {
    /// The matched association.
    pub entry: IndexEntry,
    /// The indexed key that matched.
    pub key: String,
    /// Character edit distance between the query and `key`.
    pub distance: usize,
}

impl FuzzyHit {
    /// Returns a confidence that decreases with the edit distance.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn confidence(&self, query: &str) -> f64 {
        let longest = query.chars().count().max(self.key.chars().count()).max(1);
        (1.0 - self.distance as f64 / longest as f64).max(0.0)
    }
}

#[derive(Clone, Debug, Default)]
struct TrieNode {
    children: OrdMap<char, TrieNode>,
    entries: Vector<IndexEntry>,
}

impl TrieNode {
    fn is_prunable(&self) -> bool {
        self.children.is_empty() && self.entries.is_empty()
    }

    fn insert(&mut self, key: &[char], entry: IndexEntry) -> bool {
        let Some((first, rest)) = key.split_first() else {
            if let Some(existing) = self
                .entries
                .iter()
                .position(|e| e.entity_type == entry.entity_type)
            {
                // Keep the original sequence number, refresh the canonical value
                let seq = self.entries[existing].seq;
                self.entries[existing] = IndexEntry { seq, ..entry };
                return false;
            }
            self.entries.push_back(entry);
            return true;
        };

        let mut child = self.children.get(first).cloned().unwrap_or_default();
        let added = child.insert(rest, entry);
        self.children.insert(*first, child);
        added
    }

    fn get(&self, key: &[char]) -> Option<&TrieNode> {
        match key.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children.get(first)?.get(rest),
        }
    }

    fn remove(&mut self, key: &[char], entity_type: &str) -> bool {
        let Some((first, rest)) = key.split_first() else {
            let before = self.entries.len();
            self.entries = self
                .entries
                .iter()
                .filter(|e| &*e.entity_type != entity_type)
                .cloned()
                .collect();
            return self.entries.len() != before;
        };

        let Some(mut child) = self.children.get(first).cloned() else {
            return false;
        };
        let removed = child.remove(rest, entity_type);
        if removed {
            if child.is_prunable() {
                self.children.remove(first);
            } else {
                self.children.insert(*first, child);
            }
        }
        removed
    }

    fn remove_type(&mut self, entity_type: &str) -> usize {
        let before = self.entries.len();
        self.entries = self
            .entries
            .iter()
            .filter(|e| &*e.entity_type != entity_type)
            .cloned()
            .collect();
        let mut removed = before - self.entries.len();

        let keys: Vec<char> = self.children.keys().copied().collect();
        for c in keys {
            let Some(mut child) = self.children.get(&c).cloned() else {
                continue;
            };
            let count = child.remove_type(entity_type);
            if count > 0 {
                removed += count;
                if child.is_prunable() {
                    self.children.remove(&c);
                } else {
                    self.children.insert(c, child);
                }
            }
        }
        removed
    }

    fn collect(&self, prefix: &mut String, out: &mut Vec<(String, IndexEntry)>) {
        for entry in &self.entries {
            out.push((prefix.clone(), entry.clone()));
        }
        for (c, child) in &self.children {
            prefix.push(*c);
            child.collect(prefix, out);
            prefix.pop();
        }
    }

    /// Walks the trie carrying one Levenshtein DP row per node.
    fn fuzzy(
        &self,
        query: &[char],
        row: &[usize],
        max_distance: usize,
        path: &mut String,
        out: &mut Vec<FuzzyHit>,
    ) {
        let distance = row[query.len()];
        if distance <= max_distance {
            for entry in &self.entries {
                out.push(FuzzyHit {
                    entry: entry.clone(),
                    key: path.clone(),
                    distance,
                });
            }
        }

        for (c, child) in &self.children {
            let next = next_row(query, row, *c);
            if next.iter().min().is_some_and(|&m| m <= max_distance) {
                path.push(*c);
                child.fuzzy(query, &next, max_distance, path, out);
                path.pop();
            }
        }
    }

    /// Returns true if some node within `max_distance` of `query` has children.
    fn extends(&self, query: &[char], row: &[usize], max_distance: usize) -> bool {
        if row[query.len()] <= max_distance && !self.children.is_empty() {
            return true;
        }
        self.children.iter().any(|(c, child)| {
            let next = next_row(query, row, *c);
            next.iter().min().is_some_and(|&m| m <= max_distance)
                && child.extends(query, &next, max_distance)
        })
    }
}

fn next_row(query: &[char], row: &[usize], c: char) -> Vec<usize> {
    let mut next = Vec::with_capacity(row.len());
    next.push(row[0] + 1);
    for (j, &q) in query.iter().enumerate() {
        let substitute = row[j] + usize::from(q != c);
        let delete = row[j + 1] + 1;
        let insert = next[j] + 1;
        next.push(substitute.min(delete).min(insert));
    }
    next
}

/// Normalizes a surface value into an index key: case-folded, whitespace
/// collapsed to single spaces.
#[must_use]
pub fn normalize_key(surface: &str) -> String {
    surface
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Index of keyword entities for one domain.
#[derive(Clone, Debug, Default)]
pub struct EntityIndex {
    root: TrieNode,
    next_seq: u64,
    len: usize,
}

impl EntityIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of (surface, entity type) associations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Associates `surface` with `entity_type`, standing for `canonical`.
    ///
    /// Returns true if the association is new. Re-inserting an existing
    /// association only refreshes its canonical value.
    pub fn insert(&mut self, surface: &str, entity_type: &str, canonical: &str) -> bool {
        let key: Vec<char> = normalize_key(surface).chars().collect();
        if key.is_empty() || entity_type.is_empty() {
            return false;
        }
        let entry = IndexEntry {
            entity_type: Arc::from(entity_type),
            canonical: Arc::from(canonical),
            seq: self.next_seq,
        };
        let added = self.root.insert(&key, entry);
        if added {
            self.next_seq += 1;
            self.len += 1;
        }
        added
    }

    /// Returns the associations registered for exactly `key`, in insertion order.
    #[must_use]
    pub fn lookup_exact(&self, key: &str) -> Vec<IndexEntry> {
        let key: Vec<char> = normalize_key(key).chars().collect();
        let mut entries: Vec<IndexEntry> = self
            .root
            .get(&key)
            .map(|node| node.entries.iter().cloned().collect())
            .unwrap_or_default();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    /// Returns every association whose key is within `max_distance` edits of
    /// `key`, ordered by ascending distance, then insertion order.
    #[must_use]
    pub fn lookup_fuzzy(&self, key: &str, max_distance: usize) -> Vec<FuzzyHit> {
        let query: Vec<char> = normalize_key(key).chars().collect();
        let row: Vec<usize> = (0..=query.len()).collect();
        let mut out = Vec::new();
        self.root
            .fuzzy(&query, &row, max_distance, &mut String::new(), &mut out);
        out.sort_by_key(|hit| (hit.distance, hit.entry.seq));
        out
    }

    /// Returns true if some indexed key longer than `prefix` starts with a
    /// string within `max_distance` edits of it.
    #[must_use]
    pub fn has_extension(&self, prefix: &str, max_distance: usize) -> bool {
        let query: Vec<char> = prefix.to_lowercase().chars().collect();
        if max_distance == 0 {
            return self
                .root
                .get(&query)
                .is_some_and(|node| !node.children.is_empty());
        }
        let row: Vec<usize> = (0..=query.len()).collect();
        self.root.extends(&query, &row, max_distance)
    }

    /// Removes the association between `surface` and `entity_type`.
    ///
    /// Returns true if it existed.
    pub fn remove(&mut self, surface: &str, entity_type: &str) -> bool {
        let key: Vec<char> = normalize_key(surface).chars().collect();
        let removed = self.root.remove(&key, entity_type);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Removes every association of `entity_type`, returning how many were removed.
    pub fn remove_type(&mut self, entity_type: &str) -> usize {
        let removed = self.root.remove_type(entity_type);
        self.len -= removed;
        removed
    }

    /// Returns the distinct entity types present.
    #[must_use]
    pub fn entity_types(&self) -> BTreeSet<String> {
        self.entries()
            .into_iter()
            .map(|(_, entry)| entry.entity_type.to_string())
            .collect()
    }

    /// Returns every `(key, entry)` pair in registration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, IndexEntry)> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut String::new(), &mut out);
        out.sort_by_key(|(_, entry)| entry.seq);
        out
    }
}
