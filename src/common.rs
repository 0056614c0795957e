use crate::graph::{LinkGraph, Node};
use algograph::graph::VertexId;
use std::{cmp::Ordering, collections::HashMap, hash::Hash};

pub fn norm_1<K: Hash>(v: &HashMap<K, f64, ahash::RandomState>) -> f64 {
    v.values().map(|x| x.abs()).sum()
}

/// `‖a - b‖₁` over the union of keys. Missing entries count as zero.
pub fn l1_distance<K: Hash + Eq>(
    a: &HashMap<K, f64, ahash::RandomState>,
    b: &HashMap<K, f64, ahash::RandomState>,
) -> f64 {
    let from_a: f64 = a
        .iter()
        .map(|(k, x)| (x - b.get(k).copied().unwrap_or(0.0)).abs())
        .sum();
    let only_b: f64 = b
        .iter()
        .filter(|(k, _)| !a.contains_key(*k))
        .map(|(_, x)| x.abs())
        .sum();
    from_a + only_b
}

/// Scores of known nodes, iterated in known-node order.
#[derive(Debug, Clone)]
pub struct RankVector<N: Node> {
    order: Vec<N>,
    scores: HashMap<N, f64, ahash::RandomState>,
}

impl<N: Node> RankVector<N> {
    pub(crate) fn from_vertices(
        graph: &LinkGraph<N>,
        p: &HashMap<VertexId, f64, ahash::RandomState>,
    ) -> Self {
        let mut order = Vec::with_capacity(graph.known_nodes().len());
        let mut scores = HashMap::with_hasher(ahash::RandomState::new());
        for v in graph.known_nodes() {
            let Some(label) = graph.label(v) else {
                continue;
            };
            order.push(label.clone());
            scores.insert(label.clone(), p.get(v).copied().unwrap_or(0.0));
        }
        Self { order, scores }
    }

    pub fn get(&self, node: &N) -> Option<f64> {
        self.scores.get(node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&N, f64)> + '_ {
        self.order
            .iter()
            .map(|n| (n, self.scores.get(n).copied().unwrap_or(0.0)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, x)| x).sum()
    }

    pub fn l1_distance(&self, other: &Self) -> f64 {
        l1_distance(&self.scores, &other.scores)
    }

    /// Entries by descending score. Ties keep known-node order.
    pub fn ranked(&self) -> Vec<(&N, f64)> {
        let mut res: Vec<_> = self.iter().collect();
        res.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        res
    }

    pub fn as_map(&self) -> &HashMap<N, f64, ahash::RandomState> {
        &self.scores
    }
}
