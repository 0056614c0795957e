use crate::{
    graph::{Node, Stats},
    RankVector,
};
use std::fmt;

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of Nodes: {}", self.nodes)?;
        write!(f, "Number of edges: {}", self.edges)
    }
}

/// The `n` best ranked nodes. Ties keep known-node order.
pub fn top<N: Node>(rank: &RankVector<N>, n: usize) -> Top<'_, N> {
    let mut entries = rank.ranked();
    entries.truncate(n);
    Top { entries }
}

/// Renders one `percent<TAB>node` line per entry.
pub struct Top<'a, N: Node> {
    entries: Vec<(&'a N, f64)>,
}

impl<'a, N: Node> Top<'a, N> {
    pub fn entries(&self) -> &[(&'a N, f64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Node> fmt::Display for Top<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (node, score)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:.2}\t{}", 100.0 * score, node)?;
        }
        Ok(())
    }
}
