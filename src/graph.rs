use crate::{Error, Result};
use algograph::graph::*;
use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
    hash::Hash,
    str::FromStr,
};
use tracing::{debug, warn};

/// Anything usable as a node label.
pub trait Node: Clone + Eq + Hash + Display {}
impl<T: Clone + Eq + Hash + Display> Node for T {}

/// What to do with nodes that have no out-edges once all edges are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingPolicy {
    /// Keep the graph as given. Estimators fail when they reach such a node.
    #[default]
    Reject,
    /// Give every such node a single self-loop, making it absorbing.
    SelfLoop,
    /// Remove such nodes and their in-edges until every node has an out-edge.
    Prune,
}

impl Display for DanglingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reject => "reject",
            Self::SelfLoop => "self-loop",
            Self::Prune => "prune",
        };
        f.write_str(s)
    }
}

impl FromStr for DanglingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reject" => Ok(Self::Reject),
            "self-loop" => Ok(Self::SelfLoop),
            "prune" => Ok(Self::Prune),
            _ => Err(Error::invalid(
                "dangling",
                format!("expected one of reject, self-loop, prune; got {s:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Number of known nodes. Target-only nodes are not counted.
    pub nodes: usize,
    /// Sum of out-degrees over known nodes.
    pub edges: usize,
}

/// An immutable directed multigraph of labelled nodes.
///
/// Every label gets a vertex, but only sources (and nodes declared through
/// [`Builder::node`]) are *known*. Known nodes keep the order in which they
/// first showed up.
pub struct LinkGraph<N: Node> {
    graph: directed::TreeBackedGraph,
    ids: HashMap<N, VertexId, ahash::RandomState>,
    labels: HashMap<VertexId, N, ahash::RandomState>,
    known: Vec<VertexId>,
    known_set: HashSet<VertexId, ahash::RandomState>,
}

/// Estimator failure before the offending vertex is translated into its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Dangling(VertexId),
    ZeroOutDegree(VertexId),
}

impl<N: Node> LinkGraph<N> {
    /// Groups `(source, target)` pairs by source, keeping per-source target order.
    ///
    /// The first error yielded by `edges` is returned as is.
    pub fn build<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<(N, N)>>,
    {
        Self::build_with(edges, DanglingPolicy::default())
    }

    pub fn build_with<I>(edges: I, policy: DanglingPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = Result<(N, N)>>,
    {
        let mut builder = Builder::new().dangling(policy);
        for edge in edges {
            let (source, target) = edge?;
            builder.edge(source, target);
        }
        Ok(builder.build())
    }

    pub fn stats(&self) -> Stats {
        let edges = self.known.iter().map(|v| self.out_degree(v)).sum();
        Stats {
            nodes: self.known.len(),
            edges,
        }
    }

    pub fn known_nodes(&self) -> &[VertexId] {
        &self.known
    }

    pub fn is_known(&self, v: &VertexId) -> bool {
        self.known_set.contains(v)
    }

    pub fn vertex(&self, label: &N) -> Option<VertexId> {
        self.ids.get(label).copied()
    }

    pub fn label(&self, v: &VertexId) -> Option<&N> {
        self.labels.get(v)
    }

    /// Out-edge targets of `v`, duplicates included.
    pub fn targets(&self, v: &VertexId) -> Box<dyn Iterator<Item = VertexId> + '_> {
        if self.graph.contains_vertex(v) {
            Box::new(self.graph.out_edges(v).map(|e| e.sink))
        } else {
            Box::new(std::iter::empty())
        }
    }

    pub fn out_degree(&self, v: &VertexId) -> usize {
        self.targets(v).count()
    }

    /// Labels of nodes that only ever appear as targets.
    pub fn dangling(&self) -> impl Iterator<Item = &N> + '_ {
        self.graph
            .iter_vertices()
            .filter(|v| !self.known_set.contains(v))
            .filter_map(|v| self.labels.get(&v))
    }

    /// Out-edge lists of all known nodes, in known-node order.
    pub(crate) fn transitions(&self) -> Vec<(VertexId, Vec<VertexId>)> {
        self.known
            .iter()
            .map(|u| (*u, self.targets(u).collect()))
            .collect()
    }

    pub(crate) fn fault(&self, fault: Fault) -> Error {
        let name = |v: VertexId| match self.labels.get(&v) {
            Some(label) => label.to_string(),
            None => format!("{v:?}"),
        };
        match fault {
            Fault::Dangling(v) => Error::DanglingNode(name(v)),
            Fault::ZeroOutDegree(v) => Error::ZeroOutDegree(name(v)),
        }
    }
}

impl<N: Node> FromIterator<(N, N)> for LinkGraph<N> {
    fn from_iter<I: IntoIterator<Item = (N, N)>>(iter: I) -> Self {
        let mut builder = Builder::new();
        for (source, target) in iter {
            builder.edge(source, target);
        }
        builder.build()
    }
}

pub struct Builder<N: Node> {
    graph: directed::TreeBackedGraph,
    ids: HashMap<N, VertexId, ahash::RandomState>,
    labels: HashMap<VertexId, N, ahash::RandomState>,
    // creation order
    vertices: Vec<VertexId>,
    known: Vec<VertexId>,
    known_set: HashSet<VertexId, ahash::RandomState>,
    policy: DanglingPolicy,
}

impl<N: Node> Default for Builder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> Builder<N> {
    pub fn new() -> Self {
        Self {
            graph: directed::TreeBackedGraph::new(),
            ids: HashMap::with_hasher(ahash::RandomState::new()),
            labels: HashMap::with_hasher(ahash::RandomState::new()),
            vertices: vec![],
            known: vec![],
            known_set: HashSet::with_hasher(ahash::RandomState::new()),
            policy: DanglingPolicy::default(),
        }
    }

    pub fn dangling(mut self, policy: DanglingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Declares `label` as a known node, even if it never gets an out-edge.
    pub fn node(&mut self, label: N) -> VertexId {
        let v = self.vertex(label);
        if self.known_set.insert(v) {
            self.known.push(v);
        }
        v
    }

    pub fn edge(&mut self, source: N, target: N) -> &mut Self {
        let u = self.node(source);
        let v = self.vertex(target);
        self.graph.add_edge(u, v);
        self
    }

    pub fn build(mut self) -> LinkGraph<N> {
        match self.policy {
            DanglingPolicy::Reject => {}
            DanglingPolicy::SelfLoop => self.close_sinks(),
            DanglingPolicy::Prune => self.prune_sinks(),
        }
        let res = LinkGraph {
            graph: self.graph,
            ids: self.ids,
            labels: self.labels,
            known: self.known,
            known_set: self.known_set,
        };
        debug!(
            policy = %self.policy,
            nodes = res.known.len(),
            vertices = res.graph.vertex_size(),
            edges = res.graph.edge_size(),
            "link graph built"
        );
        res
    }

    fn vertex(&mut self, label: N) -> VertexId {
        if let Some(v) = self.ids.get(&label) {
            return *v;
        }
        let v = self.graph.add_vertex();
        self.ids.insert(label.clone(), v);
        self.labels.insert(v, label);
        self.vertices.push(v);
        v
    }

    fn sinks(&self) -> Vec<VertexId> {
        self.vertices
            .iter()
            .copied()
            .filter(|v| self.graph.out_edges(v).next().is_none())
            .collect()
    }

    fn close_sinks(&mut self) {
        let sinks = self.sinks();
        if !sinks.is_empty() {
            warn!(count = sinks.len(), "adding self-loops to nodes without out-edges");
        }
        for v in sinks {
            self.graph.add_edge(v, v);
            if self.known_set.insert(v) {
                self.known.push(v);
            }
        }
    }

    fn prune_sinks(&mut self) {
        let mut pruned = 0;
        loop {
            let sinks = self.sinks();
            if sinks.is_empty() {
                break;
            }
            for v in sinks.iter() {
                let _ = self.graph.remove_vertex(v);
                if let Some(label) = self.labels.remove(v) {
                    self.ids.remove(&label);
                }
                self.known_set.remove(v);
            }
            pruned += sinks.len();
            let gone: HashSet<_, ahash::RandomState> = sinks.into_iter().collect();
            self.vertices.retain(|v| !gone.contains(v));
        }
        let known_set = &self.known_set;
        self.known.retain(|v| known_set.contains(v));
        if pruned > 0 {
            warn!(pruned, "pruned nodes without out-edges");
        }
    }
}
