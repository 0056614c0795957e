use super::*;
use crate::{
    graph::{Fault, LinkGraph, Node},
    Error, RankVector,
};
use algograph::graph::VertexId;
use rand::{prelude::*, rngs::SmallRng};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, debug_span};

type Hits = HashMap<VertexId, u64, ahash::RandomState>;

/// Estimates page ranks by counting where independent random walks end up.
pub struct StochasticPageRank<'a, N>
where
    N: Node,
{
    graph: &'a LinkGraph<N>,
    repeats: usize,
    steps: usize,
    shards: usize,
    known: Vec<VertexId>,
    transitions: HashMap<VertexId, Vec<VertexId>, ahash::RandomState>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of walks. Must be positive.
    pub repeats: usize,
    /// Transitions per walk.
    pub steps: usize,
    /// Number of independently seeded workers the walks are split across.
    pub shards: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repeats: 1_000_000,
            steps: 100,
            shards: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Result<N: Node> {
    pub page_rank: RankVector<N>,
    /// Number of walks that ended on each known node.
    pub hits: HashMap<N, u64, ahash::RandomState>,
    pub repeats: usize,
    pub steps: usize,
}

impl<'a, N: Node> StochasticPageRank<'a, N> {
    pub fn new(g: &'a LinkGraph<N>, config: &Config) -> crate::Result<Self> {
        if config.repeats == 0 {
            return Err(Error::invalid("repeats", "must be positive"));
        }
        if config.shards == 0 {
            return Err(Error::invalid("shards", "must be positive"));
        }
        if g.known_nodes().is_empty() {
            return Err(Error::invalid("graph", "no known node to start a walk from"));
        }
        Ok(Self {
            graph: g,
            repeats: config.repeats,
            steps: config.steps,
            shards: config.shards,
            known: g.known_nodes().to_vec(),
            transitions: g.transitions().into_iter().collect(),
        })
    }

    fn walker(&self) -> Walker<'_> {
        Walker {
            known: &self.known,
            transitions: &self.transitions,
            steps: self.steps,
        }
    }
}

impl<N: Node> PageRank<N> for StochasticPageRank<'_, N> {
    type Result = self::Result<N>;

    fn calc<R: Rng + ?Sized>(&self, rng: &mut R) -> crate::Result<Self::Result> {
        let _span = debug_span!(
            "stochastic_page_rank",
            repeats = self.repeats,
            steps = self.steps,
            shards = self.shards
        )
        .entered();
        let walker = self.walker();
        let hits = if self.shards == 1 {
            walker.run(self.repeats, rng)
        } else {
            // seeds are drawn up front so a seeded caller gets reproducible shards
            let jobs: Vec<(u64, usize)> = shard_sizes(self.repeats, self.shards)
                .map(|n| (rng.next_u64(), n))
                .collect();
            jobs.into_par_iter()
                .map(|(seed, n)| walker.run(n, &mut SmallRng::seed_from_u64(seed)))
                .collect::<std::result::Result<Vec<_>, Fault>>()
                .map(|parts| parts.into_iter().fold(Hits::default(), merge))
        }
        .map_err(|fault| self.graph.fault(fault))?;

        let r = self.repeats as f64;
        let p: HashMap<_, _, ahash::RandomState> =
            hits.iter().map(|(v, n)| (*v, *n as f64 / r)).collect();
        let page_rank = RankVector::from_vertices(self.graph, &p);
        let hits = self
            .known
            .iter()
            .filter_map(|v| {
                let label = self.graph.label(v)?;
                Some((label.clone(), hits.get(v).copied().unwrap_or(0)))
            })
            .collect();
        debug!(nodes = page_rank.len(), "random walks finished");
        Ok(Self::Result {
            page_rank,
            hits,
            repeats: self.repeats,
            steps: self.steps,
        })
    }
}

/// The part of the estimator that worker threads share.
struct Walker<'t> {
    known: &'t [VertexId],
    transitions: &'t HashMap<VertexId, Vec<VertexId>, ahash::RandomState>,
    steps: usize,
}

impl Walker<'_> {
    fn run<R>(&self, repeats: usize, rng: &mut R) -> std::result::Result<Hits, Fault>
    where
        R: Rng + ?Sized,
    {
        (0..repeats).try_fold(Hits::default(), |mut hits, _| {
            let Some(&start) = self.known.choose(rng) else {
                return Ok(hits);
            };
            let end = self.walk(start, rng)?;
            *hits.entry(end).or_insert(0) += 1;
            Ok(hits)
        })
    }

    fn walk<R>(&self, start: VertexId, rng: &mut R) -> std::result::Result<VertexId, Fault>
    where
        R: Rng + ?Sized,
    {
        (0..self.steps).try_fold(start, |u, _| {
            let targets = self.transitions.get(&u).ok_or(Fault::Dangling(u))?;
            let v = *targets.choose(rng).ok_or(Fault::ZeroOutDegree(u))?;
            if self.transitions.contains_key(&v) {
                Ok(v)
            } else {
                Err(Fault::Dangling(v))
            }
        })
    }
}

fn shard_sizes(repeats: usize, shards: usize) -> impl Iterator<Item = usize> {
    let base = repeats / shards;
    let extra = repeats % shards;
    (0..shards).map(move |i| base + usize::from(i < extra))
}

fn merge(mut acc: Hits, part: Hits) -> Hits {
    for (v, n) in part {
        *acc.entry(v).or_insert(0) += n;
    }
    acc
}

impl<N: Node> PageRankResult<N> for self::Result<N> {
    fn page_rank(&self) -> &RankVector<N> {
        &self.page_rank
    }

    fn into_page_rank(self) -> RankVector<N> {
        self.page_rank
    }

    fn debug(&self) -> impl std::fmt::Debug + '_ {
        ResultDebug { result: self }
    }
}

pub struct ResultDebug<'a, N: Node> {
    result: &'a self::Result<N>,
}

impl<N: Node> std::fmt::Debug for ResultDebug<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (v, p) in self.result.page_rank.iter() {
            let hits = self.result.hits.get(v).copied().unwrap_or(0);
            writeln!(f, "{v}: {p:?}, {hits}")?;
        }
        Ok(())
    }
}
