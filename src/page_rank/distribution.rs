use super::*;
use crate::{
    graph::{Fault, LinkGraph, Node},
    norm_1, Error, RankVector,
};
use algograph::graph::VertexId;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, debug_span, trace};

type Mass = HashMap<VertexId, f64, ahash::RandomState>;

/// Power iteration of the uniform random walk, starting from the uniform
/// distribution over known nodes. There is no damping term.
pub struct DistributionPageRank<'a, N>
where
    N: Node,
{
    graph: &'a LinkGraph<N>,
    steps: usize,
    epsilon: Option<f64>,
    transitions: Vec<(VertexId, Vec<VertexId>)>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of propagation steps.
    pub steps: usize,
    /// Stop as soon as one step moves less than this much mass (L1).
    pub epsilon: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            steps: 100,
            epsilon: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Result<N: Node> {
    pub page_rank: RankVector<N>,
    /// Change made to each node by the last step.
    pub delta: HashMap<N, f64, ahash::RandomState>,
    pub iterations: usize,
}

impl<'a, N: Node> DistributionPageRank<'a, N> {
    pub fn new(g: &'a LinkGraph<N>, config: &Config) -> crate::Result<Self> {
        if let Some(epsilon) = config.epsilon {
            if epsilon.is_nan() || epsilon <= 0.0 {
                return Err(Error::invalid(
                    "epsilon",
                    format!("must be positive, got {epsilon}"),
                ));
            }
        }
        Ok(Self {
            graph: g,
            steps: config.steps,
            epsilon: config.epsilon,
            transitions: g.transitions(),
        })
    }

    fn uniform(&self) -> Mass {
        let n = self.transitions.len() as f64;
        self.transitions.iter().map(|(u, _)| (*u, 1.0 / n)).collect()
    }

    /// One propagation step. Known nodes and their targets are visited in a
    /// fixed order, so the result is reproducible bit for bit.
    fn step(&self, p: &Mass) -> std::result::Result<Mass, Fault> {
        let mut next: Mass = self.transitions.iter().map(|(u, _)| (*u, 0.0)).collect();
        for (u, targets) in self.transitions.iter() {
            if targets.is_empty() {
                return Err(Fault::ZeroOutDegree(*u));
            }
            let share = p.get(u).copied().unwrap_or(0.0) / targets.len() as f64;
            for v in targets.iter() {
                let to = next.get_mut(v).ok_or(Fault::Dangling(*v))?;
                *to += share;
            }
        }
        Ok(next)
    }
}

impl<N: Node> PageRank<N> for DistributionPageRank<'_, N> {
    type Result = self::Result<N>;

    fn calc<R: Rng + ?Sized>(&self, _rng: &mut R) -> crate::Result<Self::Result> {
        let _span = debug_span!("distribution_page_rank", steps = self.steps).entered();
        let mut p = self.uniform();
        let mut delta = Mass::default();
        let mut iterations = 0;
        while iterations < self.steps {
            let r = self.step(&p).map_err(|fault| self.graph.fault(fault))?;
            delta = r
                .iter()
                .map(|(v, b)| (*v, p.get(v).copied().unwrap_or(0.0) - b))
                .collect();
            p = r;
            iterations += 1;

            let moved = norm_1(&delta);
            trace!(iterations, moved, "propagated");
            if self.epsilon.is_some_and(|epsilon| moved < epsilon) {
                debug!(iterations, moved, "converged before the step limit");
                break;
            }
        }

        let page_rank = RankVector::from_vertices(self.graph, &p);
        let delta = delta
            .iter()
            .filter_map(|(v, d)| Some((self.graph.label(v)?.clone(), *d)))
            .collect();
        Ok(Self::Result {
            page_rank,
            delta,
            iterations,
        })
    }
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
            let d = self.result.delta.get(v).copied().unwrap_or(0.0);
            writeln!(f, "{v}: {p:?}, {d:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::Builder, page_rank::testing::*};
    use quickcheck_macros::quickcheck;
    use rand::{rngs::SmallRng, SeedableRng};

    fn calc<N: Node>(g: &LinkGraph<N>, steps: usize) -> crate::Result<self::Result<N>> {
        let cfg = Config {
            steps,
            epsilon: None,
        };
        let mut rng = SmallRng::seed_from_u64(3407);
        DistributionPageRank::new(g, &cfg)?.calc(&mut rng)
    }

    #[test]
    fn zero_steps_is_uniform() {
        let g = triangle();
        let res = calc(&g, 0).unwrap();
        assert_eq!(res.iterations, 0);
        for (_, p) in res.page_rank.iter() {
            assert_eq!(p, 1.0 / 3.0);
        }
    }

    #[test]
    fn two_cycle() {
        let g: LinkGraph<_> = [("A", "B"), ("B", "A")].into_iter().collect();
        for steps in 1..10 {
            let res = calc(&g, steps).unwrap();
            assert_eq!(res.page_rank.get(&"A"), Some(0.5));
            assert_eq!(res.page_rank.get(&"B"), Some(0.5));
        }
    }

    #[test]
    fn duplicate_targets_get_separate_shares() {
        let g: LinkGraph<_> = [("A", "B"), ("A", "B"), ("A", "C"), ("B", "A"), ("C", "A")]
            .into_iter()
            .collect();
        let res = calc(&g, 1).unwrap();
        let expect = [("A", 2.0 / 3.0), ("B", 2.0 / 9.0), ("C", 1.0 / 9.0)];
        for (node, q) in expect {
            let p = res.page_rank.get(&node).unwrap();
            assert!((p - q).abs() < 1e-12, "{:?}", res.debug());
        }
    }

    #[test]
    fn converges_to_stationary() {
        let g = triangle();
        let res = calc(&g, 200).unwrap();
        for (node, oracle) in TRIANGLE_STATIONARY {
            let p = res.page_rank.get(&node).unwrap();
            assert!((p - oracle).abs() < 1e-9, "{:?}", res.debug());
        }
    }

    #[test]
    fn epsilon_stops_early() {
        let g = triangle();
        let cfg = Config {
            steps: 10_000,
            epsilon: Some(1e-6),
        };
        let mut rng = SmallRng::seed_from_u64(3407);
        let res = DistributionPageRank::new(&g, &cfg)
            .unwrap()
            .calc(&mut rng)
            .unwrap();
        assert!(res.iterations < 10_000, "{}", res.iterations);
        let moved: f64 = res.delta.values().map(|d| d.abs()).sum();
        assert!(moved < 1e-6, "{moved}");
        for (node, oracle) in TRIANGLE_STATIONARY {
            let p = res.page_rank.get(&node).unwrap();
            assert!((p - oracle).abs() < 1e-5, "{:?}", res.debug());
        }
    }

    #[test]
    fn non_positive_epsilon() {
        let g = triangle();
        for epsilon in [0.0, -1.0, f64::NAN] {
            let cfg = Config {
                steps: 10,
                epsilon: Some(epsilon),
            };
            assert!(matches!(
                DistributionPageRank::new(&g, &cfg),
                Err(Error::InvalidArgument {
                    name: "epsilon",
                    ..
                })
            ));
        }
    }

    #[test]
    fn zero_out_degree_fails() {
        let mut builder = Builder::new();
        builder.edge("A", "X");
        builder.node("X");
        let g = builder.build();
        match calc(&g, 1) {
            Err(Error::ZeroOutDegree(node)) => assert_eq!(node, "X"),
            other => panic!("{:?}", other.map(|r| r.page_rank)),
        }
        assert!(calc(&g, 0).is_ok());
    }

    #[test]
    fn dangling_target_fails() {
        let g: LinkGraph<_> = [("A", "B"), ("A", "C"), ("B", "C")].into_iter().collect();
        match calc(&g, 1) {
            Err(Error::DanglingNode(node)) => assert_eq!(node, "C"),
            other => panic!("{:?}", other.map(|r| r.page_rank)),
        }
        let res = calc(&g, 0).unwrap();
        assert_eq!(res.page_rank.get(&"A"), Some(0.5));
        assert_eq!(res.page_rank.get(&"C"), None);
    }

    #[test]
    fn empty_graph() {
        let g: LinkGraph<&str> = std::iter::empty().collect();
        let res = calc(&g, 10).unwrap();
        assert!(res.page_rank.is_empty());
    }

    #[quickcheck]
    fn sums_to_one(g: RandomGraph, steps: u8) {
        let g = g.graph();
        let res = calc(&g, steps as usize % 50).unwrap();
        assert!((res.page_rank.total() - 1.0).abs() < 1e-9, "{:?}", res.debug());
        assert!(res.page_rank.iter().all(|(_, p)| p >= 0.0));
    }

    #[quickcheck]
    fn deterministic(g: RandomGraph, steps: u8) {
        let g = g.graph();
        let steps = steps as usize % 50;
        let bits = |r: self::Result<u32>| -> Vec<(u32, u64)> {
            r.page_rank.iter().map(|(v, p)| (*v, p.to_bits())).collect()
        };
        let a = bits(calc(&g, steps).unwrap());
        let b = bits(calc(&g, steps).unwrap());
        assert_eq!(a, b);
    }
}
