use crate::graph::LinkGraph;

/// `A -> {B, C}`, `B -> C`, `C -> A`. Irreducible and aperiodic, with the
/// stationary distribution `{A: 0.4, B: 0.2, C: 0.4}`.
pub fn triangle() -> LinkGraph<&'static str> {
    [("A", "B"), ("A", "C"), ("B", "C"), ("C", "A")]
        .into_iter()
        .collect()
}

pub const TRIANGLE_STATIONARY: [(&str, f64); 3] = [("A", 0.4), ("B", 0.2), ("C", 0.4)];

/// A graph whose nodes all have at least one out-edge.
#[derive(Debug, Clone)]
pub struct RandomGraph {
    pub edges: Vec<(u32, u32)>,
}

impl RandomGraph {
    pub fn graph(&self) -> LinkGraph<u32> {
        self.edges.iter().copied().collect()
    }
}

impl quickcheck::Arbitrary for RandomGraph {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        const N: u32 = 10;
        const MAX_DEGREE: usize = 3;

        let n = u32::arbitrary(g) % N + 1;
        let mut edges = vec![];
        for u in 0..n {
            let d = usize::arbitrary(g) % MAX_DEGREE + 1;
            for _ in 0..d {
                edges.push((u, u32::arbitrary(g) % n));
            }
        }
        Self { edges }
    }
}
