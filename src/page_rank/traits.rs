use crate::{graph::Node, RankVector};
use rand::Rng;

pub trait PageRank<N: Node> {
    type Result: PageRankResult<N>;

    /// Runs the estimator. Deterministic estimators never touch `rng`.
    fn calc<R: Rng + ?Sized>(&self, rng: &mut R) -> crate::Result<Self::Result>;
}

pub trait PageRankResult<N: Node> {
    fn page_rank(&self) -> &RankVector<N>;
    fn into_page_rank(self) -> RankVector<N>;
    fn debug(&self) -> impl std::fmt::Debug + '_;
}
