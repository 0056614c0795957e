mod traits;
pub use self::traits::*;
pub mod distribution;
pub use self::distribution::DistributionPageRank;
pub mod stochastic;
pub use self::stochastic::StochasticPageRank;

#[cfg(test)]
mod testing;

use crate::{
    graph::{LinkGraph, Node},
    Error, RankVector,
};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Stochastic,
    Distribution,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stochastic => f.write_str("stochastic"),
            Self::Distribution => f.write_str("distribution"),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "stochastic" => Ok(Self::Stochastic),
            "distribution" => Ok(Self::Distribution),
            _ => Err(Error::invalid(
                "method",
                format!("expected stochastic or distribution, got {s:?}"),
            )),
        }
    }
}

/// Which estimator to run, and with what parameters.
///
/// `repeats` and `shards` only matter to [`Method::Stochastic`], `epsilon`
/// only to [`Method::Distribution`].
#[derive(Debug, Clone)]
pub struct Config {
    pub method: Method,
    pub repeats: usize,
    pub steps: usize,
    pub shards: usize,
    pub epsilon: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        let walk = stochastic::Config::default();
        Self {
            method: Method::default(),
            repeats: walk.repeats,
            steps: walk.steps,
            shards: walk.shards,
            epsilon: None,
        }
    }
}

/// Runs the estimator selected by `config` against `graph`.
pub fn estimate<N, R>(
    graph: &LinkGraph<N>,
    config: &Config,
    rng: &mut R,
) -> crate::Result<RankVector<N>>
where
    N: Node,
    R: rand::Rng + ?Sized,
{
    match config.method {
        Method::Stochastic => {
            let cfg = stochastic::Config {
                repeats: config.repeats,
                steps: config.steps,
                shards: config.shards,
            };
            let res = StochasticPageRank::new(graph, &cfg)?.calc(rng)?;
            Ok(res.into_page_rank())
        }
        Method::Distribution => {
            let cfg = distribution::Config {
                steps: config.steps,
                epsilon: config.epsilon,
            };
            let res = DistributionPageRank::new(graph, &cfg)?.calc(rng)?;
            Ok(res.into_page_rank())
        }
    }
}
