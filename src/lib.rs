mod error;
pub use self::error::{Error, Result};
mod common;
pub use self::common::*;
pub mod graph;
pub use self::graph::{Builder, DanglingPolicy, LinkGraph, Node, Stats};
pub mod loader;
pub mod report;

pub mod page_rank;
pub use self::page_rank::{estimate, Method};
