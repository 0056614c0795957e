//! Text edge lists: one `source target` pair per line.

use crate::{
    graph::{DanglingPolicy, LinkGraph},
    Error, Result,
};
use std::io::BufRead;

/// Splits `line` into exactly two whitespace-separated tokens.
///
/// `lineno` is 1-based and only used for error reporting. Blank lines are
/// malformed too.
pub fn parse_line(line: &str, lineno: usize) -> Result<(String, String)> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(source), Some(target), None) => Ok((source.to_string(), target.to_string())),
        _ => Err(Error::Parse {
            line: lineno,
            found: line.split_whitespace().count(),
        }),
    }
}

pub fn read_edges<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(String, String)>> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| parse_line(&line?, i + 1))
}

pub fn load<R: BufRead>(reader: R, policy: DanglingPolicy) -> Result<LinkGraph<String>> {
    LinkGraph::build_with(read_edges(reader), policy)
}
