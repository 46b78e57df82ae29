pub mod contraction;
pub mod error;
pub mod gap;
pub mod graph;
pub mod karger;
pub mod parse;
pub mod parser_combinators;

pub use error::{Error, Result};
pub use graph::{Graph, GraphBuilder, VertexId};
pub use karger::{Config, KargerStein, Partition, Search};
pub use parse::parse_graph;

/// Parses a wiring diagram, cuts `target_cut_size` wires and multiplies the
/// sizes of the two resulting groups.
pub fn solve(input: &str, target_cut_size: usize, config: Config) -> Result<usize> {
    let graph = parse_graph(input)?;
    let partition = KargerStein::new(&graph, config).compute_min_cut(target_cut_size)?;
    Ok(partition.product())
}
