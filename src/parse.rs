use crate::{
    error::{Error, Result},
    graph::{Graph, GraphBuilder},
    parser_combinators::{eof, many0, map, preceded, regex, seq, tag, terminated, Parser},
};

fn vertex<'i>() -> impl Parser<&'i str, Output = &'i str> {
    regex(r"^[a-z]+")
}

/// `jqt: rhn xhk nvd`
pub fn declaration<'i>() -> impl Parser<&'i str, Output = (&'i str, Vec<&'i str>)> {
    map(
        seq((
            terminated(vertex(), seq((tag(":"), regex(r"^ *")))),
            vertex(),
            many0(preceded(regex(r"^ +"), vertex())),
            seq((regex(r"^ *"), eof)),
        )),
        |(source, first, mut rest, _)| {
            rest.insert(0, first);
            (source, rest)
        },
    )
}

/// Reads one declaration per line into a [`Graph`].
///
/// Blank lines are skipped; line numbers in errors count them anyway.
pub fn parse_graph(input: &str) -> Result<Graph> {
    let mut declaration = declaration();
    let mut builder = GraphBuilder::new();

    for (i, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let Some((_, (source, neighbors))) = declaration.parse(line) else {
            return Err(Error::Parse {
                line_number: i + 1,
                line: line.to_string(),
            });
        };

        builder
            .declare(source, neighbors)
            .map_err(|err| match err {
                Error::SelfLoop { vertex, .. } => Error::SelfLoop {
                    line_number: i + 1,
                    vertex,
                },
                err => err,
            })?;
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations() {
        let mut p = declaration();
        assert_eq!(p.parse("jqt: rhn xhk nvd"), Some(("", ("jqt", vec!["rhn", "xhk", "nvd"]))));
        assert_eq!(p.parse("a:b  c "), Some(("", ("a", vec!["b", "c"]))));
        assert_eq!(p.parse("a: "), None);
        assert_eq!(p.parse("a b"), None);
        assert_eq!(p.parse("A: b"), None);
        assert_eq!(p.parse(" a: b"), None);
        assert_eq!(p.parse("a: b2"), None);
    }

    #[test]
    fn implicit_vertices() {
        let graph = parse_graph("a: b c\nb: c\n").unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.vertex_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn reports_offending_line() {
        let err = parse_graph("a: b\n\nc d\n").unwrap_err();
        match err {
            Error::Parse { line_number, line } => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "c d");
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn rejects_self_loop_before_any_search() {
        let err = parse_graph("b: c\n\na: a").unwrap_err();
        assert!(matches!(
            err,
            Error::SelfLoop { line_number: 3, ref vertex } if vertex == "a"
        ));
    }

    #[test]
    fn empty_input() {
        let graph = parse_graph("\n\n").unwrap();
        assert_eq!(graph.num_vertices(), 0);
    }
}
