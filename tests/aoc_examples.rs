use std::{collections::BTreeSet, time::Duration};

use snowverload::{parse_graph, solve, Config, Error, Graph, KargerStein};

const EXAMPLE: &str = "
jqt: rhn xhk nvd
rsh: frs pzl lsr
xhk: hfx
cmg: qnr nvd lhk bvb
rhn: xhk bvb hfx
bvb: xhk hfx
pzl: lsr hfx nvd
qnr: nvd
ntq: jqt hfx bvb xhk
nvd: lhk
lsr: lhk
rzs: qnr cmg lsr rsh
frs: qnr lhk lsr";

/// Every bipartition (vertex 0 always on the first side) with its crossing
/// edge count. Only usable on small graphs.
fn all_cuts(graph: &Graph) -> Vec<(u32, usize)> {
    let n = graph.num_vertices();
    assert!(n <= 20);

    (1..1u32 << (n - 1))
        .map(|bits| bits << 1)
        .map(|mask| {
            let crossing = graph
                .edges()
                .iter()
                .filter(|&&(a, b)| (mask >> a & 1) != (mask >> b & 1))
                .count();
            (mask, crossing)
        })
        .collect()
}

fn side(graph: &Graph, mask: u32, bit: u32) -> BTreeSet<String> {
    graph
        .vertices()
        .filter(|&v| mask >> v & 1 == bit)
        .map(|v| graph.name(v).to_string())
        .collect()
}

#[test]
fn aoc_day25() {
    assert_eq!(solve(EXAMPLE, 3, Config::default().with_seed(25)).unwrap(), 54);
}

#[test]
fn aoc_day25_matches_brute_force() {
    let graph = parse_graph(EXAMPLE).unwrap();
    let cuts = all_cuts(&graph);

    let min = cuts.iter().map(|&(_, crossing)| crossing).min().unwrap();
    assert_eq!(min, 3);

    let minimal = cuts
        .iter()
        .filter(|&&(_, crossing)| crossing == min)
        .collect::<Vec<_>>();
    assert_eq!(minimal.len(), 1);

    let (mask, _) = *minimal[0];
    let expected = [side(&graph, mask, 0), side(&graph, mask, 1)];

    let partition = KargerStein::new(&graph, Config::default().with_seed(5))
        .compute_min_cut(3)
        .unwrap();
    assert!(expected.contains(&partition.first));
    assert!(expected.contains(&partition.second));
    assert_eq!(
        partition.first,
        ["bvb", "hfx", "jqt", "ntq", "rhn", "xhk"]
            .into_iter()
            .map(String::from)
            .collect::<BTreeSet<_>>()
    );
}

#[test]
fn larger_targets_on_a_small_graph() {
    // two triangles joined by a single bridge, plus a pendant vertex
    let graph = parse_graph("a: b c\nb: c\nd: e f\ne: f\nc: d\ng: a").unwrap();

    for target in 1..=2 {
        let partition = KargerStein::new(&graph, Config::default().with_seed(target as u64))
            .compute_min_cut(target)
            .unwrap();
        assert_eq!(partition.cut_size, target);
        assert_eq!(graph.crossing_edges(&partition.first), target);
        assert_eq!(
            partition.first.len() + partition.second.len(),
            graph.num_vertices()
        );
    }
}

#[test]
fn two_groups_joined_by_three_wires() {
    // two 5-cliques joined by three disjoint wires
    let input = "
aa: ab ac ad ae
ab: ac ad ae
ac: ad ae
ad: ae
ba: bb bc bd be
bb: bc bd be
bc: bd be
bd: be
aa: ba
ab: bb
ac: bc";
    let graph = parse_graph(input).unwrap();

    for seed in 0..3 {
        let partition = KargerStein::new(&graph, Config::default().with_seed(seed).sequential())
            .compute_min_cut(3)
            .unwrap();
        assert_eq!(partition.sizes(), (5, 5));
        assert!(partition.first.iter().all(|name| name.starts_with('a')));
    }
}

#[test]
fn reproducible_under_seed() {
    let input = "
aa: ab ac ad ae
ab: ac ad ae
ac: ad ae
ad: ae
ba: bb bc bd be
bb: bc bd be
bc: bd be
bd: be
aa: ba bb
ab: bb";
    let graph = parse_graph(input).unwrap();
    let config = Config::default().with_seed(1234);

    // the three wires are the minimum cut; every degree-4 vertex also gives a
    // cut of size 4, so which one comes back depends on the seed
    let first = KargerStein::new(&graph, config.clone())
        .compute_min_cut(4)
        .unwrap();
    for _ in 0..3 {
        assert_eq!(
            KargerStein::new(&graph, config.clone())
                .compute_min_cut(4)
                .unwrap(),
            first
        );
    }
    assert_eq!(
        KargerStein::new(&graph, config.sequential())
            .compute_min_cut(4)
            .unwrap(),
        first
    );
}

#[test]
fn input_errors_surface_before_search() {
    assert!(matches!(
        solve("a: a", 1, Config::default()),
        Err(Error::SelfLoop { line_number: 1, .. })
    ));
    assert!(matches!(
        solve("a: b\nb - c", 1, Config::default()),
        Err(Error::Parse { line_number: 2, .. })
    ));
}

#[test]
fn bounded_search_gives_up() {
    let err = solve(
        EXAMPLE,
        2,
        Config::default().with_seed(8).with_max_trials(200),
    )
    .unwrap_err();
    assert!(err.is_search_exhausted());
    assert!(matches!(err, Error::CutNotFound { target: 2, trials: 200 }));

    let err = solve(
        EXAMPLE,
        2,
        Config::default().unbounded().with_timeout(Duration::from_millis(50)),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
}
