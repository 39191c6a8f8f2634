use mingle::{Bundler, BundlerOptions, EdgeData, EdgeInput, Error, NodeKind, NodeSort};

fn options(k: usize) -> BundlerOptions {
    BundlerOptions {
        k,
        ..Default::default()
    }
}

fn bundler(k: usize, edges: &[(&str, [f64; 4])]) -> Bundler {
    Bundler::from_edges(
        options(k),
        edges.iter().map(|&(id, c)| EdgeInput::new(id, c)),
    )
    .unwrap()
}

fn ids(b: &Bundler) -> Vec<String> {
    b.roots().iter().map(|&ix| b.node(ix).id().to_string()).collect()
}

/// Deterministic pseudo-random edges in a few loose flows.
fn flows(n: usize, seed: u64) -> Vec<EdgeInput> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64) / ((1u64 << 53) as f64)
    };
    (0..n)
        .map(|i| {
            let flow = (i % 4) as f64;
            let x0 = next() * 20.0;
            let y0 = flow * 40.0 + next() * 15.0;
            let x1 = 200.0 + next() * 20.0;
            let y1 = (3.0 - flow) * 40.0 + next() * 15.0;
            EdgeInput::new(format!("e{i}"), [x0, y0, x1, y1])
        })
        .collect()
}

#[test]
fn parallel_edges_merge_into_one_bundle() {
    let mut b = bundler(1, &[("A", [0.0, 0.0, 10.0, 0.0]), ("B", [0.0, 1.0, 10.0, 1.0])]);
    assert!(b.graph().has_edge("A", "B"));
    let report = b.mingle();

    assert_eq!(report.rounds.len(), 1);
    assert_eq!(report.rounds[0].merges, 1);
    assert_eq!(ids(&b), vec!["A-B".to_string()]);

    let root = b.roots()[0];
    let node = b.node(root);
    assert_eq!(node.weight(), 2.0);
    let (m1, m2) = node.compromise_points().unwrap();
    assert!((m1.y - 0.5).abs() < 1e-12, "{m1:?}");
    assert!((m2.y - 0.5).abs() < 1e-12, "{m2:?}");
    assert!((m1.x + m2.x - 10.0).abs() < 1e-9);
    assert!(m1.x > 0.0 && m1.x < 2.5, "{m1:?}");

    let leaves: Vec<&str> = node.node_array().iter().map(|&l| b.node(l).id()).collect();
    assert_eq!(leaves, vec!["A", "B"]);
    match node.kind() {
        NodeKind::Coalesced { parents_ink, .. } => {
            assert!((b.total_ink() - parents_ink).abs() < 1e-9);
        }
        NodeKind::Leaf => panic!("expected a coalesced node"),
    }
    assert!((20.0 - report.total_gain - b.total_ink()).abs() < 1e-9);
}

#[test]
fn stronger_angle_strength_moves_compromise_points_outward() {
    let edges = [("A", [0.0, 0.0, 10.0, 0.0]), ("B", [0.0, 1.0, 10.0, 1.0])];
    let mut bent = bundler(1, &edges);
    bent.mingle();
    let mut loose = Bundler::from_edges(
        BundlerOptions {
            k: 1,
            angle_strength: 1e9,
            ..Default::default()
        },
        edges.iter().map(|&(id, c)| EdgeInput::new(id, c)),
    )
    .unwrap();
    loose.mingle();

    let (bent_m1, _) = bent.node(bent.roots()[0]).compromise_points().unwrap();
    let (loose_m1, _) = loose.node(loose.roots()[0]).compromise_points().unwrap();
    assert!(loose_m1.x < 0.6, "{loose_m1:?}");
    assert!(loose_m1.x < bent_m1.x);
    assert!(loose.total_ink() < bent.total_ink());
}

#[test]
fn isolated_node_stays_a_singleton() {
    let mut b = Bundler::new(options(3)).unwrap();
    b.set_nodes([EdgeInput::new("solo", [1.0, 2.0, 3.0, 4.0])])
        .unwrap();
    b.build_nearest_neighbor_graph();
    assert_eq!(b.graph().degree("solo"), 0);

    let stats = b.mingle_round();
    assert_eq!(stats.merges, 0);
    assert_eq!(stats.gain, 0.0);
    assert_eq!(stats.nodes_after, 1);
    assert_eq!(ids(&b), vec!["solo".to_string()]);
    let solo = b.node(b.roots()[0]);
    assert!(solo.is_leaf());
    assert_eq!(solo.coords().as_array(), [1.0, 2.0, 3.0, 4.0]);

    // Nothing left to merge: no further rounds.
    assert!(b.mingle().rounds.is_empty());
}

#[test]
fn nodes_without_neighbors_do_not_stop_other_merges() {
    let mut b = Bundler::new(options(1)).unwrap();
    b.set_nodes([
        EdgeInput::new("A", [0.0, 0.0, 10.0, 0.0]),
        EdgeInput::new("B", [0.0, 1.0, 10.0, 1.0]),
        EdgeInput::new("far", [100.0, 100.0, 110.0, 100.0]),
    ])
    .unwrap();
    b.build_nearest_neighbor_graph();

    let report = b.mingle();
    assert_eq!(report.rounds.len(), 2);
    assert_eq!(report.rounds[0].merges, 1);
    assert_eq!(report.rounds[1].gain, 0.0);
    assert_eq!(ids(&b), vec!["far".to_string(), "A-B".to_string()]);

    let far = b.node(b.node_by_id("far").unwrap());
    assert_eq!(far.coords().as_array(), [100.0, 100.0, 110.0, 100.0]);
    // The bundle inherited the far edge's proximity link.
    assert!(b.graph().has_edge("far", "A-B"));
}

#[test]
fn unconnected_graph_runs_a_single_fruitless_round() {
    let mut b = Bundler::new(options(2)).unwrap();
    b.set_nodes(flows(6, 3)).unwrap();
    let before = b.total_ink();
    let report = b.mingle();
    assert_eq!(report.rounds.len(), 1);
    assert_eq!(report.total_gain, 0.0);
    assert_eq!(b.graph().node_count(), 6);
    assert_eq!(b.total_ink(), before);
}

#[test]
fn total_ink_never_increases() {
    let mut b = Bundler::from_edges(options(6), flows(80, 11)).unwrap();
    let leaf_ink: f64 = b.arena().iter().map(|n| n.coords().length()).sum();
    assert!((b.total_ink() - leaf_ink).abs() < 1e-9);

    let report = b.mingle();
    assert!(!report.rounds.is_empty());
    assert!(report.total_gain > 0.0);

    let mut previous = leaf_ink;
    for stats in &report.rounds {
        assert!(stats.total_ink <= previous + 1e-9, "{stats:?}");
        let expected = previous - stats.gain;
        assert!(
            (stats.total_ink - expected).abs() < 1e-6 * previous,
            "{stats:?} expected {expected}"
        );
        assert_eq!(stats.nodes_after, stats.nodes_before - stats.merges);
        previous = stats.total_ink;
    }
    let last = report.rounds.last().unwrap();
    assert!(last.gain <= 0.0 || b.graph().node_count() <= 1);
}

#[test]
fn every_leaf_ends_up_under_exactly_one_root() {
    let mut b = Bundler::from_edges(options(5), flows(40, 5)).unwrap();
    b.mingle();

    let mut seen: Vec<String> = b
        .roots()
        .iter()
        .flat_map(|&root| b.node(root).node_array().to_vec())
        .map(|leaf| b.node(leaf).id().to_string())
        .collect();
    seen.sort();
    let mut expected: Vec<String> = (0..40).map(|i| format!("e{i}")).collect();
    expected.sort();
    assert_eq!(seen, expected);

    for root in b.roots() {
        let expanded = b.expand_edges(root);
        assert_eq!(expanded.len(), b.node(root).node_array().len());
    }
}

#[test]
fn max_rounds_caps_the_loop() {
    let mut b = Bundler::from_edges(
        BundlerOptions {
            k: 6,
            max_rounds: Some(1),
            ..Default::default()
        },
        flows(40, 9),
    )
    .unwrap();
    let report = b.mingle();
    assert_eq!(report.rounds.len(), 1);
    assert_eq!(b.rounds_run(), 1);
}

#[test]
fn equal_savings_prefer_the_earliest_neighbor() {
    let mut b = bundler(
        2,
        &[
            ("A", [0.0, 0.0, 10.0, 0.0]),
            ("B", [0.0, 1.0, 10.0, 1.0]),
            ("C", [0.0, -1.0, 10.0, -1.0]),
        ],
    );
    let a = b.node_by_id("A").unwrap();
    let with_b = b.get_combined_node(a, b.node_by_id("B").unwrap());
    let with_c = b.get_combined_node(a, b.node_by_id("C").unwrap());
    assert_eq!(with_b.ink, with_c.ink);

    b.mingle_round();
    // A pairs with B (lower index) first; C then joins that group.
    assert_eq!(ids(&b), vec!["C-A-B".to_string()]);
    let root = b.node(b.roots()[0]);
    let parents: Vec<&str> = root.parents().iter().map(|&p| b.node(p).id()).collect();
    assert_eq!(parents, vec!["C", "A", "B"]);
}

#[test]
fn sort_option_orders_node_array() {
    let mut b = Bundler::from_edges(
        BundlerOptions {
            k: 1,
            sort: Some(NodeSort::ByWeightDesc),
            ..Default::default()
        },
        [
            EdgeInput::new("light", [0.0, 0.0, 10.0, 0.0]),
            EdgeInput::new("heavy", [0.0, 1.0, 10.0, 1.0]).with_weight(3.0),
        ],
    )
    .unwrap();
    b.mingle();
    let root = b.node(b.roots()[0]);
    let order: Vec<&str> = root.node_array().iter().map(|&l| b.node(l).id()).collect();
    assert_eq!(order, vec!["heavy", "light"]);
    assert_eq!(root.weight(), 4.0);

    let mut custom = Bundler::from_edges(
        BundlerOptions {
            k: 1,
            sort: Some(NodeSort::custom(|a, b| b.id().cmp(a.id()))),
            ..Default::default()
        },
        [
            EdgeInput::new("a", [0.0, 0.0, 10.0, 0.0]),
            EdgeInput::new("b", [0.0, 1.0, 10.0, 1.0]),
        ],
    )
    .unwrap();
    custom.mingle();
    let root = custom.node(custom.roots()[0]);
    let order: Vec<&str> = root
        .node_array()
        .iter()
        .map(|&l| custom.node(l).id())
        .collect();
    assert_eq!(order, vec!["b", "a"]);
}

#[test]
fn invalid_input_is_rejected() {
    let mut b = Bundler::default();
    let missing = EdgeInput {
        id: "x".to_string(),
        name: None,
        data: EdgeData::default(),
    };
    match b.set_nodes([EdgeInput::new("ok", [0.0; 4]), missing]) {
        Err(Error::InvalidInput { id, .. }) => assert_eq!(id, "x"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(b.graph().is_empty());

    let dup = b.set_nodes([
        EdgeInput::new("d", [0.0; 4]),
        EdgeInput::new("d", [1.0; 4]),
    ]);
    assert!(matches!(dup, Err(Error::DuplicateNode { id }) if id == "d"));

    let bad = Bundler::new(options(0));
    assert!(matches!(bad, Err(Error::InvalidOptions { .. })));
}

#[test]
fn rerunning_set_nodes_resets_state() {
    let mut b = bundler(1, &[("A", [0.0, 0.0, 10.0, 0.0]), ("B", [0.0, 1.0, 10.0, 1.0])]);
    b.mingle();
    b.set_nodes([EdgeInput::new("C", [0.0, 0.0, 1.0, 1.0])])
        .unwrap();
    assert_eq!(b.arena().len(), 1);
    assert_eq!(b.rounds_run(), 0);
    assert!(b.node_by_id("A-B").is_none());
}
