use mingle::ink::{self, SEARCH_BRACKET};
use mingle::{Bundle, Bundler, BundlerOptions, EdgeInput, Point};
use std::f64::consts::FRAC_PI_2;

fn parallel_pair() -> Bundler {
    let mut b = Bundler::new(BundlerOptions::default()).unwrap();
    b.set_nodes([
        EdgeInput::new("a", [0.0, 0.0, 10.0, 0.0]),
        EdgeInput::new("b", [0.0, 1.0, 10.0, 1.0]),
    ])
    .unwrap();
    b
}

#[test]
fn leaf_ink_is_its_length() {
    let b = parallel_pair();
    let a = b.node_by_id("a").unwrap();
    assert_eq!(ink::node_ink(b.arena(), a), 10.0);
    assert_eq!(ink::branch_ink(b.arena(), a), 0.0);
}

#[test]
fn golden_section_search_finds_convex_minimum_within_tau() {
    let tau = 0.1;
    let f = |x: f64| (x - 0.4) * (x - 0.4);
    let x = ink::golden_section_search(0.0, 0.5, 1.0, tau, f);
    assert!((x - 0.4).abs() < tau, "{x}");

    let (a, b, c) = SEARCH_BRACKET;
    let x = ink::golden_section_search(a, b, c, tau, f);
    assert!((x - 0.4).abs() < tau, "{x}");
}

#[test]
fn golden_section_search_tightens_with_tau() {
    let f = |x: f64| (x - 0.7).powi(2) + 3.0;
    let x = ink::golden_section_search(0.0, 0.5, 1.0, 1e-6, f);
    assert!((x - 0.7).abs() < 1e-4, "{x}");
}

#[test]
fn centroids_average_endpoints() {
    let b = parallel_pair();
    let members: Vec<_> = b.roots();
    let (top, bottom) = ink::centroids(b.arena(), &members);
    assert_eq!(top, Point::new(0.0, 0.5));
    assert_eq!(bottom, Point::new(10.0, 0.5));
}

#[test]
fn turning_angle_is_measured_against_the_trunk() {
    let b = parallel_pair();
    let members = b.roots();
    let m1 = Point::new(0.0, 0.5);
    let m2 = Point::new(10.0, 0.5);
    let angle = ink::max_turning_angle(b.arena(), &members, m1, m2);
    assert!((angle - FRAC_PI_2).abs() < 1e-12, "{angle}");

    // Fans pointing straight along the trunk do not bend.
    let straight = ink::max_turning_angle(
        b.arena(),
        &members[..1],
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
    );
    assert_eq!(straight, 0.0);
}

#[test]
fn cost_penalizes_ink_by_bend() {
    let b = parallel_pair();
    let ends = ink::centroids(b.arena(), &b.roots());
    let mut bundle = Bundle {
        members: b.roots(),
        m1: Point::ZERO,
        m2: Point::ZERO,
        ink: 0.0,
        weight: 2.0,
    };
    let strength = 1.2;
    let cost = ink::cost(b.arena(), &mut bundle, ends, 0.4, strength);
    assert!(bundle.m1.dist(Point::new(2.0, 0.5)) < 1e-12);
    assert!(bundle.m2.dist(Point::new(8.0, 0.5)) < 1e-12);

    let expected_ink = 4.0 * 4.25_f64.sqrt() + 6.0;
    assert!((bundle.ink - expected_ink).abs() < 1e-9);
    let angle = ink::max_turning_angle(b.arena(), &bundle.members, bundle.m1, bundle.m2);
    let expected = expected_ink * (1.0 + angle.sin() / strength);
    assert!((cost - expected).abs() < 1e-9);
}

#[test]
fn optimized_bundle_saves_ink_and_stays_symmetric() {
    let b = parallel_pair();
    let bundle = b.combine_members(b.roots());
    assert!(bundle.ink < 20.0, "{}", bundle.ink);
    assert!((bundle.m1.y - 0.5).abs() < 1e-12);
    assert!((bundle.m2.y - 0.5).abs() < 1e-12);
    assert!((bundle.m1.x + bundle.m2.x - 10.0).abs() < 1e-9);
    assert_eq!(bundle.weight, 2.0);

    let again = b.get_combined_node(b.roots()[0], b.roots()[1]);
    assert_eq!(again, bundle);
}

#[test]
fn bundle_ink_counts_fans_and_trunk() {
    let b = parallel_pair();
    let ink = ink::bundle_ink(
        b.arena(),
        &b.roots(),
        Point::new(0.0, 0.5),
        Point::new(10.0, 0.5),
    );
    assert!((ink - 12.0).abs() < 1e-12);
}
