#[test]
fn version_matches_cargo_pkg_version() {
    assert_eq!(mingle::VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!mingle::VERSION.is_empty());
}
