use assert_cmd::Command;
use serde_json::Value;
use std::fs;

const EDGES: &str = r#"[
  {"id": "A", "data": {"coords": [0, 0, 10, 0]}},
  {"id": "B", "data": {"coords": [0, 1, 10, 1], "color": ["red", "blue"]}},
  {"id": "far", "data": {"coords": [100, 100, 110, 100], "weight": 2}}
]"#;

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("mingle-cli"))
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("stdout is JSON")
}

fn edge_ids(value: &Value) -> Vec<String> {
    value["edges"]
        .as_array()
        .expect("edges array")
        .iter()
        .map(|e| e["id"].as_str().expect("id").to_string())
        .collect()
}

#[test]
fn bundle_prints_report_and_polylines() {
    let value = stdout_json(cli().args(["bundle", "--k", "1"]).write_stdin(EDGES));

    let rounds = value["report"]["rounds"].as_array().expect("rounds");
    assert!(!rounds.is_empty());
    assert_eq!(rounds[0]["merges"], 1);
    assert!(value["report"]["totalGain"].as_f64().expect("gain") > 0.0);

    assert_eq!(edge_ids(&value), vec!["far", "A", "B"]);
    let edges = value["edges"].as_array().expect("edges");
    assert_eq!(edges[0]["points"].as_array().expect("points").len(), 3);
    let a = edges[1]["points"].as_array().expect("points");
    assert_eq!(a.len(), 5);
    assert_eq!(a[0], serde_json::json!([0.0, 0.0]));
    assert_eq!(a[4], serde_json::json!([10.0, 0.0]));
}

#[test]
fn zero_delta_draws_straight_chords() {
    let value = stdout_json(
        cli()
            .args(["bundle", "--k", "1", "--delta", "0"])
            .write_stdin(EDGES),
    );
    for edge in value["edges"].as_array().expect("edges") {
        let points = edge["points"].as_array().expect("points");
        let y0 = points[0][1].as_f64().expect("y");
        assert!(
            points
                .iter()
                .all(|p| (p[1].as_f64().expect("y") - y0).abs() < 1e-9)
        );
    }
}

#[test]
fn render_writes_svg_to_out_path() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("edges.json");
    fs::write(&input, EDGES).expect("write input");
    let out = tmp.path().join("edges.svg");

    cli()
        .args([
            "render",
            "--k",
            "1",
            "--curve",
            "bezier",
            "--curviness",
            "0.5",
            "--out",
            out.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .success()
        .stdout("");

    let svg = fs::read_to_string(&out).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<path ").count(), 3);
    assert!(svg.contains("linearGradient"));
}

#[test]
fn tree_output_can_be_loaded_again() {
    let tree = cli()
        .args(["tree", "--k", "1"])
        .write_stdin(EDGES)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&tree).expect("tree JSON");
    let ids: Vec<&str> = value["nodes"]
        .as_array()
        .expect("nodes")
        .iter()
        .map(|n| n["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["far", "A-B"]);

    let direct = stdout_json(cli().args(["bundle", "--k", "1"]).write_stdin(EDGES));
    let reloaded = stdout_json(cli().arg("bundle").write_stdin(tree));
    assert_eq!(reloaded["report"]["rounds"], serde_json::json!([]));
    assert_eq!(reloaded["edges"], direct["edges"]);
}

#[test]
fn config_file_sets_options_and_flags_override_it() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("mingle.json");
    fs::write(&config, r#"{"k": 1, "maxRounds": 1}"#).expect("write config");

    let value = stdout_json(
        cli()
            .args(["bundle", "--config", config.to_string_lossy().as_ref()])
            .write_stdin(EDGES),
    );
    assert_eq!(value["report"]["rounds"].as_array().expect("rounds").len(), 1);

    cli()
        .args(["bundle", "--config", config.to_string_lossy().as_ref(), "--k", "0"])
        .write_stdin(EDGES)
        .assert()
        .code(1);
}

#[test]
fn bad_arguments_exit_with_usage() {
    cli().arg("--nope").assert().code(2);
    cli().args(["bundle", "--delta", "2"]).assert().code(2);
    cli().args(["render", "--curve", "spline"]).assert().code(2);
    cli().arg("--help").assert().code(2);
}

#[test]
fn invalid_edges_fail() {
    cli()
        .arg("bundle")
        .write_stdin(r#"[{"id": "x", "data": {}}]"#)
        .assert()
        .code(1);
    cli().arg("bundle").write_stdin("not json").assert().code(1);
}

#[test]
fn seeded_shuffle_is_reproducible() {
    let run = |seed: &str| stdout_json(cli().args(["bundle", "--seed", seed]).write_stdin(EDGES));
    let first = run("7");
    assert_eq!(first, run("7"));

    let mut ids = edge_ids(&first);
    ids.sort();
    assert_eq!(ids, vec!["A", "B", "far"]);
}

#[test]
fn seed_is_rejected_for_saved_trees() {
    let tree = cli()
        .args(["tree", "--k", "1"])
        .write_stdin(EDGES)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    cli()
        .args(["bundle", "--seed", "7"])
        .write_stdin(tree.clone())
        .assert()
        .code(2)
        .stdout("");
    cli().arg("render").write_stdin(tree).assert().success();
}
