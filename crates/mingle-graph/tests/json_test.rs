use mingle_graph::{EdgeJson, Error, Graph, GraphJson, NodeJson};

#[test]
fn json_round_trip_keeps_nodes_and_edges() {
    let mut g: Graph<String, u8> = Graph::new();
    for id in ["a", "b", "c"] {
        g.add_node(id, format!("label-{id}"));
    }
    g.add_edge("a", "b", 1);
    g.add_edge("c", "a", 2);

    let text = serde_json::to_string(&g.to_json()).unwrap();
    let parsed: GraphJson<NodeJson<String>, u8> = serde_json::from_str(&text).unwrap();
    let back: Graph<String, u8> = Graph::from_json(parsed).unwrap();

    assert_eq!(back.node_ids(), g.node_ids());
    assert_eq!(back.node("c"), Some(&"label-c".to_string()));
    assert_eq!(back.edge_count(), 2);
    assert_eq!(back.edge("b", "a"), Some(&1));
    assert_eq!(back.edge("a", "c"), Some(&2));
}

#[test]
fn edges_serialize_once_with_camel_case_keys() {
    let mut g: Graph<()> = Graph::new();
    g.add_node("a", ());
    g.add_node("b", ());
    g.add_edge("a", "b", ());

    let value = serde_json::to_value(g.to_json()).unwrap();
    let edges = value["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["nodeFrom"], "a");
    assert_eq!(edges[0]["nodeTo"], "b");
}

#[test]
fn from_json_rejects_unknown_and_duplicate_nodes() {
    let unknown: GraphJson<NodeJson<()>> = GraphJson {
        nodes: vec![NodeJson {
            id: "a".to_string(),
            data: (),
        }],
        edges: vec![EdgeJson {
            node_from: "a".to_string(),
            node_to: "z".to_string(),
            data: (),
        }],
    };
    assert_eq!(
        Graph::<()>::from_json(unknown).unwrap_err(),
        Error::UnknownNode {
            id: "z".to_string()
        }
    );

    let duplicate: GraphJson<NodeJson<()>> = GraphJson {
        nodes: vec![
            NodeJson {
                id: "a".to_string(),
                data: (),
            },
            NodeJson {
                id: "a".to_string(),
                data: (),
            },
        ],
        edges: Vec::new(),
    };
    assert!(matches!(
        Graph::<()>::from_json(duplicate),
        Err(Error::DuplicateNode { .. })
    ));
}

#[test]
fn edge_data_defaults_when_missing() {
    let text = r#"{
        "nodes": [{"id": "a", "data": null}, {"id": "b", "data": null}],
        "edges": [{"nodeFrom": "a", "nodeTo": "b"}]
    }"#;
    let parsed: GraphJson<NodeJson<()>, u8> = serde_json::from_str(text).unwrap();
    assert_eq!(parsed.edges[0].data, 0);

    let g: Graph<(), u8> = Graph::from_json(parsed).unwrap();
    assert_eq!(g.edge("b", "a"), Some(&0));
}
