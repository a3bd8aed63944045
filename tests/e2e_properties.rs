//! Generated-graph properties.
//!
//! Graphs are written straight through the store API, rendered back to a
//! CREATE script with `render_cypher`, and compared against that script.

use graphunit::model::property_map;
use graphunit::{
    render_cypher, Graph, InclusionPolicies, MemoryBackend, NodeId, PrimitiveArray, PropertyMap,
    StorageBackend, TxMode, Value,
};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

#[derive(Debug, Clone)]
struct GraphSpec {
    nodes: Vec<(Vec<&'static str>, Option<Value>)>,
    rels: Vec<(usize, usize, &'static str, Option<i64>)>,
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<i32>().prop_map(Value::Int32),
        any::<bool>().prop_map(Value::Bool),
        "[a-z' ]{0,6}".prop_map(Value::String),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        prop::collection::vec(any::<i16>(), 0..4)
            .prop_map(|v| Value::Array(PrimitiveArray::Int16(v))),
    ]
}

fn node() -> impl Strategy<Value = (Vec<&'static str>, Option<Value>)> {
    (
        prop::sample::subsequence(vec!["A", "B", "C"], 0..=3),
        prop::option::of(value()),
    )
}

fn graph() -> impl Strategy<Value = GraphSpec> {
    prop::collection::vec(node(), 0..6)
        .prop_flat_map(|nodes| {
            let n = nodes.len();
            let rels = if n == 0 {
                Just(Vec::new()).boxed()
            } else {
                prop::collection::vec(
                    (0..n, 0..n, prop::sample::select(vec!["R", "S"]), prop::option::of(0i64..3)),
                    0..10,
                )
                .boxed()
            };
            (Just(nodes), rels)
        })
        .prop_map(|(nodes, rels)| GraphSpec { nodes, rels })
}

// ============================================================================
// Helpers
// ============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

/// Write `spec` into `db`, creating nodes in the given order. Returns the
/// store id of every spec node.
async fn load(db: &MemoryBackend, spec: &GraphSpec, order: &[usize]) -> Vec<NodeId> {
    let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
    let mut ids = vec![NodeId(0); spec.nodes.len()];
    for &i in order {
        let (labels, value) = &spec.nodes[i];
        let props = match value {
            Some(v) => property_map([("k", v.clone())]),
            None => PropertyMap::new(),
        };
        ids[i] = db.create_node(&mut tx, labels, props).await.unwrap();
    }
    for (src, dst, rel_type, weight) in spec.rels.iter().rev() {
        let props = match weight {
            Some(w) => property_map([("w", *w)]),
            None => PropertyMap::new(),
        };
        db.create_relationship(&mut tx, ids[*src], ids[*dst], rel_type, props)
            .await
            .unwrap();
    }
    db.commit_tx(tx).await.unwrap();
    ids
}

async fn rendered(spec: &GraphSpec) -> String {
    let graph = Graph::open_memory().await.unwrap();
    let order: Vec<usize> = (0..spec.nodes.len()).collect();
    load(graph.backend(), spec, &order).await;
    render_cypher(&graph.snapshot(&InclusionPolicies::include_all()).await.unwrap())
}

async fn single_node(value: Value) -> Graph<MemoryBackend> {
    let graph = Graph::open_memory().await.unwrap();
    let db = graph.backend();
    let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
    db.create_node(&mut tx, &[], property_map([("v", value)])).await.unwrap();
    db.commit_tx(tx).await.unwrap();
    graph
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rendered_graph_is_same_graph(spec in graph()) {
        block_on(async {
            let all = InclusionPolicies::include_all();
            let script = rendered(&spec).await;

            let graph = Graph::open_memory().await.unwrap();
            let reversed: Vec<usize> = (0..spec.nodes.len()).rev().collect();
            load(graph.backend(), &spec, &reversed).await;

            graph.assert_same_graph(&script, &all).await.unwrap();
            graph.assert_subgraph(&script, &all).await.unwrap();
        });
    }

    #[test]
    fn graph_embeds_into_any_supergraph(spec in graph(), extra in graph()) {
        block_on(async {
            let script = rendered(&spec).await;

            let graph = Graph::open_memory().await.unwrap();
            let db = graph.backend();
            let base = load(db, &spec, &(0..spec.nodes.len()).collect::<Vec<_>>()).await;
            let more = load(db, &extra, &(0..extra.nodes.len()).collect::<Vec<_>>()).await;
            if let (Some(&a), Some(&b)) = (base.first(), more.first()) {
                let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
                db.create_relationship(&mut tx, a, b, "X", PropertyMap::new()).await.unwrap();
                db.commit_tx(tx).await.unwrap();
            }

            graph.assert_subgraph(&script, &InclusionPolicies::include_all()).await.unwrap();
        });
    }

    #[test]
    fn narrow_integers_equal_script_literals(x in any::<i16>()) {
        block_on(async {
            let graph = single_node(Value::Int16(x)).await;
            graph
                .assert_same_graph(&format!("CREATE ({{v: {x}}})"), &InclusionPolicies::include_all())
                .await
                .unwrap();
        });
    }

    #[test]
    fn integral_floats_equal_integers(x in -1_000_000i64..1_000_000) {
        block_on(async {
            let graph = single_node(Value::Float(x as f64)).await;
            graph
                .assert_same_graph(&format!("CREATE ({{v: {x}}})"), &InclusionPolicies::include_all())
                .await
                .unwrap();
        });
    }

    #[test]
    fn different_integers_never_match(a in any::<i32>(), b in any::<i32>()) {
        prop_assume!(a != b);
        block_on(async {
            let graph = single_node(Value::Int32(a)).await;
            let err = graph
                .assert_same_graph(&format!("CREATE ({{v: {b}}})"), &InclusionPolicies::include_all())
                .await
                .unwrap_err();
            assert!(err.is_mismatch());
        });
    }
}
