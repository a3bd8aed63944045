//! End-to-end tests for policy-governed clearing.

use graphunit::{
    ClearSummary, Graph, IncludeAllBusinessNodes, InclusionPolicies, MemoryBackend, Node,
    Relationship, StorageBackend, TxMode,
};

const COLOURS: &str = "CREATE \
    (blue:Blue {name:'Blue'})<-[:REL]-(red1:Red {name:'Red'})-[:REL]->(black1:Black {name:'Black'})-[:REL]->(green:Green {name:'Green'}),\
    (red2:Red {name:'Red'})-[:REL]->(black2:Black {name:'Black'})";

async fn populated(script: &str) -> Graph<MemoryBackend> {
    let graph = Graph::open_memory().await.unwrap();
    graph.mutate(script).await.unwrap();
    graph
}

fn blue_nodes() -> impl Fn(&Node) -> bool + Send + Sync + 'static {
    |node: &Node| node.has_label("Blue")
}

#[tokio::test]
async fn test_clear_deletes_all_nodes_and_relationships() {
    let graph = populated(COLOURS).await;

    let summary = graph.clear(&InclusionPolicies::include_all()).await.unwrap();

    assert_eq!(summary, ClearSummary { relationships_deleted: 4, nodes_deleted: 6, nodes_kept: 0 });
    assert_eq!(graph.node_count().await.unwrap(), 0);
    assert_eq!(graph.relationship_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_by_node_policy() {
    let graph = populated(COLOURS).await;
    let policies = InclusionPolicies::include_all().with_nodes(blue_nodes());

    graph.clear(&policies).await.unwrap();

    assert_eq!(graph.node_count().await.unwrap(), 5);
    assert_eq!(graph.relationship_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_by_node_and_relationship_policy() {
    let graph = populated(
        "CREATE \
        (purple:Purple {name:'Purple'})<-[:REL]-(red1:Red {name:'Red'})-[:REL]->(black1:Black {name:'Black'})-[:REL]->(green:Green {name:'Green'}),\
        (red2:Red {name:'Red'})-[:REL]->(black2:Black {name:'Black'}), (blue1:Blue)-[:REL2]->(blue2:Blue)",
    )
    .await;
    let policies = InclusionPolicies::include_all()
        .with_nodes(blue_nodes())
        .with_relationships(|rel: &Relationship| rel.rel_type == "REL2");

    let summary = graph.clear(&policies).await.unwrap();

    assert_eq!(summary, ClearSummary { relationships_deleted: 1, nodes_deleted: 2, nodes_kept: 0 });
    assert_eq!(graph.node_count().await.unwrap(), 6);
    assert_eq!(graph.relationship_count().await.unwrap(), 4);
    graph
        .assert_same_graph(
            "CREATE \
            (purple:Purple {name:'Purple'})<-[:REL]-(red1:Red {name:'Red'})-[:REL]->(black1:Black {name:'Black'})-[:REL]->(green:Green {name:'Green'}),\
            (red2:Red {name:'Red'})-[:REL]->(black2:Black {name:'Black'})",
            &InclusionPolicies::include_all(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clear_keeps_internal_nodes() {
    let graph = populated(&format!("{COLOURS}, (:_GA_Root)")).await;
    let policies = InclusionPolicies::include_all().with_nodes(IncludeAllBusinessNodes::new());

    graph.clear(&policies).await.unwrap();

    assert_eq!(graph.node_count().await.unwrap(), 1);
    graph.assert_same_graph("CREATE (:_GA_Root)", &InclusionPolicies::include_all()).await.unwrap();
}

#[tokio::test]
async fn test_protected_relationship_pins_included_node() {
    let graph = populated("CREATE (a:Blue)-[:KEEP]->(b:Red), (c:Blue)").await;
    let policies = InclusionPolicies::include_all()
        .with_nodes(blue_nodes())
        .with_relationships(|rel: &Relationship| rel.rel_type != "KEEP");

    let summary = graph.clear(&policies).await.unwrap();

    assert_eq!(summary, ClearSummary { relationships_deleted: 0, nodes_deleted: 1, nodes_kept: 1 });
    graph
        .assert_same_graph("CREATE (:Blue)-[:KEEP]->(:Red)", &InclusionPolicies::include_all())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let graph = populated(COLOURS).await;
    let policies = InclusionPolicies::include_all().with_nodes(blue_nodes());

    graph.clear(&policies).await.unwrap();
    let second = graph.clear(&policies).await.unwrap();

    assert_eq!(second, ClearSummary::default());
    assert_eq!(graph.node_count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_clear_then_assert_empty() {
    let graph = populated(COLOURS).await;
    let all = InclusionPolicies::include_all();
    graph.clear(&all).await.unwrap();
    graph.assert_same_graph("", &all).await.unwrap();
}

#[tokio::test]
async fn test_free_function_needs_writable_transaction() {
    let db = MemoryBackend::new();
    let mut tx = db.begin_tx(TxMode::ReadWrite).await.unwrap();
    db.create_node(&mut tx, &["A"], Default::default()).await.unwrap();
    db.commit_tx(tx).await.unwrap();

    let mut ro = db.begin_tx(TxMode::ReadOnly).await.unwrap();
    let err = graphunit::clear_graph(&db, &mut ro, &InclusionPolicies::include_all())
        .await
        .unwrap_err();
    assert!(matches!(err, graphunit::Error::TxError(_)));

    let mut rw = db.begin_tx(TxMode::ReadWrite).await.unwrap();
    graphunit::clear_graph(&db, &mut rw, &InclusionPolicies::include_all()).await.unwrap();
    db.commit_tx(rw).await.unwrap();
    let tx = db.begin_tx(TxMode::ReadOnly).await.unwrap();
    assert_eq!(db.node_count(&tx).await.unwrap(), 0);
}
