//! End-to-end tests for exact graph equivalence.
//!
//! Each test populates a store through `Graph::mutate()` and then compares it
//! with a construction script via `Graph::assert_same_graph()`.

use graphunit::{Graph, InclusionPolicies, MemoryBackend, MismatchReason};

const COMPANY: &str = "CREATE \n\
    (:Person {name:'Michal'})-[:WORKS_FOR]->(c:Company {name:'GraphAware'}),\n\
    (:Person {name:'Daniela', role:'Operations Director'})-[:WORKS_FOR]->(c)";

const COLOURS: &str = "CREATE \
    (blue {name:'Blue'})<-[:REL]-(red1 {name:'Red'})-[:REL]->(black1 {name:'Black'})-[:REL]->(green {name:'Green'}),\
    (red2 {name:'Red'})-[:REL]->(black2 {name:'Black'})";

const COLOURS_SHUFFLED: &str = "CREATE \
    (red1 {name:'Red'})-[:REL]->(black1 {name:'Black'})-[:REL]->(green {name:'Green'}),\
    (blue {name:'Blue'})<-[:REL]-(red2 {name:'Red'})-[:REL]->(black2 {name:'Black'})";

async fn populated(script: &str) -> Graph<MemoryBackend> {
    let graph = Graph::open_memory().await.unwrap();
    graph.mutate(script).await.unwrap();
    graph
}

async fn same(populate: &str, expected: &str) -> graphunit::Result<()> {
    populated(populate)
        .await
        .assert_same_graph(expected, &InclusionPolicies::include_all())
        .await
}

// ============================================================================
// Passing comparisons
// ============================================================================

#[tokio::test]
async fn test_equal_graphs_with_labels() {
    same(COMPANY, COMPANY).await.unwrap();
}

#[tokio::test]
async fn test_equal_graphs_without_labels() {
    let script = "CREATE \
        (m {name:'Michal'})-[:WORKS_FOR]->(c {name:'GraphAware'}),\
        (d {name:'Daniela', role:'Operations Director'})-[:WORKS_FOR]->(c)";
    same(script, script).await.unwrap();
}

#[tokio::test]
async fn test_equal_single_node_graphs() {
    same("CREATE (m:Person {name:'Michal'})", "CREATE (m:Person {name:'Michal'})")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_equal_colour_graphs() {
    same(COLOURS, COLOURS).await.unwrap();
}

#[tokio::test]
async fn test_empty_store_equals_empty_script() {
    same("", "").await.unwrap();
}

#[tokio::test]
async fn test_declaration_order_is_irrelevant() {
    same(
        "CREATE (a:A {k: 1})-[:R {w: 'x'}]->(b:B), (b)-[:S]->(c:C)",
        "CREATE (c:C), (b:B), (a:A {k: 1}) CREATE (b)-[:S]->(c), (a)-[:R {w: 'x'}]->(b)",
    )
    .await
    .unwrap();
}

// ============================================================================
// Failing comparisons
// ============================================================================

#[tokio::test]
async fn test_swapped_labels_fail() {
    let err = same(
        "CREATE (m:Male {name:'Michal'}), (d:Female {name:'Daniela'})",
        "CREATE (m:Female {name:'Michal'}), (d:Male {name:'Daniela'})",
    )
    .await
    .unwrap_err();
    assert!(err.is_mismatch());
}

#[tokio::test]
async fn test_extra_label_fails_both_ways() {
    assert!(same("CREATE (m:Person:Human {name:'Michal'})", "CREATE (m:Person {name:'Michal'})")
        .await
        .unwrap_err()
        .is_mismatch());
    assert!(same("CREATE (m:Person {name:'Michal'})", "CREATE (m:Person:Human {name:'Michal'})")
        .await
        .unwrap_err()
        .is_mismatch());
}

#[tokio::test]
async fn test_extra_relationship_property_fails_both_ways() {
    let with_since = "CREATE \n\
        (:Person {name:'Michal'})-[:WORKS_FOR]->(c:Company {name:'GraphAware'}),\n\
        (:Person {name:'Daniela', role:'Operations Director'})-[:WORKS_FOR {since:2014}]->(c)";

    let err = same(with_since, COMPANY).await.unwrap_err();
    assert!(matches!(err.mismatch().unwrap().reason, MismatchReason::Bucket { .. }));
    assert!(same(COMPANY, with_since).await.unwrap_err().is_mismatch());
}

#[tokio::test]
async fn test_swapped_relationship_types_fail() {
    let populate = "CREATE \n\
        (:Person {name:'Michal'})-[:WORKS_FOR1]->(c:Company {name:'GraphAware'}),\n\
        (:Person {name:'Daniela', role:'Operations Director'})-[:WORKS_FOR2]->(c)";
    let expected = "CREATE \n\
        (:Person {name:'Michal'})-[:WORKS_FOR2]->(c:Company {name:'GraphAware'}),\n\
        (:Person {name:'Daniela', role:'Operations Director'})-[:WORKS_FOR1]->(c)";
    assert!(same(populate, expected).await.unwrap_err().is_mismatch());
}

#[tokio::test]
async fn test_missing_relationship_fails_both_ways() {
    let without = "CREATE \n\
        (:Person {name:'Michal'})-[:WORKS_FOR]->(c:Company {name:'GraphAware'}),\n\
        (:Person {name:'Daniela', role:'Operations Director'})";

    let err = same(without, COMPANY).await.unwrap_err();
    assert_eq!(
        err.mismatch().unwrap().reason,
        MismatchReason::RelationshipCount { reference: 2, subject: 1 }
    );
    let err = same(COMPANY, without).await.unwrap_err();
    assert_eq!(
        err.mismatch().unwrap().reason,
        MismatchReason::RelationshipCount { reference: 1, subject: 2 }
    );
}

#[tokio::test]
async fn test_missing_node_property_fails() {
    let populate = "CREATE \n\
        (:Person {name:'Michal'})-[:WORKS_FOR]->(c:Company {name:'GraphAware'}),\n\
        (:Person {name:'Daniela'})-[:WORKS_FOR]->(c)";
    let err = same(populate, COMPANY).await.unwrap_err();
    assert!(matches!(err.mismatch().unwrap().reason, MismatchReason::UnmatchedNode { .. }));
}

#[tokio::test]
async fn test_differently_wired_colour_graphs_fail_both_ways() {
    assert!(same(COLOURS_SHUFFLED, COLOURS).await.unwrap_err().is_mismatch());
    assert!(same(COLOURS, COLOURS_SHUFFLED).await.unwrap_err().is_mismatch());
}

#[tokio::test]
async fn test_mapped_relationships_are_not_reused() {
    let populate = "CREATE\
        (root:TimeTreeRoot),\
        (root)-[:FIRST]->(year:Year {value:2013}),\
        (root)-[:CHILD]->(year),\
        (root)-[:LAST]->(year),\
        (year)-[:FIRST]->(month:Month {value:5}),\
        (year)-[:CHILD]->(month),\
        (year)-[:LAST]->(month),\
        (month)-[:FIRST]->(day:Day {value:4}),\
        (month)-[:CHILD]->(day),\
        (month)-[:LAST]->(day)";
    let expected = "CREATE\
        (root:TimeTreeRoot),\
        (root)-[:FIRST]->(year:Year {value:2013}),\
        (root)-[:CHILD]->(year),\
        (root)-[:LAST]->(year),\
        (year)-[:CHILD]->(month:Month {value:5}),\
        (year)-[:CHILD]->(month),\
        (year)-[:LAST]->(month),\
        (month)-[:FIRST]->(day:Day {value:4}),\
        (month)-[:CHILD]->(day),\
        (month)-[:LAST]->(day)";

    let err = same(populate, expected).await.unwrap_err();
    match &err.mismatch().unwrap().reason {
        MismatchReason::Bucket { relationship, required, available, .. } => {
            assert_eq!(relationship, "[:CHILD]");
            assert_eq!((*required, *available), (2, 1));
        }
        other => panic!("unexpected reason: {other:?}"),
    }
}

#[tokio::test]
async fn test_mismatch_message_shows_both_graphs() {
    let err = same("CREATE (:Person {name:'Michal'})", "CREATE (:Person {name:'Daniela'})")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("graphs are not the same"));
    assert!(message.contains("expected:\nCREATE\n  (n0:Person {name: 'Daniela'})"));
    assert!(message.contains("actual:\nCREATE\n  (n0:Person {name: 'Michal'})"));
}

// ============================================================================
// Script errors propagate unchanged
// ============================================================================

#[tokio::test]
async fn test_invalid_script_is_not_a_mismatch() {
    let err = same("CREATE (a:A)", "CREATE (a:A")
        .await
        .unwrap_err();
    assert!(matches!(err, graphunit::Error::SyntaxError { .. }));

    let err = same("CREATE (a:A)", "MATCH (a) RETURN a").await.unwrap_err();
    assert!(matches!(err, graphunit::Error::SemanticError(_)));
}
