//! Cypher export: render a graph as a CREATE script.
//!
//! The rendered script is what a failed assertion prints for both sides,
//! and it is valid input for [`CypherEngine`](crate::cypher::CypherEngine),
//! so a snapshot can be turned back into a reference graph.
//!
//! ```text
//! store ──capture──▶ GraphSnapshot ──render_cypher──▶ CREATE (n0:Person {...}), ...
//! ```

use std::io::Write;

use crate::model::*;
use crate::policy::InclusionPolicies;
use crate::snapshot::GraphSnapshot;
use crate::storage::StorageBackend;
use crate::Result;

/// Render a snapshot as one CREATE statement.
///
/// Nodes come first in id order, bound to `n0, n1, ...` by position, then
/// relationships in id order. An empty snapshot renders as an empty string.
pub fn render_cypher(graph: &GraphSnapshot) -> String {
    let mut patterns = Vec::with_capacity(graph.node_count() + graph.relationship_count());

    for (i, node) in graph.nodes().iter().enumerate() {
        patterns.push(node_pattern(&format!("n{i}"), node));
    }
    for rel in graph.relationships() {
        // Snapshots never hold dangling relationships.
        let (Some(a), Some(b)) = (graph.position(rel.src), graph.position(rel.dst)) else {
            continue;
        };
        patterns.push(format!("(n{a})-{}->(n{b})", rel_pattern(rel)));
    }

    if patterns.is_empty() {
        return String::new();
    }
    format!("CREATE\n  {}", patterns.join(",\n  "))
}

/// Write the rendered script of everything `policies` admits in `backend`.
pub async fn export_cypher_dump<B: StorageBackend>(
    backend: &B,
    tx: &B::Tx,
    policies: &InclusionPolicies,
    writer: &mut dyn Write,
) -> Result<()> {
    let graph = GraphSnapshot::capture(backend, tx, policies).await?;

    writeln!(writer, "// graphunit Cypher DUMP")?;
    writeln!(writer, "// Nodes: {}", graph.node_count())?;
    writeln!(writer, "// Relationships: {}", graph.relationship_count())?;
    let script = render_cypher(&graph);
    if !script.is_empty() {
        writeln!(writer, "{script};")?;
    }
    Ok(())
}

// ============================================================================
// Pattern fragments (shared with mismatch diagnostics)
// ============================================================================

/// `(var:L1:L2 {k: v})` with labels and keys in sorted order.
pub(crate) fn node_pattern(var: &str, node: &Node) -> String {
    let mut out = format!("({var}");
    for label in node.label_set() {
        out.push(':');
        out.push_str(&identifier(label));
    }
    let props = format_properties(&node.properties);
    if !props.is_empty() {
        if !var.is_empty() || !node.labels.is_empty() {
            out.push(' ');
        }
        out.push_str(&props);
    }
    out.push(')');
    out
}

/// `[:TYPE {k: v}]`
pub(crate) fn rel_pattern(rel: &Relationship) -> String {
    signature_pattern(&rel.rel_type, &rel.properties)
}

pub(crate) fn signature_pattern(rel_type: &str, properties: &PropertyMap) -> String {
    let props = format_properties(properties);
    if props.is_empty() {
        format!("[:{}]", identifier(rel_type))
    } else {
        format!("[:{} {}]", identifier(rel_type), props)
    }
}

/// `{k: v, ...}` in key order, or an empty string for an empty map.
pub(crate) fn format_properties(props: &PropertyMap) -> String {
    if props.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = sorted_keys(props)
        .into_iter()
        .map(|key| format!("{}: {}", identifier(key), props[key]))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// Bare identifier when possible, back-ticked otherwise.
fn identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}
