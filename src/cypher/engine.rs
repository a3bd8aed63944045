//! Script execution.
//!
//! Two phases: [`plan`] resolves variables, evaluates property values and
//! raises every semantic error without touching the store; [`apply`] then
//! performs the writes. A script that fails validation writes nothing.

use std::collections::HashMap;

use crate::model::{NodeId, PropertyMap, Value};
use crate::storage::StorageBackend;
use crate::{Error, Result};
use super::ast::*;
use super::ScriptSummary;

/// A planned write. Relationship endpoints index into the node writes.
#[derive(Debug, Clone, PartialEq)]
enum Write {
    Node { labels: Vec<String>, properties: PropertyMap },
    Relationship { src: usize, dst: usize, rel_type: String, properties: PropertyMap },
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    Node(usize),
    Relationship,
}

pub(super) async fn execute<B: StorageBackend>(
    backend: &B,
    tx: &mut B::Tx,
    script: &Script,
    params: &PropertyMap,
) -> Result<ScriptSummary> {
    let writes = plan(script, params)?;
    apply(backend, tx, &writes).await
}

// ============================================================================
// Planning
// ============================================================================

fn plan(script: &Script, params: &PropertyMap) -> Result<Vec<Write>> {
    let mut planner = Planner { params, scope: HashMap::new(), writes: Vec::new(), nodes: 0 };
    for clause in &script.clauses {
        for pattern in &clause.patterns {
            planner.pattern(pattern)?;
        }
    }
    Ok(planner.writes)
}

struct Planner<'a> {
    params: &'a PropertyMap,
    scope: HashMap<String, Binding>,
    writes: Vec<Write>,
    /// Node writes planned so far.
    nodes: usize,
}

impl Planner<'_> {
    fn pattern(&mut self, pattern: &Pattern) -> Result<()> {
        let mut elements = pattern.elements.iter();
        let Some(PatternElement::Node(first)) = elements.next() else {
            return Err(Error::SemanticError("Pattern must start with a node".into()));
        };
        let mut current = self.node(first)?;

        while let Some(element) = elements.next() {
            let (PatternElement::Relationship(rel), Some(PatternElement::Node(next))) =
                (element, elements.next())
            else {
                return Err(Error::SemanticError(
                    "Pattern must alternate relationships and nodes".into(),
                ));
            };
            let rel_type = self.check_relationship(rel)?;
            let properties = self.properties(&rel.properties)?;
            // Bound before the target so `(a)-[r:R]->(r)` is rejected.
            if let Some(alias) = &rel.alias {
                self.scope.insert(alias.clone(), Binding::Relationship);
            }
            let other = self.node(next)?;
            let (src, dst) = match rel.direction {
                PatternDirection::Left => (other, current),
                _ => (current, other),
            };
            self.writes.push(Write::Relationship { src, dst, rel_type, properties });
            current = other;
        }
        Ok(())
    }

    /// Resolve a node pattern to a node write, creating one unless the
    /// alias is already bound.
    fn node(&mut self, pattern: &NodePattern) -> Result<usize> {
        if let Some(alias) = &pattern.alias {
            match self.scope.get(alias) {
                Some(Binding::Node(slot)) => {
                    if !pattern.labels.is_empty() || !pattern.properties.is_empty() {
                        return Err(Error::SemanticError(format!(
                            "Can't create node `{alias}` with labels or properties here. \
                             The variable is already declared in this context"
                        )));
                    }
                    return Ok(*slot);
                }
                Some(Binding::Relationship) => {
                    return Err(Error::SemanticError(format!(
                        "Variable `{alias}` already declared as a relationship"
                    )));
                }
                None => {}
            }
        }

        let mut labels: Vec<String> = Vec::with_capacity(pattern.labels.len());
        for label in &pattern.labels {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        let properties = self.properties(&pattern.properties)?;

        let slot = self.nodes;
        self.nodes += 1;
        self.writes.push(Write::Node { labels, properties });
        if let Some(alias) = &pattern.alias {
            self.scope.insert(alias.clone(), Binding::Node(slot));
        }
        Ok(slot)
    }

    fn check_relationship(&self, rel: &RelPattern) -> Result<String> {
        if let Some(alias) = &rel.alias {
            if self.scope.contains_key(alias) {
                return Err(Error::SemanticError(format!(
                    "Can't create relationship `{alias}`: the variable is already declared"
                )));
            }
        }
        if rel.direction == PatternDirection::Both {
            return Err(Error::SemanticError(
                "Only directed relationships are supported in CREATE".into(),
            ));
        }
        rel.rel_type.clone().ok_or_else(|| {
            Error::SemanticError(
                "Exactly one relationship type must be specified for CREATE".into(),
            )
        })
    }

    /// Evaluate a property map. `null` values leave the key absent.
    fn properties(&self, entries: &[(String, Expr)]) -> Result<PropertyMap> {
        let mut map = PropertyMap::with_capacity(entries.len());
        for (key, expr) in entries {
            match self.evaluate(expr)? {
                Some(value) => {
                    map.insert(key.clone(), value);
                }
                None => {
                    map.remove(key);
                }
            }
        }
        Ok(map)
    }

    fn evaluate(&self, expr: &Expr) -> Result<Option<Value>> {
        let value = match expr {
            Expr::Literal(Literal::Null) => return Ok(None),
            Expr::Literal(Literal::Bool(b)) => Value::Bool(*b),
            Expr::Literal(Literal::Int(i)) => Value::Int(*i),
            Expr::Literal(Literal::Float(f)) => Value::Float(*f),
            Expr::Literal(Literal::String(s)) => Value::String(s.clone()),
            Expr::Parameter(name) => self
                .params
                .get(name)
                .cloned()
                .ok_or_else(|| Error::SemanticError(format!("Expected parameter(s): {name}")))?,
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match self.evaluate(item)? {
                        Some(v) => values.push(v),
                        None => {
                            return Err(Error::SemanticError(
                                "Collections containing null values can not be stored in properties"
                                    .into(),
                            ));
                        }
                    }
                }
                Value::List(values)
            }
        };
        check_storable(&value)?;
        Ok(Some(value))
    }
}

/// Lists stored as properties must hold scalars of a single type.
fn check_storable(value: &Value) -> Result<()> {
    let Value::List(items) = value else {
        return Ok(());
    };
    if items.iter().any(Value::is_sequence) {
        return Err(Error::SemanticError(
            "Collections containing collections can not be stored in properties".into(),
        ));
    }
    if let Some(first) = items.first() {
        if let Some(other) = items.iter().find(|v| v.type_name() != first.type_name()) {
            return Err(Error::SemanticError(format!(
                "Collections containing mixed types can not be stored in properties \
                 ({} and {})",
                first.type_name(),
                other.type_name()
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Writes
// ============================================================================

async fn apply<B: StorageBackend>(
    backend: &B,
    tx: &mut B::Tx,
    writes: &[Write],
) -> Result<ScriptSummary> {
    let mut summary = ScriptSummary::default();
    let mut created: Vec<NodeId> = Vec::new();

    for write in writes {
        match write {
            Write::Node { labels, properties } => {
                let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                let id = backend.create_node(tx, &labels, properties.clone()).await?;
                created.push(id);
                summary.nodes_created += 1;
                summary.labels_added += labels.len() as u64;
                summary.properties_set += properties.len() as u64;
            }
            Write::Relationship { src, dst, rel_type, properties } => {
                let (src, dst) = match (created.get(*src), created.get(*dst)) {
                    (Some(s), Some(d)) => (*s, *d),
                    _ => {
                        return Err(Error::SemanticError(
                            "Relationship endpoint was not created".into(),
                        ));
                    }
                };
                backend.create_relationship(tx, src, dst, rel_type, properties.clone()).await?;
                summary.relationships_created += 1;
                summary.properties_set += properties.len() as u64;
            }
        }
    }
    Ok(summary)
}
