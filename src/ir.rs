//! Index-based graph view of a schema, consumed by the layout algorithms.

use crate::schema::{Relationship, Table};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct GraphIR {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    /// Name prefix before the first underscore, lowercased, or "misc".
    pub group: String,
}

/// Directed edge between node indices: `from` depends on `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

impl Edge {
    pub fn is_self_ref(&self) -> bool {
        self.from == self.to
    }
}

impl GraphIR {
    /// Build the graph. Relationship endpoints are matched to tables
    /// case-insensitively; relationships with an unknown endpoint are left out.
    pub fn from_tables(tables: &[Table], relationships: &[Relationship]) -> Self {
        let mut lookup: HashMap<String, usize> = HashMap::new();
        let mut nodes = Vec::with_capacity(tables.len());

        for table in tables {
            let key = table.name.to_lowercase();
            if lookup.contains_key(&key) {
                continue;
            }
            lookup.insert(key, nodes.len());
            nodes.push(Node {
                id: table.name.clone(),
                group: group_of(&table.name),
            });
        }

        let edges = relationships
            .iter()
            .filter_map(|r| {
                let from = *lookup.get(&r.from.to_lowercase())?;
                let to = *lookup.get(&r.to.to_lowercase())?;
                Some(Edge { from, to })
            })
            .collect();

        GraphIR { nodes, edges }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn group_of(name: &str) -> String {
    match name.split_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_lowercase(),
        _ => "misc".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(from: &str, to: &str) -> Relationship {
        Relationship {
            id: format!("{from}-{to}-0"),
            from: from.to_string(),
            to: to.to_string(),
            from_column: "x".to_string(),
            to_column: "id".to_string(),
        }
    }

    #[test]
    fn test_nodes_and_edges() {
        let tables = vec![Table::new("users"), Table::new("Orders")];
        let ir = GraphIR::from_tables(&tables, &[rel("orders", "USERS"), rel("orders", "ghosts")]);

        assert_eq!(ir.len(), 2);
        assert_eq!(ir.nodes[1].id, "Orders");
        assert_eq!(ir.edges, vec![Edge { from: 1, to: 0 }]);
    }

    #[test]
    fn test_groups() {
        let tables = vec![
            Table::new("Auth_users"),
            Table::new("auth_tokens"),
            Table::new("settings"),
            Table::new("_hidden"),
        ];
        let ir = GraphIR::from_tables(&tables, &[]);
        let groups: Vec<&str> = ir.nodes.iter().map(|n| n.group.as_str()).collect();
        assert_eq!(groups, vec!["auth", "auth", "misc", "misc"]);
    }
}
