use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Deserialize;

use crate::dimension::Dimension;
use crate::error::{DiError, Result};

/// Tag of the anchor node that holds several top-level hierarchies.
pub const SYNTHETIC_ROOT_TAG: &str = "__root__";

/// One node of a hierarchy as delivered by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// Node payload. The synthetic root is the only node without an id.
#[derive(Debug, Clone)]
pub struct TaxonomyNode {
    pub id: Option<i64>,
    pub tag: String,
}

/// Write-once rooted tree over a petgraph DiGraph.
///
/// Edges point from parent to child. Node ids are unique within a tree.
pub struct TaxonomyTree {
    dimension: Dimension,
    graph: DiGraph<TaxonomyNode, ()>,
    /// Map from service node id → NodeIndex for fast lookup.
    node_map: HashMap<i64, NodeIndex>,
    root: NodeIndex,
}

impl TaxonomyTree {
    /// Build a tree rooted at the service-provided root node.
    pub fn build(dimension: Dimension, root: &NodeSpec) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let root_idx = insert_subtree(dimension, &mut graph, &mut node_map, root, None)?;
        Ok(Self {
            dimension,
            graph,
            node_map,
            root: root_idx,
        })
    }

    /// Build a tree with a synthetic root anchoring every top-level hierarchy.
    pub fn build_forest(dimension: Dimension, hierarchies: &[NodeSpec]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let root_idx = graph.add_node(TaxonomyNode {
            id: None,
            tag: SYNTHETIC_ROOT_TAG.to_string(),
        });
        for hierarchy in hierarchies {
            insert_subtree(dimension, &mut graph, &mut node_map, hierarchy, Some(root_idx))?;
        }
        Ok(Self {
            dimension,
            graph,
            node_map,
            root: root_idx,
        })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Number of nodes, synthetic root included. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.node_map.contains_key(&id)
    }

    pub fn root(&self) -> &TaxonomyNode {
        &self.graph[self.root]
    }

    pub fn lookup(&self, id: i64) -> Result<&TaxonomyNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Node tag, or the `unknown {dimension} nr. {id}` placeholder on a miss.
    pub fn label_or_placeholder(&self, id: i64) -> Cow<'_, str> {
        match self.lookup(id) {
            Ok(node) => Cow::Borrowed(node.tag.as_str()),
            Err(_) => Cow::Owned(format!("unknown {} nr. {}", self.dimension, id)),
        }
    }

    /// Parent of a node; `None` for top-level nodes of a forest and for the root.
    pub fn parent(&self, id: i64) -> Result<Option<&TaxonomyNode>> {
        let idx = self.index_of(id)?;
        Ok(self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .map(|p| &self.graph[p])
            .filter(|p| p.id.is_some()))
    }

    /// Children of a node in input order.
    pub fn children(&self, id: i64) -> Result<Vec<&TaxonomyNode>> {
        let idx = self.index_of(id)?;
        Ok(self
            .ordered_children(idx)
            .into_iter()
            .map(|c| &self.graph[c])
            .collect())
    }

    /// Human-readable dump, one `tag[id]` per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let root = &self.graph[self.root];
        let _ = writeln!(out, "{}", display_node(root));
        self.render_children(self.root, "", &mut out);
        out
    }

    fn render_children(&self, idx: NodeIndex, prefix: &str, out: &mut String) {
        let children = self.ordered_children(idx);
        let last = children.len().saturating_sub(1);
        for (i, child) in children.into_iter().enumerate() {
            let (branch, extension) = if i == last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            let _ = writeln!(out, "{prefix}{branch}{}", display_node(&self.graph[child]));
            self.render_children(child, &format!("{prefix}{extension}"), out);
        }
    }

    // petgraph walks edges newest first.
    fn ordered_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    fn index_of(&self, id: i64) -> Result<NodeIndex> {
        self.node_map
            .get(&id)
            .copied()
            .ok_or(DiError::NodeNotFound {
                dimension: self.dimension,
                id,
            })
    }
}

fn display_node(node: &TaxonomyNode) -> String {
    match node.id {
        Some(id) => format!("{}[{}]", node.tag, id),
        None => node.tag.clone(),
    }
}

fn insert_subtree(
    dimension: Dimension,
    graph: &mut DiGraph<TaxonomyNode, ()>,
    node_map: &mut HashMap<i64, NodeIndex>,
    spec: &NodeSpec,
    parent: Option<NodeIndex>,
) -> Result<NodeIndex> {
    if node_map.contains_key(&spec.id) {
        return Err(DiError::Configuration(format!(
            "duplicate {dimension} node id {}",
            spec.id
        )));
    }
    let idx = graph.add_node(TaxonomyNode {
        id: Some(spec.id),
        tag: spec.name.clone(),
    });
    node_map.insert(spec.id, idx);
    if let Some(parent_idx) = parent {
        graph.add_edge(parent_idx, idx, ());
    }
    for child in &spec.children {
        insert_subtree(dimension, graph, node_map, child, Some(idx))?;
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, name: &str, children: Vec<NodeSpec>) -> NodeSpec {
        NodeSpec {
            id,
            name: name.to_string(),
            children,
        }
    }

    fn categories() -> TaxonomyTree {
        let spec = node(
            1,
            "Total",
            vec![
                node(2, "1. Energy", vec![node(4, "1.A Fuel combustion", vec![])]),
                node(3, "2. Industrial processes", vec![]),
            ],
        );
        TaxonomyTree::build(Dimension::Category, &spec).unwrap()
    }

    #[test]
    fn lookup_and_links() {
        let tree = categories();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.lookup(4).unwrap().tag, "1.A Fuel combustion");
        assert_eq!(tree.parent(4).unwrap().unwrap().id, Some(2));
        assert!(tree.parent(1).unwrap().is_none());

        let children: Vec<i64> = tree
            .children(1)
            .unwrap()
            .iter()
            .filter_map(|n| n.id)
            .collect();
        assert_eq!(children, vec![2, 3]);
    }

    #[test]
    fn miss_is_typed_and_recoverable() {
        let tree = categories();
        assert!(matches!(
            tree.lookup(99),
            Err(DiError::NodeNotFound { id: 99, .. })
        ));
        assert_eq!(tree.label_or_placeholder(99), "unknown category nr. 99");
        assert_eq!(tree.label_or_placeholder(3), "2. Industrial processes");
    }

    #[test]
    fn forest_hangs_off_synthetic_root() {
        let tree = TaxonomyTree::build_forest(
            Dimension::Measure,
            &[
                node(10, "Net emissions", vec![node(11, "Emissions", vec![])]),
                node(20, "Activity data", vec![]),
            ],
        )
        .unwrap();
        assert_eq!(tree.root().tag, SYNTHETIC_ROOT_TAG);
        assert!(tree.root().id.is_none());
        assert!(tree.parent(20).unwrap().is_none());
        assert_eq!(tree.parent(11).unwrap().unwrap().tag, "Net emissions");
        assert_eq!(tree.label_or_placeholder(7), "unknown measure nr. 7");

        let empty = TaxonomyTree::build_forest(Dimension::Measure, &[]).unwrap();
        assert_eq!(empty.len(), 1);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let spec = node(1, "Total", vec![node(1, "Again", vec![])]);
        assert!(matches!(
            TaxonomyTree::build(Dimension::Category, &spec),
            Err(DiError::Configuration(_))
        ));
    }

    #[test]
    fn render_shows_ids_in_input_order() {
        let rendered = categories().render();
        let expected = "Total[1]\n\
                        ├── 1. Energy[2]\n\
                        │   └── 1.A Fuel combustion[4]\n\
                        └── 2. Industrial processes[3]\n";
        assert_eq!(rendered, expected);
    }
}
